use folio_core::Navigator;

use crate::cli::PostFields;
use crate::commands::common::{
    apply_fields, attach_images, capture_editor_input_with_initial, open_coordinator,
    read_piped_stdin, GlobalOptions,
};
use crate::error::CliError;

pub async fn run_new(fields: &PostFields, options: &GlobalOptions) -> Result<(), CliError> {
    let coordinator = open_coordinator(options).await?;
    let mut navigator = Navigator::new();
    navigator.create_new();

    let mut form = navigator.editor_form().unwrap_or_default();
    apply_fields(&mut form, fields);
    if fields.content.is_none() && !form.title.trim().is_empty() {
        form.content = resolve_new_content()?.unwrap_or_default();
    }
    attach_images(&coordinator, &mut form, &fields.images).await?;

    let post = navigator.save(&coordinator, &form).await?;
    println!("{}", post.id);
    Ok(())
}

fn resolve_new_content() -> Result<Option<String>, CliError> {
    if let Some(content) = read_piped_stdin()? {
        return Ok(Some(content));
    }
    capture_editor_input_with_initial("")
}


use folio_core::Navigator;

use crate::cli::PostFields;
use crate::commands::common::{
    apply_fields, attach_images, capture_editor_input_with_initial, normalize_post_identifier,
    open_coordinator, read_piped_stdin, resolve_post, GlobalOptions,
};
use crate::error::CliError;

pub async fn run_edit(
    id: &str,
    fields: &PostFields,
    options: &GlobalOptions,
) -> Result<(), CliError> {
    let normalized_id = normalize_post_identifier(id)?;
    let coordinator = open_coordinator(options).await?;
    let post = resolve_post(&normalized_id, &coordinator.posts())?;

    let mut navigator = Navigator::new();
    navigator.edit_post(post.clone());
    let mut form = navigator.editor_form().unwrap_or_default();
    apply_fields(&mut form, fields);

    // Without any field flags the body is edited interactively.
    if fields.content.is_none() {
        if let Some(content) = read_piped_stdin()? {
            form.content = content;
        } else if !has_field_overrides(fields) {
            form.content = capture_editor_input_with_initial(&post.content)?.unwrap_or_default();
        }
    }
    attach_images(&coordinator, &mut form, &fields.images).await?;

    let updated = navigator.save(&coordinator, &form).await?;
    println!("{}", updated.id);
    Ok(())
}

pub fn has_field_overrides(fields: &PostFields) -> bool {
    fields.title.is_some()
        || fields.content.is_some()
        || fields.excerpt.is_some()
        || fields.author.is_some()
        || fields.cover.is_some()
        || fields.tags.is_some()
        || fields.read_time.is_some()
        || fields.date.is_some()
        || !fields.images.is_empty()
}

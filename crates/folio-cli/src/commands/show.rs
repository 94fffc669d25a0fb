use folio_core::Navigator;

use crate::commands::common::{
    normalize_post_identifier, open_coordinator, render_post, resolve_post, GlobalOptions,
};
use crate::error::CliError;

pub async fn run_show(id: &str, as_json: bool, options: &GlobalOptions) -> Result<(), CliError> {
    let normalized_id = normalize_post_identifier(id)?;
    let coordinator = open_coordinator(options).await?;
    let post = resolve_post(&normalized_id, &coordinator.posts())?;

    let mut navigator = Navigator::new();
    navigator.view_post(post);
    let Some(post) = navigator.selected() else {
        return Err(CliError::PostNotFound(normalized_id));
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(post)?);
    } else {
        println!("{}", render_post(post));
    }
    Ok(())
}

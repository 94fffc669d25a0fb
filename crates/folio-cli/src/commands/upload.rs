use std::path::Path;

use folio_core::backend::Asset;

use crate::commands::common::{open_coordinator, GlobalOptions};
use crate::error::CliError;

pub async fn run_upload(path: &Path, options: &GlobalOptions) -> Result<(), CliError> {
    // Reject non-images before touching the network.
    let asset = Asset::from_path(path)?;
    let coordinator = open_coordinator(options).await?;

    let url = coordinator.upload_asset(&asset).await?;
    println!("{url}");
    Ok(())
}

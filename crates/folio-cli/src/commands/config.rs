use std::path::{Path, PathBuf};

use folio_core::config::ClientConfig;
use folio_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::commands::common::{load_config, resolve_config_path, resolve_data_dir, GlobalOptions};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, options: &GlobalOptions) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            api_url,
            data_dir,
            timeout,
        } => {
            let path = resolve_config_path(options.config_path.clone())?;
            let config = run_config_init(&path, api_url, data_dir, timeout)?;
            println!("Saved config to {}", path.display());
            println!("API: {}", config.api_base_url);
            Ok(())
        }
        ConfigCommands::Show => run_config_show(options),
    }
}

/// Merge explicit values into the existing config file and save it.
pub fn run_config_init(
    path: &Path,
    api_url: Option<String>,
    data_dir: Option<PathBuf>,
    timeout: Option<u64>,
) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::load_from_path(path)?;

    if let Some(url) = normalize_text_option(api_url) {
        config.api_base_url = url;
    }
    if let Some(dir) = data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(timeout) = timeout {
        config.request_timeout_secs = timeout;
    }

    config.normalize()?;
    config.save_to_path(path)?;
    Ok(config)
}

fn run_config_show(options: &GlobalOptions) -> Result<(), CliError> {
    let path = resolve_config_path(options.config_path.clone())?;
    let config = load_config(options)?;
    let data_dir = resolve_data_dir(&config)?;

    println!("config:    {}", path.display());
    println!("api:       {}", config.api_base_url);
    println!("timeout:   {}s", config.request_timeout_secs);
    println!("data dir:  {}", data_dir.display());
    println!("offline:   {}", options.offline);
    Ok(())
}

mod cli;
mod commands;
mod error;


use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::GlobalOptions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::list::run_list;
use crate::commands::new::run_new;
use crate::commands::show::run_show;
use crate::commands::upload::run_upload;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "folio=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = GlobalOptions {
        api_url: cli.api_url,
        data_dir: cli.data_dir,
        offline: cli.offline,
        config_path: cli.config,
    };

    match cli.command {
        Commands::List { limit, tag, json } => {
            run_list(limit, tag.as_deref(), json, &options).await?;
        }
        Commands::Show { id, json } => run_show(&id, json, &options).await?,
        Commands::New { fields } => run_new(&fields, &options).await?,
        Commands::Edit { id, fields } => run_edit(&id, &fields, &options).await?,
        Commands::Delete { id, yes } => run_delete(&id, yes, &options).await?,
        Commands::Upload { path } => run_upload(&path, &options).await?,
        Commands::Config { command } => run_config(command, &options)?,
    }

    Ok(())
}

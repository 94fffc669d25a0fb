use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Read and write blog posts, online or off")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Blog API host (the posts API lives under <URL>/api)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Directory of the local post store
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Never contact the API; read and write the local store only
    #[arg(long, global = true)]
    pub offline: bool,

    /// Optional path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List posts, newest first
    List {
        /// Number of posts to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only show posts carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single post
    Show {
        /// Post ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a new post
    #[command(alias = "add")]
    New {
        #[command(flatten)]
        fields: PostFields,
    },
    /// Edit an existing post
    Edit {
        /// Post ID or unique ID prefix
        id: String,
        #[command(flatten)]
        fields: PostFields,
    },
    /// Delete a post
    Delete {
        /// Post ID or unique ID prefix
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Upload an image and print its URL
    Upload {
        /// Image file to upload
        path: PathBuf,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Editor form fields. Anything left out keeps its current value (or the
/// default when creating).
#[derive(Args, Debug, Default, Clone)]
pub struct PostFields {
    #[arg(long)]
    pub title: Option<String>,
    /// Markdown body; read from stdin or $EDITOR when omitted
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub excerpt: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    /// Cover image URL
    #[arg(long, value_name = "URL")]
    pub cover: Option<String>,
    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,
    /// Minutes; derived from the content when 0
    #[arg(long, value_name = "MINUTES")]
    pub read_time: Option<u32>,
    /// Publication date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,
    /// Upload an image and append it to the content (repeatable)
    #[arg(long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create or update the config file
    Init {
        /// Blog API host
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// Directory of the local post store
        #[arg(long, value_name = "PATH")]
        data_dir: Option<PathBuf>,
        /// Request timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
    /// Print the effective configuration
    Show,
}

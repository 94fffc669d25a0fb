use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use folio_core::backend::{Asset, FileStore, LocalBackend, RemoteBackend};
use folio_core::config::ClientConfig;
use folio_core::util::normalize_text_option;
use folio_core::{Coordinator, Post, PostForm};
use serde::Serialize;

use crate::cli::PostFields;
use crate::error::CliError;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub api_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub offline: bool,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct PostListItem {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub date: Option<NaiveDate>,
    pub read_time: u32,
    pub tags: Vec<String>,
}

pub fn resolve_config_path(cli_config_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_config_path {
        return Ok(path);
    }
    dirs::config_dir()
        .map(|dir| dir.join("folio").join("config.json"))
        .ok_or_else(|| CliError::Config("Failed to resolve config directory".to_string()))
}

/// Config file, then `FOLIO_*` environment, then command-line flags.
pub fn load_config(options: &GlobalOptions) -> Result<ClientConfig, CliError> {
    let path = resolve_config_path(options.config_path.clone())?;
    let mut config = ClientConfig::load_from_path(&path)?;
    config.apply_env()?;

    if let Some(url) = normalize_text_option(options.api_url.clone()) {
        config.api_base_url = url;
    }
    if let Some(dir) = options.data_dir.clone() {
        config.data_dir = Some(dir);
    }
    config.normalize()?;
    Ok(config)
}

pub fn resolve_data_dir(config: &ClientConfig) -> Result<PathBuf, CliError> {
    if let Some(dir) = config.data_dir.clone() {
        return Ok(dir);
    }
    dirs::data_dir()
        .map(|dir| dir.join("folio"))
        .ok_or_else(|| CliError::Config("Failed to resolve data directory".to_string()))
}

/// Build a coordinator for the effective config and load the collection.
pub async fn open_coordinator(options: &GlobalOptions) -> Result<Coordinator, CliError> {
    let config = load_config(options)?;
    let data_dir = resolve_data_dir(&config)?;
    let local = Arc::new(LocalBackend::new(FileStore::new(data_dir)));

    let coordinator = if options.offline {
        Coordinator::local_only(local)
    } else {
        let remote = Arc::new(RemoteBackend::from_config(&config)?);
        Coordinator::new(remote, local)
    };

    coordinator.load().await;
    if coordinator.is_degraded() && !options.offline {
        eprintln!(
            "warning: {} is unreachable; showing local posts",
            config.api_base_url
        );
    }
    Ok(coordinator)
}

pub fn normalize_post_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyPostId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Find a post by exact ID, falling back to a unique ID prefix.
pub fn resolve_post(post_query: &str, posts: &[Post]) -> Result<Post, CliError> {
    if let Some(post) = posts.iter().find(|post| post.id.as_str() == post_query) {
        return Ok(post.clone());
    }

    let matching = posts
        .iter()
        .filter(|post| post.id.as_str().starts_with(post_query))
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Err(CliError::PostNotFound(post_query.to_string())),
        [post] => Ok((*post).clone()),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|post| short_id(post))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousPostId(format!(
                "ID prefix '{post_query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn short_id(post: &Post) -> String {
    post.id.as_str().chars().take(13).collect()
}

pub fn filter_posts(posts: Vec<Post>, tag: Option<&str>, limit: usize) -> Vec<Post> {
    posts
        .into_iter()
        .filter(|post| tag.is_none_or(|tag| post.has_tag(tag)))
        .take(limit)
        .collect()
}

pub fn format_post_lines(posts: &[Post]) -> Vec<String> {
    posts
        .iter()
        .map(|post| {
            let id = short_id(post);
            let title = truncate_chars(&post.title, 40);
            let date = format_date(post);
            let tags = render_tags(post);

            if tags.is_empty() {
                format!("{id:<13}  {title:<40}  {date}")
            } else {
                format!("{id:<13}  {title:<40}  {date:<10}  {tags}")
            }
        })
        .collect()
}

pub fn post_to_list_item(post: &Post) -> PostListItem {
    PostListItem {
        id: post.id.to_string(),
        title: post.title.clone(),
        excerpt: post.excerpt.clone(),
        author: post.author.clone(),
        date: post.display_date(),
        read_time: post.read_time,
        tags: post.tags.clone(),
    }
}

/// Full-page rendering used by `folio show`.
pub fn render_post(post: &Post) -> String {
    let mut lines = vec![
        post.title.clone(),
        format!(
            "{} · {} · {}",
            post.author,
            format_date(post),
            format_read_time(post.read_time)
        ),
    ];
    let tags = render_tags(post);
    if !tags.is_empty() {
        lines.push(tags);
    }
    if let Some(cover) = &post.cover_image {
        lines.push(format!("cover: {cover}"));
    }
    lines.push(String::new());
    lines.push(post.content.clone());
    lines.join("\n")
}

pub fn format_date(post: &Post) -> String {
    post.display_date()
        .map_or_else(|| "undated".to_string(), |date| date.format("%Y-%m-%d").to_string())
}

pub fn format_read_time(minutes: u32) -> String {
    format!("{minutes} min read")
}

pub fn render_tags(post: &Post) -> String {
    post.tags
        .iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

/// Copy the fields given on the command line into the editor form.
pub fn apply_fields(form: &mut PostForm, fields: &PostFields) {
    if let Some(title) = &fields.title {
        form.title.clone_from(title);
    }
    if let Some(content) = &fields.content {
        form.content.clone_from(content);
    }
    if let Some(excerpt) = &fields.excerpt {
        form.excerpt.clone_from(excerpt);
    }
    if let Some(author) = &fields.author {
        form.author.clone_from(author);
    }
    if let Some(cover) = &fields.cover {
        form.cover_image.clone_from(cover);
    }
    if let Some(tags) = &fields.tags {
        form.tags.clone_from(tags);
    }
    if let Some(read_time) = fields.read_time {
        form.read_time = read_time;
    }
    if let Some(date) = fields.date {
        form.date = Some(date);
    }
}

/// Upload every `--image` and append it to the form content.
pub async fn attach_images(
    coordinator: &Coordinator,
    form: &mut PostForm,
    paths: &[PathBuf],
) -> Result<(), CliError> {
    for path in paths {
        let asset = Asset::from_path(path)?;
        let url = coordinator.upload_into(form, &asset).await?;
        tracing::debug!("Attached {} as {}", path.display(), url);
    }
    Ok(())
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_post_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        // EDITOR values like "code --wait" carry arguments.
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let status = Command::new(program).args(parts).arg(file_path).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

fn create_temp_post_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("folio-post-{}-{now}.md", std::process::id()))
}

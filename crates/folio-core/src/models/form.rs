//! Editor input and its normalization into a creation payload.

use chrono::{Local, NaiveDate};

use crate::error::{Field, ValidationError};
use crate::models::post::{Post, PostDraft, DEFAULT_AUTHOR};

/// Characters kept when deriving an excerpt from content
pub const EXCERPT_CHARS: usize = 100;

/// Characters of content per minute of estimated reading
pub const CHARS_PER_MINUTE: usize = 500;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_AUTHOR_CHARS: usize = 100;
pub const MAX_READ_TIME: u32 = 120;

/// Raw editor form input, exactly as typed.
///
/// `tags` is the comma-joined text field and `read_time` is `0` when the
/// field was left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub cover_image: String,
    pub tags: String,
    pub read_time: u32,
    pub date: Option<NaiveDate>,
}

impl PostForm {
    /// Pre-fill the form from an existing record for editing.
    #[must_use]
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            author: post.author.clone(),
            cover_image: post.cover_image.clone().unwrap_or_default(),
            tags: post.tags.join(", "),
            read_time: post.read_time,
            date: post.date,
        }
    }

    /// Append a Markdown image reference to the content being edited.
    pub fn append_image(&mut self, alt: &str, url: &str) {
        if !self.content.is_empty() && !self.content.ends_with('\n') {
            self.content.push('\n');
        }
        self.content.push_str(&format!("![{alt}]({url})\n"));
    }

    /// Validate and normalize into a creation payload.
    ///
    /// Title and content are checked first; nothing else is evaluated when
    /// either is blank.
    pub fn normalize(&self) -> Result<PostDraft, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyField(Field::Title));
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyField(Field::Content));
        }

        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(ValidationError::TooLong {
                field: Field::Title,
                max: MAX_TITLE_CHARS,
            });
        }

        let author = match self.author.trim() {
            "" => DEFAULT_AUTHOR.to_string(),
            author if author.chars().count() > MAX_AUTHOR_CHARS => {
                return Err(ValidationError::TooLong {
                    field: Field::Author,
                    max: MAX_AUTHOR_CHARS,
                });
            }
            author => author.to_string(),
        };

        // Only an entered value is range-checked; a derived one is capped.
        let read_time = match self.read_time {
            0 => estimate_read_time(content).min(MAX_READ_TIME),
            entered if entered > MAX_READ_TIME => {
                return Err(ValidationError::OutOfRange {
                    field: Field::ReadTime,
                    min: 1,
                    max: MAX_READ_TIME,
                });
            }
            entered => entered,
        };

        let excerpt = match self.excerpt.trim() {
            "" => derive_excerpt(content),
            excerpt => excerpt.to_string(),
        };

        let cover_image = match self.cover_image.trim() {
            "" => None,
            url => Some(url.to_string()),
        };

        Ok(PostDraft {
            title: title.to_string(),
            excerpt,
            content: content.to_string(),
            author,
            cover_image,
            tags: split_tags(&self.tags),
            read_time,
            date: Some(self.date.unwrap_or_else(|| Local::now().date_naive())),
        })
    }
}

/// Split comma-separated tag input, trimming each entry and dropping blanks.
/// Order is preserved.
#[must_use]
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// `ceil(chars / 500)`, never below one minute.
#[must_use]
pub fn estimate_read_time(content: &str) -> u32 {
    let minutes = content.chars().count().div_ceil(CHARS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// First 100 characters of content followed by `...`
#[must_use]
pub fn derive_excerpt(content: &str) -> String {
    let mut excerpt = content.chars().take(EXCERPT_CHARS).collect::<String>();
    excerpt.push_str("...");
    excerpt
}

//! Post model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Author placeholder used when the editor leaves the field blank
pub const DEFAULT_AUTHOR: &str = "匿名";

/// Read time assumed when a stored record has none
pub const DEFAULT_READ_TIME: u32 = 5;

/// An opaque post identifier.
///
/// Locally created posts get a UUID v7 (time-sortable); ids coming from the
/// API or the bundled samples are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Create a new unique post ID using UUID v7
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PostId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PostId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A blog post.
///
/// Records from the local store carry `date`; records from the API carry
/// `created_at`/`updated_at`. Both shapes deserialize into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt: String,
    /// Markdown source
    pub content: String,
    #[serde(default = "default_author", deserialize_with = "null_as_author")]
    pub author: String,
    #[serde(default, alias = "coverImage")]
    pub cover_image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default = "default_read_time", alias = "readTime")]
    pub read_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "timestamp::deserialize"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "timestamp::deserialize"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Merge every field set in `patch` over this record. The id never changes.
    pub fn apply_patch(&mut self, patch: &PostPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(excerpt) = &patch.excerpt {
            self.excerpt.clone_from(excerpt);
        }
        if let Some(content) = &patch.content {
            self.content.clone_from(content);
        }
        if let Some(author) = &patch.author {
            self.author.clone_from(author);
        }
        if let Some(cover_image) = &patch.cover_image {
            self.cover_image.clone_from(cover_image);
        }
        if let Some(tags) = &patch.tags {
            self.tags.clone_from(tags);
        }
        if let Some(read_time) = patch.read_time {
            self.read_time = read_time;
        }
        if let Some(date) = patch.date {
            self.date = Some(date);
        }
    }

    /// Publication date for display: the local `date`, else the server's
    /// creation day.
    #[must_use]
    pub fn display_date(&self) -> Option<NaiveDate> {
        self.date
            .or_else(|| self.created_at.map(|created| created.date_naive()))
    }

    /// Case-insensitive tag membership check
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.tags.iter().any(|candidate| candidate.eq_ignore_ascii_case(tag))
    }
}

/// A normalized creation payload. Has no id; the backend assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub read_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl PostDraft {
    /// Materialize the draft as a record with the given id.
    #[must_use]
    pub fn into_post(self, id: PostId) -> Post {
        Post {
            id,
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            author: self.author,
            cover_image: self.cover_image,
            tags: self.tags,
            read_time: self.read_time,
            date: self.date,
            created_at: None,
            updated_at: None,
        }
    }

    /// Full-field patch carrying every value of this draft
    #[must_use]
    pub fn into_patch(self) -> PostPatch {
        PostPatch {
            title: Some(self.title),
            excerpt: Some(self.excerpt),
            content: Some(self.content),
            author: Some(self.author),
            cover_image: Some(self.cover_image),
            tags: Some(self.tags),
            read_time: Some(self.read_time),
            date: self.date,
        }
    }
}

/// Partial update. Unset fields are left untouched on the target record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// `Some(None)` clears the cover image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl PostPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

const fn default_read_time() -> u32 {
    DEFAULT_READ_TIME
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_author<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_author))
}

/// The API emits naive UTC timestamps (`2026-01-08T10:00:00.123456`); other
/// producers emit RFC 3339. Accept both.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse(&raw).map(Some).map_err(D::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|error| format!("invalid timestamp '{raw}': {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Post {
        PostDraft {
            title: "Hello".to_string(),
            excerpt: "Intro...".to_string(),
            content: "Intro text".to_string(),
            author: "Ana".to_string(),
            cover_image: None,
            tags: vec!["rust".to_string()],
            read_time: 1,
            date: NaiveDate::from_ymd_opt(2026, 1, 8),
        }
        .into_post(PostId::from("p1"))
    }

    #[test]
    fn test_post_id_unique() {
        assert_ne!(PostId::generate(), PostId::generate());
    }

    #[test]
    fn test_apply_patch_merges_only_set_fields() {
        let mut post = sample();
        post.apply_patch(&PostPatch {
            title: Some("Renamed".to_string()),
            cover_image: Some(Some("https://img.example/a.png".to_string())),
            ..PostPatch::default()
        });

        assert_eq!(post.id, PostId::from("p1"));
        assert_eq!(post.title, "Renamed");
        assert_eq!(post.content, "Intro text");
        assert_eq!(
            post.cover_image.as_deref(),
            Some("https://img.example/a.png")
        );
        assert_eq!(post.tags, vec!["rust".to_string()]);
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = PostPatch {
            read_time: Some(3),
            ..PostPatch::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({ "read_time": 3 })
        );
        assert!(PostPatch::default().is_empty());
    }

    #[test]
    fn test_deserialize_api_record() {
        let raw = r#"{
            "id": "9f1c",
            "title": "From API",
            "excerpt": null,
            "content": "Body",
            "author": "Bo",
            "cover_image": null,
            "tags": ["a", "b"],
            "read_time": 4,
            "created_at": "2026-01-08T10:00:00.123456",
            "updated_at": "2026-01-09T08:30:00Z"
        }"#;

        let post: Post = serde_json::from_str(raw).unwrap();
        assert_eq!(post.excerpt, "");
        assert_eq!(post.tags, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            post.display_date(),
            NaiveDate::from_ymd_opt(2026, 1, 8)
        );
        assert!(post.updated_at.is_some());
    }

    #[test]
    fn test_deserialize_legacy_camel_case_record() {
        let raw = r#"{
            "id": "1",
            "title": "Legacy",
            "excerpt": "x",
            "content": "y",
            "author": "Zhang",
            "date": "2026-01-04",
            "coverImage": "https://img.example/c.jpg",
            "tags": [],
            "readTime": 6
        }"#;

        let post: Post = serde_json::from_str(raw).unwrap();
        assert_eq!(post.read_time, 6);
        assert_eq!(post.cover_image.as_deref(), Some("https://img.example/c.jpg"));
        assert_eq!(post.date, NaiveDate::from_ymd_opt(2026, 1, 4));
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let post: Post =
            serde_json::from_str(r#"{"id":"2","title":"T","content":"C","author":null}"#).unwrap();
        assert_eq!(post.author, DEFAULT_AUTHOR);
        assert_eq!(post.read_time, DEFAULT_READ_TIME);
        assert!(post.tags.is_empty());
    }

    #[test]
    fn test_rejects_garbage_timestamp() {
        let result = serde_json::from_str::<Post>(
            r#"{"id":"3","title":"T","content":"C","created_at":"yesterday"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_has_tag_ignores_case() {
        let post = sample();
        assert!(post.has_tag("Rust"));
        assert!(!post.has_tag("go"));
    }
}

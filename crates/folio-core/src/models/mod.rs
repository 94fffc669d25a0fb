//! Data models for Folio

mod form;
mod post;

pub use form::{derive_excerpt, estimate_read_time, split_tags, PostForm};
pub use post::{Post, PostDraft, PostId, PostPatch, DEFAULT_AUTHOR, DEFAULT_READ_TIME};

//! Persistence backends for posts.
//!
//! [`PostBackend`] is implemented by [`RemoteBackend`] (the REST API) and by
//! [`LocalBackend`] (a JSON array in a [`KeyValueStore`]). The coordinator
//! talks to both through the trait and never knows which one it holds.

mod local;
mod remote;
mod store;

use std::path::Path;

use async_trait::async_trait;

use crate::error::{Result, UploadError};
use crate::models::{Post, PostDraft, PostId, PostPatch};

pub use local::{LocalBackend, STORAGE_KEY};
pub use remote::RemoteBackend;
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Capability set shared by every persistence variant.
#[async_trait]
pub trait PostBackend: Send + Sync {
    /// All posts, newest first
    async fn list(&self) -> Result<Vec<Post>>;

    /// A single post; `Error::NotFound` when absent
    async fn get(&self, id: &PostId) -> Result<Post>;

    /// Persist a new post and return the canonical record with its id
    async fn create(&self, draft: &PostDraft) -> Result<Post>;

    /// Merge `patch` over the stored record and return the canonical result
    async fn update(&self, id: &PostId, patch: &PostPatch) -> Result<Post>;

    async fn delete(&self, id: &PostId) -> Result<()>;

    /// Store an image and return a URL that can be embedded in content
    async fn upload_asset(&self, asset: &Asset) -> Result<String>;
}

/// An image selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Asset {
    /// Build an asset, guessing the content type from the file name.
    ///
    /// Only images are accepted.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(UploadError::NotAnImage(file_name).into());
        }
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Read an image file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        // Check the type before reading a potentially large non-image file.
        Self::new(file_name.clone(), Vec::new())?;
        let bytes = std::fs::read(path)?;
        Self::new(file_name, bytes)
    }
}

//! Error types for folio-core

use thiserror::Error;

/// Result type alias using folio-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in folio-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Editor input rejected before any I/O
    #[error("Invalid post: {0}")]
    Validation(#[from] ValidationError),

    /// Remote API failure
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Local store failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Asset upload failure
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    /// Post not found
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation not available from the current view
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Form fields that are checked by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Content,
    Author,
    ReadTime,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Author => "author",
            Self::ReadTime => "read_time",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    EmptyField(Field),

    #[error("{field} is longer than {max} characters")]
    TooLong { field: Field, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: Field, min: u32, max: u32 },
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Network(String),

    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse API response: {0}")]
    ParseFailure(String),
}

impl BackendError {
    /// HTTP status carried by the error, if the server answered at all.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to read '{key}': {message}")]
    Read { key: String, message: String },

    #[error("failed to write '{key}': {message}")]
    Write { key: String, message: String },

    #[error("storage quota exceeded writing '{key}' ({size} bytes)")]
    QuotaExceeded { key: String, size: usize },

    #[error("stored value under '{key}' is corrupted: {message}")]
    Corrupted { key: String, message: String },
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("'{0}' is not an image")]
    NotAnImage(String),

    #[error("upload request failed: {0}")]
    Network(String),

    #[error("upload rejected with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid upload response: {0}")]
    InvalidResponse(String),
}

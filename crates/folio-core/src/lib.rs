//! folio-core - Core library for Folio
//!
//! This crate contains the post model and editor validation, the remote and
//! local persistence backends, the data coordinator that falls back between
//! them, and the navigation state used by Folio front ends.

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod navigation;
pub mod seed;
pub mod util;

#[cfg(test)]
mod test_support;

pub use coordinator::{Coordinator, LoadOutcome, LoadStatus, Mode, UploadState};
pub use error::{Error, Result};
pub use models::{Post, PostDraft, PostForm, PostId, PostPatch};
pub use navigation::{NavigationState, Navigator, View};

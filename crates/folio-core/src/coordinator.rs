//! The data coordinator: owns the in-memory post collection and mediates
//! every read and write against the persistence backends.
//!
//! Reads degrade silently: when the API cannot be listed the coordinator
//! switches to the local backend and still reports `Ready`. Writes never
//! degrade: a failed write is returned to the caller and `posts` keeps the
//! last state confirmed by a backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backend::{Asset, PostBackend};
use crate::error::{Error, Result};
use crate::models::{Post, PostDraft, PostForm, PostId, PostPatch};
use crate::seed::default_posts;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    /// Not produced by [`Coordinator::load`], which always falls back to
    /// local data
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Reads and writes go to the API
    Remote,
    /// The API was unreachable; reads and writes go to the local store
    LocalFallback,
}

/// Result of a single `load` call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied(Mode),
    /// A newer load started before this one finished; its result was dropped
    Superseded,
}

/// Asset upload progress, tracked apart from the post collection
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadState {
    pub pending: bool,
    pub error: Option<String>,
}

struct State {
    posts: Vec<Post>,
    load_status: LoadStatus,
    mode: Mode,
    error: Option<String>,
    upload: UploadState,
}

pub struct Coordinator {
    remote: Option<Arc<dyn PostBackend>>,
    local: Arc<dyn PostBackend>,
    state: Mutex<State>,
    load_generation: AtomicU64,
    /// Bumped under the state lock by every applied write
    write_epoch: AtomicU64,
    write_lock: tokio::sync::Mutex<()>,
}

impl Coordinator {
    /// Coordinator that prefers `remote` and falls back to `local`.
    pub fn new(remote: Arc<dyn PostBackend>, local: Arc<dyn PostBackend>) -> Self {
        Self::build(Some(remote), local, Mode::Remote)
    }

    /// Coordinator that never contacts an API.
    pub fn local_only(local: Arc<dyn PostBackend>) -> Self {
        Self::build(None, local, Mode::LocalFallback)
    }

    fn build(remote: Option<Arc<dyn PostBackend>>, local: Arc<dyn PostBackend>, mode: Mode) -> Self {
        Self {
            remote,
            local,
            state: Mutex::new(State {
                posts: Vec::new(),
                load_status: LoadStatus::Loading,
                mode,
                error: None,
                upload: UploadState::default(),
            }),
            load_generation: AtomicU64::new(0),
            write_epoch: AtomicU64::new(0),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// (Re)load the collection. The most recently started call wins.
    ///
    /// A listing fetched while a write landed predates that write, so it is
    /// fetched again rather than applied.
    pub async fn load(&self) -> LoadOutcome {
        let generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock_state().load_status = LoadStatus::Loading;

        loop {
            let writes = self.write_epoch.load(Ordering::SeqCst);
            let (posts, mode) = self.fetch().await;

            let mut state = self.lock_state();
            if self.load_generation.load(Ordering::SeqCst) != generation {
                tracing::debug!("Discarding result of superseded load #{}", generation);
                return LoadOutcome::Superseded;
            }
            if self.write_epoch.load(Ordering::SeqCst) != writes {
                tracing::debug!("Posts changed during load #{}, listing again", generation);
                continue;
            }

            if state.mode != mode {
                tracing::info!("Switching data mode to {:?}", mode);
            }
            state.posts = posts;
            state.mode = mode;
            state.load_status = LoadStatus::Ready;
            state.error = None;
            return LoadOutcome::Applied(mode);
        }
    }

    async fn fetch(&self) -> (Vec<Post>, Mode) {
        match &self.remote {
            Some(remote) => match remote.list().await {
                Ok(posts) => (posts, Mode::Remote),
                Err(error) => {
                    tracing::warn!("Post API unavailable, using local posts: {}", error);
                    (self.local_posts().await, Mode::LocalFallback)
                }
            },
            None => (self.local_posts().await, Mode::LocalFallback),
        }
    }

    async fn local_posts(&self) -> Vec<Post> {
        match self.local.list().await {
            Ok(posts) => posts,
            Err(error) => {
                tracing::warn!("Local posts unavailable, showing bundled samples: {}", error);
                default_posts()
            }
        }
    }

    fn active_backend(&self) -> Arc<dyn PostBackend> {
        let mode = self.lock_state().mode;
        match (&self.remote, mode) {
            (Some(remote), Mode::Remote) => Arc::clone(remote),
            _ => Arc::clone(&self.local),
        }
    }

    /// Record a write outcome in the error slot and pass it through.
    fn settle<T>(&self, result: Result<T>) -> Result<T> {
        self.lock_state().error = result.as_ref().err().map(ToString::to_string);
        result
    }

    /// Create a post and prepend the backend's canonical copy.
    pub async fn create(&self, draft: &PostDraft) -> Result<Post> {
        let _write = self.write_lock.lock().await;
        let result = self.active_backend().create(draft).await.map(|post| {
            let mut state = self.lock_state();
            state.posts.retain(|existing| existing.id != post.id);
            state.posts.insert(0, post.clone());
            self.write_epoch.fetch_add(1, Ordering::SeqCst);
            post
        });
        self.settle(result)
    }

    /// Apply `patch` and swap in the backend's canonical copy.
    ///
    /// Fails with `NotFound` when the collection holds no post with `id`,
    /// even if the backend accepted the update.
    pub async fn update(&self, id: &PostId, patch: &PostPatch) -> Result<Post> {
        let _write = self.write_lock.lock().await;
        let result = self.active_backend().update(id, patch).await.and_then(|post| {
            let mut state = self.lock_state();
            let slot = state
                .posts
                .iter_mut()
                .find(|existing| &existing.id == id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            *slot = post.clone();
            self.write_epoch.fetch_add(1, Ordering::SeqCst);
            Ok(post)
        });
        self.settle(result)
    }

    pub async fn delete(&self, id: &PostId) -> Result<()> {
        let _write = self.write_lock.lock().await;
        let result = self.active_backend().delete(id).await.map(|()| {
            self.lock_state().posts.retain(|existing| &existing.id != id);
            self.write_epoch.fetch_add(1, Ordering::SeqCst);
        });
        self.settle(result)
    }

    /// Upload an image through the active backend.
    pub async fn upload_asset(&self, asset: &Asset) -> Result<String> {
        {
            let mut state = self.lock_state();
            state.upload = UploadState {
                pending: true,
                error: None,
            };
        }

        let result = self.active_backend().upload_asset(asset).await;

        self.lock_state().upload = UploadState {
            pending: false,
            error: result.as_ref().err().map(ToString::to_string),
        };
        result
    }

    /// Upload an image and append its Markdown reference to `form`.
    pub async fn upload_into(&self, form: &mut PostForm, asset: &Asset) -> Result<String> {
        let url = self.upload_asset(asset).await?;
        form.append_image(&asset.file_name, &url);
        Ok(url)
    }

    #[must_use]
    pub fn get_by_id(&self, id: &PostId) -> Option<Post> {
        self.lock_state()
            .posts
            .iter()
            .find(|post| &post.id == id)
            .cloned()
    }

    #[must_use]
    pub fn posts(&self) -> Vec<Post> {
        self.lock_state().posts.clone()
    }

    #[must_use]
    pub fn load_status(&self) -> LoadStatus {
        self.lock_state().load_status
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.lock_state().mode
    }

    /// Whether views should present editing as degraded
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.mode() == Mode::LocalFallback
    }

    /// Last write failure, cleared by the next successful write or load
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.lock_state().error.clone()
    }

    #[must_use]
    pub fn upload_state(&self) -> UploadState {
        self.lock_state().upload.clone()
    }
}

//! In-memory stand-in for the REST API used by coordinator and navigation tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Notify;

use crate::backend::{Asset, PostBackend};
use crate::error::{BackendError, Error, Result, UploadError};
use crate::models::{Post, PostDraft, PostForm, PostId, PostPatch};

#[derive(Default)]
pub struct FakeRemote {
    pub posts: Mutex<Vec<Post>>,
    offline: AtomicBool,
    scripted_lists: Mutex<VecDeque<(Option<Arc<Notify>>, Result<Vec<Post>>)>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
}

impl FakeRemote {
    pub fn with_posts(posts: Vec<Post>) -> Arc<Self> {
        Arc::new(Self {
            posts: Mutex::new(posts),
            ..Self::default()
        })
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Queue the answer for the next `list` call, optionally held until
    /// `gate` is notified.
    pub fn script_list(&self, gate: Option<Arc<Notify>>, answer: Result<Vec<Post>>) {
        self.scripted_lists
            .lock()
            .unwrap()
            .push_back((gate, answer));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }

    fn begin(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(BackendError::Network("connection refused".to_string()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl PostBackend for FakeRemote {
    async fn list(&self) -> Result<Vec<Post>> {
        self.begin()?;
        let scripted = self.scripted_lists.lock().unwrap().pop_front();
        match scripted {
            Some((gate, answer)) => {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                answer
            }
            None => Ok(self.stored()),
        }
    }

    async fn get(&self, id: &PostId) -> Result<Post> {
        self.begin()?;
        self.stored()
            .into_iter()
            .find(|post| &post.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn create(&self, draft: &PostDraft) -> Result<Post> {
        self.begin()?;
        let number = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut post = draft.clone().into_post(PostId::from(format!("srv-{number}")));
        post.date = None;
        post.created_at = Utc.with_ymd_and_hms(2026, 1, 8, 10, 0, 0).single();
        post.updated_at = post.created_at;
        self.posts.lock().unwrap().insert(0, post.clone());
        Ok(post)
    }

    async fn update(&self, id: &PostId, patch: &PostPatch) -> Result<Post> {
        self.begin()?;
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|post| &post.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        post.apply_patch(patch);
        post.updated_at = Utc.with_ymd_and_hms(2026, 1, 9, 10, 0, 0).single();
        Ok(post.clone())
    }

    async fn delete(&self, id: &PostId) -> Result<()> {
        self.begin()?;
        let mut posts = self.posts.lock().unwrap();
        let index = posts
            .iter()
            .position(|post| &post.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        posts.remove(index);
        Ok(())
    }

    async fn upload_asset(&self, asset: &Asset) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(UploadError::Network("connection refused".to_string()).into());
        }
        Ok(format!("https://cdn.example/{}", asset.file_name))
    }
}

pub fn form(title: &str, content: &str) -> PostForm {
    PostForm {
        title: title.to_string(),
        content: content.to_string(),
        ..PostForm::default()
    }
}

pub fn draft(title: &str) -> PostDraft {
    form(title, "Body").normalize().unwrap()
}

pub fn remote_post(id: &str, title: &str) -> Post {
    let mut post = draft(title).into_post(PostId::from(id));
    post.date = None;
    post.created_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single();
    post.updated_at = post.created_at;
    post
}

//! Local persistence: the whole post list as one JSON array in a key-value store.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Local;

use super::{Asset, KeyValueStore, PostBackend};
use crate::error::{Error, Result, StorageError};
use crate::models::{Post, PostDraft, PostId, PostPatch};
use crate::seed::default_posts;

/// Fixed key the post array is stored under
pub const STORAGE_KEY: &str = "blog_posts";

/// Post backend over a [`KeyValueStore`].
///
/// The in-memory copy is authoritative for the session. Store failures are
/// logged and swallowed, so this backend only returns `NotFound` errors.
pub struct LocalBackend<S> {
    store: S,
    loaded: Mutex<Option<Loaded>>,
}

struct Loaded {
    posts: Vec<Post>,
    /// False when the stored value could not be read; writing then would
    /// overwrite data this session never saw.
    persistable: bool,
}

impl<S: KeyValueStore> LocalBackend<S> {
    pub fn new(store: S) -> Self {
        if let Err(error) = store.init() {
            tracing::warn!("Local store initialization failed: {}", error);
        }
        Self {
            store,
            loaded: Mutex::new(None),
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Run `f` against the loaded sequence; persist it when `f` succeeds and
    /// reports a change.
    fn with_posts<T>(&self, f: impl FnOnce(&mut Vec<Post>) -> Result<(T, bool)>) -> Result<T> {
        let mut guard = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        let loaded = guard.get_or_insert_with(|| self.load_or_seed());
        let (value, changed) = f(&mut loaded.posts)?;
        if changed {
            if loaded.persistable {
                self.persist(&loaded.posts);
            } else {
                tracing::warn!("Stored posts were never read, keeping changes in memory only");
            }
        }
        Ok(value)
    }

    fn load_or_seed(&self) -> Loaded {
        match self.store.read(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Post>>(&raw) {
                Ok(posts) => {
                    return Loaded {
                        posts,
                        persistable: true,
                    }
                }
                Err(error) => {
                    tracing::warn!("Stored posts are unreadable, reseeding defaults: {}", error);
                }
            },
            Ok(None) => tracing::info!("No stored posts, seeding defaults"),
            Err(error @ StorageError::Corrupted { .. }) => {
                tracing::warn!("Stored posts are corrupted, reseeding defaults: {}", error);
            }
            Err(error) => {
                tracing::warn!("Failed to read stored posts, showing defaults: {}", error);
                return Loaded {
                    posts: default_posts(),
                    persistable: false,
                };
            }
        }

        let seeded = default_posts();
        self.persist(&seeded);
        Loaded {
            posts: seeded,
            persistable: true,
        }
    }

    fn persist(&self, posts: &[Post]) {
        let serialized = match serde_json::to_string(posts) {
            Ok(serialized) => serialized,
            Err(error) => {
                tracing::warn!("Failed to serialize posts: {}", error);
                return;
            }
        };
        if let Err(error) = self.store.write(STORAGE_KEY, &serialized) {
            tracing::warn!("Failed to persist posts, keeping in-memory state: {}", error);
        }
    }
}

fn not_found(id: &PostId) -> Error {
    Error::NotFound(id.to_string())
}

#[async_trait]
impl<S: KeyValueStore> PostBackend for LocalBackend<S> {
    async fn list(&self) -> Result<Vec<Post>> {
        self.with_posts(|posts| Ok((posts.clone(), false)))
    }

    async fn get(&self, id: &PostId) -> Result<Post> {
        self.with_posts(|posts| {
            posts
                .iter()
                .find(|post| &post.id == id)
                .cloned()
                .map(|post| (post, false))
                .ok_or_else(|| not_found(id))
        })
    }

    async fn create(&self, draft: &PostDraft) -> Result<Post> {
        let mut post = draft.clone().into_post(PostId::generate());
        post.date.get_or_insert_with(|| Local::now().date_naive());

        self.with_posts(|posts| {
            posts.insert(0, post.clone());
            Ok((post, true))
        })
    }

    async fn update(&self, id: &PostId, patch: &PostPatch) -> Result<Post> {
        self.with_posts(|posts| {
            let post = posts
                .iter_mut()
                .find(|post| &post.id == id)
                .ok_or_else(|| not_found(id))?;
            post.apply_patch(patch);
            Ok((post.clone(), true))
        })
    }

    async fn delete(&self, id: &PostId) -> Result<()> {
        self.with_posts(|posts| {
            let index = posts
                .iter()
                .position(|post| &post.id == id)
                .ok_or_else(|| not_found(id))?;
            posts.remove(index);
            Ok(((), true))
        })
    }

    async fn upload_asset(&self, asset: &Asset) -> Result<String> {
        Ok(format!(
            "data:{};base64,{}",
            asset.content_type,
            STANDARD.encode(&asset.bytes)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FileStore, MemoryStore};
    use crate::models::PostForm;
    use pretty_assertions::assert_eq;

    fn draft(title: &str) -> PostDraft {
        PostForm {
            title: title.to_string(),
            content: "Body".to_string(),
            tags: "a, b, ,c".to_string(),
            ..PostForm::default()
        }
        .normalize()
        .unwrap()
    }

    /// Holds a value it cannot read back.
    #[derive(Default)]
    struct UnreadableStore {
        writes: std::sync::Mutex<Vec<String>>,
    }

    impl KeyValueStore for UnreadableStore {
        fn init(&self) -> std::result::Result<(), StorageError> {
            Ok(())
        }

        fn read(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
            Err(StorageError::Read {
                key: key.to_string(),
                message: "device busy".to_string(),
            })
        }

        fn write(&self, _key: &str, value: &str) -> std::result::Result<(), StorageError> {
            self.writes.lock().unwrap().push(value.to_string());
            Ok(())
        }
    }

    fn stored(backend: &LocalBackend<MemoryStore>) -> Vec<Post> {
        let raw = backend.store().get_raw(STORAGE_KEY).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn empty_store_seeds_and_persists_defaults() {
        let backend = LocalBackend::new(MemoryStore::new());

        let posts = backend.list().await.unwrap();
        assert_eq!(posts.len(), 4);
        assert_eq!(stored(&backend), default_posts());
    }

    #[tokio::test]
    async fn corrupted_store_is_reseeded() {
        let store = MemoryStore::new();
        store.insert_raw(STORAGE_KEY, "{not json");
        let backend = LocalBackend::new(store);

        assert_eq!(backend.list().await.unwrap(), default_posts());
        assert_eq!(stored(&backend), default_posts());
    }

    #[tokio::test]
    async fn existing_posts_are_loaded_verbatim() {
        let store = MemoryStore::new();
        let only = draft("Only").into_post(PostId::from("only"));
        store.insert_raw(STORAGE_KEY, serde_json::to_string(&vec![only.clone()]).unwrap());
        let backend = LocalBackend::new(store);

        assert_eq!(backend.list().await.unwrap(), vec![only]);
    }

    #[tokio::test]
    async fn create_prepends_with_generated_id() {
        let backend = LocalBackend::new(MemoryStore::new());

        let first = backend.create(&draft("First")).await.unwrap();
        let second = backend.create(&draft("Second")).await.unwrap();
        assert_ne!(first.id, second.id);

        let posts = backend.list().await.unwrap();
        assert_eq!(posts.len(), 6);
        assert_eq!(posts[0], second);
        assert_eq!(posts[1], first);
        assert_eq!(stored(&backend), posts);
        assert_eq!(second.tags, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn update_merges_patch_and_persists() {
        let backend = LocalBackend::new(MemoryStore::new());
        let id = PostId::from("2");

        let updated = backend
            .update(
                &id,
                &PostPatch {
                    title: Some("Retitled".to_string()),
                    ..PostPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Retitled");
        assert_eq!(updated.author, "Li Si");
        assert_eq!(backend.get(&id).await.unwrap(), updated);
        assert_eq!(stored(&backend)[1], updated);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_and_second_delete_fails() {
        let backend = LocalBackend::new(MemoryStore::new());
        let id = PostId::from("3");

        backend.delete(&id).await.unwrap();
        assert_eq!(backend.list().await.unwrap().len(), 3);

        let error = backend.delete(&id).await.unwrap_err();
        assert!(matches!(error, Error::NotFound(ref missing) if missing == "3"));
        assert_eq!(backend.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let backend = LocalBackend::new(MemoryStore::new());
        let missing = PostId::from("missing");

        assert!(matches!(backend.get(&missing).await, Err(Error::NotFound(_))));
        assert!(matches!(
            backend.update(&missing, &PostPatch::default()).await,
            Err(Error::NotFound(_))
        ));
        assert_eq!(stored(&backend), default_posts());
    }

    #[tokio::test]
    async fn quota_failures_keep_in_memory_state() {
        let backend = LocalBackend::new(MemoryStore::with_quota(16));

        let posts = backend.list().await.unwrap();
        assert_eq!(posts.len(), 4);
        assert_eq!(backend.store().get_raw(STORAGE_KEY), None);

        let created = backend.create(&draft("Unsaved")).await.unwrap();
        assert_eq!(backend.list().await.unwrap()[0], created);
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let created = {
            let backend = LocalBackend::new(FileStore::new(dir.path()));
            backend.create(&draft("Durable")).await.unwrap()
        };

        let reopened = LocalBackend::new(FileStore::new(dir.path()));
        let posts = reopened.list().await.unwrap();
        assert_eq!(posts.len(), 5);
        assert_eq!(posts[0], created);
    }

    #[tokio::test]
    async fn upload_encodes_data_url() {
        let backend = LocalBackend::new(MemoryStore::new());
        let asset = Asset::new("dot.png", vec![0xff]).unwrap();
        assert_eq!(
            backend.upload_asset(&asset).await.unwrap(),
            "data:image/png;base64,/w=="
        );
    }

    #[tokio::test]
    async fn read_failure_never_overwrites_stored_posts() {
        let backend = LocalBackend::new(UnreadableStore::default());

        assert_eq!(backend.list().await.unwrap(), default_posts());
        let created = backend.create(&draft("Kept in memory")).await.unwrap();
        backend.delete(&PostId::from("1")).await.unwrap();

        let posts = backend.list().await.unwrap();
        assert_eq!(posts.len(), 4);
        assert_eq!(posts[0], created);
        assert!(backend.store().writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupted_file_is_reseeded_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(store.path_for(STORAGE_KEY), [0xff, 0xfe, 0x00]).unwrap();

        let backend = LocalBackend::new(store);
        assert_eq!(backend.list().await.unwrap(), default_posts());

        let reopened = LocalBackend::new(FileStore::new(dir.path()));
        assert_eq!(reopened.list().await.unwrap(), default_posts());
    }
}

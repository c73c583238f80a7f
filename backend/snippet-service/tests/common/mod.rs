#![allow(dead_code)]

//! Shared fixtures for integration tests: store wrappers that make timing and
//! failure deterministic, plus payload builders.

use async_trait::async_trait;
use serde_json::{json, Value};
use snippet_service::models::{CreateFolderData, CreatePostData};
use snippet_service::store::{
    Document, DocumentStore, MemoryStore, Query, StoreError, WatchCallback, WatchHandle,
};
use std::collections::HashSet;
use std::sync::{Arc, Once};
use std::time::Duration;

/// Route test logs through the captured test writer; safe to call from every
/// test
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Wrapper that yields to the scheduler before every operation.
///
/// Under a single-threaded test runtime this interleaves concurrent callers at
/// operation boundaries: every in-flight read completes before any of their
/// follow-up writes, which reliably exhibits the lost-update behavior of
/// read-modify-write counters.
pub struct SlowStore {
    inner: MemoryStore,
}

impl SlowStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl DocumentStore for SlowStore {
    async fn insert(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        tokio::task::yield_now().await;
        self.inner.insert(collection, data).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        tokio::task::yield_now().await;
        self.inner.get(collection, id).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.inner.delete(collection, id).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        tokio::task::yield_now().await;
        self.inner.query(query).await
    }

    async fn count(&self, query: &Query) -> Result<usize, StoreError> {
        tokio::task::yield_now().await;
        self.inner.count(query).await
    }

    async fn watch(&self, query: Query, callback: WatchCallback) -> Result<WatchHandle, StoreError> {
        self.inner.watch(query, callback).await
    }
}

/// Wrapper that fails point lookups for a chosen set of user ids, leaving
/// every other operation intact. Exercises partial-failure paths in the
/// aggregation layer.
pub struct FlakyUserStore {
    inner: MemoryStore,
    failing_user_ids: HashSet<String>,
}

impl FlakyUserStore {
    pub fn new(inner: MemoryStore, failing_user_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            inner,
            failing_user_ids: failing_user_ids.into_iter().collect(),
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyUserStore {
    async fn insert(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        self.inner.insert(collection, data).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        if collection == "users" && self.failing_user_ids.contains(id) {
            return Err(StoreError::Backend("simulated user lookup outage".to_string()));
        }
        self.inner.get(collection, id).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.inner.delete(collection, id).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.inner.query(query).await
    }

    async fn count(&self, query: &Query) -> Result<usize, StoreError> {
        self.inner.count(query).await
    }

    async fn watch(&self, query: Query, callback: WatchCallback) -> Result<WatchHandle, StoreError> {
        self.inner.watch(query, callback).await
    }
}

/// Seed a user document, returning its store-assigned id
pub async fn seed_user(store: &dyn DocumentStore, display_name: &str, username: &str) -> String {
    store
        .insert(
            "users",
            json!({
                "email": format!("{}@example.com", username),
                "displayName": display_name,
                "username": username,
                "createdAt": snippet_service::store::server_timestamp(),
                "updatedAt": snippet_service::store::server_timestamp(),
            }),
        )
        .await
        .expect("seeding user")
}

pub fn post_data(title: &str) -> CreatePostData {
    CreatePostData {
        title: title.to_string(),
        content: format!("{} content", title),
        code: None,
        language: None,
        folder_id: None,
        tags: Vec::new(),
        is_public: true,
    }
}

pub fn folder_data(name: &str) -> CreateFolderData {
    CreateFolderData {
        name: name.to_string(),
        description: None,
        color: "#3366FF".to_string(),
        icon: "folder".to_string(),
        is_public: false,
    }
}

pub fn memory_store() -> Arc<dyn DocumentStore> {
    Arc::new(MemoryStore::default())
}

/// Advance wall-clock time enough that consecutive server timestamps order
/// distinctly
pub async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

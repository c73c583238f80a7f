//! Document store boundary.
//!
//! The hosted document database is an external collaborator: collections of
//! documents addressed by store-generated string ids, queried with conjunctive
//! field predicates, optional single-field ordering and result caps, plus a
//! watch primitive yielding the full matching set on every change. This module
//! defines that contract as a trait; `MemoryStore` is the in-process
//! implementation used for local development and tests.

pub mod memory;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinHandle;

pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document {collection}/{id} does not exist")]
    MissingDocument { collection: String, id: String },

    #[error("store backend error: {0}")]
    Backend(String),
}

/// A raw document: its store-assigned id plus the field map.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Decode into a typed model, injecting the document id as the `id` field.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let mut data = self.data;
        if let Value::Object(map) = &mut data {
            map.insert("id".to_string(), Value::String(self.id));
        }
        serde_json::from_value(data).map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
    ArrayContains,
    ArrayContainsAny,
}

/// A single (field, operator, value) predicate
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), op: FilterOp::Eq, value: value.into() }
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), op: FilterOp::Gte, value: value.into() }
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), op: FilterOp::Lte, value: value.into() }
    }

    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), op: FilterOp::ArrayContains, value: value.into() }
    }

    pub fn array_contains_any(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self { field: field.into(), op: FilterOp::ArrayContainsAny, value: Value::Array(values) }
    }
}

/// A query against one collection. Filters combine conjunctively.
///
/// When no ordering is requested, `limit` caps whatever arbitrary set the
/// store happens to return; only with `order_by` is the cap applied to an
/// ordered sequence. This mirrors the index limitations of the hosted store.
#[derive(Debug, Clone)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Callback invoked with the full current result set of a watched query
pub type WatchCallback = Box<dyn Fn(Vec<Document>) + Send + Sync>;

/// Cancellation handle for a standing watch.
///
/// The watch keeps running until `unsubscribe` is called; dropping the handle
/// without calling it leaks the watcher, matching the hosted store's
/// subscription contract where cleanup is the caller's responsibility.
pub struct WatchHandle {
    task: JoinHandle<()>,
}

impl WatchHandle {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    pub fn unsubscribe(self) {
        self.task.abort();
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document, returning its store-generated id
    async fn insert(&self, collection: &str, data: Value) -> Result<String, StoreError>;

    /// Point lookup; absence is `Ok(None)`, never an error
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Merge `patch` fields into an existing document. A `null` patch value
    /// removes the field. Fails with `MissingDocument` when absent.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError>;

    /// Delete by id; deleting an absent document is a no-op
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Number of documents matching the query's filters
    async fn count(&self, query: &Query) -> Result<usize, StoreError>;

    /// Open a standing watch: the callback fires with the full current result
    /// set immediately and again after every change to the collection.
    async fn watch(&self, query: Query, callback: WatchCallback) -> Result<WatchHandle, StoreError>;
}

const SERVER_TIMESTAMP_MARKER: &str = "__server_timestamp__";

/// Sentinel patch value the store replaces with its own clock at write time
pub fn server_timestamp() -> Value {
    serde_json::json!({ SERVER_TIMESTAMP_MARKER: true })
}

pub(crate) fn is_server_timestamp(value: &Value) -> bool {
    value
        .as_object()
        .map(|m| m.len() == 1 && m.contains_key(SERVER_TIMESTAMP_MARKER))
        .unwrap_or(false)
}

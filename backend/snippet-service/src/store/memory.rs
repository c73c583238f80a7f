//! In-process implementation of the document-store contract.
//!
//! Collections live in concurrent maps; watchers are fan-out broadcast
//! channels per collection. Server timestamps are stamped in the store's
//! native `{seconds, nanos}` object form so the edge normalization in the
//! model layer is exercised exactly as it is against the hosted store.

use super::{
    is_server_timestamp, Direction, Document, DocumentStore, Filter, FilterOp, Query, StoreError,
    WatchCallback, WatchHandle,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

const WATCH_CHANNEL_CAPACITY: usize = 64;

#[derive(Default)]
struct Inner {
    collections: DashMap<String, DashMap<String, Value>>,
    watchers: DashMap<String, broadcast::Sender<()>>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&self, collection: &str) {
        if let Some(tx) = self.inner.watchers.get(collection) {
            // No receivers is fine; the send result is irrelevant.
            let _ = tx.send(());
        }
    }

    fn change_sender(&self, collection: &str) -> broadcast::Sender<()> {
        self.inner
            .watchers
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(WATCH_CHANNEL_CAPACITY).0)
            .clone()
    }

    fn run_query(&self, query: &Query) -> Vec<Document> {
        let Some(collection) = self.inner.collections.get(&query.collection) else {
            return Vec::new();
        };

        let mut docs: Vec<Document> = collection
            .iter()
            .filter(|entry| query.filters.iter().all(|f| matches_filter(entry.value(), f)))
            .map(|entry| Document {
                id: entry.key().clone(),
                data: entry.value().clone(),
            })
            .collect();
        drop(collection);

        match &query.order_by {
            Some((field, direction)) => {
                docs.sort_by(|a, b| {
                    let ord = compare_field(&a.data, &b.data, field);
                    match direction {
                        Direction::Ascending => ord,
                        Direction::Descending => ord.reverse(),
                    }
                });
                if let Some(limit) = query.limit {
                    docs.truncate(limit);
                }
            }
            None => {
                // Without an ordering the cap takes an arbitrary subset,
                // exactly like a limited unindexed query on the hosted store.
                if let Some(limit) = query.limit {
                    docs.truncate(limit);
                }
            }
        }

        docs
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        let Value::Object(mut map) = data else {
            return Err(StoreError::Backend(
                "document body must be an object".to_string(),
            ));
        };
        resolve_server_timestamps(&mut map);

        let id = Uuid::new_v4().to_string();
        self.inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), Value::Object(map));
        self.notify(collection);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .inner
            .collections
            .get(collection)
            .and_then(|col| col.get(id).map(|doc| doc.value().clone()))
            .map(|data| Document {
                id: id.to_string(),
                data,
            }))
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let Value::Object(mut patch) = patch else {
            return Err(StoreError::Backend("patch must be an object".to_string()));
        };
        resolve_server_timestamps(&mut patch);

        let col = self
            .inner
            .collections
            .entry(collection.to_string())
            .or_default();
        let mut entry = col.get_mut(id).ok_or_else(|| StoreError::MissingDocument {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;

        if let Value::Object(doc) = entry.value_mut() {
            for (key, value) in patch {
                if value.is_null() {
                    doc.remove(&key);
                } else {
                    doc.insert(key, value);
                }
            }
        }
        drop(entry);
        drop(col);

        self.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        if let Some(col) = self.inner.collections.get(collection) {
            col.remove(id);
        }
        self.notify(collection);
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        Ok(self.run_query(query))
    }

    async fn count(&self, query: &Query) -> Result<usize, StoreError> {
        let unlimited = Query {
            collection: query.collection.clone(),
            filters: query.filters.clone(),
            order_by: None,
            limit: None,
        };
        Ok(self.run_query(&unlimited).len())
    }

    async fn watch(&self, query: Query, callback: WatchCallback) -> Result<WatchHandle, StoreError> {
        let tx = self.change_sender(&query.collection);
        let mut rx = tx.subscribe();
        let store = self.clone();

        let task = tokio::spawn(async move {
            callback(store.run_query(&query));
            loop {
                match rx.recv().await {
                    Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        callback(store.run_query(&query));
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(WatchHandle::new(task))
    }
}

fn resolve_server_timestamps(map: &mut serde_json::Map<String, Value>) {
    let now = Utc::now();
    for value in map.values_mut() {
        if is_server_timestamp(value) {
            *value = native_timestamp(now);
        }
    }
}

fn native_timestamp(at: DateTime<Utc>) -> Value {
    serde_json::json!({
        "seconds": at.timestamp(),
        "nanos": at.timestamp_subsec_nanos(),
    })
}

fn matches_filter(doc: &Value, filter: &Filter) -> bool {
    let Some(field) = doc.get(&filter.field) else {
        return false;
    };

    match filter.op {
        FilterOp::Eq => compare_values(field, &filter.value) == Some(Ordering::Equal),
        FilterOp::Gte => matches!(
            compare_values(field, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOp::Lte => matches!(
            compare_values(field, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOp::ArrayContains => field
            .as_array()
            .map(|items| items.contains(&filter.value))
            .unwrap_or(false),
        FilterOp::ArrayContainsAny => match (field.as_array(), filter.value.as_array()) {
            (Some(items), Some(candidates)) => candidates.iter().any(|c| items.contains(c)),
            _ => false,
        },
    }
}

fn compare_field(a: &Value, b: &Value, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(av), Some(bv)) => compare_values(av, bv).unwrap_or(Ordering::Equal),
    }
}

/// Compare two field values. Timestamps compare chronologically whether they
/// are native objects or ISO strings; otherwise same-type scalars compare
/// naturally and mixed types are incomparable.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (timestamp_nanos(a), timestamp_nanos(b)) {
        return Some(x.cmp(&y));
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x.as_f64().zip(y.as_f64()).and_then(|(x, y)| x.partial_cmp(&y))
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn timestamp_nanos(value: &Value) -> Option<i128> {
    match value {
        Value::Object(map) => {
            let seconds = map.get("seconds")?.as_i64()?;
            let nanos = map
                .get("nanos")
                .or_else(|| map.get("nanoseconds"))
                .and_then(Value::as_i64)
                .unwrap_or(0);
            Some(i128::from(seconds) * 1_000_000_000 + i128::from(nanos))
        }
        Value::String(raw) => DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| i128::from(dt.with_timezone(&Utc).timestamp_micros()) * 1_000),
        _ => None,
    }
}

/// Folder service - folder CRUD plus denormalized post-counter maintenance
use super::posts::POSTS_COLLECTION;
use crate::error::{AppError, Result};
use crate::models::{CreateFolderData, Folder, UpdateFolderData};
use crate::store::{
    server_timestamp, Direction, Document, DocumentStore, Filter, Query, StoreError, WatchHandle,
};
use serde_json::{json, Value};
use std::sync::Arc;

const FOLDERS_COLLECTION: &str = "folders";

pub struct FolderService {
    store: Arc<dyn DocumentStore>,
}

impl FolderService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a folder owned by `user_id` with `postsCount` starting at zero
    pub async fn create_folder(&self, user_id: &str, data: CreateFolderData) -> Result<String> {
        let Value::Object(mut doc) = serde_json::to_value(&data)
            .map_err(|e| AppError::Persistence(e.to_string()))?
        else {
            return Err(AppError::Persistence("folder payload must be an object".to_string()));
        };
        doc.insert("userId".to_string(), json!(user_id));
        doc.insert("createdAt".to_string(), server_timestamp());
        doc.insert("updatedAt".to_string(), server_timestamp());
        doc.insert("postsCount".to_string(), json!(0));

        self.store
            .insert(FOLDERS_COLLECTION, Value::Object(doc))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to create folder");
                AppError::Persistence("failed to create folder".to_string())
            })
    }

    /// Folders owned by a user, newest first (client-sorted; no composite
    /// index for owner + createdAt)
    pub async fn get_user_folders(&self, user_id: &str) -> Result<Vec<Folder>> {
        let query = Query::collection(FOLDERS_COLLECTION).filter(Filter::eq("userId", user_id));
        let docs = self.store.query(&query).await.map_err(|e| {
            tracing::error!(error = %e, user_id, "failed to fetch user folders");
            AppError::Persistence("failed to fetch folders".to_string())
        })?;

        let mut folders = decode_folders(docs)?;
        folders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(folders)
    }

    /// Public folders, server-ordered newest first
    pub async fn get_public_folders(&self) -> Result<Vec<Folder>> {
        let query = Query::collection(FOLDERS_COLLECTION)
            .filter(Filter::eq("isPublic", true))
            .order_by("createdAt", Direction::Descending);
        let docs = self.store.query(&query).await.map_err(|e| {
            tracing::error!(error = %e, "failed to fetch public folders");
            AppError::Persistence("failed to fetch public folders".to_string())
        })?;
        decode_folders(docs)
    }

    pub async fn get_folder(&self, folder_id: &str) -> Result<Option<Folder>> {
        let doc = self
            .store
            .get(FOLDERS_COLLECTION, folder_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, folder_id, "failed to fetch folder");
                AppError::Persistence("failed to fetch folder".to_string())
            })?;
        doc.map(decode_folder).transpose()
    }

    pub async fn update_folder(&self, folder_id: &str, data: UpdateFolderData) -> Result<()> {
        let Value::Object(mut patch) = serde_json::to_value(&data)
            .map_err(|e| AppError::Persistence(e.to_string()))?
        else {
            return Err(AppError::Persistence("update payload must be an object".to_string()));
        };
        patch.insert("updatedAt".to_string(), server_timestamp());

        self.store
            .update(FOLDERS_COLLECTION, folder_id, Value::Object(patch))
            .await
            .map_err(|e| match e {
                StoreError::MissingDocument { .. } => {
                    AppError::NotFound(format!("folder {} not found", folder_id))
                }
                other => {
                    tracing::error!(error = %other, folder_id, "failed to update folder");
                    AppError::Persistence("failed to update folder".to_string())
                }
            })
    }

    /// Delete a folder, then clear `folderId` on the posts that referenced it
    /// so they are not left pointing at a missing document. Each clear is
    /// best-effort: a failure is logged and does not fail the deletion.
    pub async fn delete_folder(&self, folder_id: &str) -> Result<()> {
        self.store
            .delete(FOLDERS_COLLECTION, folder_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, folder_id, "failed to delete folder");
                AppError::Persistence("failed to delete folder".to_string())
            })?;

        let orphans = Query::collection(POSTS_COLLECTION).filter(Filter::eq("folderId", folder_id));
        match self.store.query(&orphans).await {
            Ok(docs) => {
                for doc in docs {
                    let patch = json!({"folderId": null, "updatedAt": server_timestamp()});
                    if let Err(e) = self.store.update(POSTS_COLLECTION, &doc.id, patch).await {
                        tracing::warn!(error = %e, post_id = %doc.id, folder_id, "failed to detach post from deleted folder");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, folder_id, "failed to list posts of deleted folder");
            }
        }

        Ok(())
    }

    /// Bump the denormalized counter after a post lands in the folder.
    ///
    /// Read-modify-write without an atomic increment: concurrent updates to
    /// the same folder can lose increments. `recalculate_posts_count` is the
    /// repair path. Missing folder is a silent no-op.
    pub async fn increment_posts_count(&self, folder_id: &str) -> Result<()> {
        self.adjust_posts_count(folder_id, 1).await
    }

    /// Counterpart of `increment_posts_count`; floors at zero
    pub async fn decrement_posts_count(&self, folder_id: &str) -> Result<()> {
        self.adjust_posts_count(folder_id, -1).await
    }

    async fn adjust_posts_count(&self, folder_id: &str, delta: i64) -> Result<()> {
        let doc = self
            .store
            .get(FOLDERS_COLLECTION, folder_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, folder_id, "failed to read folder counter");
                AppError::Persistence("failed to update folder post count".to_string())
            })?;
        let Some(doc) = doc else {
            return Ok(());
        };

        let current = doc.data.get("postsCount").and_then(Value::as_i64).unwrap_or(0);
        let next = (current + delta).max(0);
        let patch = json!({"postsCount": next, "updatedAt": server_timestamp()});

        self.store
            .update(FOLDERS_COLLECTION, folder_id, patch)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, folder_id, "failed to write folder counter");
                AppError::Persistence("failed to update folder post count".to_string())
            })
    }

    /// Authoritative correction: recount the posts referencing this folder
    /// and overwrite the stored counter unconditionally. Idempotent; safe to
    /// call opportunistically to heal drift from lost counter updates.
    pub async fn recalculate_posts_count(&self, folder_id: &str) -> Result<i64> {
        let query = Query::collection(POSTS_COLLECTION).filter(Filter::eq("folderId", folder_id));
        let actual = self.store.count(&query).await.map_err(|e| {
            tracing::error!(error = %e, folder_id, "failed to count folder posts");
            AppError::Persistence("failed to recalculate folder post count".to_string())
        })? as i64;

        let patch = json!({"postsCount": actual, "updatedAt": server_timestamp()});
        self.store
            .update(FOLDERS_COLLECTION, folder_id, patch)
            .await
            .map_err(|e| match e {
                StoreError::MissingDocument { .. } => {
                    AppError::NotFound(format!("folder {} not found", folder_id))
                }
                other => {
                    tracing::error!(error = %other, folder_id, "failed to write recalculated count");
                    AppError::Persistence("failed to recalculate folder post count".to_string())
                }
            })?;

        tracing::debug!(folder_id, count = actual, "recalculated folder post count");
        Ok(actual)
    }

    /// Ownership check; a missing folder or a failed lookup both answer
    /// `false` rather than erroring
    pub async fn is_owner(&self, folder_id: &str, user_id: &str) -> bool {
        match self.get_folder(folder_id).await {
            Ok(folder) => folder.map(|f| f.user_id == user_id).unwrap_or(false),
            Err(e) => {
                tracing::warn!(error = %e, folder_id, "ownership check failed");
                false
            }
        }
    }

    /// Standing watch on a user's folders, sorted newest first on the client
    /// inside the watch callback
    pub async fn subscribe_to_user_folders<F>(
        &self,
        user_id: &str,
        callback: F,
    ) -> Result<WatchHandle>
    where
        F: Fn(Vec<Folder>) + Send + Sync + 'static,
    {
        let query = Query::collection(FOLDERS_COLLECTION).filter(Filter::eq("userId", user_id));
        self.watch_folders(query, move |mut folders| {
            folders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            callback(folders);
        })
        .await
    }

    /// Standing watch on public folders, server-ordered newest first
    pub async fn subscribe_to_public_folders<F>(&self, callback: F) -> Result<WatchHandle>
    where
        F: Fn(Vec<Folder>) + Send + Sync + 'static,
    {
        let query = Query::collection(FOLDERS_COLLECTION)
            .filter(Filter::eq("isPublic", true))
            .order_by("createdAt", Direction::Descending);
        self.watch_folders(query, callback).await
    }

    async fn watch_folders<F>(&self, query: Query, callback: F) -> Result<WatchHandle>
    where
        F: Fn(Vec<Folder>) + Send + Sync + 'static,
    {
        self.store
            .watch(
                query,
                Box::new(move |docs| match decode_folders(docs) {
                    Ok(folders) => callback(folders),
                    Err(e) => tracing::error!(error = %e, "folder watch decode failed"),
                }),
            )
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to open folder watch");
                AppError::Persistence("failed to watch folders".to_string())
            })
    }
}

fn decode_folder(doc: Document) -> Result<Folder> {
    doc.decode().map_err(|e| {
        tracing::error!(error = %e, "malformed folder document");
        AppError::Persistence("malformed folder document".to_string())
    })
}

fn decode_folders(docs: Vec<Document>) -> Result<Vec<Folder>> {
    docs.into_iter().map(decode_folder).collect()
}

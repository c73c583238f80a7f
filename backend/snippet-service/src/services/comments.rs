/// Comment service - comment creation, chronological listing, and
/// author-enforced mutation
use crate::error::{AppError, Result};
use crate::models::{Comment, CreateCommentData, UpdateCommentData};
use crate::store::{server_timestamp, Direction, Document, DocumentStore, Filter, Query};
use serde_json::{json, Value};
use std::sync::Arc;

const COMMENTS_COLLECTION: &str = "comments";

pub struct CommentService {
    store: Arc<dyn DocumentStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create_comment(&self, user_id: &str, data: CreateCommentData) -> Result<String> {
        let Value::Object(mut doc) = serde_json::to_value(&data)
            .map_err(|e| AppError::Persistence(e.to_string()))?
        else {
            return Err(AppError::Persistence("comment payload must be an object".to_string()));
        };
        doc.insert("userId".to_string(), json!(user_id));
        doc.insert("createdAt".to_string(), server_timestamp());
        doc.insert("updatedAt".to_string(), server_timestamp());

        self.store
            .insert(COMMENTS_COLLECTION, Value::Object(doc))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to create comment");
                AppError::Persistence("failed to create comment".to_string())
            })
    }

    /// Comments on a post in chronological thread order (oldest first)
    pub async fn get_post_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let query = Query::collection(COMMENTS_COLLECTION)
            .filter(Filter::eq("postId", post_id))
            .order_by("createdAt", Direction::Ascending);
        let docs = self.store.query(&query).await.map_err(|e| {
            tracing::error!(error = %e, post_id, "failed to fetch comments");
            AppError::Persistence("failed to fetch comments".to_string())
        })?;
        docs.into_iter().map(decode_comment).collect()
    }

    /// Update a comment's content. Only the comment's author may update it.
    pub async fn update_comment(
        &self,
        comment_id: &str,
        user_id: &str,
        data: UpdateCommentData,
    ) -> Result<()> {
        let comment = self.require_comment(comment_id).await?;
        if comment.user_id != user_id {
            return Err(AppError::Forbidden(
                "only the comment author can update it".to_string(),
            ));
        }

        let Value::Object(mut patch) = serde_json::to_value(&data)
            .map_err(|e| AppError::Persistence(e.to_string()))?
        else {
            return Err(AppError::Persistence("update payload must be an object".to_string()));
        };
        patch.insert("updatedAt".to_string(), server_timestamp());

        self.store
            .update(COMMENTS_COLLECTION, comment_id, Value::Object(patch))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, comment_id, "failed to update comment");
                AppError::Persistence("failed to update comment".to_string())
            })
    }

    /// Delete a comment. Only the author may delete; deleting an already
    /// absent comment is a no-op.
    pub async fn delete_comment(&self, comment_id: &str, user_id: &str) -> Result<()> {
        let doc = self
            .store
            .get(COMMENTS_COLLECTION, comment_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, comment_id, "failed to fetch comment");
                AppError::Persistence("failed to delete comment".to_string())
            })?;
        let Some(doc) = doc else {
            return Ok(());
        };

        let comment = decode_comment(doc)?;
        if comment.user_id != user_id {
            return Err(AppError::Forbidden(
                "only the comment author can delete it".to_string(),
            ));
        }

        self.store
            .delete(COMMENTS_COLLECTION, comment_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, comment_id, "failed to delete comment");
                AppError::Persistence("failed to delete comment".to_string())
            })
    }

    async fn require_comment(&self, comment_id: &str) -> Result<Comment> {
        let doc = self
            .store
            .get(COMMENTS_COLLECTION, comment_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, comment_id, "failed to fetch comment");
                AppError::Persistence("failed to fetch comment".to_string())
            })?;
        let doc = doc.ok_or_else(|| AppError::NotFound(format!("comment {} not found", comment_id)))?;
        decode_comment(doc)
    }
}

fn decode_comment(doc: Document) -> Result<Comment> {
    doc.decode().map_err(|e| {
        tracing::error!(error = %e, "malformed comment document");
        AppError::Persistence("malformed comment document".to_string())
    })
}

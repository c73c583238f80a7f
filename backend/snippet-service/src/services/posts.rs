/// Post service - handles snippet post creation, retrieval, and search
use crate::error::{AppError, Result};
use crate::models::{CreatePostData, Post, SearchParams, SearchSort, UpdatePostData};
use crate::store::{
    server_timestamp, Direction, Document, DocumentStore, Filter, Query, StoreError, WatchHandle,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub(crate) const POSTS_COLLECTION: &str = "posts";

/// Default result cap for public feed queries
pub const DEFAULT_FEED_LIMIT: usize = 20;

pub struct PostService {
    store: Arc<dyn DocumentStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a new post owned by `user_id`.
    ///
    /// `None` fields are stripped before the write, timestamps are
    /// server-stamped, and both denormalized counters start at zero. Tags are
    /// deduplicated preserving first occurrence.
    pub async fn create_post(&self, user_id: &str, mut data: CreatePostData) -> Result<String> {
        if user_id.is_empty() {
            return Err(AppError::Validation(
                "userId is required to create a post".to_string(),
            ));
        }

        dedup_preserving_order(&mut data.tags);

        let Value::Object(mut doc) = serde_json::to_value(&data)
            .map_err(|e| AppError::Persistence(e.to_string()))?
        else {
            return Err(AppError::Persistence("post payload must be an object".to_string()));
        };
        doc.insert("userId".to_string(), json!(user_id));
        doc.insert("createdAt".to_string(), server_timestamp());
        doc.insert("updatedAt".to_string(), server_timestamp());
        doc.insert("likesCount".to_string(), json!(0));
        doc.insert("commentsCount".to_string(), json!(0));

        self.store
            .insert(POSTS_COLLECTION, Value::Object(doc))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to create post");
                AppError::Persistence("failed to create post".to_string())
            })
    }

    /// Posts owned by a user, newest first.
    ///
    /// The owner-equality query carries no server-side ordering (the
    /// composite index is unavailable), so the result is sorted on the client.
    pub async fn get_user_posts(&self, user_id: &str) -> Result<Vec<Post>> {
        let query = Query::collection(POSTS_COLLECTION).filter(Filter::eq("userId", user_id));
        let docs = self.store.query(&query).await.map_err(|e| {
            tracing::error!(error = %e, user_id, "failed to fetch user posts");
            AppError::Persistence("failed to fetch posts".to_string())
        })?;

        let mut posts = decode_posts(docs)?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    /// Public posts, capped and then sorted newest first on the client.
    ///
    /// Non-guarantee: the cap is applied by the store before any ordering, so
    /// this returns an arbitrary `limit`-sized subset of public posts sorted
    /// among themselves, not necessarily the most recent ones overall.
    pub async fn get_public_posts(&self, limit: Option<usize>) -> Result<Vec<Post>> {
        let query = Query::collection(POSTS_COLLECTION)
            .filter(Filter::eq("isPublic", true))
            .limit(limit.unwrap_or(DEFAULT_FEED_LIMIT));
        let docs = self.store.query(&query).await.map_err(|e| {
            tracing::error!(error = %e, "failed to fetch public posts");
            AppError::Persistence("failed to fetch public posts".to_string())
        })?;

        let mut posts = decode_posts(docs)?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    /// Posts in a folder, server-ordered newest first (the folderId/createdAt
    /// composite index exists).
    pub async fn get_posts_by_folder(&self, folder_id: &str) -> Result<Vec<Post>> {
        let query = Query::collection(POSTS_COLLECTION)
            .filter(Filter::eq("folderId", folder_id))
            .order_by("createdAt", Direction::Descending);
        let docs = self.store.query(&query).await.map_err(|e| {
            tracing::error!(error = %e, folder_id, "failed to fetch folder posts");
            AppError::Persistence("failed to fetch folder posts".to_string())
        })?;
        decode_posts(docs)
    }

    /// Point lookup; absence is `Ok(None)`
    pub async fn get_post(&self, post_id: &str) -> Result<Option<Post>> {
        let doc = self.store.get(POSTS_COLLECTION, post_id).await.map_err(|e| {
            tracing::error!(error = %e, post_id, "failed to fetch post");
            AppError::Persistence("failed to fetch post".to_string())
        })?;
        doc.map(decode_post).transpose()
    }

    /// Apply a partial update and re-stamp `updatedAt`
    pub async fn update_post(&self, post_id: &str, data: UpdatePostData) -> Result<()> {
        let Value::Object(mut patch) = serde_json::to_value(&data)
            .map_err(|e| AppError::Persistence(e.to_string()))?
        else {
            return Err(AppError::Persistence("update payload must be an object".to_string()));
        };
        patch.insert("updatedAt".to_string(), server_timestamp());

        self.store
            .update(POSTS_COLLECTION, post_id, Value::Object(patch))
            .await
            .map_err(|e| match e {
                StoreError::MissingDocument { .. } => {
                    AppError::NotFound(format!("post {} not found", post_id))
                }
                other => {
                    tracing::error!(error = %other, post_id, "failed to update post");
                    AppError::Persistence("failed to update post".to_string())
                }
            })
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<()> {
        self.store
            .delete(POSTS_COLLECTION, post_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, post_id, "failed to delete post");
                AppError::Persistence("failed to delete post".to_string())
            })
    }

    /// Public posts carrying any of the given tags, newest first
    pub async fn get_posts_by_tags(&self, tags: &[String]) -> Result<Vec<Post>> {
        let values = tags.iter().map(|t| json!(t)).collect();
        let query = Query::collection(POSTS_COLLECTION)
            .filter(Filter::array_contains_any("tags", values))
            .filter(Filter::eq("isPublic", true))
            .order_by("createdAt", Direction::Descending);
        let docs = self.store.query(&query).await.map_err(|e| {
            tracing::error!(error = %e, "failed to fetch posts by tags");
            AppError::Persistence("failed to fetch posts by tags".to_string())
        })?;
        decode_posts(docs)
    }

    /// Two-phase keyword search.
    ///
    /// Phase one runs on the store: public posts only, optionally narrowed to
    /// posts tagged with the requested language, ordered by the requested
    /// sort. Phase two filters that fetched set by case-insensitive substring
    /// match over title, content, and tags. Search quality is bounded by what
    /// phase one already excluded; the store cannot express free-text search.
    pub async fn search_posts(&self, params: &SearchParams) -> Result<Vec<Post>> {
        let mut query =
            Query::collection(POSTS_COLLECTION).filter(Filter::eq("isPublic", true));
        if let Some(language) = &params.language {
            query = query.filter(Filter::array_contains("tags", language.as_str()));
        }
        query = match params.sort_by {
            SearchSort::Popular => query.order_by("likesCount", Direction::Descending),
            SearchSort::Oldest => query.order_by("createdAt", Direction::Ascending),
            SearchSort::Recent => query.order_by("createdAt", Direction::Descending),
        };

        let docs = self.store.query(&query).await.map_err(|e| {
            tracing::error!(error = %e, "post search query failed");
            AppError::Persistence("failed to search posts".to_string())
        })?;
        let posts = decode_posts(docs)?;

        let term = params.query.to_lowercase();
        Ok(posts
            .into_iter()
            .filter(|post| {
                post.title.to_lowercase().contains(&term)
                    || post.content.to_lowercase().contains(&term)
                    || post.tags.iter().any(|tag| tag.to_lowercase().contains(&term))
            })
            .collect())
    }

    /// Standing watch on a user's posts, newest first. The caller owns the
    /// returned handle and must call `unsubscribe` to stop the watch.
    pub async fn subscribe_to_user_posts<F>(&self, user_id: &str, callback: F) -> Result<WatchHandle>
    where
        F: Fn(Vec<Post>) + Send + Sync + 'static,
    {
        let query = Query::collection(POSTS_COLLECTION)
            .filter(Filter::eq("userId", user_id))
            .order_by("createdAt", Direction::Descending);
        self.watch_posts(query, callback).await
    }

    /// Standing watch on the public feed, newest first
    pub async fn subscribe_to_public_posts<F>(
        &self,
        limit: Option<usize>,
        callback: F,
    ) -> Result<WatchHandle>
    where
        F: Fn(Vec<Post>) + Send + Sync + 'static,
    {
        let query = Query::collection(POSTS_COLLECTION)
            .filter(Filter::eq("isPublic", true))
            .order_by("createdAt", Direction::Descending)
            .limit(limit.unwrap_or(DEFAULT_FEED_LIMIT));
        self.watch_posts(query, callback).await
    }

    async fn watch_posts<F>(&self, query: Query, callback: F) -> Result<WatchHandle>
    where
        F: Fn(Vec<Post>) + Send + Sync + 'static,
    {
        self.store
            .watch(
                query,
                Box::new(move |docs| match decode_posts(docs) {
                    Ok(posts) => callback(posts),
                    Err(e) => tracing::error!(error = %e, "post watch decode failed"),
                }),
            )
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to open post watch");
                AppError::Persistence("failed to watch posts".to_string())
            })
    }
}

fn decode_post(doc: Document) -> Result<Post> {
    doc.decode().map_err(|e| {
        tracing::error!(error = %e, "malformed post document");
        AppError::Persistence("malformed post document".to_string())
    })
}

fn decode_posts(docs: Vec<Document>) -> Result<Vec<Post>> {
    docs.into_iter().map(decode_post).collect()
}

fn dedup_preserving_order(tags: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    tags.retain(|tag| seen.insert(tag.clone()));
}

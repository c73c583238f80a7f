//! Read-side aggregation and the post/folder composition mutations.
//!
//! Every post leaving this layer carries a resolved `author`. Author lookups
//! for a batch are fanned out concurrently and joined, so latency stays at
//! roughly one store round-trip regardless of post count. A failed or empty
//! lookup downgrades to a deterministic placeholder author; it is logged,
//! never propagated, and never blocks sibling posts.

use super::folders::FolderService;
use super::posts::PostService;
use super::users::UserService;
use crate::config::FeedConfig;
use crate::error::{AppError, Result};
use crate::models::{CreatePostData, Post, PostAuthor, PostView, SearchParams};
use crate::store::DocumentStore;
use futures::future::join_all;
use std::sync::Arc;

/// Dispatch parameters for `list_posts`, mirroring the feed screens: a user's
/// posts, the public feed, or one folder's posts.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub user_id: Option<String>,
    pub folder_id: Option<String>,
    pub is_public: Option<bool>,
    pub limit: Option<usize>,
}

/// Outcome of one author lookup. The external contract always yields a
/// `PostAuthor`; the tag is kept internally so substitutions stay observable.
enum AuthorResolution {
    Resolved(PostAuthor),
    Unresolved,
}

impl AuthorResolution {
    fn into_author(self) -> PostAuthor {
        match self {
            AuthorResolution::Resolved(author) => author,
            AuthorResolution::Unresolved => PostAuthor::unknown(),
        }
    }
}

pub struct FeedService {
    posts: PostService,
    folders: FolderService,
    users: UserService,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, FeedConfig::default())
    }

    pub fn with_config(store: Arc<dyn DocumentStore>, config: FeedConfig) -> Self {
        Self {
            posts: PostService::new(store.clone()),
            folders: FolderService::new(store.clone()),
            users: UserService::new(store),
            config,
        }
    }

    /// List posts per the filter dispatch and resolve their authors
    pub async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<PostView>> {
        let limit = filter.limit.unwrap_or(self.config.default_limit);
        let posts = if let Some(user_id) = &filter.user_id {
            self.posts.get_user_posts(user_id).await?
        } else if filter.is_public.unwrap_or(false) {
            self.posts.get_public_posts(Some(limit)).await?
        } else if let Some(folder_id) = &filter.folder_id {
            self.posts.get_posts_by_folder(folder_id).await?
        } else {
            self.posts.get_public_posts(Some(limit)).await?
        };

        Ok(self.resolve_authors(posts).await)
    }

    /// Fetch one post for display; absence is an error here because the
    /// detail screen requires an existing post
    pub async fn get_post(&self, post_id: &str) -> Result<PostView> {
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} not found", post_id)))?;

        let author = self.resolve_author(&post.user_id).await.into_author();
        Ok(PostView::assemble(post, author))
    }

    /// Keyword search with resolved authors. Terms shorter than the
    /// configured minimum are answered with an empty result instead of
    /// issuing a query.
    pub async fn search_posts(&self, params: &SearchParams) -> Result<Vec<PostView>> {
        if params.query.trim().len() < self.config.search_min_chars {
            return Ok(Vec::new());
        }
        let posts = self.posts.search_posts(params).await?;
        Ok(self.resolve_authors(posts).await)
    }

    /// Create a post and, when it lands in a folder, bump that folder's
    /// counter. The counter update is best-effort: its failure is logged and
    /// the created post stands — this is the designed source of counter
    /// drift that recalculation later repairs.
    pub async fn create_post(&self, user_id: &str, data: CreatePostData) -> Result<String> {
        let folder_id = data.folder_id.clone();
        let post_id = self.posts.create_post(user_id, data).await?;

        if let Some(folder_id) = folder_id {
            if let Err(e) = self.folders.increment_posts_count(&folder_id).await {
                tracing::warn!(error = %e, folder_id, post_id, "post created but folder counter increment failed");
            }
        }

        Ok(post_id)
    }

    /// Delete a post and, when it belonged to a folder, decrement that
    /// folder's counter best-effort
    pub async fn delete_post(&self, post_id: &str) -> Result<()> {
        let folder_id = self
            .posts
            .get_post(post_id)
            .await?
            .and_then(|post| post.folder_id);

        self.posts.delete_post(post_id).await?;

        if let Some(folder_id) = folder_id {
            if let Err(e) = self.folders.decrement_posts_count(&folder_id).await {
                tracing::warn!(error = %e, folder_id, post_id, "post deleted but folder counter decrement failed");
            }
        }

        Ok(())
    }

    async fn resolve_authors(&self, posts: Vec<Post>) -> Vec<PostView> {
        let lookups = posts.iter().map(|post| self.resolve_author(&post.user_id));
        let resolutions = join_all(lookups).await;

        posts
            .into_iter()
            .zip(resolutions)
            .map(|(post, resolution)| PostView::assemble(post, resolution.into_author()))
            .collect()
    }

    async fn resolve_author(&self, user_id: &str) -> AuthorResolution {
        match self.users.get_user_by_id(user_id).await {
            Ok(Some(profile)) => AuthorResolution::Resolved(PostAuthor::from(profile)),
            Ok(None) => {
                tracing::warn!(user_id, "post author no longer exists, substituting placeholder");
                AuthorResolution::Unresolved
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id, "author lookup failed, substituting placeholder");
                AuthorResolution::Unresolved
            }
        }
    }
}

//! Display-ready shapes produced by the aggregation layer.
//!
//! Every `PostView` carries a non-null `author` and textual ISO-8601
//! timestamps; heterogeneous store timestamp representations never reach
//! callers of the feed service.

use super::post::Post;
use super::time::StoreTimestamp;
use super::user::UserProfile;
use serde::{Deserialize, Serialize};

/// Placeholder id used when a post's author cannot be resolved
pub const UNKNOWN_AUTHOR_ID: &str = "unknown";

/// Author record merged into a post for display. Optional profile fields
/// default to empty strings rather than being absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub avatar: String,
    pub github_url: String,
    pub linkedin_url: String,
    pub created_at: String,
    pub updated_at: String,
}

impl PostAuthor {
    /// Deterministic sentinel substituted when the real author lookup fails
    /// or the referenced user no longer exists.
    pub fn unknown() -> Self {
        let now = StoreTimestamp::now().to_iso();
        Self {
            id: UNKNOWN_AUTHOR_ID.to_string(),
            name: "Unknown User".to_string(),
            email: String::new(),
            bio: String::new(),
            avatar: String::new(),
            github_url: String::new(),
            linkedin_url: String::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.id == UNKNOWN_AUTHOR_ID
    }
}

impl From<UserProfile> for PostAuthor {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.display_name,
            email: profile.email,
            bio: profile.bio.unwrap_or_default(),
            avatar: profile.avatar.unwrap_or_default(),
            github_url: profile.github_url.unwrap_or_default(),
            linkedin_url: profile.linkedin_url.unwrap_or_default(),
            created_at: profile.created_at.to_iso(),
            updated_at: profile.updated_at.to_iso(),
        }
    }
}

/// A fully denormalized, UI-ready post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
    pub likes_count: i64,
    pub comments_count: i64,
    pub author: PostAuthor,
}

impl PostView {
    pub fn assemble(post: Post, author: PostAuthor) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            code: post.code,
            language: post.language,
            user_id: post.user_id,
            folder_id: post.folder_id,
            tags: post.tags,
            is_public: post.is_public,
            created_at: post.created_at.to_iso(),
            updated_at: post.updated_at.to_iso(),
            likes_count: post.likes_count,
            comments_count: post.comments_count,
            author,
        }
    }
}

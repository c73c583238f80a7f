use super::time::StoreTimestamp;
use serde::{Deserialize, Serialize};

/// A comment on a post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Store-assigned document id
    pub id: String,
    pub content: String,
    pub user_id: String,
    pub post_id: String,
    #[serde(default)]
    pub created_at: StoreTimestamp,
    #[serde(default)]
    pub updated_at: StoreTimestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentData {
    pub content: String,
    pub post_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

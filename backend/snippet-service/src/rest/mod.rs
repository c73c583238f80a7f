//! Fallback HTTP client for the legacy REST API.
//!
//! The primary data path is the document store; this client covers the
//! deployments still fronted by the REST backend. Every response arrives in a
//! `{ success, data, message }` envelope, and transport or status failures are
//! normalized into the same [`AppError`] taxonomy the store path uses.

pub mod client;

pub use client::ApiClient;

use crate::error::AppError;
use crate::models::{Comment, Folder, Post, UserProfile};
use reqwest::StatusCode;
use serde::Deserialize;

/// Standard response envelope used by every endpoint
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct FolderListResponse {
    pub folders: Vec<Folder>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub likes_count: i64,
}

/// Map a non-success HTTP status to the domain error.
///
/// 401 means the session token expired, so the caller must re-authenticate;
/// it is distinct from 403 which means the action itself is not permitted.
pub(crate) fn map_status(status: StatusCode, message: Option<&str>) -> Option<AppError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::UNAUTHORIZED => {
            AppError::Forbidden("session expired, please sign in again".to_string())
        }
        StatusCode::FORBIDDEN => AppError::Forbidden(
            message
                .unwrap_or("you do not have permission to perform this action")
                .to_string(),
        ),
        StatusCode::NOT_FOUND => {
            AppError::NotFound(message.unwrap_or("resource not found").to_string())
        }
        StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
            AppError::Validation(message.unwrap_or("invalid request").to_string())
        }
        s if s.is_server_error() => {
            AppError::Persistence("server error, please try again later".to_string())
        }
        s => AppError::Persistence(format!("request failed with status {}", s.as_u16())),
    })
}

//! Request payload schemas for the REST boundary.
//!
//! Each payload enumerates its required fields, length bounds, and format
//! constraints; validation runs before any store or network call so malformed
//! input surfaces as `ValidationError` without a round-trip.

use crate::error::{AppError, Result};
use crate::models::SearchSort;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color pattern is valid")
});

pub const MAX_POST_TAGS: u64 = 10;
pub const MAX_COMMENT_LENGTH: u64 = 1000;
pub const MAX_FOLDER_NAME_LENGTH: u64 = 100;

fn validate_hex_color(color: &str) -> std::result::Result<(), ValidationError> {
    if HEX_COLOR.is_match(color) {
        Ok(())
    } else {
        Err(ValidationError::new("hex_color"))
    }
}

fn validate_uuid(id: &str) -> std::result::Result<(), ValidationError> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| ValidationError::new("uuid"))
}

/// Run a payload's schema, normalizing failures into the domain error
pub fn check<T: Validate>(payload: &T) -> Result<()> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}

// ---------------------------------------------------------------------------
// Auth & profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(max = 500))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[validate(url)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(min = 2, max = 100))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[validate(url)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[validate(url)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[validate(length(max = 10))]
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostPayload {
    #[validate(length(min = 1, max = 200))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[validate(url)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[validate(length(max = 10))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(custom(function = validate_hex_color))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFolderPayload {
    #[validate(length(min = 1, max = 100))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(custom(function = validate_hex_color))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentPayload {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Query parameters & path parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[validate(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: u32,
    #[validate(range(min = 1, max = 50))]
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            search: None,
            user_id: None,
            folder_id: None,
            language: None,
            is_public: None,
        }
    }
}

/// Query parameters for the dedicated post-search endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[validate(length(min = 1))]
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SearchSort>,
    #[validate(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: u32,
    #[validate(range(min = 1, max = 50))]
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: None,
            sort_by: None,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

/// UUID-shaped path parameter
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IdParam {
    #[validate(custom(function = validate_uuid))]
    pub id: String,
}

fn default_true() -> bool {
    true
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_rejects_short_name_and_bad_email() {
        let payload = RegisterPayload {
            name: "a".to_string(),
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
            bio: None,
            avatar_url: None,
        };
        let err = check(&payload).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn register_accepts_valid_payload() {
        let payload = RegisterPayload {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "difference-engine".to_string(),
            bio: Some("first programmer".to_string()),
            avatar_url: Some("https://example.com/ada.png".to_string()),
        };
        assert!(check(&payload).is_ok());
    }

    #[test]
    fn post_rejects_more_than_ten_tags() {
        let payload = CreatePostPayload {
            title: "hello".to_string(),
            content: "world".to_string(),
            code_snippet: None,
            language: None,
            image_url: None,
            tags: (0..11).map(|i| format!("tag{}", i)).collect(),
            folder_id: None,
            is_public: true,
        };
        assert!(check(&payload).is_err());
    }

    #[test]
    fn post_title_bounds() {
        let mut payload = CreatePostPayload {
            title: String::new(),
            content: "body".to_string(),
            code_snippet: None,
            language: None,
            image_url: None,
            tags: vec![],
            folder_id: None,
            is_public: true,
        };
        assert!(check(&payload).is_err());
        payload.title = "t".repeat(201);
        assert!(check(&payload).is_err());
        payload.title = "just right".to_string();
        assert!(check(&payload).is_ok());
    }

    #[test]
    fn folder_color_must_be_hex() {
        let mut payload = CreateFolderPayload {
            name: "snippets".to_string(),
            description: None,
            color: Some("blue".to_string()),
            is_public: false,
        };
        assert!(check(&payload).is_err());
        payload.color = Some("#1A2b3C".to_string());
        assert!(check(&payload).is_ok());
    }

    #[test]
    fn comment_content_capped_at_1000() {
        let payload = CreateCommentPayload {
            content: "x".repeat(1001),
            parent_id: None,
        };
        assert!(check(&payload).is_err());
    }

    #[test]
    fn list_query_limit_capped_at_50() {
        let query = ListQuery {
            limit: 51,
            ..ListQuery::default()
        };
        assert!(check(&query).is_err());
    }

    #[test]
    fn id_param_must_be_uuid_shaped() {
        let bad = IdParam { id: "abc".to_string() };
        assert!(check(&bad).is_err());
        let good = IdParam {
            id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
        };
        assert!(check(&good).is_ok());
    }

    #[test]
    fn search_query_serializes_camel_case_sort() {
        let query = SearchQuery {
            sort_by: Some(SearchSort::Popular),
            ..SearchQuery::new("hooks")
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["query"], "hooks");
        assert_eq!(value["sortBy"], "popular");
        assert!(value.get("language").is_none());
    }

    #[test]
    fn search_query_requires_a_term_and_caps_the_limit() {
        assert!(check(&SearchQuery::new("")).is_err());
        let oversized = SearchQuery {
            limit: 51,
            ..SearchQuery::new("react")
        };
        assert!(check(&oversized).is_err());
        assert!(check(&SearchQuery::new("react")).is_ok());
    }

    #[test]
    fn list_query_defaults_from_empty_json() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 20);
        assert!(check(&query).is_ok());
    }
}

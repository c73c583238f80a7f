/// User service - profile lookups, prefix search, and profile updates
use crate::error::{AppError, Result};
use crate::models::{UpdateUserData, UserProfile};
use crate::store::{
    server_timestamp, Direction, Document, DocumentStore, Filter, Query, StoreError,
};
use serde_json::Value;
use std::sync::Arc;

const USERS_COLLECTION: &str = "users";

const DEFAULT_SEARCH_LIMIT: usize = 20;

/// High code point appended to a prefix to form its upper range bound
const PREFIX_RANGE_CEILING: char = '\u{f8ff}';

pub struct UserService {
    store: Arc<dyn DocumentStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let doc = self.store.get(USERS_COLLECTION, user_id).await.map_err(|e| {
            tracing::error!(error = %e, user_id, "failed to fetch user");
            AppError::Persistence("failed to fetch user".to_string())
        })?;
        doc.map(decode_user).transpose()
    }

    /// Prefix search over display name and username.
    ///
    /// The store only supports range scans, so both fields are scanned with a
    /// `[term, term + U+F8FF]` range, merged, and deduplicated by id with
    /// display-name matches taking precedence.
    pub async fn search_users(
        &self,
        term: &str,
        limit: Option<usize>,
    ) -> Result<Vec<UserProfile>> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let ceiling = format!("{}{}", term, PREFIX_RANGE_CEILING);

        let by_display_name = Query::collection(USERS_COLLECTION)
            .filter(Filter::gte("displayName", term))
            .filter(Filter::lte("displayName", ceiling.as_str()))
            .order_by("displayName", Direction::Ascending)
            .limit(limit);
        let by_username = Query::collection(USERS_COLLECTION)
            .filter(Filter::gte("username", term))
            .filter(Filter::lte("username", ceiling.as_str()))
            .order_by("username", Direction::Ascending)
            .limit(limit);

        let (display_docs, username_docs) = tokio::try_join!(
            self.store.query(&by_display_name),
            self.store.query(&by_username)
        )
        .map_err(|e| {
            tracing::error!(error = %e, "user search failed");
            AppError::Persistence("failed to search users".to_string())
        })?;

        let mut seen = std::collections::HashSet::new();
        let mut users = Vec::new();
        for doc in display_docs.into_iter().chain(username_docs) {
            if seen.insert(doc.id.clone()) {
                users.push(decode_user(doc)?);
            }
        }
        users.truncate(limit);
        Ok(users)
    }

    pub async fn update_profile(&self, user_id: &str, data: UpdateUserData) -> Result<()> {
        let Value::Object(mut patch) = serde_json::to_value(&data)
            .map_err(|e| AppError::Persistence(e.to_string()))?
        else {
            return Err(AppError::Persistence("update payload must be an object".to_string()));
        };
        patch.insert("updatedAt".to_string(), server_timestamp());

        self.store
            .update(USERS_COLLECTION, user_id, Value::Object(patch))
            .await
            .map_err(|e| match e {
                StoreError::MissingDocument { .. } => {
                    AppError::NotFound(format!("user {} not found", user_id))
                }
                other => {
                    tracing::error!(error = %other, user_id, "failed to update profile");
                    AppError::Persistence("failed to update profile".to_string())
                }
            })
    }

    /// Check whether a username is free, optionally ignoring one user (the
    /// profile being edited)
    pub async fn is_username_available(
        &self,
        username: &str,
        exclude_user_id: Option<&str>,
    ) -> Result<bool> {
        let query = Query::collection(USERS_COLLECTION)
            .filter(Filter::eq("username", username))
            .limit(1);
        let docs = self.store.query(&query).await.map_err(|e| {
            tracing::error!(error = %e, username, "username availability check failed");
            AppError::Persistence("failed to check username availability".to_string())
        })?;

        match docs.first() {
            None => Ok(true),
            Some(existing) => Ok(exclude_user_id == Some(existing.id.as_str())),
        }
    }
}

fn decode_user(doc: Document) -> Result<UserProfile> {
    doc.decode().map_err(|e| {
        tracing::error!(error = %e, "malformed user document");
        AppError::Persistence("malformed user document".to_string())
    })
}

//! HTTP client wrapping the legacy REST endpoints.

use super::{
    map_status, AuthResponse, CommentListResponse, Envelope, FolderListResponse, LikeResponse,
    PostListResponse,
};
use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::models::{Comment, Folder, Post, UserProfile};
use crate::validation::{
    check, CreateCommentPayload, CreateFolderPayload, CreatePostPayload, ListQuery, LoginPayload,
    RegisterPayload, SearchQuery, UpdateFolderPayload, UpdatePostPayload, UpdateProfilePayload,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::RwLock;

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Persistence(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub async fn set_token(&self, token: String) {
        *self.token.write().await = Some(token);
    }

    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    // -- auth ---------------------------------------------------------------

    pub async fn login(&self, payload: &LoginPayload) -> Result<AuthResponse> {
        check(payload)?;
        let auth: AuthResponse = self
            .send(Method::POST, "/auth/login", Some(payload), None::<&()>)
            .await?;
        self.set_token(auth.token.clone()).await;
        Ok(auth)
    }

    pub async fn register(&self, payload: &RegisterPayload) -> Result<AuthResponse> {
        check(payload)?;
        let auth: AuthResponse = self
            .send(Method::POST, "/auth/register", Some(payload), None::<&()>)
            .await?;
        self.set_token(auth.token.clone()).await;
        Ok(auth)
    }

    pub async fn get_profile(&self) -> Result<UserProfile> {
        self.send::<(), (), UserProfile>(Method::GET, "/auth/profile", None, None)
            .await
    }

    // -- users --------------------------------------------------------------

    pub async fn get_users(&self, query: &ListQuery) -> Result<Vec<UserProfile>> {
        check(query)?;
        self.send(Method::GET, "/users", None::<&()>, Some(query))
            .await
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<UserProfile> {
        self.send::<(), (), UserProfile>(Method::GET, &format!("/users/{}", user_id), None, None)
            .await
    }

    pub async fn update_profile(&self, payload: &UpdateProfilePayload) -> Result<UserProfile> {
        check(payload)?;
        self.send(Method::PUT, "/users/profile", Some(payload), None::<&()>)
            .await
    }

    // -- posts --------------------------------------------------------------

    pub async fn get_posts(&self, query: &ListQuery) -> Result<PostListResponse> {
        check(query)?;
        self.send(Method::GET, "/posts", None::<&()>, Some(query))
            .await
    }

    pub async fn get_post_by_id(&self, post_id: &str) -> Result<Post> {
        self.send::<(), (), Post>(Method::GET, &format!("/posts/{}", post_id), None, None)
            .await
    }

    pub async fn create_post(&self, payload: &CreatePostPayload) -> Result<Post> {
        check(payload)?;
        self.send(Method::POST, "/posts", Some(payload), None::<&()>)
            .await
    }

    pub async fn update_post(&self, post_id: &str, payload: &UpdatePostPayload) -> Result<Post> {
        check(payload)?;
        self.send(
            Method::PUT,
            &format!("/posts/{}", post_id),
            Some(payload),
            None::<&()>,
        )
        .await
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<()> {
        self.send_no_content(Method::DELETE, &format!("/posts/{}", post_id))
            .await
    }

    pub async fn like_post(&self, post_id: &str) -> Result<LikeResponse> {
        self.send::<(), (), LikeResponse>(
            Method::POST,
            &format!("/posts/{}/like", post_id),
            None,
            None,
        )
        .await
    }

    pub async fn unlike_post(&self, post_id: &str) -> Result<LikeResponse> {
        self.send::<(), (), LikeResponse>(
            Method::DELETE,
            &format!("/posts/{}/like", post_id),
            None,
            None,
        )
        .await
    }

    pub async fn search_posts(&self, query: &SearchQuery) -> Result<PostListResponse> {
        check(query)?;
        self.send(Method::GET, "/posts/search", None::<&()>, Some(query))
            .await
    }

    // -- folders ------------------------------------------------------------

    pub async fn get_folders(&self, query: &ListQuery) -> Result<FolderListResponse> {
        check(query)?;
        self.send(Method::GET, "/folders", None::<&()>, Some(query))
            .await
    }

    pub async fn get_folder_by_id(&self, folder_id: &str) -> Result<Folder> {
        self.send::<(), (), Folder>(Method::GET, &format!("/folders/{}", folder_id), None, None)
            .await
    }

    pub async fn create_folder(&self, payload: &CreateFolderPayload) -> Result<Folder> {
        check(payload)?;
        self.send(Method::POST, "/folders", Some(payload), None::<&()>)
            .await
    }

    pub async fn update_folder(
        &self,
        folder_id: &str,
        payload: &UpdateFolderPayload,
    ) -> Result<Folder> {
        check(payload)?;
        self.send(
            Method::PUT,
            &format!("/folders/{}", folder_id),
            Some(payload),
            None::<&()>,
        )
        .await
    }

    pub async fn delete_folder(&self, folder_id: &str) -> Result<()> {
        self.send_no_content(Method::DELETE, &format!("/folders/{}", folder_id))
            .await
    }

    /// One user's folders via the shared listing endpoint
    pub async fn get_user_folders(&self, user_id: &str) -> Result<FolderListResponse> {
        let query = ListQuery {
            user_id: Some(user_id.to_string()),
            ..ListQuery::default()
        };
        self.get_folders(&query).await
    }

    // -- comments -----------------------------------------------------------

    pub async fn get_comments(
        &self,
        post_id: &str,
        query: &ListQuery,
    ) -> Result<CommentListResponse> {
        check(query)?;
        self.send(
            Method::GET,
            &format!("/posts/{}/comments", post_id),
            None::<&()>,
            Some(query),
        )
        .await
    }

    pub async fn create_comment(
        &self,
        post_id: &str,
        payload: &CreateCommentPayload,
    ) -> Result<Comment> {
        check(payload)?;
        self.send(
            Method::POST,
            &format!("/posts/{}/comments", post_id),
            Some(payload),
            None::<&()>,
        )
        .await
    }

    pub async fn update_comment(&self, comment_id: &str, content: &str) -> Result<Comment> {
        let body = json!({ "content": content });
        self.send(
            Method::PUT,
            &format!("/comments/{}", comment_id),
            Some(&body),
            None::<&()>,
        )
        .await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        self.send_no_content(Method::DELETE, &format!("/comments/{}", comment_id))
            .await
    }

    // -- transport ----------------------------------------------------------

    async fn send<B, Q, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: Option<&Q>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let envelope = self.exchange(method, path, body, query).await?;
        envelope.data.ok_or_else(|| {
            AppError::Persistence("response envelope is missing its data field".to_string())
        })
    }

    async fn send_no_content(&self, method: Method, path: &str) -> Result<()> {
        self.exchange::<(), (), serde_json::Value>(method, path, None, None)
            .await?;
        Ok(())
    }

    async fn exchange<B, Q, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: Option<&Q>,
    ) -> Result<Envelope<T>>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);

        if let Some(token) = self.token.read().await.as_deref() {
            request = request.bearer_auth(token);
        }
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Persistence("request timed out".to_string())
            } else if e.is_connect() {
                AppError::Persistence("network error, check your connection".to_string())
            } else {
                AppError::Persistence(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            AppError::Persistence(format!("failed to read response body: {}", e))
        })?;

        // The backend carries its human-readable message inside the envelope
        // even on error statuses, so parse before the status check.
        let envelope: Option<Envelope<T>> = serde_json::from_str(&text).ok();
        let message = envelope
            .as_ref()
            .and_then(|env| env.message.as_deref().map(str::to_string));

        if let Some(err) = map_status(status, message.as_deref()) {
            tracing::warn!(%status, %url, "rest request failed");
            return Err(err);
        }

        let envelope = envelope.ok_or_else(|| {
            AppError::Persistence("response body is not a valid envelope".to_string())
        })?;
        if !envelope.success {
            return Err(AppError::Persistence(
                message.unwrap_or_else(|| "request reported failure".to_string()),
            ));
        }
        Ok(envelope)
    }
}

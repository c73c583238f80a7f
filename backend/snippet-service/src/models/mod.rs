/// Data models for snippet-service
///
/// This module defines structures for:
/// - Post: code-snippet posts with tags and visibility
/// - Folder: user folders with a denormalized post counter
/// - Comment: comments on posts
/// - UserProfile: user profile documents
/// - PostView/PostAuthor: display-ready aggregated shapes
pub mod comment;
pub mod folder;
pub mod post;
pub mod time;
pub mod user;
pub mod view;

pub use comment::{Comment, CreateCommentData, UpdateCommentData};
pub use folder::{CreateFolderData, Folder, UpdateFolderData};
pub use post::{CreatePostData, Post, SearchParams, SearchSort, UpdatePostData};
pub use time::StoreTimestamp;
pub use user::{UpdateUserData, UserProfile};
pub use view::{PostAuthor, PostView, UNKNOWN_AUTHOR_ID};

/// Business logic layer for snippet-service
///
/// This module provides high-level operations:
/// - Post service: snippet CRUD, tag queries, two-phase search, watches
/// - Folder service: folder CRUD and denormalized post-counter maintenance
/// - Comment service: comment CRUD with author enforcement
/// - User service: profile lookup, prefix search, profile updates
/// - Feed service: post/author aggregation and composition mutations
pub mod comments;
pub mod feed;
pub mod folders;
pub mod posts;
pub mod users;

// Re-export commonly used services
pub use comments::CommentService;
pub use feed::{FeedService, PostFilter};
pub use folders::FolderService;
pub use posts::{PostService, DEFAULT_FEED_LIMIT};
pub use users::UserService;

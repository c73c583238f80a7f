//! Comment CRUD: thread ordering and author-only mutation.

mod common;

use common::{memory_store, tick};
use snippet_service::models::{CreateCommentData, UpdateCommentData};
use snippet_service::services::CommentService;
use snippet_service::AppError;

fn comment(post_id: &str, content: &str) -> CreateCommentData {
    CreateCommentData {
        content: content.to_string(),
        post_id: post_id.to_string(),
    }
}

#[tokio::test]
async fn post_comments_come_back_oldest_first() {
    let comments = CommentService::new(memory_store());

    for content in ["first", "second", "third"] {
        comments.create_comment("u1", comment("p1", content)).await.unwrap();
        tick().await;
    }
    comments.create_comment("u1", comment("p2", "elsewhere")).await.unwrap();

    let thread = comments.get_post_comments("p1").await.unwrap();
    let contents: Vec<&str> = thread.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
    assert!(thread.iter().all(|c| c.post_id == "p1"));
}

#[tokio::test]
async fn only_the_author_may_update() {
    let comments = CommentService::new(memory_store());
    let id = comments.create_comment("author", comment("p1", "draft")).await.unwrap();

    let err = comments
        .update_comment(
            &id,
            "impostor",
            UpdateCommentData {
                content: Some("hijacked".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    comments
        .update_comment(
            &id,
            "author",
            UpdateCommentData {
                content: Some("edited".to_string()),
            },
        )
        .await
        .unwrap();

    let thread = comments.get_post_comments("p1").await.unwrap();
    assert_eq!(thread[0].content, "edited");
}

#[tokio::test]
async fn updating_a_missing_comment_is_not_found() {
    let comments = CommentService::new(memory_store());
    let err = comments
        .update_comment("ghost", "anyone", UpdateCommentData::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn only_the_author_may_delete_and_absent_delete_is_a_no_op() {
    let comments = CommentService::new(memory_store());
    let id = comments.create_comment("author", comment("p1", "mine")).await.unwrap();

    let err = comments.delete_comment(&id, "impostor").await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(comments.get_post_comments("p1").await.unwrap().len(), 1);

    comments.delete_comment(&id, "author").await.unwrap();
    assert!(comments.get_post_comments("p1").await.unwrap().is_empty());

    // second delete of the same id succeeds quietly
    comments.delete_comment(&id, "author").await.unwrap();
}

#[tokio::test]
async fn edits_restamp_updated_at_but_not_created_at() {
    let comments = CommentService::new(memory_store());
    let id = comments.create_comment("author", comment("p1", "v1")).await.unwrap();

    let before = comments.get_post_comments("p1").await.unwrap().remove(0);
    tick().await;
    comments
        .update_comment(
            &id,
            "author",
            UpdateCommentData {
                content: Some("v2".to_string()),
            },
        )
        .await
        .unwrap();

    let after = comments.get_post_comments("p1").await.unwrap().remove(0);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
}

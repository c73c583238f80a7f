//! Feed aggregation: author resolution, placeholder substitution on missing
//! or failing lookups, and the display-shape guarantees of `PostView`.

mod common;

use chrono::DateTime;
use common::{memory_store, post_data, seed_user, tick, FlakyUserStore};
use snippet_service::models::{SearchParams, UNKNOWN_AUTHOR_ID};
use snippet_service::services::{FeedService, PostFilter, PostService};
use snippet_service::store::{DocumentStore, MemoryStore};
use snippet_service::AppError;
use std::sync::Arc;

#[tokio::test]
async fn listed_posts_carry_their_resolved_author() {
    let store = memory_store();
    let user_id = seed_user(store.as_ref(), "Grace Hopper", "grace").await;
    let posts = PostService::new(store.clone());
    posts.create_post(&user_id, post_data("compilers")).await.unwrap();

    let feed = FeedService::new(store);
    let filter = PostFilter {
        user_id: Some(user_id.clone()),
        ..PostFilter::default()
    };
    let views = feed.list_posts(&filter).await.unwrap();

    assert_eq!(views.len(), 1);
    let view = &views[0];
    assert_eq!(view.author.id, user_id);
    assert_eq!(view.author.name, "Grace Hopper");
    assert_eq!(view.author.email, "grace@example.com");
    // optional profile fields default to empty strings, never absent
    assert_eq!(view.author.bio, "");
    assert_eq!(view.author.avatar, "");
    assert!(!view.author.is_unknown());
}

#[tokio::test]
async fn view_timestamps_are_textual_iso_8601() {
    let store = memory_store();
    let user_id = seed_user(store.as_ref(), "Ada", "ada").await;
    let posts = PostService::new(store.clone());
    posts.create_post(&user_id, post_data("engines")).await.unwrap();

    let feed = FeedService::new(store);
    let filter = PostFilter {
        user_id: Some(user_id),
        ..PostFilter::default()
    };
    let views = feed.list_posts(&filter).await.unwrap();

    let view = &views[0];
    assert!(DateTime::parse_from_rfc3339(&view.created_at).is_ok());
    assert!(DateTime::parse_from_rfc3339(&view.updated_at).is_ok());
    assert!(view.created_at.ends_with('Z'));
    assert!(DateTime::parse_from_rfc3339(&view.author.created_at).is_ok());
}

#[tokio::test]
async fn missing_author_becomes_the_placeholder() {
    let store = memory_store();
    let posts = PostService::new(store.clone());
    posts.create_post("vanished-user", post_data("orphaned")).await.unwrap();

    let feed = FeedService::new(store);
    let filter = PostFilter {
        user_id: Some("vanished-user".to_string()),
        ..PostFilter::default()
    };
    let views = feed.list_posts(&filter).await.unwrap();

    assert_eq!(views.len(), 1);
    assert_eq!(views[0].author.id, UNKNOWN_AUTHOR_ID);
    assert_eq!(views[0].author.name, "Unknown User");
    assert!(views[0].author.is_unknown());
}

#[tokio::test]
async fn author_lookup_failure_does_not_poison_sibling_posts() {
    common::init_tracing();
    let mem = MemoryStore::default();
    let healthy_id = seed_user(&mem, "Healthy", "healthy").await;
    let broken_id = seed_user(&mem, "Broken", "broken").await;

    let store: Arc<dyn DocumentStore> =
        Arc::new(FlakyUserStore::new(mem, [broken_id.clone()]));
    let posts = PostService::new(store.clone());
    posts.create_post(&healthy_id, post_data("fine")).await.unwrap();
    tick().await;
    posts.create_post(&broken_id, post_data("unlucky")).await.unwrap();

    let feed = FeedService::new(store);
    let filter = PostFilter {
        is_public: Some(true),
        ..PostFilter::default()
    };
    let views = feed.list_posts(&filter).await.unwrap();

    assert_eq!(views.len(), 2);
    let fine = views.iter().find(|v| v.title == "fine").unwrap();
    let unlucky = views.iter().find(|v| v.title == "unlucky").unwrap();
    assert_eq!(fine.author.name, "Healthy");
    assert!(unlucky.author.is_unknown());
}

#[tokio::test]
async fn get_post_resolves_its_author() {
    let store = memory_store();
    let user_id = seed_user(store.as_ref(), "Solo", "solo").await;
    let posts = PostService::new(store.clone());
    let post_id = posts.create_post(&user_id, post_data("single")).await.unwrap();

    let feed = FeedService::new(store);
    let view = feed.get_post(&post_id).await.unwrap();
    assert_eq!(view.id, post_id);
    assert_eq!(view.author.name, "Solo");
}

#[tokio::test]
async fn get_post_on_missing_id_is_not_found() {
    let feed = FeedService::new(memory_store());
    let err = feed.get_post("nope").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn search_results_are_enriched_too() {
    let store = memory_store();
    let user_id = seed_user(store.as_ref(), "Search Author", "searcher").await;
    let posts = PostService::new(store.clone());
    posts.create_post(&user_id, post_data("findable thing")).await.unwrap();

    let feed = FeedService::new(store);
    let views = feed
        .search_posts(&SearchParams::new("findable"))
        .await
        .unwrap();

    assert_eq!(views.len(), 1);
    assert_eq!(views[0].author.name, "Search Author");
}

#[tokio::test]
async fn sub_minimum_search_terms_return_nothing() {
    let store = memory_store();
    let user_id = seed_user(store.as_ref(), "Terse", "terse").await;
    let posts = PostService::new(store.clone());
    posts.create_post(&user_id, post_data("a")).await.unwrap();

    let feed = FeedService::new(store);
    let views = feed.search_posts(&SearchParams::new("a")).await.unwrap();
    assert!(views.is_empty());
}

#[tokio::test]
async fn mixed_timestamp_representations_normalize_in_views() {
    let store = memory_store();
    let user_id = seed_user(store.as_ref(), "Mixed", "mixed").await;

    // One document written with a textual timestamp, as the legacy path does
    store
        .insert(
            "posts",
            serde_json::json!({
                "title": "legacy", "content": "old format",
                "userId": user_id, "isPublic": true, "tags": [],
                "createdAt": "2024-03-01T10:00:00.000Z",
                "updatedAt": "2024-03-01T10:00:00.000Z",
                "likesCount": 0, "commentsCount": 0,
            }),
        )
        .await
        .unwrap();

    // And one stamped natively by the store
    let posts = PostService::new(store.clone());
    posts.create_post(&user_id, post_data("modern")).await.unwrap();

    let feed = FeedService::new(store);
    let filter = PostFilter {
        user_id: Some(user_id),
        ..PostFilter::default()
    };
    let views = feed.list_posts(&filter).await.unwrap();

    assert_eq!(views.len(), 2);
    // newest first: the natively stamped post precedes the 2024 one
    assert_eq!(views[0].title, "modern");
    assert_eq!(views[1].created_at, "2024-03-01T10:00:00.000Z");
    for view in &views {
        assert!(DateTime::parse_from_rfc3339(&view.created_at).is_ok());
    }
}

//! User profile lookup, prefix search, and profile updates.

mod common;

use common::memory_store;
use snippet_service::models::UpdateUserData;
use snippet_service::services::UserService;
use snippet_service::AppError;

#[tokio::test]
async fn get_user_by_id_round_trips_and_absence_is_none() {
    let store = memory_store();
    let id = common::seed_user(store.as_ref(), "carol", "carol").await;
    let users = UserService::new(store);

    let profile = users.get_user_by_id(&id).await.unwrap().unwrap();
    assert_eq!(profile.id, id);
    assert_eq!(profile.display_name, "carol");
    assert_eq!(profile.email, "carol@example.com");

    assert!(users.get_user_by_id("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn search_matches_prefixes_on_both_name_fields() {
    let store = memory_store();
    common::seed_user(store.as_ref(), "alice wonder", "wonderland").await;
    common::seed_user(store.as_ref(), "alicia keys", "akeys").await;
    common::seed_user(store.as_ref(), "bob builder", "alimony").await;
    let users = UserService::new(store);

    let found = users.search_users("ali", None).await.unwrap();
    let names: Vec<&str> = found.iter().map(|u| u.display_name.as_str()).collect();

    // "bob builder" matches through his username prefix
    assert_eq!(found.len(), 3);
    assert!(names.contains(&"alice wonder"));
    assert!(names.contains(&"alicia keys"));
    assert!(names.contains(&"bob builder"));
}

#[tokio::test]
async fn search_deduplicates_users_matching_on_both_fields() {
    let store = memory_store();
    common::seed_user(store.as_ref(), "dev one", "devone").await;
    let users = UserService::new(store);

    let found = users.search_users("dev", None).await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn search_respects_the_limit() {
    let store = memory_store();
    for i in 0..5 {
        common::seed_user(store.as_ref(), &format!("pager {}", i), &format!("pager{}", i)).await;
    }
    let users = UserService::new(store);

    let found = users.search_users("pager", Some(3)).await.unwrap();
    assert_eq!(found.len(), 3);
}

#[tokio::test]
async fn profile_updates_merge_and_missing_user_is_not_found() {
    let store = memory_store();
    let id = common::seed_user(store.as_ref(), "eve", "eve").await;
    let users = UserService::new(store);

    users
        .update_profile(
            &id,
            UpdateUserData {
                bio: Some("security researcher".to_string()),
                ..UpdateUserData::default()
            },
        )
        .await
        .unwrap();

    let profile = users.get_user_by_id(&id).await.unwrap().unwrap();
    assert_eq!(profile.bio.as_deref(), Some("security researcher"));
    assert_eq!(profile.display_name, "eve");

    let err = users
        .update_profile("ghost", UpdateUserData::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn username_availability_excludes_the_profile_being_edited() {
    let store = memory_store();
    let id = common::seed_user(store.as_ref(), "frank", "frank").await;
    let users = UserService::new(store);

    assert!(!users.is_username_available("frank", None).await.unwrap());
    assert!(users.is_username_available("frank", Some(&id)).await.unwrap());
    assert!(users.is_username_available("unclaimed", None).await.unwrap());
}

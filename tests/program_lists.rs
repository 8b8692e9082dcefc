//! Integration tests for saved program lists: CRUD and membership toggles

mod common;

use std::time::Duration;

use common::{seeded_storage, MockBackend, USER_ID};
use studywat::lists::membership::{ADDED, REMOVED, TOGGLE_FAILED};
use studywat::lists::{ListCollection, ListDraft, ListService, ToggleOutcome};
use studywat::notify::{Notifications, ToastKind};
use studywat::ApiError;

async fn service(mock: &MockBackend) -> ListService {
    let (_session, backend) = mock.connect(seeded_storage("access-1", "refresh-1"));
    ListService::new(backend.program_lists)
}

#[tokio::test]
async fn test_create_list_and_load_it_back() {
    let mock = MockBackend::start().await;
    let lists = service(&mock).await;

    let created = lists
        .create(USER_ID, &ListDraft::new("  Dream schools ", None), Vec::new())
        .await
        .unwrap();

    // `_id` from the backend is exposed as `id`; title trimmed; default emoji
    assert_eq!(created.id, "l1");
    assert_eq!(created.title, "Dream schools");
    assert_eq!(created.emoji, "📋");
    assert!(created.created_at.is_some());

    let loaded = lists.load(USER_ID).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "l1");
    assert!(lists.load("someone-else").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_title_is_rejected_locally() {
    let mock = MockBackend::start().await;
    let lists = service(&mock).await;

    let blank = lists
        .create(USER_ID, &ListDraft::new("   ", None), Vec::new())
        .await
        .unwrap_err();
    let long = lists
        .create(USER_ID, &ListDraft::new("x".repeat(51), None), Vec::new())
        .await
        .unwrap_err();

    assert!(matches!(blank, ApiError::Validation(_)));
    assert!(matches!(long, ApiError::Validation(_)));
    assert_eq!(mock.state().create_calls, 0);
}

#[tokio::test]
async fn test_edit_resends_current_program_ids() {
    let mock = MockBackend::start().await;
    let lists = service(&mock).await;
    let created = lists
        .create(
            USER_ID,
            &ListDraft::new("Shortlist", Some("⭐".to_string())),
            vec!["p1".to_string(), "p2".to_string()],
        )
        .await
        .unwrap();

    let edited = lists
        .edit(&created, &ListDraft::new("Final picks", Some("🏆".to_string())))
        .await
        .unwrap();

    assert_eq!(edited.title, "Final picks");
    assert_eq!(edited.emoji, "🏆");
    assert_eq!(edited.program_ids, vec!["p1", "p2"]);
}

#[tokio::test]
async fn test_delete_list() {
    let mock = MockBackend::start().await;
    let lists = service(&mock).await;
    let created = lists
        .create(USER_ID, &ListDraft::new("Temp", None), Vec::new())
        .await
        .unwrap();

    lists.delete(&created.id).await.unwrap();

    assert!(lists.load(USER_ID).await.unwrap().is_empty());
    let err = lists.delete(&created.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_membership_toggle_round_trip() {
    let mock = MockBackend::start().await;
    let lists = service(&mock).await;
    let created = lists
        .create(
            USER_ID,
            &ListDraft::new("Shortlist", None),
            vec!["p2".to_string()],
        )
        .await
        .unwrap();

    let mut collection = ListCollection::default();
    collection.apply_loaded(lists.load(USER_ID).await);
    let mut notes = Notifications::new(Duration::from_secs(3));

    let added = lists
        .toggle_membership(&mut collection, &created.id, "p1", &mut notes)
        .await;
    assert_eq!(added, Some(ToggleOutcome::Added));
    assert_eq!(notes.last().map(|t| t.message.as_str()), Some(ADDED));
    // Whole array replacement, existing ids kept in order
    assert_eq!(
        collection.get(&created.id).unwrap().program_ids,
        vec!["p2", "p1"]
    );

    let removed = lists
        .toggle_membership(&mut collection, &created.id, "p2", &mut notes)
        .await;
    assert_eq!(removed, Some(ToggleOutcome::Removed));
    assert_eq!(notes.last().map(|t| t.message.as_str()), Some(REMOVED));

    let stored = lists.api().get(&created.id).await.unwrap();
    assert_eq!(stored.program_ids, vec!["p1"]);
    assert!(!collection.is_updating(&created.id));
}

#[tokio::test]
async fn test_failed_toggle_rolls_back() {
    let mock = MockBackend::start().await;
    let lists = service(&mock).await;
    let created = lists
        .create(USER_ID, &ListDraft::new("Shortlist", None), Vec::new())
        .await
        .unwrap();

    let mut collection = ListCollection::default();
    collection.apply_loaded(lists.load(USER_ID).await);
    mock.state().lists.clear();
    let mut notes = Notifications::new(Duration::from_secs(3));

    let outcome = lists
        .toggle_membership(&mut collection, &created.id, "p1", &mut notes)
        .await;

    assert_eq!(outcome, Some(ToggleOutcome::RolledBack));
    assert!(collection.get(&created.id).unwrap().program_ids.is_empty());
    let toast = notes.last().unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.message, TOGGLE_FAILED);
}

//! Integration tests for PgNoteRepository.
//!
//! These tests require a running PostgreSQL instance:
//! `DATABASE_URL=postgres://... cargo test -p notekeep-db -- --ignored`

use chrono::{Duration, Utc};
use notekeep_db::test_fixtures::TestDatabase;
use notekeep_db::{Error, NoteFilter, NoteRepository};

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_insert_returns_note_with_labels() {
    dotenvy::dotenv().ok();
    let test_db = TestDatabase::new().await;
    let owner = test_db.owner();
    let work = test_db.label(owner, "Work").await;
    let home = test_db.label(owner, "home").await;

    let note = test_db.note(owner, "Plan", &[work.id, home.id]).await;

    assert_eq!(note.owner_id, owner);
    assert_eq!(note.color, "#FFFFFF");
    assert!(!note.is_pinned && !note.is_archived && !note.is_deleted);
    assert!(note.updated_at.is_none());
    // labels come back ordered by name, case-insensitively
    let names: Vec<&str> = note.labels.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["home", "Work"]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_list_orders_pinned_then_recent() {
    dotenvy::dotenv().ok();
    let test_db = TestDatabase::new().await;
    let owner = test_db.owner();
    let notes = &test_db.db.notes;

    let mut first = test_db.note(owner, "first", &[]).await;
    let second = test_db.note(owner, "second", &[]).await;
    let mut third = test_db.note(owner, "third", &[]).await;

    first.toggle_pin(Utc::now());
    notes.save(&first).await.expect("Failed to pin");
    third.touch(Utc::now() + Duration::seconds(5));
    notes.save(&third).await.expect("Failed to touch");

    let listed = notes
        .list(owner, NoteFilter::Active)
        .await
        .expect("Failed to list notes");
    let ids: Vec<i64> = listed.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![first.id, third.id, second.id]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_trash_listing_and_empty_trash() {
    dotenvy::dotenv().ok();
    let test_db = TestDatabase::new().await;
    let owner = test_db.owner();
    let other = test_db.owner();
    let notes = &test_db.db.notes;

    let mut a = test_db.note(owner, "a", &[]).await;
    let mut b = test_db.note(owner, "b", &[]).await;
    test_db.note(owner, "kept", &[]).await;
    let mut foreign = test_db.note(other, "foreign", &[]).await;

    let now = Utc::now();
    a.trash(now - Duration::minutes(1));
    b.trash(now);
    foreign.trash(now);
    for n in [&a, &b, &foreign] {
        notes.save(n).await.expect("Failed to trash");
    }

    let trash = notes
        .list(owner, NoteFilter::Trashed)
        .await
        .expect("Failed to list trash");
    let ids: Vec<i64> = trash.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);

    let deleted = notes.delete_trashed(owner).await.expect("Failed to empty trash");
    assert_eq!(deleted, 2);
    assert_eq!(notes.list(owner, NoteFilter::Active).await.unwrap().len(), 1);
    // another owner's trash is untouched
    assert!(notes.fetch(foreign.id).await.unwrap().is_some());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_search_escapes_wildcards() {
    dotenvy::dotenv().ok();
    let test_db = TestDatabase::new().await;
    let owner = test_db.owner();
    let notes = &test_db.db.notes;

    let discount = test_db.note(owner, "50% off", &[]).await;
    test_db.note(owner, "500 items", &[]).await;

    let hits = notes.search(owner, "0%").await.expect("Failed to search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, discount.id);

    let hits = notes.search(owner, "OFF").await.expect("Failed to search");
    assert_eq!(hits.len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_attach_is_idempotent_and_detach_reports_noop() {
    dotenvy::dotenv().ok();
    let test_db = TestDatabase::new().await;
    let owner = test_db.owner();
    let notes = &test_db.db.notes;
    let label = test_db.label(owner, "Work").await;
    let note = test_db.note(owner, "Plan", &[]).await;

    assert!(notes.attach_label(note.id, label.id, Utc::now()).await.unwrap());
    assert!(!notes.attach_label(note.id, label.id, Utc::now()).await.unwrap());

    let reloaded = notes.fetch(note.id).await.unwrap().expect("note exists");
    assert_eq!(reloaded.labels.len(), 1);
    assert!(reloaded.updated_at.is_some());

    assert!(notes.detach_label(note.id, label.id, Utc::now()).await.unwrap());
    assert!(!notes.detach_label(note.id, label.id, Utc::now()).await.unwrap());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_attach_missing_label_maps_to_label_not_found() {
    dotenvy::dotenv().ok();
    let test_db = TestDatabase::new().await;
    let owner = test_db.owner();
    let note = test_db.note(owner, "Plan", &[]).await;

    let err = test_db
        .db
        .notes
        .attach_label(note.id, i64::MAX, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::LabelNotFound(id) if id == i64::MAX));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_save_with_labels_and_cascade_on_delete() {
    dotenvy::dotenv().ok();
    let test_db = TestDatabase::new().await;
    let owner = test_db.owner();
    let notes = &test_db.db.notes;
    let a = test_db.label(owner, "a").await;
    let b = test_db.label(owner, "b").await;
    let mut note = test_db.note(owner, "Plan", &[a.id]).await;

    note.title = Some("Plan v2".to_string());
    note.touch(Utc::now());
    notes
        .save_with_labels(&note, &[b.id], Utc::now())
        .await
        .expect("Failed to save note");
    let reloaded = notes.fetch(note.id).await.unwrap().expect("note exists");
    assert_eq!(reloaded.title.as_deref(), Some("Plan v2"));
    assert_eq!(reloaded.label_ids(), vec![b.id]);

    let with_b = notes.list_with_label(owner, b.id).await.unwrap();
    assert_eq!(with_b.len(), 1);

    assert!(notes.delete(note.id).await.unwrap());
    assert!(notes.fetch(note.id).await.unwrap().is_none());
    assert!(notes.list_with_label(owner, b.id).await.unwrap().is_empty());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_save_with_missing_label_rolls_back_columns() {
    dotenvy::dotenv().ok();
    let test_db = TestDatabase::new().await;
    let owner = test_db.owner();
    let notes = &test_db.db.notes;
    let a = test_db.label(owner, "a").await;
    let note = test_db.note(owner, "Plan", &[a.id]).await;

    let mut edited = note.clone();
    edited.title = Some("Changed".to_string());
    edited.toggle_pin(Utc::now());
    let err = notes
        .save_with_labels(&edited, &[i64::MAX], Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::LabelNotFound(id) if id == i64::MAX));

    let reloaded = notes.fetch(note.id).await.unwrap().expect("note exists");
    assert_eq!(reloaded.title.as_deref(), Some("Plan"));
    assert!(!reloaded.is_pinned);
    assert_eq!(reloaded.label_ids(), vec![a.id]);

    test_db.cleanup().await;
}

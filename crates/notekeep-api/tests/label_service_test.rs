use std::sync::Arc;

use notekeep_api::services::LabelService;
use notekeep_core::memory::InMemoryStore;
use notekeep_core::{CreateLabelRequest, Error, UpdateLabelRequest};

fn service() -> LabelService {
    LabelService::new(Arc::new(InMemoryStore::new()))
}

fn named(name: &str) -> CreateLabelRequest {
    CreateLabelRequest {
        name: Some(name.to_string()),
    }
}

fn rename(name: &str) -> UpdateLabelRequest {
    UpdateLabelRequest {
        name: Some(name.to_string()),
    }
}

#[tokio::test]
async fn test_create_trims_name() {
    let labels = service();
    let label = labels.create(1, named("  Work  ")).await.unwrap();
    assert_eq!(label.name, "Work");
    assert_eq!(label.owner_id, 1);
}

#[tokio::test]
async fn test_create_rejects_blank_and_long_names() {
    let labels = service();

    let err = labels.create(1, named("   ")).await.unwrap_err();
    assert_eq!(err.public_message(), "Label name is required");

    let err = labels
        .create(1, CreateLabelRequest { name: None })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = labels.create(1, named(&"x".repeat(51))).await.unwrap_err();
    assert_eq!(err.public_message(), "Label name must be 50 characters or less");

    assert!(labels.create(1, named(&"x".repeat(50))).await.is_ok());
}

#[tokio::test]
async fn test_duplicate_name_ignores_case() {
    let labels = service();
    labels.create(1, named("Work")).await.unwrap();

    let err = labels.create(1, named("WORK")).await.unwrap_err();
    assert_eq!(err.public_message(), "A label with this name already exists");

    // other owners have their own namespace
    assert!(labels.create(2, named("work")).await.is_ok());
}

#[tokio::test]
async fn test_list_is_sorted_and_scoped() {
    let labels = service();
    labels.create(1, named("Zeta")).await.unwrap();
    labels.create(1, named("alpha")).await.unwrap();
    labels.create(2, named("Beta")).await.unwrap();

    let names: Vec<String> = labels
        .list(1)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(names, vec!["alpha", "Zeta"]);
}

#[tokio::test]
async fn test_rename_to_same_name_is_noop() {
    let labels = service();
    let label = labels.create(1, named("Work")).await.unwrap();

    let same = labels.update(1, label.id, rename("work")).await.unwrap();
    assert_eq!(same.name, "Work");
}

#[tokio::test]
async fn test_rename_conflict_with_sibling() {
    let labels = service();
    labels.create(1, named("Home")).await.unwrap();
    let work = labels.create(1, named("Work")).await.unwrap();

    let err = labels.update(1, work.id, rename("home")).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let renamed = labels.update(1, work.id, rename("Office")).await.unwrap();
    assert_eq!(renamed.name, "Office");
    assert_eq!(labels.get(1, work.id).await.unwrap().name, "Office");
}

#[tokio::test]
async fn test_foreign_label_access_is_unauthorized() {
    let labels = service();
    let label = labels.create(1, named("Work")).await.unwrap();

    assert!(matches!(
        labels.get(2, label.id).await,
        Err(Error::Unauthorized(_))
    ));
    assert!(matches!(
        labels.update(2, label.id, rename("Mine")).await,
        Err(Error::Unauthorized(_))
    ));
    assert!(matches!(
        labels.delete(2, label.id).await,
        Err(Error::Unauthorized(_))
    ));
    assert!(matches!(
        labels.get(1, 9999).await,
        Err(Error::LabelNotFound(9999))
    ));
}

#[tokio::test]
async fn test_delete_removes_label() {
    let labels = service();
    let label = labels.create(1, named("Work")).await.unwrap();

    labels.delete(1, label.id).await.unwrap();
    assert!(labels.list(1).await.unwrap().is_empty());
    assert!(labels.get(1, label.id).await.unwrap_err().is_not_found());
}

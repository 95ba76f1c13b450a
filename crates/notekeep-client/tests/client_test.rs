//! Client request/response tests against a mock API server.

use notekeep_client::{ClientConfig, ClientError, NotekeepClient};
use notekeep_core::CreateNoteRequest;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn note_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "userId": 7,
        "title": title,
        "content": null,
        "color": "#FFFFFF",
        "isPinned": false,
        "isArchived": false,
        "isDeleted": false,
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": null,
        "deletedAt": null,
        "labels": []
    })
}

fn client_for(server: &MockServer) -> NotekeepClient {
    let config = ClientConfig::default().with_base_url(server.uri());
    NotekeepClient::new(config, 7).expect("Failed to create client")
}

#[tokio::test]
async fn test_user_id_header_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .and(header("x-user-id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [note_json(1, "Groceries")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let notes = client_for(&mock_server).list_notes().await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title.as_deref(), Some("Groceries"));
    assert_eq!(notes[0].owner_id, 7);
}

#[tokio::test]
async fn test_create_note_posts_camel_case_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/notes"))
        .and(body_json(json!({
            "title": "Plan",
            "content": null,
            "color": "#fbbc04",
            "labelIds": [3]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "message": "Note created successfully",
            "data": note_json(11, "Plan")
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let note = client_for(&mock_server)
        .create_note(&CreateNoteRequest {
            title: Some("Plan".into()),
            content: None,
            color: Some("#fbbc04".into()),
            label_ids: Some(vec![3]),
        })
        .await
        .unwrap();
    assert_eq!(note.id, 11);
}

#[tokio::test]
async fn test_error_envelope_becomes_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/notes/42"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "message": "Note with ID 42 not found"
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).get_note(42).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "API returned 404: Note with ID 42 not found");
}

#[tokio::test]
async fn test_error_without_envelope_uses_status_reason() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/notes/5/pin"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).toggle_pin(5).await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "Bad Gateway");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_local_validation_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let err = client
        .create_note(&CreateNoteRequest {
            title: Some("   ".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Validation error: A note needs a title or content");

    assert!(matches!(
        client.update_color(1, "teal").await,
        Err(ClientError::Validation(_))
    ));
    assert!(matches!(
        client.bulk_delete(&[]).await,
        Err(ClientError::Validation(_))
    ));
    assert!(matches!(
        client.get_note(0).await,
        Err(ClientError::Validation(_))
    ));
    assert!(matches!(
        client.create_label("  ").await,
        Err(ClientError::Validation(_))
    ));
    assert!(client.search("   ").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_sends_query_param() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/notes/search"))
        .and(query_param("query", "milk run"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [note_json(2, "Milk run")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let hits = client_for(&mock_server).search(" milk run ").await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn test_bulk_delete_deduplicates_ids() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/notes/bulk-delete"))
        .and(body_json(json!({ "noteIds": [1, 2] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "1 note(s) moved to trash, 1 failed",
            "data": {
                "deleted": [1],
                "failed": [{ "id": 2, "reason": "Note with ID 2 not found" }]
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = client_for(&mock_server)
        .bulk_delete(&[1, 2, 1])
        .await
        .unwrap();
    assert_eq!(outcome.deleted, vec![1]);
    assert_eq!(outcome.failed[0].reason, "Note with ID 2 not found");
}

#[tokio::test]
async fn test_permanent_delete_accepts_message_only_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/notes/9/permanent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Note permanently deleted"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    client_for(&mock_server).permanent_delete(9).await.unwrap();
}

#[tokio::test]
async fn test_missing_data_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).list_labels().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn test_health_check() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "healthy" })))
        .mount(&mock_server)
        .await;

    assert!(client_for(&mock_server).health_check().await.unwrap());
}

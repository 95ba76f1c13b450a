//! HTTP client for the notekeep API.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use notekeep_core::validation::{
    dedup_ids, normalize_label_name, validate_color, validate_id, validate_owner,
};
use notekeep_core::{
    BulkDeleteOutcome, BulkDeleteRequest, CreateLabelRequest, CreateNoteRequest, DetachOutcome,
    EmptyTrashOutcome, Label, Note, NoteViews, UpdateColorRequest, UpdateLabelRequest,
    UpdateNoteRequest,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Response envelope as sent by the API.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    message: Option<String>,
    data: Option<T>,
}

/// Typed client acting on behalf of one user.
#[derive(Debug, Clone)]
pub struct NotekeepClient {
    http: Client,
    config: ClientConfig,
    user_id: i64,
}

impl NotekeepClient {
    /// Create a client for `user_id`.
    pub fn new(config: ClientConfig, user_id: i64) -> Result<Self> {
        validate_owner(user_id)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        info!(
            subsystem = "client",
            base_url = %config.base_url,
            timeout_secs = config.timeout_seconds,
            "Initializing notekeep client"
        );

        Ok(Self {
            http,
            config,
            user_id,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.config.url(path))
            .header(self.config.user_id_header.as_str(), self.user_id.to_string())
    }

    /// Send a request and unwrap the envelope.
    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, op: &'static str) -> Result<Envelope<T>> {
        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            warn!(
                subsystem = "client",
                op,
                status = status.as_u16(),
                error = %message,
                "API request failed"
            );
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| ClientError::Decode(format!("Failed to parse response: {}", e)))?;
        if !envelope.success {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: envelope.message.unwrap_or_default(),
            });
        }
        debug!(subsystem = "client", op, status = status.as_u16(), "API request succeeded");
        Ok(envelope)
    }

    async fn data<T: DeserializeOwned>(&self, req: RequestBuilder, op: &'static str) -> Result<T> {
        self.send::<T>(req, op)
            .await?
            .data
            .ok_or_else(|| ClientError::Decode(format!("{} response has no data", op)))
    }

    async fn json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        op: &'static str,
    ) -> Result<T> {
        self.data(self.request(method, path).json(body), op).await
    }

    async fn empty(&self, method: Method, path: &str, op: &'static str) -> Result<()> {
        self.send::<serde_json::Value>(self.request(method, path), op)
            .await
            .map(|_| ())
    }

    // =========================================================================
    // NOTES
    // =========================================================================

    /// Every non-deleted note, pinned first.
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        self.data(self.request(Method::GET, "/api/notes"), "list_notes")
            .await
    }

    pub async fn note_views(&self) -> Result<NoteViews> {
        self.data(self.request(Method::GET, "/api/notes/views"), "note_views")
            .await
    }

    pub async fn list_archived(&self) -> Result<Vec<Note>> {
        self.data(self.request(Method::GET, "/api/notes/archived"), "list_archived")
            .await
    }

    pub async fn list_trash(&self) -> Result<Vec<Note>> {
        self.data(self.request(Method::GET, "/api/notes/trash"), "list_trash")
            .await
    }

    /// Search title and content. A blank query returns nothing without a request.
    pub async fn search(&self, query: &str) -> Result<Vec<Note>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let req = self
            .request(Method::GET, "/api/notes/search")
            .query(&[("query", query)]);
        self.data(req, "search").await
    }

    pub async fn get_note(&self, id: i64) -> Result<Note> {
        validate_id(id, "note")?;
        self.data(self.request(Method::GET, &format!("/api/notes/{}", id)), "get_note")
            .await
    }

    /// Create a note. A title or some content is required.
    pub async fn create_note(&self, req: &CreateNoteRequest) -> Result<Note> {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, |s| s.trim().is_empty());
        if blank(&req.title) && blank(&req.content) {
            return Err(ClientError::Validation(
                "A note needs a title or content".to_string(),
            ));
        }
        if let Some(color) = &req.color {
            validate_color(color)?;
        }
        for id in req.label_ids.iter().flatten() {
            validate_id(*id, "label")?;
        }
        self.json(Method::POST, "/api/notes", req, "create_note").await
    }

    pub async fn update_note(&self, id: i64, req: &UpdateNoteRequest) -> Result<Note> {
        validate_id(id, "note")?;
        if let Some(color) = &req.color {
            validate_color(color)?;
        }
        self.json(Method::PUT, &format!("/api/notes/{}", id), req, "update_note")
            .await
    }

    /// Move a note to the trash.
    pub async fn delete_note(&self, id: i64) -> Result<Note> {
        validate_id(id, "note")?;
        self.data(
            self.request(Method::DELETE, &format!("/api/notes/{}", id)),
            "delete_note",
        )
        .await
    }

    pub async fn toggle_pin(&self, id: i64) -> Result<Note> {
        self.toggle(id, "pin", "toggle_pin").await
    }

    pub async fn toggle_archive(&self, id: i64) -> Result<Note> {
        self.toggle(id, "archive", "toggle_archive").await
    }

    pub async fn toggle_trash(&self, id: i64) -> Result<Note> {
        self.toggle(id, "trash", "toggle_trash").await
    }

    async fn toggle(&self, id: i64, action: &str, op: &'static str) -> Result<Note> {
        validate_id(id, "note")?;
        self.data(
            self.request(Method::PATCH, &format!("/api/notes/{}/{}", id, action)),
            op,
        )
        .await
    }

    pub async fn update_color(&self, id: i64, color: &str) -> Result<Note> {
        validate_id(id, "note")?;
        let color = validate_color(color)?;
        self.json(
            Method::PATCH,
            &format!("/api/notes/{}/color", id),
            &UpdateColorRequest { color },
            "update_color",
        )
        .await
    }

    pub async fn restore_note(&self, id: i64) -> Result<Note> {
        validate_id(id, "note")?;
        self.data(
            self.request(Method::POST, &format!("/api/notes/{}/restore", id)),
            "restore_note",
        )
        .await
    }

    pub async fn copy_note(&self, id: i64) -> Result<Note> {
        validate_id(id, "note")?;
        self.data(
            self.request(Method::POST, &format!("/api/notes/{}/copy", id)),
            "copy_note",
        )
        .await
    }

    pub async fn permanent_delete(&self, id: i64) -> Result<()> {
        validate_id(id, "note")?;
        self.empty(
            Method::DELETE,
            &format!("/api/notes/{}/permanent", id),
            "permanent_delete",
        )
        .await
    }

    pub async fn empty_trash(&self) -> Result<EmptyTrashOutcome> {
        self.data(
            self.request(Method::DELETE, "/api/notes/trash/empty"),
            "empty_trash",
        )
        .await
    }

    /// Trash several notes at once.
    pub async fn bulk_delete(&self, note_ids: &[i64]) -> Result<BulkDeleteOutcome> {
        if note_ids.is_empty() {
            return Err(ClientError::Validation("No note IDs provided".to_string()));
        }
        let body = BulkDeleteRequest {
            note_ids: dedup_ids(note_ids),
        };
        self.json(Method::POST, "/api/notes/bulk-delete", &body, "bulk_delete")
            .await
    }

    pub async fn attach_label(&self, note_id: i64, label_id: i64) -> Result<Note> {
        validate_id(note_id, "note")?;
        validate_id(label_id, "label")?;
        self.data(
            self.request(
                Method::POST,
                &format!("/api/notes/{}/labels/{}", note_id, label_id),
            ),
            "attach_label",
        )
        .await
    }

    pub async fn detach_label(&self, note_id: i64, label_id: i64) -> Result<DetachOutcome> {
        validate_id(note_id, "note")?;
        validate_id(label_id, "label")?;
        self.data(
            self.request(
                Method::DELETE,
                &format!("/api/notes/{}/labels/{}", note_id, label_id),
            ),
            "detach_label",
        )
        .await
    }

    // =========================================================================
    // LABELS
    // =========================================================================

    pub async fn list_labels(&self) -> Result<Vec<Label>> {
        self.data(self.request(Method::GET, "/api/labels"), "list_labels")
            .await
    }

    pub async fn get_label(&self, id: i64) -> Result<Label> {
        validate_id(id, "label")?;
        self.data(self.request(Method::GET, &format!("/api/labels/{}", id)), "get_label")
            .await
    }

    pub async fn create_label(&self, name: &str) -> Result<Label> {
        let name = normalize_label_name(Some(name))?;
        self.json(
            Method::POST,
            "/api/labels",
            &CreateLabelRequest { name: Some(name) },
            "create_label",
        )
        .await
    }

    pub async fn update_label(&self, id: i64, name: &str) -> Result<Label> {
        validate_id(id, "label")?;
        let name = normalize_label_name(Some(name))?;
        self.json(
            Method::PUT,
            &format!("/api/labels/{}", id),
            &UpdateLabelRequest { name: Some(name) },
            "update_label",
        )
        .await
    }

    pub async fn delete_label(&self, id: i64) -> Result<()> {
        validate_id(id, "label")?;
        self.empty(Method::DELETE, &format!("/api/labels/{}", id), "delete_label")
            .await
    }

    /// Non-deleted notes carrying a label.
    pub async fn label_notes(&self, id: i64) -> Result<Vec<Note>> {
        validate_id(id, "label")?;
        self.data(
            self.request(Method::GET, &format!("/api/labels/{}/notes", id)),
            "label_notes",
        )
        .await
    }

    /// True when `/health` answers with a success status.
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .http
            .get(self.config.url("/health"))
            .timeout(Duration::from_secs(5))
            .send()
            .await;
        match response {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) => {
                warn!(subsystem = "client", error = %e, "Health check failed");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_user() {
        let err = NotekeepClient::new(ClientConfig::default(), 0).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_envelope_without_data() {
        let env: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"success":true,"message":"Trash emptied"}"#).unwrap();
        assert!(env.success);
        assert!(env.data.is_none());
        assert_eq!(env.message.as_deref(), Some("Trash emptied"));
    }
}

//! # notekeep-api
//!
//! HTTP API for notekeep: notes, labels and their associations, scoped to
//! the caller identified by a trusted gateway header.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod response;
pub mod services;

use std::sync::Arc;

use axum::http::{header, HeaderName, Method};
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use notekeep_core::{LabelRepository, NoteRepository};

pub use config::ApiConfig;
pub use error::ApiError;
pub use response::ApiResponse;

use handlers::{labels, notes, system};
use middleware::{rate_limit::build_limiter, rate_limit_middleware, GlobalRateLimiter};
use middleware::{request_span, MakeRequestUuidV7};
use services::{LabelService, NoteLabelService, NoteService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub notes: NoteService,
    pub note_labels: NoteLabelService,
    pub labels: LabelService,
    /// Header the caller id is read from.
    pub user_id_header: HeaderName,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    pub fn new(
        notes: Arc<dyn NoteRepository>,
        labels: Arc<dyn LabelRepository>,
        config: &ApiConfig,
    ) -> Self {
        Self {
            notes: NoteService::new(notes.clone(), labels.clone()),
            note_labels: NoteLabelService::new(notes, labels.clone()),
            labels: LabelService::new(labels),
            user_id_header: config.user_id_header.clone(),
            rate_limiter: config.rate_limit.and_then(build_limiter).map(Arc::new),
        }
    }
}

/// Build the full router with middleware.
pub fn router(state: AppState, config: &ApiConfig) -> Router {
    let user_id_header = config.user_id_header.clone();

    Router::new()
        .route("/health", get(system::health_check))
        .route("/openapi.json", get(system::openapi_json))
        // Notes
        .route("/api/notes", get(notes::list_notes).post(notes::create_note))
        .route("/api/notes/views", get(notes::note_views))
        .route("/api/notes/search", get(notes::search_notes))
        .route("/api/notes/archived", get(notes::list_archived))
        .route("/api/notes/trash", get(notes::list_trash))
        .route("/api/notes/trash/empty", axum::routing::delete(notes::empty_trash))
        .route("/api/notes/bulk-delete", post(notes::bulk_delete))
        .route(
            "/api/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/api/notes/:id/pin", patch(notes::toggle_pin))
        .route("/api/notes/:id/archive", patch(notes::toggle_archive))
        .route("/api/notes/:id/trash", patch(notes::toggle_trash))
        .route("/api/notes/:id/color", patch(notes::update_color))
        .route("/api/notes/:id/restore", post(notes::restore_note))
        .route("/api/notes/:id/copy", post(notes::copy_note))
        .route(
            "/api/notes/:id/permanent",
            axum::routing::delete(notes::permanent_delete),
        )
        .route(
            "/api/notes/:id/labels/:label_id",
            post(notes::attach_label).delete(notes::detach_label),
        )
        // Labels
        .route(
            "/api/labels",
            get(labels::list_labels).post(labels::create_label),
        )
        .route(
            "/api/labels/:id",
            get(labels::get_label)
                .put(labels::update_label)
                .delete(labels::delete_label),
        )
        .route("/api/labels/:id/notes", get(labels::label_notes))
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(request_span::<axum::body::Body>))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT, user_id_header])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .with_state(state)
}

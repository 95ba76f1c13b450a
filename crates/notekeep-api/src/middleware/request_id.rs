//! Request correlation ids and the per-request tracing span.

use axum::http::Request;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::field::Empty;
use tracing::Span;
use uuid::Uuid;

use notekeep_core::logging;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Span wrapping one request.
///
/// `request_id` is filled from the `x-request-id` header set upstream;
/// `owner_id` stays empty until the caller is identified (see [`record_owner`]).
pub fn request_span<B>(request: &Request<B>) -> Span {
    let span = tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = Empty,
        owner_id = Empty
    );
    if let Some(id) = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
    {
        span.record(logging::REQUEST_ID, id);
    }
    span
}

/// Attach the caller id to the current request span.
pub fn record_owner(owner_id: i64) {
    Span::current().record(logging::OWNER_ID, owner_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_request_span_declares_recorded_fields() {
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry());
        let request = Request::builder()
            .uri("/api/notes")
            .header("x-request-id", "0190b4a2-demo")
            .body(Body::empty())
            .expect("request");

        let span = request_span(&request);
        assert!(span.has_field(logging::REQUEST_ID));
        assert!(span.has_field(logging::OWNER_ID));

        let _entered = span.enter();
        record_owner(42);
    }
}

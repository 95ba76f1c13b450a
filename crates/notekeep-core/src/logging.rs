//! Structured logging conventions for notekeep.
//!
//! Event macros spell their field names literally (`tracing` only takes
//! identifiers there). Values recorded onto an open span go through
//! [`Span::record`](https://docs.rs/tracing/latest/tracing/struct.Span.html#method.record),
//! which takes the name at runtime; those names are the constants below.
//!
//! ## Event fields
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `subsystem` | "api", "notes", "labels", "database", "client" |
//! | `component` | part of the subsystem, e.g. "lifecycle", "associations", "pool" |
//! | `op` | operation name, e.g. "toggle_pin", "attach", "empty_trash" |
//! | `note_id`, `label_id` | entity operated on |
//! | `duration_ms`, `pool_size`, `pool_idle` | measurements |
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Rejected access, partial bulk failures, exhausted pool |
//! | INFO  | Lifecycle events (startup, shutdown), destructive operations |
//! | DEBUG | Mutations and their outcomes |
//! | TRACE | Per-item iteration |

/// Correlation ID propagated from the `x-request-id` header.
pub const REQUEST_ID: &str = "request_id";

/// Caller (owner) id, recorded once the identity header is accepted.
pub const OWNER_ID: &str = "owner_id";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_field_names_are_snake_case() {
        for field in [REQUEST_ID, OWNER_ID] {
            assert!(field
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'));
        }
        assert_ne!(REQUEST_ID, OWNER_ID);
    }
}

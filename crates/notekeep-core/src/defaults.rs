//! Centralized default constants for notekeep.
//!
//! Every crate references these instead of repeating magic values.

// =============================================================================
// NOTES
// =============================================================================

/// Color assigned to notes created without a (valid) color.
pub const NOTE_COLOR: &str = "#FFFFFF";

/// Suffix appended to the title of a copied note.
pub const COPY_TITLE_SUFFIX: &str = " (copy)";

// =============================================================================
// LABELS
// =============================================================================

/// Maximum label name length, in characters, after trimming.
pub const LABEL_NAME_MAX_LEN: usize = 50;

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const SERVER_PORT: u16 = 5000;

/// Header carrying the authenticated caller id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Default database URL when `DATABASE_URL` is unset.
pub const DATABASE_URL: &str = "postgres://localhost/notekeep";

/// Request body limit (notes are plain text).
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Requests allowed per rate-limit period.
pub const RATE_LIMIT_REQUESTS: u32 = 100;

/// Rate-limit period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

// =============================================================================
// CLIENT
// =============================================================================

/// Default API base URL for the client.
pub const CLIENT_API_URL: &str = "http://localhost:5000";

/// Default client request timeout in seconds.
pub const CLIENT_TIMEOUT_SECS: u64 = 30;

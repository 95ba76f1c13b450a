//! HTTP middleware.

pub mod rate_limit;
pub mod request_id;

pub use rate_limit::{rate_limit_middleware, GlobalRateLimiter};
pub use request_id::{record_owner, request_span, MakeRequestUuidV7};

//! Global rate limiting.

use std::num::NonZeroU32;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use governor::{Quota, RateLimiter};

use crate::config::RateLimitConfig;
use crate::{ApiError, AppState};

/// Global rate limiter type (direct quota, no keyed bucketing).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Build a limiter allowing `requests` per `period`, or `None` when the quota is empty.
pub fn build_limiter(config: RateLimitConfig) -> Option<GlobalRateLimiter> {
    let burst = NonZeroU32::new(config.requests)?;
    let quota = Quota::with_period(config.period / burst.get())?.allow_burst(burst);
    Some(RateLimiter::direct(quota))
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!(
                subsystem = "api",
                component = "rate_limit",
                path = %request.uri().path(),
                "Rate limit exceeded"
            );
            return Err(ApiError::TooManyRequests);
        }
    }
    Ok(next.run(request).await)
}

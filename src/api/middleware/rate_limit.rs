//! Rate limiting for the submission endpoint.
//!
//! Uses the governor crate. One limiter is shared per application state and
//! checked at the top of the submit handler, so reads of submissions are
//! never throttled.

use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Submissions allowed per minute, matching the public submission quota.
pub const SUBMISSIONS_PER_MINUTE: u32 = 30;

/// Rate limiter state
pub type SharedRateLimiter = Arc<
    RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
>;

/// Create a rate limiter with the given per-minute quota
pub fn create_rate_limiter(requests_per_minute: u32) -> SharedRateLimiter {
    let quota = Quota::per_minute(
        NonZeroU32::new(requests_per_minute)
            .unwrap_or_else(|| NonZeroU32::new(SUBMISSIONS_PER_MINUTE).expect("nonzero quota")),
    );
    Arc::new(RateLimiter::direct(quota))
}

/// Check the limiter, returning whether this request may proceed.
pub fn check_rate_limit(limiter: &SharedRateLimiter) -> bool {
    limiter.check().is_ok()
}

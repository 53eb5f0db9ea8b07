//! Fixed-window rate limiting for the protected routes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Extension, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

/// Low 32 bits of the packed state hold the count, high 32 bits the window.
const COUNT_BITS: u32 = 32;
const COUNT_MASK: u64 = (1 << COUNT_BITS) - 1;

/// Allows `max_per_sec` requests in each one-second window.
///
/// Windows are counted from the limiter's creation, not wall-clock seconds,
/// so clock adjustments cannot reset the budget. A rollover and the first
/// acquire in the new window are one atomic update.
#[derive(Clone)]
pub struct RateLimiter {
    max_per_sec: u64,
    origin: Instant,
    state: Arc<AtomicU64>,
}

impl RateLimiter {
    pub fn new(max_per_sec: u64) -> Self {
        Self {
            max_per_sec: max_per_sec.min(COUNT_MASK),
            origin: Instant::now(),
            state: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Take one permit from the current window.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_in(self.origin.elapsed().as_secs())
    }

    fn try_acquire_in(&self, now: u64) -> bool {
        let now = now.min(u64::from(u32::MAX));
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |packed| {
                let window = packed >> COUNT_BITS;
                let used = packed & COUNT_MASK;
                // A late caller from an older window spends from the newer one.
                let (window, used) = if now > window { (now, 0) } else { (window, used) };
                (used < self.max_per_sec).then(|| (window << COUNT_BITS) | (used + 1))
            })
            .is_ok()
    }
}

pub async fn rate_limit_middleware(
    Extension(limiter): Extension<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    if limiter.try_acquire() {
        next.run(req).await
    } else {
        tracing::debug!("Rate limit exceeded");
        ApiError::TooManyRequests.into_response()
    }
}

//! Client-side cap on in-flight provider requests.
//!
//! Requests over the cap are rejected immediately with `RateLimited`; nothing
//! waits in-process for a slot.

use skillforge_core::GenerationError;
use tokio::sync::{Semaphore, SemaphorePermit, TryAcquireError};

/// Suggested back-off returned when the local cap is full.
const LOCAL_RETRY_AFTER_MS: u64 = 1000;

/// Caps concurrent requests to one provider.
pub(crate) struct RequestThrottle {
    permits: Semaphore,
}

impl RequestThrottle {
    /// Throttle allowing at most `max_in_flight` concurrent requests (minimum 1).
    pub(crate) fn new(max_in_flight: u32) -> Self {
        Self {
            permits: Semaphore::new(max_in_flight.max(1) as usize),
        }
    }

    /// Take a slot without waiting. Hold the permit for the whole request.
    pub(crate) fn try_acquire(
        &self,
        provider: &str,
    ) -> Result<SemaphorePermit<'_>, GenerationError> {
        self.permits.try_acquire().map_err(|e| match e {
            TryAcquireError::NoPermits => GenerationError::RateLimited {
                provider: provider.to_string(),
                retry_after_ms: LOCAL_RETRY_AFTER_MS,
            },
            TryAcquireError::Closed => GenerationError::InvalidResponse {
                provider: provider.to_string(),
                reason: "Request limiter closed".to_string(),
            },
        })
    }
}

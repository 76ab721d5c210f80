use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Fiken allows at most four requests per second per token.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(250);

/// Minimum-interval gate shared by every request a client dispatches.
///
/// The lock is held across the sleep, so each caller reserves its own slot
/// after the previous holder has recorded its dispatch time. Two waiters can
/// never both compute a remainder from the same stale timestamp.
#[derive(Debug)]
pub struct RateLimiter {
    min_delay: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_dispatch: Mutex::new(None),
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Wait until a request may be dispatched, then record the dispatch time.
    ///
    /// Returns how long the caller was held back by the interval.
    pub async fn acquire(&self) -> Duration {
        let mut last_dispatch = self.last_dispatch.lock().await;

        let mut waited = Duration::ZERO;
        if let Some(last) = *last_dispatch {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                waited = self.min_delay - elapsed;
                tokio::time::sleep(waited).await;
            }
        }

        *last_dispatch = Some(Instant::now());
        waited
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY)
    }
}

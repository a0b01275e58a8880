//! Sleep abstraction for pacing and the inter-cycle wait - mockable for tests

use std::time::Duration;

use async_trait::async_trait;

/// Suspends the caller for a fixed duration
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Mock sleeper for testing
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    use tokio_util::sync::CancellationToken;

    /// Returns immediately and records every requested duration
    ///
    /// Optionally cancels a token once a given number of sleeps of at least
    /// `threshold` have been requested, which lets tests stop a runner loop.
    #[derive(Debug, Default)]
    pub struct RecordingSleeper {
        pub sleeps: Mutex<Vec<Duration>>,
        stop: Option<(CancellationToken, Duration, usize)>,
    }

    impl RecordingSleeper {
        pub fn new() -> Self {
            Self::default()
        }

        /// Cancel `token` on the `count`-th sleep lasting at least `threshold`
        pub fn cancel_after(token: CancellationToken, threshold: Duration, count: usize) -> Self {
            Self {
                sleeps: Mutex::new(Vec::new()),
                stop: Some((token, threshold, count)),
            }
        }

        pub fn recorded(&self) -> Vec<Duration> {
            self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
        }

        /// Number of recorded sleeps lasting at least `threshold`
        pub fn count_at_least(&self, threshold: Duration) -> usize {
            self.recorded().iter().filter(|d| **d >= threshold).count()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            if let Ok(mut sleeps) = self.sleeps.lock() {
                sleeps.push(duration);
            }
            if let Some((token, threshold, count)) = &self.stop {
                if duration >= *threshold && self.count_at_least(*threshold) >= *count {
                    token.cancel();
                }
            }
        }
    }
}

//! Time source for the poller
//!
//! The poller never calls `Instant::now()` or sleeps directly; it goes through
//! a [`Clock`] so tests can drive it without real time passing.

use std::future::Future;
use std::time::{Duration, Instant};

/// Monotonic time plus a cooperative delay
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;

    /// Suspend for `duration`
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Real clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-support"))]
mod manual {
    use super::Clock;
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::{Duration, Instant};

    /// Virtual clock: `sleep` returns immediately and advances time instead.
    ///
    /// Clones share the same timeline, so a mock provider holding a clone can
    /// simulate slow responses with [`ManualClock::advance`].
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        origin: Instant,
        state: Arc<Mutex<ManualState>>,
    }

    #[derive(Debug, Default)]
    struct ManualState {
        elapsed: Duration,
        sleeps: Vec<Duration>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                state: Arc::new(Mutex::new(ManualState::default())),
            }
        }

        /// Move virtual time forward without recording a sleep
        pub fn advance(&self, duration: Duration) {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.elapsed += duration;
        }

        /// Total virtual time since creation
        pub fn elapsed(&self) -> Duration {
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .elapsed
        }

        /// Every delay requested through [`Clock::sleep`], in order
        pub fn sleeps(&self) -> Vec<Duration> {
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .sleeps
                .clone()
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.origin + self.elapsed()
        }

        async fn sleep(&self, duration: Duration) {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.elapsed += duration;
            state.sleeps.push(duration);
        }
    }
}

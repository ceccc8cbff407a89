//! Status poller: the state machine that waits for a test run to finish
//!
//! Each iteration runs these steps in order:
//!
//! 1. If more than the time limit has elapsed since polling began, stop with
//!    [`PollOutcome::TimedOut`]. The check happens before the request, so a
//!    slow response is never cut off; the following iteration times out.
//! 2. Fetch the status report and log it.
//! 3. Any call completed with result `failure` → [`PollOutcome::Failed`],
//!    whatever the overall status says.
//! 4. Overall status `completed` → [`PollOutcome::Passed`].
//! 5. Otherwise sleep for the poll interval and go again.
//!
//! Reports are evaluated on their own; nothing is carried between polls, so
//! repeated identical responses cannot change the outcome.

use crate::clock::Clock;
use crate::config::RunConfig;
use crate::provider::{ProviderError, TestProvider};
use crate::types::{Call, TestStatusReport};
use std::time::Duration;
use tracing::{debug, info};

/// Poller state after evaluating one report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Running,
    Passed,
    Failed,
    TimedOut,
}

/// How polling ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Overall status reached `completed` with no failing call
    Passed { polls: u32 },
    /// At least one call completed with a failure
    Failed { failed_calls: Vec<String>, polls: u32 },
    /// Time limit exceeded before a verdict
    TimedOut { elapsed: Duration, polls: u32 },
}

impl PollOutcome {
    pub fn state(&self) -> PollState {
        match self {
            Self::Passed { .. } => PollState::Passed,
            Self::Failed { .. } => PollState::Failed,
            Self::TimedOut { .. } => PollState::TimedOut,
        }
    }

    /// Number of status requests issued
    pub fn polls(&self) -> u32 {
        match self {
            Self::Passed { polls } | Self::Failed { polls, .. } | Self::TimedOut { polls, .. } => {
                *polls
            }
        }
    }
}

/// Decide the next state from a single report.
///
/// A failing call wins over an overall `completed` status. With zero calls the
/// verdict rests on the overall status alone.
pub fn evaluate(report: &TestStatusReport) -> PollState {
    if report.calls().iter().any(Call::is_failed) {
        PollState::Failed
    } else if report.is_completed() {
        PollState::Passed
    } else {
        PollState::Running
    }
}

/// Polls one test run until it reaches a terminal state
#[derive(Debug)]
pub struct Poller<'a, P, C> {
    provider: &'a P,
    clock: &'a C,
    time_limit: Duration,
    interval: Duration,
}

impl<'a, P: TestProvider, C: Clock> Poller<'a, P, C> {
    pub fn new(provider: &'a P, clock: &'a C, time_limit: Duration, interval: Duration) -> Self {
        Self {
            provider,
            clock,
            time_limit,
            interval,
        }
    }

    /// Poller using the time limit and interval from `config`
    pub fn from_config(provider: &'a P, clock: &'a C, config: &RunConfig) -> Self {
        Self::new(provider, clock, config.time_limit(), config.poll_interval)
    }

    /// Run the state machine for `test_id`.
    ///
    /// # Errors
    ///
    /// Returns the provider error of the first status request that fails.
    /// Such errors end polling immediately; they are not retried.
    pub async fn poll(&self, test_id: &str) -> Result<PollOutcome, ProviderError> {
        let started = self.clock.now();
        let mut polls: u32 = 0;

        loop {
            let elapsed = self.clock.now().saturating_duration_since(started);
            if elapsed > self.time_limit {
                debug!("Time limit {:?} exceeded after {:?}", self.time_limit, elapsed);
                return Ok(PollOutcome::TimedOut { elapsed, polls });
            }

            let report = self.provider.get_status(test_id).await?;
            polls += 1;
            log_report(&report);

            match evaluate(&report) {
                PollState::Failed => {
                    return Ok(PollOutcome::Failed {
                        failed_calls: report.failed_call_ids(),
                        polls,
                    });
                }
                PollState::Passed => return Ok(PollOutcome::Passed { polls }),
                PollState::Running | PollState::TimedOut => {
                    debug!("Poll #{polls} not terminal, waiting {:?}", self.interval);
                    self.clock.sleep(self.interval).await;
                }
            }
        }
    }
}

fn log_report(report: &TestStatusReport) {
    info!("current test status: {}", report.status);
    if let Some(calls) = &report.calls {
        for call in calls {
            info!("- {call}");
        }
    }
}

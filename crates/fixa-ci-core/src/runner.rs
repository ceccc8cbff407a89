//! One complete run: launch, poll, report

use crate::clock::Clock;
use crate::config::RunConfig;
use crate::launcher::launch;
use crate::outcome::Outcome;
use crate::poller::{PollOutcome, Poller};
use crate::provider::TestProvider;
use tracing::{debug, error, info};

/// Launch a test run and poll it to a terminal state.
///
/// Never panics and never exits the process; every terminal condition,
/// including transport failures, comes back as an [`Outcome`].
pub async fn run_test<P: TestProvider, C: Clock>(
    config: &RunConfig,
    provider: &P,
    clock: &C,
) -> Outcome {
    let launched = match launch(provider, config).await {
        Ok(launched) => launched,
        Err(error) => {
            let outcome = Outcome::TransportError {
                test_id: None,
                error,
            };
            report(&outcome, config);
            return outcome;
        }
    };

    let poller = Poller::from_config(provider, clock, config);
    let test_id = launched.test_id;
    let polled = poller.poll(&test_id).await;
    if let Ok(finished) = &polled {
        debug!(
            "Polling ended {:?} after {} status requests",
            finished.state(),
            finished.polls()
        );
    }

    let outcome = match polled {
        Ok(PollOutcome::Passed { .. }) => Outcome::Passed { test_id },
        Ok(PollOutcome::Failed { failed_calls, .. }) => {
            debug!("Failed calls: {failed_calls:?}");
            Outcome::Failed {
                test_id,
                failed_calls,
            }
        }
        Ok(PollOutcome::TimedOut { elapsed, .. }) => {
            debug!("Elapsed {elapsed:?} before a verdict");
            Outcome::TimedOut {
                test_id,
                time_limit_minutes: config.time_limit_minutes,
            }
        }
        Err(error) => Outcome::TransportError {
            test_id: Some(test_id),
            error,
        },
    };

    report(&outcome, config);
    outcome
}

/// Log the terminal line, then the dashboard link when there is a run to view
fn report(outcome: &Outcome, config: &RunConfig) {
    if outcome.is_success() {
        info!("{outcome}");
    } else {
        error!("{outcome}");
    }
    if let Some(test_id) = outcome.test_id() {
        info!("view test at: {}", config.dashboard_url(test_id));
    }
}

//! Terminal result of a run and its process exit code

use crate::config::ConfigError;
use crate::provider::ProviderError;
use std::fmt;

/// Exit code for a passing run
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for every other terminal state
pub const EXIT_FAILURE: i32 = 1;

/// How a run ended. Components return this upward; only the binary turns it
/// into a process exit.
#[derive(Debug)]
pub enum Outcome {
    /// Overall status completed with no failing call
    Passed { test_id: String },
    /// One or more calls completed with result `failure`
    Failed {
        test_id: String,
        failed_calls: Vec<String>,
    },
    /// The time limit ran out first
    TimedOut {
        test_id: String,
        time_limit_minutes: u64,
    },
    /// Configuration was missing or invalid; no request was sent
    ConfigError(ConfigError),
    /// Launch or a status request failed. `test_id` is set when launch succeeded.
    TransportError {
        test_id: Option<String>,
        error: ProviderError,
    },
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Passed { .. } => EXIT_SUCCESS,
            Self::Failed { .. }
            | Self::TimedOut { .. }
            | Self::ConfigError(_)
            | Self::TransportError { .. } => EXIT_FAILURE,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }

    /// Id of the launched run, if launch got that far
    pub fn test_id(&self) -> Option<&str> {
        match self {
            Self::Passed { test_id }
            | Self::Failed { test_id, .. }
            | Self::TimedOut { test_id, .. } => Some(test_id),
            Self::TransportError { test_id, .. } => test_id.as_deref(),
            Self::ConfigError(_) => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed { .. } => write!(f, "test passed!"),
            Self::Failed { .. } => write!(f, "some tests failed!"),
            Self::TimedOut {
                time_limit_minutes, ..
            } => write!(f, "test timed out after {time_limit_minutes} minutes"),
            Self::ConfigError(e) => write!(f, "error running test: {e}"),
            Self::TransportError { error, .. } => write!(f, "error running test: {error}"),
        }
    }
}

impl From<ConfigError> for Outcome {
    fn from(e: ConfigError) -> Self {
        Self::ConfigError(e)
    }
}

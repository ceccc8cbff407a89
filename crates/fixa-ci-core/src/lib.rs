//! Core library for fixa-ci
//!
//! Starts an agent test run on the fixa testing service, then polls the run
//! until it passes, fails, or exceeds its time limit. Every terminal condition
//! is reported as an [`Outcome`]; only the binary turns that into a process
//! exit code.
//!
//! The pieces compose in one direction:
//!
//! - [`config`] resolves an immutable [`RunConfig`] from defaults, an optional
//!   TOML file, environment variables and CLI overrides.
//! - [`launcher`] submits the creation request through a [`TestProvider`].
//! - [`poller`] drives the status state machine with an injectable [`Clock`].
//! - [`runner`] glues both together and produces the [`Outcome`].

pub mod clock;
pub mod config;
pub mod http;
pub mod launcher;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod mock_provider;
pub mod outcome;
pub mod poller;
pub mod provider;
pub mod runner;
pub mod types;

pub use clock::{Clock, TokioClock};
pub use config::{ConfigError, ConfigOverrides, RunConfig};
pub use http::FixaApiProvider;
pub use outcome::Outcome;
pub use provider::{ProviderError, TestProvider};
pub use runner::run_test;
pub use types::{Call, CallResult, CallStatus, CreateTestRequest, TestStatus, TestStatusReport};

#[cfg(any(test, feature = "test-support"))]
pub use clock::ManualClock;
#[cfg(any(test, feature = "test-support"))]
pub use mock_provider::{MockCall, MockTestProvider};

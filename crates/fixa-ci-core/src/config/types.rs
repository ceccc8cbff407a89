//! Configuration types

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Public web origin used for dashboard links
pub const DEFAULT_BASE_URL: &str = "https://www.fixa.dev";

/// REST API root
pub const DEFAULT_API_BASE_URL: &str = "https://www.fixa.dev/api/v1";

/// Poll timeout applied when no time limit is configured
pub const DEFAULT_TIME_LIMIT_MINUTES: u64 = 10;

/// Fixed delay between two status polls
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Upper bound for a single HTTP request
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fully resolved, validated configuration for one test run.
///
/// Built once by [`super::resolve_config`] and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Bearer credential presented on every request
    pub api_key: String,
    /// Agent under test
    pub agent_id: String,
    /// Restrict the run to these scenarios (None = all)
    pub scenario_ids: Option<Vec<String>>,
    /// Restrict the run to these test agents (None = all)
    pub test_agent_ids: Option<Vec<String>>,
    /// Poll timeout in minutes, always positive
    pub time_limit_minutes: u64,
    /// Web origin for dashboard links, without trailing slash
    pub base_url: String,
    /// API root, without trailing slash
    pub api_base_url: String,
    /// Delay between polls
    pub poll_interval: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl RunConfig {
    /// Time limit as a duration
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_minutes.saturating_mul(60))
    }

    /// Dashboard link for a test run: `<base-url>/dashboard/<agent-id>/tests/<test-id>`
    pub fn dashboard_url(&self, test_id: &str) -> String {
        format!(
            "{}/dashboard/{}/tests/{}",
            self.base_url, self.agent_id, test_id
        )
    }
}

// Hand-written so the credential never reaches a log line.
impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("api_key", &"<redacted>")
            .field("agent_id", &self.agent_id)
            .field("scenario_ids", &self.scenario_ids)
            .field("test_agent_ids", &self.test_agent_ids)
            .field("time_limit_minutes", &self.time_limit_minutes)
            .field("base_url", &self.base_url)
            .field("api_base_url", &self.api_base_url)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Identifier list as written in a config file: either a TOML array or a
/// comma-separated string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdList {
    /// `scenario_ids = ["a", "b"]`
    List(Vec<String>),
    /// `scenario_ids = "a, b"`
    Csv(String),
}

impl IdList {
    /// Flatten into raw comma-separated form; entries are trimmed at validation
    pub fn into_raw(self) -> String {
        match self {
            Self::List(items) => items.join(","),
            Self::Csv(raw) => raw,
        }
    }
}

/// On-disk configuration file (`fixa.toml`)
///
/// Every key is optional; values here are overridden by environment variables
/// and command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    pub agent_id: Option<String>,
    pub scenario_ids: Option<IdList>,
    pub test_agent_ids: Option<IdList>,
    pub time_limit: Option<i64>,
    pub base_url: Option<String>,
    pub api_base_url: Option<String>,
    pub poll_interval_secs: Option<i64>,
    pub request_timeout_secs: Option<i64>,
}

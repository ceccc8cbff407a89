//! Configuration resolution for a single test run
//!
//! A run is configured once at process entry. The resolved [`RunConfig`] is
//! immutable and is passed explicitly to the launcher and the poller.

mod discovery;
mod types;

pub use discovery::{
    ConfigError, ConfigOverrides, ENV_AGENT_ID, ENV_API_BASE_URL, ENV_API_KEY, ENV_BASE_URL,
    ENV_CONFIG, ENV_POLL_INTERVAL_SECS, ENV_REQUEST_TIMEOUT_SECS, ENV_SCENARIO_IDS,
    ENV_TEST_AGENT_IDS, ENV_TIME_LIMIT, parse_id_list, resolve_config, resolve_config_from_env,
};
pub use types::{
    ConfigFile, DEFAULT_API_BASE_URL, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TIME_LIMIT_MINUTES, IdList, RunConfig,
};

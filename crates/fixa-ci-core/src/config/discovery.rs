//! Configuration discovery and resolution

use super::types::{
    ConfigFile, DEFAULT_API_BASE_URL, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TIME_LIMIT_MINUTES, IdList, RunConfig,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Bearer credential
pub const ENV_API_KEY: &str = "FIXA_API_KEY";
/// Agent under test
pub const ENV_AGENT_ID: &str = "AGENT_ID";
/// Comma-separated scenario ids
pub const ENV_SCENARIO_IDS: &str = "SCENARIO_IDS";
/// Comma-separated test agent ids
pub const ENV_TEST_AGENT_IDS: &str = "TEST_AGENT_IDS";
/// Poll timeout in minutes
pub const ENV_TIME_LIMIT: &str = "TIME_LIMIT";
/// Dashboard origin override
pub const ENV_BASE_URL: &str = "FIXA_BASE_URL";
/// API root override
pub const ENV_API_BASE_URL: &str = "FIXA_API_BASE_URL";
/// Delay between polls, seconds
pub const ENV_POLL_INTERVAL_SECS: &str = "FIXA_POLL_INTERVAL_SECS";
/// Per-request timeout, seconds
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "FIXA_REQUEST_TIMEOUT_SECS";
/// Path to an optional TOML config file
pub const ENV_CONFIG: &str = "FIXA_CONFIG";

/// Configuration error
///
/// Always detected before any network call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required value is absent or blank
    #[error("missing required configuration: {name}")]
    Missing { name: &'static str },

    /// Time limit is zero, negative or not a number
    #[error("TIME_LIMIT must be a positive number (got '{value}')")]
    InvalidTimeLimit { value: String },

    /// A numeric setting is not a positive integer
    #[error("{name} must be a positive integer (got '{value}')")]
    InvalidNumber { name: &'static str, value: String },

    /// A base URL does not parse as an http(s) URL
    #[error("{name} is not a valid http(s) URL: '{value}'")]
    InvalidUrl { name: &'static str, value: String },

    /// Config file could not be read
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`ConfigFile`]
    #[error("failed to parse config file {}: {source}", .path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Command-line overrides for configuration
///
/// Values are kept as raw strings so that validation (and its error messages)
/// is identical regardless of which layer supplied them.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub agent_id: Option<String>,
    pub scenario_ids: Option<String>,
    pub test_agent_ids: Option<String>,
    pub time_limit: Option<String>,
    pub base_url: Option<String>,
    pub api_base_url: Option<String>,
    pub poll_interval_secs: Option<String>,
    /// Path to config file override
    pub config_path: Option<PathBuf>,
}

/// Unvalidated values collected from one configuration layer
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct RawConfig {
    api_key: Option<String>,
    agent_id: Option<String>,
    scenario_ids: Option<String>,
    test_agent_ids: Option<String>,
    time_limit: Option<String>,
    base_url: Option<String>,
    api_base_url: Option<String>,
    poll_interval_secs: Option<String>,
    request_timeout_secs: Option<String>,
}

impl RawConfig {
    fn from_env<F>(env: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| non_blank(env(name));
        Self {
            api_key: get(ENV_API_KEY),
            agent_id: get(ENV_AGENT_ID),
            scenario_ids: non_empty(env(ENV_SCENARIO_IDS)),
            test_agent_ids: non_empty(env(ENV_TEST_AGENT_IDS)),
            time_limit: get(ENV_TIME_LIMIT),
            base_url: get(ENV_BASE_URL),
            api_base_url: get(ENV_API_BASE_URL),
            poll_interval_secs: get(ENV_POLL_INTERVAL_SECS),
            request_timeout_secs: get(ENV_REQUEST_TIMEOUT_SECS),
        }
    }

    fn from_overrides(overrides: &ConfigOverrides) -> Self {
        Self {
            api_key: non_blank(overrides.api_key.clone()),
            agent_id: non_blank(overrides.agent_id.clone()),
            scenario_ids: non_empty(overrides.scenario_ids.clone()),
            test_agent_ids: non_empty(overrides.test_agent_ids.clone()),
            time_limit: non_blank(overrides.time_limit.clone()),
            base_url: non_blank(overrides.base_url.clone()),
            api_base_url: non_blank(overrides.api_base_url.clone()),
            poll_interval_secs: non_blank(overrides.poll_interval_secs.clone()),
            request_timeout_secs: None,
        }
    }

    fn from_file(file: ConfigFile) -> Self {
        Self {
            api_key: non_blank(file.api_key),
            agent_id: non_blank(file.agent_id),
            scenario_ids: non_empty(file.scenario_ids.map(IdList::into_raw)),
            test_agent_ids: non_empty(file.test_agent_ids.map(IdList::into_raw)),
            time_limit: file.time_limit.map(|v| v.to_string()),
            base_url: non_blank(file.base_url),
            api_base_url: non_blank(file.api_base_url),
            poll_interval_secs: file.poll_interval_secs.map(|v| v.to_string()),
            request_timeout_secs: file.request_timeout_secs.map(|v| v.to_string()),
        }
    }

    /// Later layers win field by field
    fn overlay(&mut self, upper: RawConfig) {
        fn take(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }
        take(&mut self.api_key, upper.api_key);
        take(&mut self.agent_id, upper.agent_id);
        take(&mut self.scenario_ids, upper.scenario_ids);
        take(&mut self.test_agent_ids, upper.test_agent_ids);
        take(&mut self.time_limit, upper.time_limit);
        take(&mut self.base_url, upper.base_url);
        take(&mut self.api_base_url, upper.api_base_url);
        take(&mut self.poll_interval_secs, upper.poll_interval_secs);
        take(&mut self.request_timeout_secs, upper.request_timeout_secs);
    }

    fn validate(self) -> Result<RunConfig, ConfigError> {
        let api_key = self.api_key.ok_or(ConfigError::Missing { name: ENV_API_KEY })?;
        let agent_id = self.agent_id.ok_or(ConfigError::Missing { name: ENV_AGENT_ID })?;

        let time_limit_minutes = match self.time_limit.as_deref() {
            None => DEFAULT_TIME_LIMIT_MINUTES,
            Some(raw) => parse_time_limit(raw)?,
        };

        let poll_interval_secs = parse_positive(
            ENV_POLL_INTERVAL_SECS,
            self.poll_interval_secs.as_deref(),
            DEFAULT_POLL_INTERVAL_SECS,
        )?;
        let request_timeout_secs = parse_positive(
            ENV_REQUEST_TIMEOUT_SECS,
            self.request_timeout_secs.as_deref(),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        let base_url = normalize_url(
            ENV_BASE_URL,
            self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
        )?;
        let api_base_url = normalize_url(
            ENV_API_BASE_URL,
            self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL),
        )?;

        Ok(RunConfig {
            api_key,
            agent_id,
            scenario_ids: self.scenario_ids.as_deref().map(parse_id_list),
            test_agent_ids: self.test_agent_ids.as_deref().map(parse_id_list),
            time_limit_minutes,
            base_url,
            api_base_url,
            poll_interval: Duration::from_secs(poll_interval_secs),
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

/// Resolve configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Command-line overrides
/// 2. Environment variables (read through `env`)
/// 3. Config file (`overrides.config_path`, else `FIXA_CONFIG`)
/// 4. Defaults
///
/// Blank values at any layer count as unset.
///
/// # Errors
///
/// Returns a [`ConfigError`] when a required value is missing, a number or URL
/// is invalid, or the config file cannot be read or parsed.
pub fn resolve_config<F>(overrides: &ConfigOverrides, env: F) -> Result<RunConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut raw = RawConfig::default();

    let config_path = overrides
        .config_path
        .clone()
        .or_else(|| non_blank(env(ENV_CONFIG)).map(PathBuf::from));
    if let Some(path) = config_path {
        let file = load_config_file(&path)?;
        debug!("Loaded config from: {}", path.display());
        raw.overlay(RawConfig::from_file(file));
    }

    raw.overlay(RawConfig::from_env(&env));
    raw.overlay(RawConfig::from_overrides(overrides));

    raw.validate()
}

/// [`resolve_config`] against the process environment
pub fn resolve_config_from_env(overrides: &ConfigOverrides) -> Result<RunConfig, ConfigError> {
    resolve_config(overrides, |name| std::env::var(name).ok())
}

/// Split a comma-separated id list and trim each entry.
///
/// Entries are otherwise forwarded as given: `"a,,b"` yields `["a", "", "b"]`.
/// Omitting the field is decided by the caller, only when no value was set.
pub fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|id| id.trim().to_string()).collect()
}

/// Load config from a TOML file
fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Id lists only count as unset when empty; whitespace is a supplied value
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_time_limit(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(ConfigError::InvalidTimeLimit {
            value: raw.to_string(),
        }),
    }
}

fn parse_positive(name: &'static str, raw: Option<&str>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: raw.to_string(),
        }),
    }
}

fn normalize_url(name: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = || ConfigError::InvalidUrl {
        name,
        value: raw.to_string(),
    };
    let parsed = url::Url::parse(trimmed).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(trimmed.to_string())
}

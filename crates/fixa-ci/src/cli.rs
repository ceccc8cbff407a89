//! Command-line arguments and top-level execution

use anyhow::{Context, Result};
use clap::Parser;
use fixa_ci_core::config::resolve_config_from_env;
use fixa_ci_core::{ConfigOverrides, FixaApiProvider, Outcome, TokioClock, logging, run_test};
use std::path::PathBuf;
use tracing::{debug, error};

/// fixa-ci - Run a fixa agent test from CI
///
/// Every option falls back to its environment variable, then to the config
/// file, then to a built-in default.
#[derive(Parser, Debug)]
#[command(
    name = "fixa-ci",
    version,
    about = "Start a fixa agent test run and wait for the result",
    long_about = "Starts an agent test run on the fixa testing service, polls it until it \
                  passes, fails or times out, and exits 0 only when it passed"
)]
pub struct Cli {
    /// API key for the fixa service [env: FIXA_API_KEY]
    #[arg(long)]
    api_key: Option<String>,

    /// Agent under test [env: AGENT_ID]
    #[arg(long)]
    agent_id: Option<String>,

    /// Comma-separated scenario ids to run [env: SCENARIO_IDS]
    #[arg(long)]
    scenario_ids: Option<String>,

    /// Comma-separated test agent ids to use [env: TEST_AGENT_IDS]
    #[arg(long)]
    test_agent_ids: Option<String>,

    /// Minutes to wait before giving up [env: TIME_LIMIT, default: 10]
    #[arg(long)]
    time_limit: Option<String>,

    /// Dashboard root used for "view test at" links [env: FIXA_BASE_URL]
    #[arg(long)]
    base_url: Option<String>,

    /// API root [env: FIXA_API_BASE_URL]
    #[arg(long)]
    api_base_url: Option<String>,

    /// Seconds between status polls [env: FIXA_POLL_INTERVAL_SECS, default: 5]
    #[arg(long)]
    poll_interval_secs: Option<String>,

    /// TOML config file [env: FIXA_CONFIG]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level (overrides FIXA_LOG)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_key: self.api_key.clone(),
            agent_id: self.agent_id.clone(),
            scenario_ids: self.scenario_ids.clone(),
            test_agent_ids: self.test_agent_ids.clone(),
            time_limit: self.time_limit.clone(),
            base_url: self.base_url.clone(),
            api_base_url: self.api_base_url.clone(),
            poll_interval_secs: self.poll_interval_secs.clone(),
            config_path: self.config.clone(),
        }
    }

    /// Resolve configuration and run the test to a terminal outcome.
    ///
    /// Configuration problems are reported as [`Outcome::ConfigError`] before
    /// any request is made. `Err` is reserved for failing to start the runtime.
    pub fn execute(self) -> Result<Outcome> {
        logging::init(self.verbose);

        let config = match resolve_config_from_env(&self.overrides()) {
            Ok(config) => config,
            Err(e) => {
                let outcome = Outcome::from(e);
                error!("{outcome}");
                return Ok(outcome);
            }
        };
        debug!("Resolved configuration: {config:?}");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;

        let outcome = runtime.block_on(async {
            match FixaApiProvider::new(&config) {
                Ok(provider) => run_test(&config, &provider, &TokioClock).await,
                Err(error) => {
                    let outcome = Outcome::TransportError {
                        test_id: None,
                        error,
                    };
                    error!("{outcome}");
                    outcome
                }
            }
        });
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "fixa-ci",
            "--api-key",
            "k",
            "--agent-id",
            "a",
            "--scenario-ids",
            "s1,s2",
            "--time-limit",
            "3",
            "--config",
            "/tmp/fixa.toml",
        ])
        .unwrap();

        let overrides = cli.overrides();

        assert_eq!(overrides.api_key.as_deref(), Some("k"));
        assert_eq!(overrides.agent_id.as_deref(), Some("a"));
        assert_eq!(overrides.scenario_ids.as_deref(), Some("s1,s2"));
        assert_eq!(overrides.time_limit.as_deref(), Some("3"));
        assert_eq!(overrides.test_agent_ids, None);
        assert_eq!(overrides.config_path, Some(PathBuf::from("/tmp/fixa.toml")));
    }

    #[test]
    fn test_no_flags_is_valid() {
        let cli = Cli::try_parse_from(["fixa-ci"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.overrides().api_key.is_none());
    }

    #[test]
    fn test_time_limit_is_not_validated_by_clap() {
        // Validation happens during config resolution so the error text is
        // the same for flag and env values.
        let cli = Cli::try_parse_from(["fixa-ci", "--time-limit", "abc"]).unwrap();
        assert_eq!(cli.overrides().time_limit.as_deref(), Some("abc"));
    }
}

//! Test launcher: submits the creation request and hands back the test id

use crate::config::RunConfig;
use crate::provider::{ProviderError, TestProvider};
use crate::types::CreateTestRequest;
use tracing::{debug, info};

/// A test run the service has accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchedTest {
    /// Opaque id assigned by the service
    pub test_id: String,
    /// Where a human can follow the run
    pub dashboard_url: String,
}

/// Start one test run for `config.agent_id`.
///
/// Issues exactly one creation request; any failure is returned as-is and is
/// never retried.
pub async fn launch<P: TestProvider>(
    provider: &P,
    config: &RunConfig,
) -> Result<LaunchedTest, ProviderError> {
    let request = CreateTestRequest::from_config(config);
    debug!(
        "Creating test run via {} (scenarios: {:?}, test agents: {:?})",
        provider.provider_name(),
        request.scenario_ids,
        request.test_agent_ids
    );

    let test_id = provider.create_test(&request).await?;
    let dashboard_url = config.dashboard_url(&test_id);

    info!("test run started with id: {test_id}");
    info!("view test at: {dashboard_url}");

    Ok(LaunchedTest {
        test_id,
        dashboard_url,
    })
}

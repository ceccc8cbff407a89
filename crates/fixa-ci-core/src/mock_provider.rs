//! Mock test provider for testing

use crate::clock::ManualClock;
use crate::provider::{ProviderError, TestProvider};
use crate::types::{
    Call, CallResult, CallStatus, CreateTestRequest, TestStatus, TestStatusReport,
};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Mock test provider for testing. Replays a scripted sequence of status
/// responses; once the script runs out the last entry repeats.
#[derive(Debug, Clone)]
pub struct MockTestProvider {
    /// Id returned from `create_test` (None = response without an id)
    pub test_id: Option<String>,
    /// If set, `create_test` fails with this HTTP status
    pub create_error: Option<u16>,
    /// Scripted status responses; `Err` entries become transport errors
    pub statuses: Vec<Result<TestStatusReport, String>>,
    /// Virtual latency applied to every status request
    pub latency: Option<(ManualClock, Duration)>,
    /// Track calls for verification
    pub call_log: Arc<Mutex<Vec<MockCall>>>,
}

/// Record of method calls for test assertions
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    CreateTest(CreateTestRequest),
    GetStatus(String),
}

impl MockTestProvider {
    /// Create a mock that assigns `test_id` and has no status script yet
    pub fn new(test_id: &str) -> Self {
        Self {
            test_id: Some(test_id.to_string()),
            create_error: None,
            statuses: Vec::new(),
            latency: None,
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock with a status script
    pub fn with_statuses(test_id: &str, statuses: Vec<TestStatusReport>) -> Self {
        Self {
            statuses: statuses.into_iter().map(Ok).collect(),
            ..Self::new(test_id)
        }
    }

    /// Append a status request that fails at the transport level
    pub fn then_error(mut self, message: &str) -> Self {
        self.statuses.push(Err(message.to_string()));
        self
    }

    /// Make `create_test` fail with an HTTP status
    pub fn with_create_error(mut self, status: u16) -> Self {
        self.create_error = Some(status);
        self
    }

    /// Make `create_test` succeed without returning an id
    pub fn without_test_id(mut self) -> Self {
        self.test_id = None;
        self
    }

    /// Advance `clock` by `delay` during every status request
    pub fn with_latency(mut self, clock: ManualClock, delay: Duration) -> Self {
        self.latency = Some((clock, delay));
        self
    }

    /// Get a copy of the call log for assertions
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of status requests seen so far
    pub fn status_requests(&self) -> usize {
        self.get_calls()
            .iter()
            .filter(|call| matches!(call, MockCall::GetStatus(_)))
            .count()
    }

    /// Helper to log a call; returns the number of calls of the same kind before it
    fn log_call(&self, call: MockCall) -> usize {
        let mut log = self.call_log.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = log
            .iter()
            .filter(|c| std::mem::discriminant(*c) == std::mem::discriminant(&call))
            .count();
        log.push(call);
        previous
    }
}

impl TestProvider for MockTestProvider {
    async fn create_test(&self, request: &CreateTestRequest) -> Result<String, ProviderError> {
        self.log_call(MockCall::CreateTest(request.clone()));

        if let Some(status) = self.create_error {
            return Err(ProviderError::Http {
                status,
                body: String::new(),
            });
        }

        self.test_id.clone().ok_or(ProviderError::MissingTestId)
    }

    async fn get_status(&self, test_id: &str) -> Result<TestStatusReport, ProviderError> {
        let index = self.log_call(MockCall::GetStatus(test_id.to_string()));

        if let Some((clock, delay)) = &self.latency {
            clock.advance(*delay);
        }

        let scripted = self
            .statuses
            .get(index)
            .or_else(|| self.statuses.last())
            .cloned()
            .ok_or_else(|| ProviderError::Transport {
                message: "no scripted status response".to_string(),
                source: None,
            })?;

        scripted.map_err(|message| ProviderError::Transport {
            message,
            source: None,
        })
    }

    fn provider_name(&self) -> &str {
        "MockTestProvider"
    }
}

/// Helper function to create a test call
pub fn create_test_call(id: &str, status: CallStatus, result: Option<CallResult>) -> Call {
    Call {
        id: id.to_string(),
        status,
        result,
    }
}

/// Helper function to create a status report
pub fn create_status_report(status: TestStatus, calls: Vec<Call>) -> TestStatusReport {
    TestStatusReport {
        status,
        calls: Some(calls),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateTestRequest {
        CreateTestRequest {
            agent_id: "agent-1".to_string(),
            scenario_ids: None,
            test_agent_ids: None,
        }
    }

    #[tokio::test]
    async fn test_mock_provider_create_logs_call() {
        let provider = MockTestProvider::new("t1");

        let id = provider.create_test(&request()).await.unwrap();

        assert_eq!(id, "t1");
        assert_eq!(provider.get_calls(), vec![MockCall::CreateTest(request())]);
    }

    #[tokio::test]
    async fn test_mock_provider_create_error() {
        let provider = MockTestProvider::new("t1").with_create_error(503);

        let err = provider.create_test(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_mock_provider_missing_id() {
        let provider = MockTestProvider::new("t1").without_test_id();

        let err = provider.create_test(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingTestId));
    }

    #[tokio::test]
    async fn test_mock_provider_replays_script_then_repeats_last() {
        let provider = MockTestProvider::with_statuses(
            "t1",
            vec![
                create_status_report(TestStatus::Pending, vec![]),
                create_status_report(TestStatus::Completed, vec![]),
            ],
        );

        let first = provider.get_status("t1").await.unwrap();
        let second = provider.get_status("t1").await.unwrap();
        let third = provider.get_status("t1").await.unwrap();

        assert_eq!(first.status, TestStatus::Pending);
        assert_eq!(second.status, TestStatus::Completed);
        assert_eq!(third.status, TestStatus::Completed);
        assert_eq!(provider.status_requests(), 3);
    }

    #[tokio::test]
    async fn test_mock_provider_scripted_error() {
        let provider = MockTestProvider::with_statuses(
            "t1",
            vec![create_status_report(TestStatus::Running, vec![])],
        )
        .then_error("connection reset");

        assert!(provider.get_status("t1").await.is_ok());
        let err = provider.get_status("t1").await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_mock_provider_empty_script_errors() {
        let provider = MockTestProvider::new("t1");
        assert!(provider.get_status("t1").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_provider_latency_advances_clock() {
        let clock = ManualClock::new();
        let provider = MockTestProvider::with_statuses(
            "t1",
            vec![create_status_report(TestStatus::Running, vec![])],
        )
        .with_latency(clock.clone(), Duration::from_secs(7));

        provider.get_status("t1").await.unwrap();

        assert_eq!(clock.elapsed(), Duration::from_secs(7));
    }
}

//! Provider trait for the remote test service

use crate::types::{CreateTestRequest, TestStatusReport};
use std::future::Future;

/// Errors talking to the remote test service
///
/// Every variant is fatal for the run; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Service answered with a non-success status
    #[error("HTTP error! status: {status}{}", format_body(.body))]
    Http { status: u16, body: String },

    /// Request never produced a response (connect failure, timeout, ...)
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Response body was not the expected JSON shape
    #[error("failed to decode response: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Creation succeeded but no test id came back
    #[error("response did not contain a test id")]
    MissingTestId,
}

fn format_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" ({body})")
    }
}

/// Async trait for the two operations the tool needs from the service.
///
/// Uses RPITIT (Return Position Impl Trait in Traits) with explicit Send bounds.
pub trait TestProvider: Send + Sync + std::fmt::Debug {
    /// Start a test run and return its id
    fn create_test(
        &self,
        request: &CreateTestRequest,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;

    /// Fetch the current status of a test run
    fn get_status(
        &self,
        test_id: &str,
    ) -> impl Future<Output = Result<TestStatusReport, ProviderError>> + Send;

    /// Provider name for logging/display
    fn provider_name(&self) -> &str;
}

//! Wire types for the fixa test API
//!
//! Status strings are decoded into enums but keep the raw value for anything
//! unrecognised, so progress lines always show exactly what the service sent.

use crate::config::RunConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of `POST /tests`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestRequest {
    /// Agent under test
    pub agent_id: String,
    /// Scenarios to run; omitted from the body when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_ids: Option<Vec<String>>,
    /// Test agents to use; omitted from the body when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_agent_ids: Option<Vec<String>>,
}

impl CreateTestRequest {
    /// Build the creation request for a resolved configuration
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            agent_id: config.agent_id.clone(),
            scenario_ids: config.scenario_ids.clone(),
            test_agent_ids: config.test_agent_ids.clone(),
        }
    }
}

/// Response of `POST /tests`
///
/// Older service versions return `{ "testId": ... }`, newer ones wrap it as
/// `{ "data": { "testId": ... } }`. Both are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTestResponse {
    #[serde(rename = "testId", default)]
    test_id: Option<String>,
    #[serde(default)]
    data: Option<CreateTestData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CreateTestData {
    #[serde(rename = "testId", default)]
    test_id: Option<String>,
}

impl CreateTestResponse {
    /// The assigned test id, top-level first, then under `data`.
    /// Blank ids are treated as absent.
    pub fn test_id(&self) -> Option<&str> {
        self.test_id
            .as_deref()
            .or_else(|| self.data.as_ref().and_then(|d| d.test_id.as_deref()))
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Overall status of a test run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TestStatus {
    Pending,
    Running,
    /// Terminal success marker
    Completed,
    /// Anything else the service reports, kept verbatim
    Other(String),
}

impl TestStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for TestStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "completed" => Self::Completed,
            _ => Self::Other(raw),
        }
    }
}

impl From<TestStatus> for String {
    fn from(status: TestStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single call within a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CallStatus {
    Pending,
    InProgress,
    Completed,
    Other(String),
}

impl CallStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for CallStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => Self::Pending,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            _ => Self::Other(raw),
        }
    }
}

impl From<CallStatus> for String {
    fn from(status: CallStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict of a completed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CallResult {
    Success,
    Failure,
    Other(String),
}

impl CallResult {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for CallResult {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "success" => Self::Success,
            "failure" => Self::Failure,
            _ => Self::Other(raw),
        }
    }
}

impl From<CallResult> for String {
    fn from(result: CallResult) -> Self {
        result.as_str().to_string()
    }
}

impl fmt::Display for CallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One simulated call inside a test run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub id: String,
    pub status: CallStatus,
    /// Only meaningful once `status` is completed
    #[serde(default)]
    pub result: Option<CallResult>,
}

impl Call {
    /// A call counts as failed only when it has completed with a failure result
    pub fn is_failed(&self) -> bool {
        self.status == CallStatus::Completed && self.result == Some(CallResult::Failure)
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call_id: {}, status: {}", self.id, self.status)?;
        if self.status == CallStatus::Completed {
            match &self.result {
                Some(result) => write!(f, ", result: {result}")?,
                None => f.write_str(", result: unknown")?,
            }
        }
        Ok(())
    }
}

/// Response of `GET /tests/{testId}/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStatusReport {
    pub status: TestStatus,
    /// Full call list as of this poll; `None` when the service omits it
    #[serde(default)]
    pub calls: Option<Vec<Call>>,
}

impl TestStatusReport {
    /// Calls in the report, empty when none were sent
    pub fn calls(&self) -> &[Call] {
        self.calls.as_deref().unwrap_or_default()
    }

    /// Ids of calls that completed with a failure, in report order
    pub fn failed_call_ids(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter(|call| call.is_failed())
            .map(|call| call.id.clone())
            .collect()
    }

    pub fn is_completed(&self) -> bool {
        self.status == TestStatus::Completed
    }
}

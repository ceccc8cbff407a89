//! fixa REST API provider using `reqwest`

use crate::config::RunConfig;
use crate::provider::{ProviderError, TestProvider};
use crate::types::{CreateTestRequest, CreateTestResponse, TestStatusReport};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::debug;

/// Longest error body echoed back in an [`ProviderError::Http`]
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Provider that talks to the fixa HTTP API with a static bearer credential
pub struct FixaApiProvider {
    client: Client,
    api_base_url: Url,
    api_key: String,
}

impl FixaApiProvider {
    /// Build a provider from a resolved configuration.
    ///
    /// Every request is bounded by `config.request_timeout`.
    pub fn new(config: &RunConfig) -> Result<Self, ProviderError> {
        let api_base_url =
            Url::parse(&config.api_base_url).map_err(|e| ProviderError::Transport {
                message: format!("invalid API base URL '{}': {e}", config.api_base_url),
                source: Some(Box::new(e)),
            })?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("fixa-ci/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Join path segments onto the API root, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.api_base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::Transport {
                message: format!("API base URL cannot be a base: {}", self.api_base_url),
                source: None,
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Reject non-2xx responses, keeping a short snippet of the body
    async fn check_status(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = match response.text().await {
            Ok(body) => truncate(body.trim(), MAX_ERROR_BODY_CHARS),
            Err(e) => {
                debug!("Failed to read body of HTTP {status} response: {e}");
                format!("<body unreadable: {e}>")
            }
        };
        Err(ProviderError::Http {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| ProviderError::Decode {
            message: e.to_string(),
            source: Some(Box::new(e)),
        })
    }
}

impl fmt::Debug for FixaApiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixaApiProvider")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl TestProvider for FixaApiProvider {
    async fn create_test(&self, request: &CreateTestRequest) -> Result<String, ProviderError> {
        let url = self.endpoint(&["tests"])?;
        debug!("POST {url}");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let response = Self::check_status(response).await?;
        let body: CreateTestResponse = Self::decode(response).await?;
        body.test_id()
            .map(str::to_string)
            .ok_or(ProviderError::MissingTestId)
    }

    async fn get_status(&self, test_id: &str) -> Result<TestStatusReport, ProviderError> {
        let url = self.endpoint(&["tests", test_id, "status"])?;
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(transport_error)?;

        let response = Self::check_status(response).await?;
        Self::decode(response).await
    }

    fn provider_name(&self) -> &str {
        "fixa"
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    let message = if e.is_timeout() {
        format!("request timed out: {e}")
    } else {
        e.to_string()
    };
    ProviderError::Transport {
        message,
        source: Some(Box::new(e)),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

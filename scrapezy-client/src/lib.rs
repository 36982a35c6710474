//! Scrapezy HTTP Client
//!
//! A small, type-safe HTTP client for the Scrapezy extraction API.
//!
//! The API is asynchronous: a job is created with [`ScrapezyClient::submit_job`]
//! and its status is read back with [`ScrapezyClient::poll_job`] until it
//! leaves the pending state. Both calls are also exposed through the
//! [`ExtractionApi`] trait so callers can drive them against a fake.
//!
//! # Example
//!
//! ```no_run
//! use scrapezy_client::ScrapezyClient;
//! use scrapezy_core::domain::{Credential, ExtractionRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ScrapezyClient::new(scrapezy_client::DEFAULT_API_URL)?;
//!     let credential = Credential::new("my-api-key");
//!     let req = ExtractionRequest::new("https://example.com", "Extract the page title")?;
//!
//!     let submitted = client.submit_job(&req, &credential).await?;
//!     println!("Submitted job: {:?}", submitted.job_handle());
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use scrapezy_core::dto::job::{PollJobResponse, SubmitJobResponse};

use async_trait::async_trait;
use reqwest::Client;
use scrapezy_core::domain::{Credential, ExtractionRequest, JobHandle};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Production endpoint of the extraction API
pub const DEFAULT_API_URL: &str = "https://scrapezy.com/api";

/// Upper bound on a single submit or poll request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// The two remote calls an extraction run is built from
#[async_trait]
pub trait ExtractionApi: Send + Sync {
    /// Creates a remote extraction job
    async fn submit_job(
        &self,
        req: &ExtractionRequest,
        credential: &Credential,
    ) -> Result<SubmitJobResponse>;

    /// Reads the current status of a job
    async fn poll_job(&self, job: &JobHandle, credential: &Credential) -> Result<PollJobResponse>;
}

/// HTTP client for the Scrapezy extraction API
#[derive(Debug, Clone)]
pub struct ScrapezyClient {
    /// Base URL of the API (e.g., "https://scrapezy.com/api")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ScrapezyClient {
    /// Create a new client with the default request timeout
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API; a trailing slash is ignored
    ///
    /// # Example
    /// ```
    /// use scrapezy_client::ScrapezyClient;
    ///
    /// let client = ScrapezyClient::new("https://scrapezy.com/api/").unwrap();
    /// assert_eq!(client.base_url(), "https://scrapezy.com/api");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a new client whose requests give up after `timeout`
    ///
    /// The timeout covers the whole request, so a server that accepts the
    /// connection but never answers still yields an error.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// The service reports rejections as JSON bodies on non-2xx statuses, so
    /// the body is parsed whatever the status. Only a body that is not valid
    /// JSON turns into an error, tagged with the status when it was not a
    /// success.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => {
                let message = if body.trim().is_empty() {
                    "Unknown error".to_string()
                } else {
                    body
                };
                Err(ClientError::api_error(status.as_u16(), message))
            }
            Err(e) => Err(ClientError::ParseError(format!(
                "Failed to parse JSON response: {}",
                e
            ))),
        }
    }
}

#[async_trait]
impl ExtractionApi for ScrapezyClient {
    async fn submit_job(
        &self,
        req: &ExtractionRequest,
        credential: &Credential,
    ) -> Result<SubmitJobResponse> {
        ScrapezyClient::submit_job(self, req, credential).await
    }

    async fn poll_job(&self, job: &JobHandle, credential: &Credential) -> Result<PollJobResponse> {
        ScrapezyClient::poll_job(self, job, credential).await
    }
}

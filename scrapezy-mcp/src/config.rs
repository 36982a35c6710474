//! Server configuration
//!
//! Command-line and environment settings, plus the credential resolver that
//! must succeed before any extraction can run.

use anyhow::Result;
use clap::Parser;
use scrapezy_client::{DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT};
use scrapezy_core::domain::Credential;
use std::time::Duration;

/// Delay before each status poll
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Polls allowed before a job is declared timed out
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 30;

const MISSING_API_KEY: &str = "SCRAPEZY_API_KEY is required. Either set it as an environment variable or pass it using --api-key=YOUR_KEY";

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "scrapezy-mcp-server")]
#[command(version, about = "MCP server for structured data extraction with Scrapezy", long_about = None)]
pub struct CliArgs {
    /// Scrapezy API key
    #[arg(long, env = "SCRAPEZY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Scrapezy API base URL
    #[arg(long, env = "SCRAPEZY_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Extraction API base URL (e.g., "https://scrapezy.com/api")
    pub api_url: String,

    /// How long to wait before each status poll
    pub poll_interval: Duration,

    /// Maximum number of status polls per job
    pub max_poll_attempts: u32,

    /// Upper bound on each submit or poll request
    pub request_timeout: Duration,
}

impl Config {
    /// Creates a new configuration with the fixed polling cadence
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            anyhow::bail!("api_url cannot be empty");
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_poll_attempts == 0 {
            anyhow::bail!("max_poll_attempts must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL.to_string())
    }
}

impl From<&CliArgs> for Config {
    fn from(args: &CliArgs) -> Self {
        Self::new(args.api_url.clone())
    }
}

/// Supplies the API credential before any extraction is attempted
pub trait CredentialResolver {
    fn resolve(&self) -> Result<Credential>;
}

/// Resolves the key given by `--api-key`, or by `SCRAPEZY_API_KEY` when the
/// flag is absent (clap applies the env fallback)
#[derive(Debug, Clone)]
pub struct ArgsCredentialResolver {
    api_key: Option<String>,
}

impl ArgsCredentialResolver {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }
}

impl From<&CliArgs> for ArgsCredentialResolver {
    fn from(args: &CliArgs) -> Self {
        Self::new(args.api_key.clone())
    }
}

impl CredentialResolver for ArgsCredentialResolver {
    fn resolve(&self) -> Result<Credential> {
        match self.api_key.as_deref().map(|key| Credential::new(key.trim())) {
            Some(credential) if !credential.is_empty() => Ok(credential),
            _ => anyhow::bail!(MISSING_API_KEY),
        }
    }
}

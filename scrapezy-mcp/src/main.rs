//! Scrapezy MCP Server
//!
//! Exposes structured data extraction as a single MCP tool served over stdio.
//!
//! Architecture:
//! - Configuration: flags and environment, including the API key
//! - Extraction: submits a remote job and polls it to a terminal outcome
//! - Server: MCP handler that validates tool arguments and renders outcomes
//!
//! Stdout carries the MCP protocol, so all logging goes to stderr.

mod config;
mod extraction;
mod server;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ArgsCredentialResolver, CliArgs, Config, CredentialResolver};
use crate::extraction::JobPoller;
use crate::server::ScrapezyMcpHandler;
use scrapezy_client::ScrapezyClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scrapezy_mcp=info,scrapezy_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    // Resolve the credential before anything can be served
    let credential = ArgsCredentialResolver::from(&args).resolve()?;

    let config = Config::from(&args);
    config.validate().context("Invalid configuration")?;

    info!("Starting Scrapezy MCP server (api_url={})", config.api_url);

    let client = ScrapezyClient::with_timeout(config.api_url.clone(), config.request_timeout)
        .context("Failed to build HTTP client")?;
    let client = Arc::new(client);
    let poller = Arc::new(JobPoller::new(&config, client));

    info!(
        "Poll interval: {:?}, max poll attempts: {}, request timeout: {:?}",
        config.poll_interval, config.max_poll_attempts, config.request_timeout
    );

    ScrapezyMcpHandler::new(poller, credential)
        .serve_stdio()
        .await
        .context("MCP server error")
}

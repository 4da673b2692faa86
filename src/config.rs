//! Runtime settings
//!
//! Every setting can be given as a flag or through the environment, so a
//! host that only provides environment variables needs no arguments.

use crate::checker::Checker;
use crate::fetcher::HttpMetadataSource;
use crate::notifier::WebhookNotifier;
use crate::scheduler::ScheduleOptions;
use crate::state::{FsBlobStore, StateManager};
use crate::token::{Hs256Verifier, TokenDecoder};
use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args};
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;

/// One week
const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Location of the persisted state object
#[derive(Debug, Clone, Args)]
pub struct StoreSettings {
    /// State store root directory (optionally `file://`-prefixed)
    #[arg(long, env = "STORE_CONNECTION_STRING")]
    pub store_connection_string: String,

    /// Container holding the state object
    #[arg(long, env = "STORE_CONTAINER_NAME", default_value = "revision-checker")]
    pub store_container: String,

    /// Name of the state object
    #[arg(long, env = "STORE_BLOB_NAME", default_value = "version-state.json")]
    pub store_blob_name: String,
}

impl StoreSettings {
    pub fn state_manager(&self) -> Result<StateManager> {
        let store = FsBlobStore::new(&self.store_connection_string, &self.store_container)
            .context("Invalid state store configuration")?;
        Ok(StateManager::new(Arc::new(store), &self.store_blob_name))
    }
}

/// Everything a check run needs
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// URL serving the signed version metadata token
    #[arg(long, env = "METADATA_URL")]
    pub metadata_url: Url,

    /// Webhook receiving `{"content": ...}` notifications
    #[arg(long, env = "WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Url,

    #[command(flatten)]
    pub store: StoreSettings,

    /// Timeout for each HTTP request, in seconds
    #[arg(
        long,
        env = "HTTP_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub http_timeout_secs: u64,

    /// Shared secret for HS256 token verification (unset: no verification)
    #[arg(long, env = "TOKEN_HMAC_SECRET", hide_env_values = true)]
    pub token_hmac_secret: Option<String>,
}

impl Settings {
    /// Build a checker wired to the HTTP endpoints and filesystem store
    pub fn build_checker(&self) -> Result<Checker> {
        ensure_http_url("metadata URL", &self.metadata_url)?;
        ensure_http_url("webhook URL", &self.webhook_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(self.http_timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let decoder = match self.token_hmac_secret.as_deref() {
            Some(secret) if !secret.is_empty() => {
                TokenDecoder::new(Arc::new(Hs256Verifier::new(secret)))
            }
            _ => TokenDecoder::unverified(),
        };
        tracing::debug!(verifier = decoder.verifier_name(), "Token verification configured");

        Ok(Checker::new(
            Arc::new(HttpMetadataSource::new(
                client.clone(),
                self.metadata_url.clone(),
            )),
            decoder,
            Arc::new(WebhookNotifier::new(client, self.webhook_url.clone())),
            self.store.state_manager()?,
        ))
    }
}

/// Scheduling flags for `watch`
#[derive(Debug, Clone, Args)]
pub struct ScheduleSettings {
    /// Minutes between checks
    #[arg(
        long,
        env = "CHECK_INTERVAL_MINUTES",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..=MAX_INTERVAL_MINUTES)
    )]
    pub interval_minutes: u64,

    /// Run a check immediately instead of waiting one interval
    #[arg(
        long,
        env = "RUN_ON_STARTUP",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub run_on_startup: bool,

    /// Consecutive failed runs before an alert is posted (0 disables)
    #[arg(long, env = "FAILURE_ALERT_THRESHOLD", default_value_t = 3)]
    pub failure_alert_threshold: u32,
}

impl ScheduleSettings {
    pub fn options(&self) -> ScheduleOptions {
        ScheduleOptions {
            interval: Duration::from_secs(self.interval_minutes.saturating_mul(60)),
            run_on_startup: self.run_on_startup,
            failure_alert_threshold: self.failure_alert_threshold,
        }
    }
}

fn ensure_http_url(name: &str, url: &Url) -> Result<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("The {} must use http or https, got '{}'", name, other),
    }
}

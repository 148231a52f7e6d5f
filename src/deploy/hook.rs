//! Deploy-hook trigger client.
//!
//! A deploy hook is a provider-issued webhook URL; POSTing to it starts a new
//! build of the published site. The hook's identifier is the final path
//! segment of that URL, and the provider stamps it onto the deployments the
//! hook creates, which is how a poll session finds its run later.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;

use crate::config::DeployConfig;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Receipt for one successful trigger: everything a poll session needs to
/// locate the resulting deployment at the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerReceipt {
    pub hook_id: String,
    /// Captured just before the webhook call, so the provider-side record
    /// can only be newer than this minus clock skew.
    pub triggered_at: DateTime<Utc>,
}

/// Client for the configured deploy webhook.
pub struct DeployHook {
    client: Client,
    hook_url: String,
    hook_id: String,
}

impl DeployHook {
    pub fn new(config: &DeployConfig) -> Self {
        let client = Client::builder()
            .timeout(CONNECTION_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            hook_id: hook_id_from_url(&config.hook_url),
            hook_url: config.hook_url.clone(),
        }
    }

    /// Identifier of the configured hook.
    pub fn hook_id(&self) -> &str {
        &self.hook_id
    }

    /// Fire the deploy hook once. One POST, no retry: a failed trigger is
    /// surfaced to the caller as an error, not retried.
    pub async fn trigger(&self) -> Result<TriggerReceipt> {
        let triggered_at = Utc::now();

        let response = self.client.post(&self.hook_url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("deploy hook returned status {}", response.status());
        }

        tracing::info!(hook_id = %self.hook_id, "Deployment triggered");

        Ok(TriggerReceipt {
            hook_id: self.hook_id.clone(),
            triggered_at,
        })
    }
}

/// Final path segment of a hook URL, with query/fragment and any trailing
/// slash stripped.
pub fn hook_id_from_url(url: &str) -> String {
    let path = match url.find(['?', '#']) {
        Some(idx) => &url[..idx],
        None => url,
    };

    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}

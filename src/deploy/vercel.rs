//! Vercel deployment-listing client.
//!
//! Implements [`DeploymentProvider`] against Vercel's `v6/deployments`
//! endpoint. The listing is filtered server-side by project and a `since`
//! timestamp; hook matching and status mapping happen in
//! [`resolve_status`](super::provider::resolve_status).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::config::DeployConfig;

use super::provider::{DeploymentProvider, DeploymentRecord};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const LIST_LIMIT: u32 = 20;

#[derive(Debug, Deserialize)]
struct DeploymentsResponse {
    deployments: Vec<DeploymentRecord>,
}

/// Client for Vercel's deployments API.
pub struct VercelProvider {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    project_id: String,
    team_id: Option<String>,
}

impl VercelProvider {
    pub fn new(config: &DeployConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            project_id: config.project_id.clone(),
            team_id: config.team_id.clone(),
        }
    }

    fn deployments_url(&self, since: DateTime<Utc>) -> String {
        let mut url = format!(
            "{}/v6/deployments?projectId={}&since={}&limit={}",
            self.base_url,
            self.project_id,
            since.timestamp_millis(),
            LIST_LIMIT
        );
        if let Some(ref team_id) = self.team_id {
            url.push_str("&teamId=");
            url.push_str(team_id);
        }
        url
    }
}

#[async_trait]
impl DeploymentProvider for VercelProvider {
    fn name(&self) -> &'static str {
        "vercel"
    }

    async fn list_deployments(&self, since: DateTime<Utc>) -> Result<Vec<DeploymentRecord>> {
        let url = self.deployments_url(since);
        debug!(url = %url, "Listing deployments");

        let body: DeploymentsResponse = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .context("deployment listing request failed")?
            .error_for_status()
            .context("deployment listing returned error status")?
            .json()
            .await
            .context("failed to parse deployment listing response")?;

        Ok(body.deployments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_config() -> DeployConfig {
        DeployConfig {
            hook_url: "https://hooks.example.com/deploy/abc".to_string(),
            api_token: "tok_test".to_string(),
            project_id: "prj_test".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn url_includes_project_and_since() {
        let provider = VercelProvider::new(&test_config());
        let since = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(
            provider.deployments_url(since),
            "https://api.vercel.com/v6/deployments?projectId=prj_test&since=1700000000000&limit=20"
        );
    }

    #[test]
    fn url_includes_team_when_configured() {
        let mut config = test_config();
        config.team_id = Some("team_x".to_string());
        let provider = VercelProvider::new(&config);
        let since = Utc.timestamp_millis_opt(0).unwrap();
        assert!(provider.deployments_url(since).ends_with("&teamId=team_x"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let mut config = test_config();
        config.api_base_url = "http://127.0.0.1:9999/".to_string();
        let provider = VercelProvider::new(&config);
        let since = Utc.timestamp_millis_opt(0).unwrap();
        assert!(provider
            .deployments_url(since)
            .starts_with("http://127.0.0.1:9999/v6/deployments?"));
    }

    #[test]
    fn provider_name() {
        assert_eq!(VercelProvider::new(&test_config()).name(), "vercel");
    }

    #[test]
    fn listing_response_parses_records() {
        let body = r#"{
            "deployments": [
                {
                    "uid": "dpl_1",
                    "state": "READY",
                    "created": 1700000000000,
                    "meta": { "deployHookId": "abc" }
                },
                {
                    "uid": "dpl_2",
                    "created": 1700000001000
                }
            ]
        }"#;

        let parsed: DeploymentsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.deployments.len(), 2);
        assert_eq!(parsed.deployments[0].meta.deploy_hook_id.as_deref(), Some("abc"));
        assert_eq!(parsed.deployments[1].state, None);
        assert_eq!(parsed.deployments[1].meta.deploy_hook_id, None);
    }
}

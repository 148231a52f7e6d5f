//! Deployment-provider abstraction.
//!
//! The poller and the status route only need one thing from the build
//! provider: a listing of recent deployments for the configured project.
//! [`DeploymentProvider`] is that seam; [`resolve_status`] turns a listing
//! into the status of one deployment run.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Build status for one deployment run.
///
/// `NOT_FOUND` means the provider has no matching record (yet); the rest
/// mirror provider-reported states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    NotFound,
    Building,
    Ready,
    Error,
    Canceled,
    Failed,
}

impl BuildStatus {
    /// Provider-reported failure states. `NOT_FOUND` is not a failure; the
    /// record may simply not exist yet.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            BuildStatus::Error | BuildStatus::Canceled | BuildStatus::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::NotFound => "NOT_FOUND",
            BuildStatus::Building => "BUILDING",
            BuildStatus::Ready => "READY",
            BuildStatus::Error => "ERROR",
            BuildStatus::Canceled => "CANCELED",
            BuildStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One deployment as returned by the provider's listing API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub uid: String,
    /// Raw provider state string, e.g. `BUILDING`, `READY`, `ERROR`.
    #[serde(default)]
    pub state: Option<String>,
    /// Creation time in epoch milliseconds.
    pub created: i64,
    #[serde(default)]
    pub meta: DeploymentMeta,
}

/// Provider-attached metadata on a deployment record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentMeta {
    /// Id of the deploy hook that created the deployment, when one did.
    #[serde(default)]
    pub deploy_hook_id: Option<String>,
}

/// Client for a provider's deployment-listing API.
#[async_trait]
pub trait DeploymentProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// List the configured project's deployments created at or after `since`.
    async fn list_deployments(&self, since: DateTime<Utc>) -> Result<Vec<DeploymentRecord>>;
}

/// Resolve the status of one deployment run from a provider listing.
///
/// Only records created by the matching deploy hook inside the window count;
/// among several matches the most recently created wins. No match resolves
/// to [`BuildStatus::NotFound`], which callers treat as "still building".
pub fn resolve_status(
    records: &[DeploymentRecord],
    hook_id: &str,
    window_start: DateTime<Utc>,
) -> BuildStatus {
    let window_start_ms = window_start.timestamp_millis();

    records
        .iter()
        .filter(|r| r.meta.deploy_hook_id.as_deref() == Some(hook_id))
        .filter(|r| r.created >= window_start_ms)
        .max_by_key(|r| r.created)
        .map(|r| map_provider_state(r.state.as_deref()))
        .unwrap_or(BuildStatus::NotFound)
}

/// Map a raw provider state to a [`BuildStatus`]. Unknown and missing states
/// (e.g. `QUEUED`, `INITIALIZING`) count as still building.
fn map_provider_state(state: Option<&str>) -> BuildStatus {
    match state {
        Some("READY") => BuildStatus::Ready,
        Some("ERROR") => BuildStatus::Error,
        Some("CANCELED") => BuildStatus::Canceled,
        Some("FAILED") => BuildStatus::Failed,
        _ => BuildStatus::Building,
    }
}

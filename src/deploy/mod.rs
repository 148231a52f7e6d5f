//! Frontend deployment orchestration.
//!
//! Triggering a deployment is a single POST to a provider webhook; the
//! hook itself returns no build handle, so progress is recovered by
//! querying the provider's deployment listing and matching records back
//! to the hook that created them.
//!
//! - [`hook`] -- the trigger webhook client.
//! - [`provider`] -- the deployment listing trait and status resolution.
//! - [`vercel`] -- the Vercel implementation of the listing trait.
//! - [`poller`] -- the background state machine tying it all together.

pub mod hook;
pub mod poller;
pub mod provider;
pub mod vercel;

pub use hook::{DeployHook, TriggerReceipt};
pub use poller::{DeployState, DeploymentPoller, PollHandle};
pub use provider::{BuildStatus, DeploymentProvider};
pub use vercel::VercelProvider;

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::config::DeployConfig;
use provider::resolve_status;

/// Deployment operations shared by the HTTP API, the poller, and the CLI.
pub struct DeployService {
    hook: DeployHook,
    provider: Arc<dyn DeploymentProvider>,
    grace_window_secs: u64,
}

impl DeployService {
    pub fn new(
        hook: DeployHook,
        provider: Arc<dyn DeploymentProvider>,
        grace_window_secs: u64,
    ) -> Self {
        Self {
            hook,
            provider,
            grace_window_secs,
        }
    }

    /// Wire up the hook client and the Vercel provider from config.
    pub fn from_config(config: &DeployConfig) -> Self {
        Self::new(
            DeployHook::new(config),
            Arc::new(VercelProvider::new(config)),
            config.grace_window_secs,
        )
    }

    /// Identifier of the configured hook, as derived from its URL.
    pub fn hook_id(&self) -> &str {
        self.hook.hook_id()
    }

    /// Fire the deploy hook once.
    pub async fn trigger(&self) -> Result<TriggerReceipt> {
        self.hook.trigger().await
    }

    /// Resolve the status of the deployment a trigger at `from` produced.
    ///
    /// The listing window opens `grace_window_secs` before `from` so that
    /// clock skew between this host and the provider cannot hide the
    /// record that the trigger created.
    pub async fn status(&self, from: DateTime<Utc>, hook_id: &str) -> Result<BuildStatus> {
        let window_start = from - chrono::Duration::seconds(self.grace_window_secs as i64);
        let records = self.provider.list_deployments(window_start).await?;
        Ok(resolve_status(&records, hook_id, window_start))
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub enrich: EnrichConfig,

    #[serde(default)]
    pub deploy: DeployConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auth: AuthConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Enable authentication for the API
    #[serde(default)]
    pub enabled: bool,

    /// API key for programmatic access (used with Authorization: Bearer header)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Username for session login
    #[serde(default)]
    pub username: Option<String>,

    /// Bcrypt hash of the password (generate with `foliocms hash-password`)
    #[serde(default)]
    pub password_hash: Option<String>,

    /// Session timeout in hours (default: 24)
    #[serde(default = "default_session_timeout")]
    pub session_timeout_hours: u64,
}

fn default_session_timeout() -> u64 {
    24
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            username: None,
            password_hash: None,
            session_timeout_hours: default_session_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichConfig {
    /// Timeout for fetching a single image, in seconds (default: 15)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// How many images are probed concurrently per request (default: 8)
    #[serde(default = "default_max_concurrent_probes")]
    pub max_concurrent_probes: usize,
}

fn default_request_timeout() -> u64 {
    15
}
fn default_max_concurrent_probes() -> usize {
    8
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            max_concurrent_probes: default_max_concurrent_probes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeployConfig {
    /// Provider webhook that triggers a frontend build
    #[serde(default)]
    pub hook_url: String,

    /// API token used to query the provider's deployment listing
    #[serde(default)]
    pub api_token: String,

    /// Provider project whose deployments are polled
    #[serde(default)]
    pub project_id: String,

    /// Team scope for the project, if it lives under one
    #[serde(default)]
    pub team_id: Option<String>,

    /// Base URL of the provider API (default: "https://api.vercel.com")
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Seconds between deployment status checks (default: 5)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// How far before the trigger time the listing window opens,
    /// in seconds (default: 60)
    #[serde(default = "default_grace_window")]
    pub grace_window_secs: u64,

    /// Overall deadline for one deployment session, in seconds (default: 300)
    #[serde(default = "default_deploy_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.vercel.com".to_string()
}
fn default_poll_interval() -> u64 {
    5
}
fn default_grace_window() -> u64 {
    60
}
fn default_deploy_timeout() -> u64 {
    300
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            hook_url: String::new(),
            api_token: String::new(),
            project_id: String::new(),
            team_id: None,
            api_base_url: default_api_base_url(),
            poll_interval_secs: default_poll_interval(),
            grace_window_secs: default_grace_window(),
            timeout_secs: default_deploy_timeout(),
        }
    }
}

impl DeployConfig {
    /// True when everything needed to trigger and poll a deployment is set.
    pub fn is_configured(&self) -> bool {
        !self.hook_url.is_empty() && !self.api_token.is_empty() && !self.project_id.is_empty()
    }
}

mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./foliocms.toml",
        "~/.config/foliocms/config.toml",
        "/etc/foliocms/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // No file found; env vars may still provide deploy credentials
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Deploy credentials can come from the environment so they stay out of
/// the config file. Env values win over file values.
fn apply_env_overrides(config: &mut Config) {
    if let Some(url) = env_nonempty("FOLIOCMS_DEPLOY_HOOK_URL") {
        config.deploy.hook_url = url;
    }
    if let Some(token) = env_nonempty("FOLIOCMS_DEPLOY_API_TOKEN") {
        config.deploy.api_token = token;
    }
    if let Some(project) = env_nonempty("FOLIOCMS_DEPLOY_PROJECT_ID") {
        config.deploy.project_id = project;
    }
    if let Some(team) = env_nonempty("FOLIOCMS_DEPLOY_TEAM_ID") {
        config.deploy.team_id = Some(team);
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    // Validate server config
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    let auth = &config.server.auth;
    if auth.enabled {
        let has_login = auth.username.is_some() && auth.password_hash.is_some();
        if !has_login && auth.api_key.is_none() {
            anyhow::bail!(
                "Auth is enabled but neither login credentials nor an API key are configured"
            );
        }
    }

    // Validate enrichment config
    if config.enrich.request_timeout_secs == 0 {
        anyhow::bail!("enrich.request_timeout_secs must be at least 1");
    }
    if config.enrich.max_concurrent_probes == 0 {
        anyhow::bail!("enrich.max_concurrent_probes must be at least 1");
    }

    // Deploy is optional, but a partial config is a mistake rather than
    // a disabled feature
    let deploy = &config.deploy;
    let any_set =
        !deploy.hook_url.is_empty() || !deploy.api_token.is_empty() || !deploy.project_id.is_empty();
    if any_set && !deploy.is_configured() {
        anyhow::bail!(
            "Deploy config is incomplete: hook_url, api_token and project_id must all be set"
        );
    }
    if deploy.is_configured() && crate::deploy::hook::hook_id_from_url(&deploy.hook_url).is_empty()
    {
        anyhow::bail!("deploy.hook_url does not end in a hook id path segment");
    }
    if deploy.poll_interval_secs == 0 {
        anyhow::bail!("deploy.poll_interval_secs must be at least 1");
    }
    if deploy.grace_window_secs == 0 {
        anyhow::bail!("deploy.grace_window_secs must be at least 1");
    }
    if deploy.timeout_secs == 0 {
        anyhow::bail!("deploy.timeout_secs must be at least 1");
    }

    Ok(())
}

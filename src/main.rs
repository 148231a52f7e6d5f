mod cli;

use foliocms::{
    config,
    deploy::{DeployService, DeployState, DeploymentPoller},
    server::{self, auth},
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;

async fn start_server(
    host: String,
    port: u16,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting foliocms server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

async fn run_deploy(config_path: Option<&std::path::Path>, no_wait: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !config.deploy.is_configured() {
        anyhow::bail!(
            "Deploy is not configured: set deploy.hook_url, deploy.api_token and deploy.project_id"
        );
    }

    let service = Arc::new(DeployService::from_config(&config.deploy));

    if no_wait {
        let receipt = service.trigger().await?;
        println!("Deployment triggered (hook {})", receipt.hook_id);
        return Ok(());
    }

    let poller = DeploymentPoller::new(
        service,
        config.deploy.poll_interval_secs,
        config.deploy.timeout_secs,
    );
    let handle = poller.start()?;
    let mut states = handle.states();

    println!("{}", handle.state());
    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        println!("{state}");
        if state.is_terminal() {
            if let DeployState::Error { message } = state {
                anyhow::bail!("{message}");
            }
            break;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "foliocms=trace,tower_http=debug".to_string()
        } else {
            "foliocms=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            // Create tokio runtime
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Deploy { no_wait } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_deploy(cli.config.as_deref(), no_wait))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("foliocms {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::HashPassword { password } => hash_password(&password),
        Commands::GenerateApiKey => generate_api_key(),
    }
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Auth enabled: {}", config.server.auth.enabled);
            println!(
                "  Probe concurrency: {}",
                config.enrich.max_concurrent_probes
            );
            println!("  Deploy configured: {}", config.deploy.is_configured());
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}

fn hash_password(password: &str) -> Result<()> {
    let hash = auth::hash_password(password)?;
    println!("{}", hash);
    Ok(())
}

fn generate_api_key() -> Result<()> {
    let key = auth::generate_api_key();
    println!("{}", key);
    Ok(())
}

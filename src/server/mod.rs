use crate::config::Config;
use crate::deploy::DeployService;
use crate::enrich::ImageEnricher;
use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod auth;
pub mod routes_content;
pub mod routes_deploy;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Resolves image dimensions for content blocks
    pub enricher: Arc<ImageEnricher>,
    /// Deployment operations; `None` when deploy is not configured
    pub deploy: Option<Arc<DeployService>>,
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // API routes (with optional auth)
        .nest("/api", api_routes(&ctx))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

fn api_routes(ctx: &AppContext) -> Router<AppContext> {
    // Auth routes (always available, even when auth is disabled)
    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/status", get(auth::auth_status));

    // Protected routes
    let protected_routes =
        routes_content::content_routes().merge(routes_deploy::deploy_routes());

    // Apply auth middleware to protected routes only if enabled
    let protected_routes = if ctx.config.server.auth.enabled {
        protected_routes.layer(middleware::from_fn_with_state(
            ctx.clone(),
            auth::api_auth_middleware,
        ))
    } else {
        protected_routes
    };

    // Merge auth routes (no middleware) with protected routes
    auth_routes.merge(protected_routes)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let enricher = Arc::new(ImageEnricher::new(&config.enrich));

    let deploy = config
        .deploy
        .is_configured()
        .then(|| Arc::new(DeployService::from_config(&config.deploy)));
    if deploy.is_none() {
        tracing::info!("Deploy routes disabled: deploy is not configured");
    }

    let ctx = AppContext {
        config: Arc::new(config),
        enricher,
        deploy,
    };

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

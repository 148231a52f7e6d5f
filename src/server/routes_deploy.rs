//! Deployment endpoints.
//!
//! `POST /deploy-frontend` fires the configured deploy hook once and
//! returns a receipt; clients then poll `GET /deploy-status` with the
//! receipt's `createdAt` and `hookId` until the build settles.

use crate::deploy::{BuildStatus, DeployService};
use crate::server::AppContext;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn deploy_routes() -> Router<AppContext> {
    Router::new()
        .route("/deploy-frontend", post(deploy_frontend))
        .route("/deploy-status", get(deploy_status))
}

fn deploy_service(ctx: &AppContext) -> Result<&Arc<DeployService>, ApiError> {
    ctx.deploy.as_ref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({"error": "Deploy is not configured"})),
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeployFrontendResponse {
    message: String,
    /// Epoch milliseconds of the moment the hook was fired
    created_at: i64,
    hook_id: String,
}

async fn deploy_frontend(
    State(ctx): State<AppContext>,
) -> Result<Json<DeployFrontendResponse>, ApiError> {
    let deploy = deploy_service(&ctx)?;

    let receipt = deploy.trigger().await.map_err(|e| {
        (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({
                "error": format!("Failed to trigger deployment: {e:#}")
            })),
        )
    })?;

    Ok(Json(DeployFrontendResponse {
        message: "Deployment triggered successfully!".to_string(),
        created_at: receipt.triggered_at.timestamp_millis(),
        hook_id: receipt.hook_id,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeployStatusQuery {
    /// Trigger time as epoch milliseconds
    from: i64,
    hook_id: String,
}

#[derive(Serialize)]
struct DeployStatusResponse {
    status: BuildStatus,
}

async fn deploy_status(
    State(ctx): State<AppContext>,
    Query(params): Query<DeployStatusQuery>,
) -> Result<Json<DeployStatusResponse>, ApiError> {
    let deploy = deploy_service(&ctx)?;

    if params.hook_id.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "hookId cannot be empty"})),
        ));
    }
    let from = Utc.timestamp_millis_opt(params.from).single().ok_or((
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": "'from' is not a valid timestamp"})),
    ))?;

    let status = deploy.status(from, &params.hook_id).await.map_err(|e| {
        (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({
                "error": format!("Failed to query deployment status: {e:#}")
            })),
        )
    })?;

    Ok(Json(DeployStatusResponse { status }))
}

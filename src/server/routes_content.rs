//! Content block endpoints.

use crate::content::ContentBlock;
use crate::server::AppContext;
use axum::{extract::State, routing::post, Json, Router};

pub fn content_routes() -> Router<AppContext> {
    Router::new().route("/content/enrich", post(enrich_content))
}

/// Resolve image dimensions for a list of content blocks.
///
/// The list comes back in the same order with the same blocks; only
/// `imageDimensions` changes on blocks that carry an image URL.
async fn enrich_content(
    State(ctx): State<AppContext>,
    Json(blocks): Json<Vec<ContentBlock>>,
) -> Json<Vec<ContentBlock>> {
    let enriched = ctx.enricher.enrich(blocks).await;
    Json(enriched)
}

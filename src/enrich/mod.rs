//! Remote-image dimension enrichment for content blocks.
//!
//! The [`ImageEnricher`] implements the CMS pre-persist hook: walk a page's
//! content blocks, fetch every referenced remote image, probe its intrinsic
//! width/height from the header, and write the result back into the block.
//! Enrichment never fails the save. A block whose image cannot be fetched or
//! decoded gets `imageDimensions` with null width/height and a log entry;
//! blocks without an image pass through untouched.

pub mod probe;

use std::time::Duration;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::EnrichConfig;
use crate::content::{ContentBlock, ImageDimensions};

/// Probes remote images referenced by content blocks.
///
/// Blocks are processed concurrently up to a configured cap, and the output
/// preserves input order. The whole operation is total: it returns a block
/// list of the same length for every input, with failures recorded inside
/// the affected block rather than surfaced to the caller.
pub struct ImageEnricher {
    client: Client,
    max_concurrent: usize,
}

impl ImageEnricher {
    pub fn new(config: &EnrichConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            max_concurrent: config.max_concurrent_probes.max(1),
        }
    }

    /// Enrich a page's content blocks with probed image dimensions.
    ///
    /// Dimension-bearing blocks with a non-empty `imageUrl` are fetched and
    /// probed; everything else is returned unchanged, in the original order.
    /// An empty-string URL counts as "no image": the block is skipped and its
    /// `imageDimensions` field is left exactly as it came in.
    pub async fn enrich(&self, blocks: Vec<ContentBlock>) -> Vec<ContentBlock> {
        if blocks.is_empty() {
            return blocks;
        }

        stream::iter(blocks.into_iter().map(|block| self.enrich_block(block)))
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    async fn enrich_block(&self, mut block: ContentBlock) -> ContentBlock {
        let url = match block.image_url() {
            Some(url) if !url.is_empty() => url.to_owned(),
            _ => return block,
        };

        match self.probe_remote(&url).await {
            Ok((width, height)) => {
                debug!(url = %url, width, height, "Probed image dimensions");
                block.set_image_dimensions(ImageDimensions::probed(width, height));
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to resolve image dimensions");
                block.set_image_dimensions(ImageDimensions::failed());
            }
        }

        block
    }

    /// Fetch an image and read its dimensions from the header.
    async fn probe_remote(&self, url: &str) -> Result<(u32, u32)> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("image fetch returned status {}", response.status());
        }

        let bytes = response.bytes().await?;
        let dimensions = probe::read_dimensions(&bytes)?;
        Ok(dimensions)
    }
}

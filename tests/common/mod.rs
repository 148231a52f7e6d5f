//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use foliocms::config::{Config, DeployConfig};
use foliocms::deploy::DeployService;
use foliocms::enrich::ImageEnricher;
use foliocms::server::AppContext;
use image::{DynamicImage, ImageFormat, RgbImage};

/// Deploy config pointing every outbound call at `base` (a mock server).
pub fn deploy_config(base: &str) -> DeployConfig {
    DeployConfig {
        hook_url: format!("{base}/hooks/hook_abc123"),
        api_token: "tok_test".to_string(),
        project_id: "prj_test".to_string(),
        api_base_url: base.to_string(),
        ..Default::default()
    }
}

/// Application context built the way the server builds it: enrichment
/// always on, deploy only when configured.
pub fn test_context_with_config(config: Config) -> AppContext {
    let enricher = Arc::new(ImageEnricher::new(&config.enrich));
    let deploy = config
        .deploy
        .is_configured()
        .then(|| Arc::new(DeployService::from_config(&config.deploy)));

    AppContext {
        config: Arc::new(config),
        enricher,
        deploy,
    }
}

/// Context with default config (auth off, deploy unconfigured).
pub fn test_context() -> AppContext {
    test_context_with_config(Config::default())
}

/// Encode a solid-color image at the given size.
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format)
        .expect("failed to encode test image");
    out.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    image_bytes(width, height, ImageFormat::Png)
}

/// One deployment record as the provider's listing API returns it.
pub fn deployment_json(uid: &str, state: &str, created: i64, hook_id: &str) -> serde_json::Value {
    serde_json::json!({
        "uid": uid,
        "state": state,
        "created": created,
        "meta": { "deployHookId": hook_id }
    })
}

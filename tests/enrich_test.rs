//! Enrichment integration tests
//!
//! Exercise [`ImageEnricher`] against a local mock image host.

mod common;

use common::{image_bytes, png_bytes};
use foliocms::config::EnrichConfig;
use foliocms::content::{ContentBlock, ImageDimensions};
use foliocms::enrich::ImageEnricher;
use image::ImageFormat;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn enricher() -> ImageEnricher {
    ImageEnricher::new(&EnrichConfig::default())
}

/// Build a block from its wire form.
fn block(json: serde_json::Value) -> ContentBlock {
    serde_json::from_value(json).unwrap()
}

async fn mount_image(server: &MockServer, route: &str, bytes: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .mount(server)
        .await;
}

#[tokio::test]
async fn resolves_dimensions_from_remote_images() {
    let server = MockServer::start().await;
    mount_image(&server, "/a.png", png_bytes(800, 600)).await;
    mount_image(&server, "/b.jpg", image_bytes(64, 48, ImageFormat::Jpeg)).await;

    let blocks = vec![
        block(serde_json::json!({
            "blockType": "imageBlock",
            "imageUrl": format!("{}/a.png", server.uri()),
        })),
        block(serde_json::json!({
            "blockType": "textWithImageBlock",
            "imageUrl": format!("{}/b.jpg", server.uri()),
        })),
    ];

    let enriched = enricher().enrich(blocks).await;

    assert_eq!(
        enriched[0].image_dimensions(),
        Some(&ImageDimensions::probed(800, 600))
    );
    assert_eq!(
        enriched[1].image_dimensions(),
        Some(&ImageDimensions::probed(64, 48))
    );
}

#[tokio::test]
async fn fetch_failure_yields_null_dimensions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let blocks = vec![block(serde_json::json!({
        "blockType": "imageBlock",
        "imageUrl": format!("{}/gone.png", server.uri()),
    }))];

    let enriched = enricher().enrich(blocks).await;

    assert_eq!(enriched[0].image_dimensions(), Some(&ImageDimensions::failed()));

    // The failure marker serializes as explicit nulls, not as absence
    let json = serde_json::to_value(&enriched[0]).unwrap();
    assert_eq!(
        json["imageDimensions"],
        serde_json::json!({ "width": null, "height": null })
    );
}

#[tokio::test]
async fn undecodable_body_yields_null_dimensions() {
    let server = MockServer::start().await;
    mount_image(&server, "/not-an-image.png", b"<html>nope</html>".to_vec()).await;

    let blocks = vec![block(serde_json::json!({
        "blockType": "imageBlock",
        "imageUrl": format!("{}/not-an-image.png", server.uri()),
    }))];

    let enriched = enricher().enrich(blocks).await;

    assert_eq!(enriched[0].image_dimensions(), Some(&ImageDimensions::failed()));
}

#[tokio::test]
async fn unreachable_host_yields_null_dimensions() {
    // Nothing listens here; the connection itself fails
    let blocks = vec![block(serde_json::json!({
        "blockType": "imageBlock",
        "imageUrl": "http://127.0.0.1:9/unreachable.png",
    }))];

    let enriched = enricher().enrich(blocks).await;

    assert_eq!(enriched[0].image_dimensions(), Some(&ImageDimensions::failed()));
}

#[tokio::test]
async fn missing_url_leaves_dimensions_absent() {
    let blocks = vec![block(serde_json::json!({
        "blockType": "imageBlock",
        "imageUrl": "",
    }))];

    let enriched = enricher().enrich(blocks).await;

    assert_eq!(enriched[0].image_dimensions(), None);

    // Skipped means the key is absent from the wire form entirely
    let json = serde_json::to_value(&enriched[0]).unwrap();
    assert!(json.get("imageDimensions").is_none());
}

#[tokio::test]
async fn one_failure_does_not_affect_other_blocks() {
    let server = MockServer::start().await;
    mount_image(&server, "/ok.png", png_bytes(320, 200)).await;
    Mock::given(method("GET"))
        .and(path("/broken.png"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let blocks = vec![
        block(serde_json::json!({
            "blockType": "imageBlock",
            "imageUrl": format!("{}/ok.png", server.uri()),
        })),
        block(serde_json::json!({
            "blockType": "imageBlock",
            "imageUrl": format!("{}/broken.png", server.uri()),
        })),
        block(serde_json::json!({
            "blockType": "videoBlock",
            "videoUrl": "https://vimeo.com/123",
        })),
    ];

    let enriched = enricher().enrich(blocks).await;

    assert_eq!(
        enriched[0].image_dimensions(),
        Some(&ImageDimensions::probed(320, 200))
    );
    assert_eq!(enriched[1].image_dimensions(), Some(&ImageDimensions::failed()));
    assert_eq!(enriched[2].block_type(), "videoBlock");
    assert_eq!(enriched[2].image_dimensions(), None);
}

#[tokio::test]
async fn preserves_block_order() {
    let server = MockServer::start().await;
    for i in 0..10u32 {
        mount_image(&server, &format!("/img-{i}.png"), png_bytes(100 + i, 50 + i)).await;
    }

    let blocks: Vec<ContentBlock> = (0..10u32)
        .map(|i| {
            block(serde_json::json!({
                "blockType": "imageBlock",
                "imageUrl": format!("{}/img-{i}.png", server.uri()),
                "blockName": format!("block-{i}"),
            }))
        })
        .collect();

    let enriched = enricher().enrich(blocks).await;

    assert_eq!(enriched.len(), 10);
    for (i, got) in enriched.iter().enumerate() {
        let i = i as u32;
        match got {
            ContentBlock::ImageBlock(img) => {
                assert_eq!(img.block_name.as_deref(), Some(format!("block-{i}").as_str()));
                assert_eq!(
                    img.image_dimensions,
                    Some(ImageDimensions::probed(100 + i, 50 + i))
                );
            }
            other => panic!("expected imageBlock, got {}", other.block_type()),
        }
    }
}

#[tokio::test]
async fn enrichment_is_repeatable() {
    let server = MockServer::start().await;
    mount_image(&server, "/stable.png", png_bytes(640, 480)).await;

    let blocks = vec![block(serde_json::json!({
        "blockType": "imageBlock",
        "imageUrl": format!("{}/stable.png", server.uri()),
    }))];

    let once = enricher().enrich(blocks).await;
    let twice = enricher().enrich(once.clone()).await;

    assert_eq!(once, twice);
}

#[tokio::test]
async fn non_image_blocks_pass_through_untouched() {
    let blocks = vec![
        block(serde_json::json!({
            "blockType": "richTextBlock",
            "richText": { "root": { "children": [] } },
        })),
        block(serde_json::json!({
            "blockType": "htmlBlock",
            "html": "<blockquote>hi</blockquote>",
        })),
        block(serde_json::json!({
            "blockType": "mediaGrid",
            "items": [{ "url": "https://cdn.example.com/t.png" }],
            "columns": 3,
        })),
    ];

    let enriched = enricher().enrich(blocks.clone()).await;

    assert_eq!(enriched, blocks);
}

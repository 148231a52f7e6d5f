//! Content-block data model.
//!
//! Pages are stored as a sequence of blocks tagged by `blockType` on the
//! wire. Only [`ImageBlock`] and [`TextWithImageBlock`] reference a remote
//! image and participate in dimension enrichment; every other variant passes
//! through the enricher untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Intrinsic pixel dimensions probed from a remote image.
///
/// A populated field with `null` width/height means the probe was attempted
/// and failed; a missing `imageDimensions` field means the probe never ran.
/// Consumers rely on that distinction, so `None` values serialize as explicit
/// JSON nulls rather than being skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ImageDimensions {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl ImageDimensions {
    /// Dimensions successfully read from the image header.
    pub fn probed(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// Marker for a probe that was attempted but failed.
    pub fn failed() -> Self {
        Self {
            width: None,
            height: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

/// Horizontal placement of a media element within its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Which side media sits on in a split text/media layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// One structured-content block of a page.
///
/// Tagged union over the CMS block catalogue. Unknown `blockType` tags are a
/// deserialization error; unknown fields within a known variant are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "blockType", rename_all = "camelCase")]
pub enum ContentBlock {
    RichTextBlock(RichTextBlock),
    ImageBlock(ImageBlock),
    TextWithImageBlock(TextWithImageBlock),
    TextWithVideo(TextWithVideo),
    MediaGrid(MediaGrid),
    VideoBlock(VideoBlock),
    HtmlBlock(HtmlBlock),
    TextWithHtml(TextWithHtml),
}

/// Free-form rich text with no media reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RichTextBlock {
    /// Opaque editor document; never interpreted here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_text: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A standalone remote image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImageBlock {
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    /// Author-specified display width; -1 leaves it unset. Distinct from the
    /// probed intrinsic dimensions below.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_dimensions: Option<ImageDimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Rich text alongside a remote image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextWithImageBlock {
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Side>,
    /// Percentage of the row reserved for text (0-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_text_space: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_percentage_based_padding: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_padding: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_image_padding: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_text: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_dimensions: Option<ImageDimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Rich text alongside an embedded video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextWithVideo {
    #[serde(default)]
    pub video_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_alignment: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_text_space: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_percentage_based_padding: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_padding: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_video_padding: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Gallery of media thumbnails laid out in columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MediaGrid {
    #[serde(default)]
    pub items: Vec<MediaGridItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MediaGridItem {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A standalone embedded video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoBlock {
    #[serde(default)]
    pub video_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Raw HTML pasted by the author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HtmlBlock {
    #[serde(default)]
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Rich text alongside a raw HTML fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextWithHtml {
    #[serde(default)]
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_text: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ContentBlock {
    /// Wire-format tag for this variant.
    pub fn block_type(&self) -> &'static str {
        match self {
            ContentBlock::RichTextBlock(_) => "richTextBlock",
            ContentBlock::ImageBlock(_) => "imageBlock",
            ContentBlock::TextWithImageBlock(_) => "textWithImageBlock",
            ContentBlock::TextWithVideo(_) => "textWithVideo",
            ContentBlock::MediaGrid(_) => "mediaGrid",
            ContentBlock::VideoBlock(_) => "videoBlock",
            ContentBlock::HtmlBlock(_) => "htmlBlock",
            ContentBlock::TextWithHtml(_) => "textWithHtml",
        }
    }

    /// Remote image URL for dimension-bearing variants. `None` for every
    /// other variant; may be empty for a block whose image was cleared.
    pub fn image_url(&self) -> Option<&str> {
        match self {
            ContentBlock::ImageBlock(b) => Some(&b.image_url),
            ContentBlock::TextWithImageBlock(b) => Some(&b.image_url),
            _ => None,
        }
    }

    /// Probed dimensions, if any. `None` for variants that never carry them.
    pub fn image_dimensions(&self) -> Option<&ImageDimensions> {
        match self {
            ContentBlock::ImageBlock(b) => b.image_dimensions.as_ref(),
            ContentBlock::TextWithImageBlock(b) => b.image_dimensions.as_ref(),
            _ => None,
        }
    }

    /// Write probed dimensions into a dimension-bearing block. No-op for
    /// variants without the field.
    pub fn set_image_dimensions(&mut self, dimensions: ImageDimensions) {
        match self {
            ContentBlock::ImageBlock(b) => b.image_dimensions = Some(dimensions),
            ContentBlock::TextWithImageBlock(b) => b.image_dimensions = Some(dimensions),
            _ => {}
        }
    }
}

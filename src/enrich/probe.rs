//! Header-only image dimension probing.
//!
//! Reads intrinsic width/height from an encoded image's header after
//! sniffing the format from the bytes. No pixel data is decoded, so probing
//! stays cheap even for large images.

use std::io::Cursor;

use image::ImageReader;

/// Why a dimension probe failed.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("could not detect image format: {0}")]
    FormatDetection(#[from] std::io::Error),
    #[error("could not read image header: {0}")]
    HeaderDecode(#[from] image::ImageError),
}

/// Extract intrinsic pixel dimensions from encoded image bytes.
pub fn read_dimensions(data: &[u8]) -> Result<(u32, u32), ProbeError> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    let dimensions = reader.into_dimensions()?;
    Ok(dimensions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::new(width, height);
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn reads_png_dimensions() {
        let data = encode(800, 600, ImageFormat::Png);
        assert_eq!(read_dimensions(&data).unwrap(), (800, 600));
    }

    #[test]
    fn reads_jpeg_dimensions() {
        let data = encode(64, 48, ImageFormat::Jpeg);
        assert_eq!(read_dimensions(&data).unwrap(), (64, 48));
    }

    #[test]
    fn rejects_non_image_bytes() {
        let result = read_dimensions(b"<!doctype html><html></html>");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(read_dimensions(&[]).is_err());
    }
}

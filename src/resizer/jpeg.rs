//! JPEG resizer backed by the `image` crate

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};

use crate::error::{PictDbError, Result};

use super::{scaled_dims, shrink_ratio, Resizer};

/// Default JPEG quality for re-encoded variants
pub const DEFAULT_QUALITY: u8 = 85;

/// Production resizer: decode, shrink preserving aspect ratio, re-encode as JPEG
#[derive(Debug, Clone, Copy)]
pub struct JpegResizer {
    quality: u8,
}

impl Default for JpegResizer {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

impl JpegResizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quality is clamped to 1..=100
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

impl Resizer for JpegResizer {
    fn decode_dimensions(&self, data: &[u8]) -> Result<(u32, u32)> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| PictDbError::Resize(format!("cannot sniff image format: {}", e)))?
            .into_dimensions()
            .map_err(|e| PictDbError::Resize(format!("cannot decode image header: {}", e)))
    }

    fn resize(&self, data: &[u8], max_width: u16, max_height: u16) -> Result<Vec<u8>> {
        let image = image::load_from_memory(data)
            .map_err(|e| PictDbError::Resize(format!("cannot decode image: {}", e)))?;

        let orig = image.dimensions();
        let ratio = shrink_ratio(orig, (max_width, max_height));
        let (width, height) = scaled_dims(orig, ratio);
        tracing::debug!(
            "Resizing {}x{} -> {}x{} (ratio {:.4})",
            orig.0,
            orig.1,
            width,
            height,
            ratio
        );

        let resized = image.resize_exact(width, height, FilterType::Triangle);

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, self.quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| PictDbError::Resize(format!("cannot encode image: {}", e)))?;
        Ok(out)
    }
}

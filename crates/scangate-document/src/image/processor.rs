// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decoding, grayscale views, and JPEG encoding for the
// quality gate pipeline. Operates on in-memory images using the `image`
// crate.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, GrayImage, Luma, RgbImage};
use scangate_core::error::ScangateError;
use tracing::{debug, info, instrument};

/// JPEG quality used for every rectified output.
pub const OUTPUT_JPEG_QUALITY: u8 = 95;

/// A single decoded input image.
///
/// The decoded buffer is never modified; every derived view (grayscale,
/// RGB copy) is a fresh allocation.
///
/// ```ignore
/// let processor = ImageProcessor::from_bytes(&upload)?;
/// let gray = processor.grayscale();
/// ```
pub struct ImageProcessor {
    /// The decoded image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, ScangateError> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(&data)
    }

    /// Decode raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, ScangateError> {
        let img = image::load_from_memory(data).map_err(|err| {
            ScangateError::UnreadableInput(format!("failed to decode image: {}", err))
        })?;
        if img.width() == 0 || img.height() == 0 {
            return Err(ScangateError::UnreadableInput(
                "decoded image has no pixels".into(),
            ));
        }
        info!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Derived views --------------------------------------------------------

    /// 8-bit BT.601 luma copy of the image. See [`bt601_luma`].
    pub fn grayscale(&self) -> GrayImage {
        bt601_luma(&self.image)
    }

    /// 8-bit RGB copy of the image, dropping any alpha channel.
    pub fn rgb(&self) -> RgbImage {
        self.image.to_rgb8()
    }
}

// -- Grayscale ----------------------------------------------------------------

/// BT.601 luma weights in 14-bit fixed point (0.299, 0.587, 0.114).
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Convert to 8-bit grayscale with BT.601 weights.
///
/// The gate thresholds are calibrated against these weights, not the Rec.709
/// weights `DynamicImage::to_luma8` uses. Rounds half up. Alpha is ignored,
/// and gray inputs pass through unchanged.
pub fn bt601_luma(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let weighted = LUMA_R * r as u32 + LUMA_G * g as u32 + LUMA_B * b as u32;
        Luma([((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8])
    })
}

// -- Output -------------------------------------------------------------------

/// Encode an RGB buffer as JPEG bytes with the given quality (1-100).
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, ScangateError> {
    let mut buffer = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    image.write_with_encoder(encoder).map_err(|err| {
        ScangateError::Encoding(format!("JPEG encoding failed: {}", err))
    })?;
    debug!(bytes = buffer.len(), quality, "JPEG encoded");
    Ok(buffer)
}

/// Render JPEG bytes as a `data:` URL, ready to embed in a vision-model
/// request.
pub fn jpeg_data_url(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg))
}

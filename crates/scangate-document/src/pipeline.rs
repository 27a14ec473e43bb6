// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end document pipeline: decode, quality gate, boundary search,
// deskew, JPEG encode.

use std::path::Path;

use image::DynamicImage;
use scangate_core::ThresholdProfile;
use scangate_core::error::ScangateError;
use tracing::{info, instrument};

use crate::fingerprint::input_fingerprint;
use crate::image::{ImageProcessor, OUTPUT_JPEG_QUALITY, encode_jpeg, jpeg_data_url};
use crate::scan::{ContourLocator, Deskewer, OrderedCorners, QualityGate};

/// A successfully rectified document, encoded as JPEG.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Source-image corners that were mapped onto the output rectangle.
    pub corners: OrderedCorners,
}

impl ProcessedDocument {
    /// The JPEG payload as a `data:image/jpeg;base64,...` URL.
    pub fn data_url(&self) -> String {
        jpeg_data_url(&self.jpeg)
    }
}

/// Runs the full pipeline under one threshold profile.
///
/// Stages run strictly in order and the first failure wins:
///
/// 1. Decode (`UnreadableInput`)
/// 2. Quality gate (`Quality`)
/// 3. Boundary search (`BoundaryNotFound`)
/// 4. Perspective deskew (`Rectification`)
/// 5. JPEG encode at quality 95 (`Encoding`)
///
/// The input is never modified. Each call is independent, so a pipeline
/// may be shared across threads.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'p> {
    profile: &'p ThresholdProfile,
}

impl<'p> Pipeline<'p> {
    pub fn new(profile: &'p ThresholdProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ThresholdProfile {
        self.profile
    }

    /// Process encoded image bytes.
    #[instrument(skip_all, fields(data_len = data.len(), sha256 = tracing::field::Empty))]
    pub fn run_bytes(&self, data: &[u8]) -> Result<ProcessedDocument, ScangateError> {
        tracing::Span::current().record("sha256", input_fingerprint(data).as_str());
        let processor = ImageProcessor::from_bytes(data)?;
        self.run_image(processor.as_dynamic())
    }

    /// Read and process an image file.
    pub fn run_path(&self, path: impl AsRef<Path>) -> Result<ProcessedDocument, ScangateError> {
        let data = std::fs::read(path.as_ref())?;
        self.run_bytes(&data)
    }

    /// Process an already-decoded image.
    pub fn run_image(&self, image: &DynamicImage) -> Result<ProcessedDocument, ScangateError> {
        QualityGate::new(self.profile).evaluate(image).into_result()?;

        let quad = ContourLocator::new(self.profile)
            .locate(image)
            .ok_or(ScangateError::BoundaryNotFound)?;

        let rectified = Deskewer::new().deskew(image, &quad)?;
        let jpeg = encode_jpeg(&rectified.image, OUTPUT_JPEG_QUALITY)?;

        info!(
            width = rectified.width(),
            height = rectified.height(),
            bytes = jpeg.len(),
            "Document rectified"
        );
        Ok(ProcessedDocument {
            width: rectified.width(),
            height: rectified.height(),
            corners: rectified.corners,
            jpeg,
        })
    }
}

/// Process encoded image bytes with the given profile.
pub fn process(data: &[u8], profile: &ThresholdProfile) -> Result<ProcessedDocument, ScangateError> {
    Pipeline::new(profile).run_bytes(data)
}

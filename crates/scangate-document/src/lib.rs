// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scangate-document — Image side of the Scangate document gate.
//
// Provides decoding and JPEG output, the numeric quality gate (blur,
// resolution, contrast, glare, darkness, edge density), document boundary
// search, perspective deskew, and the pipeline that chains them.

pub mod fingerprint;
pub mod image;
pub mod pipeline;
pub mod scan;

// Re-export the primary structs so callers can use `scangate_document::Pipeline` etc.
pub use crate::image::processor::ImageProcessor;
pub use pipeline::{Pipeline, ProcessedDocument, process};
pub use scan::contour::{ContourLocator, Quad};
pub use scan::deskew::{Deskewer, OrderedCorners, RectifiedImage};
pub use scan::quality::{QualityGate, QualityVerdict};

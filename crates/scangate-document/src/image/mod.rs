// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding, grayscale views, and JPEG output.

pub mod processor;

pub use processor::{ImageProcessor, OUTPUT_JPEG_QUALITY, bt601_luma, encode_jpeg, jpeg_data_url};

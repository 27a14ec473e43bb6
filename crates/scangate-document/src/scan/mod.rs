// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline stages — numeric quality gate, document boundary search,
// and perspective deskew.

pub mod contour;
pub mod deskew;
pub mod quality;

pub use contour::{ContourLocator, Quad};
pub use deskew::{Deskewer, OrderedCorners, RectifiedImage};
pub use quality::{Measurement, QualityGate, QualityVerdict};

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scangate quality gate.

use serde::{Deserialize, Serialize};

use crate::error::ScangateError;

/// Photography advice appended verbatim to every retake-the-photo message.
pub const REMEDIATION_INSTRUCTIONS: &str = "\
Ensure good lighting without harsh shadows or glare
Hold camera steady and ensure the image is in focus
Make sure the document fills most of the frame
Take photo straight-on to avoid perspective distortion";

/// Named severity preset for the quality gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    #[serde(alias = "easy")]
    Lenient,
    #[default]
    #[serde(alias = "medium")]
    Standard,
    #[serde(alias = "hard")]
    Strict,
}

impl Strictness {
    /// Every preset, from least to most restrictive.
    pub const ALL: [Strictness; 3] = [Self::Lenient, Self::Standard, Self::Strict];

    /// The threshold bundle for this preset.
    pub fn profile(self) -> &'static ThresholdProfile {
        match self {
            Self::Lenient => &ThresholdProfile::LENIENT,
            Self::Standard => &ThresholdProfile::STANDARD,
            Self::Strict => &ThresholdProfile::STRICT,
        }
    }

    /// Canonical lowercase keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Standard => "standard",
            Self::Strict => "strict",
        }
    }

    /// Parse a severity keyword, case-insensitively.
    ///
    /// The legacy `easy` / `medium` / `hard` spellings map onto the same
    /// presets.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "lenient" | "easy" => Some(Self::Lenient),
            "standard" | "medium" => Some(Self::Standard),
            "strict" | "hard" => Some(Self::Strict),
            _ => None,
        }
    }
}

impl std::fmt::Display for Strictness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Strictness {
    type Err = ScangateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(s).ok_or_else(|| {
            ScangateError::Config(format!(
                "unknown strictness '{s}' (expected lenient, standard, or strict)"
            ))
        })
    }
}

/// Numeric thresholds driving the quality gate and the boundary search.
///
/// Built only through the named presets and never mutated, so a single
/// `&'static ThresholdProfile` can be shared by any number of concurrent
/// pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdProfile {
    /// Laplacian variance floor; lower variance means a blurrier image.
    pub blur_threshold: f64,
    /// Maximum fraction of pixels brighter than `glare_brightness`.
    pub glare_threshold: f64,
    /// Grayscale level above which a pixel counts as glare.
    pub glare_brightness: u8,
    /// Minimum mean grayscale brightness.
    pub darkness_threshold: f64,
    /// Minimum standard deviation of grayscale intensities.
    pub min_contrast: f64,
    pub min_width: u32,
    pub min_height: u32,
    /// Minimum document area as a fraction of the whole frame.
    pub min_doc_area_ratio: f64,
    /// Minimum fraction of Canny edge pixels.
    pub min_edge_density: f64,
}

impl ThresholdProfile {
    pub const LENIENT: Self = Self {
        blur_threshold: 150.0,
        glare_threshold: 0.01,
        glare_brightness: 220,
        darkness_threshold: 70.0,
        min_contrast: 20.0,
        min_width: 600,
        min_height: 400,
        min_doc_area_ratio: 0.2,
        min_edge_density: 0.015,
    };

    pub const STANDARD: Self = Self {
        blur_threshold: 200.0,
        glare_threshold: 0.005,
        glare_brightness: 240,
        darkness_threshold: 100.0,
        min_contrast: 30.0,
        min_width: 800,
        min_height: 600,
        min_doc_area_ratio: 0.3,
        min_edge_density: 0.02,
    };

    pub const STRICT: Self = Self {
        blur_threshold: 300.0,
        glare_threshold: 0.003,
        glare_brightness: 250,
        darkness_threshold: 120.0,
        min_contrast: 40.0,
        min_width: 1000,
        min_height: 800,
        min_doc_area_ratio: 0.4,
        min_edge_density: 0.025,
    };
}

impl Default for ThresholdProfile {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// The numeric check that rejected an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityFailure {
    Blurry,
    LowResolution,
    LowContrast,
    Glare,
    Dark,
    LowEdgeDensity,
}

impl QualityFailure {
    /// Stable machine-readable tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Blurry => "blurry",
            Self::LowResolution => "low-resolution",
            Self::LowContrast => "low-contrast",
            Self::Glare => "glare",
            Self::Dark => "dark",
            Self::LowEdgeDensity => "low-edge-density",
        }
    }

    /// Fixed one-line summary shown to the person holding the camera.
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Blurry => "Image is too blurry.",
            Self::LowResolution => "Image resolution is too low.",
            Self::LowContrast => "Image contrast is too low.",
            Self::Glare => "Image has too much glare.",
            Self::Dark => "Image is too dark.",
            Self::LowEdgeDensity => "Image does not show enough document detail.",
        }
    }

    /// Headline followed by the shared photography instructions.
    pub fn message(&self) -> String {
        format!("{}\n{}", self.headline(), REMEDIATION_INSTRUCTIONS)
    }
}

impl std::fmt::Display for QualityFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Classification of errors for the calling orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The photo is unusable; the user should take another one.
    RetakePhoto,
    /// The input was not an image at all.
    InvalidInput,
    /// Unexpected internal condition; the orchestrator may retry.
    Internal,
}

impl ErrorClass {
    /// Suggested transport status code for this class.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::RetakePhoto => 422,
            Self::InvalidInput => 400,
            Self::Internal => 500,
        }
    }

    /// Whether an automatic retry could possibly change the outcome.
    pub fn retriable(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

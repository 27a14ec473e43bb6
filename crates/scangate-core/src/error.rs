// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scangate.

use thiserror::Error;

use crate::types::QualityFailure;

/// Top-level error type for all Scangate operations.
#[derive(Debug, Error)]
pub enum ScangateError {
    // -- Retake-the-photo errors --
    #[error("quality check failed: {}", .0.headline())]
    Quality(QualityFailure),

    #[error("no document boundary found")]
    BoundaryNotFound,

    // -- Input errors --
    #[error("cannot read image: {0}")]
    UnreadableInput(String),

    // -- Internal errors --
    #[error("rectification failed: {0}")]
    Rectification(String),

    #[error("image encoding failed: {0}")]
    Encoding(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScangateError {
    /// Stable taxonomy tag, used as the `tag` of an error descriptor.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Quality(failure) => failure.tag(),
            Self::BoundaryNotFound => "boundary-not-found",
            Self::UnreadableInput(_) => "unreadable-input",
            Self::Rectification(_) => "rectification-failure",
            Self::Encoding(_) => "encoding-failure",
            Self::Config(_) => "invalid-config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}

impl From<QualityFailure> for ScangateError {
    fn from(failure: QualityFailure) -> Self {
        Self::Quality(failure)
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScangateError>;

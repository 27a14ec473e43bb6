// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error descriptors for the calling orchestrator.
//
// Every pipeline error maps to a taxonomy tag, a plain-English message, and
// the transport status the orchestrator should surface. Retake-the-photo
// errors always carry the shared photography instructions.

use serde::Serialize;

use crate::error::ScangateError;
use crate::types::{ErrorClass, REMEDIATION_INSTRUCTIONS};

/// Serializable description of a pipeline failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDescriptor {
    /// Stable taxonomy tag (`blurry`, `boundary-not-found`, ...).
    pub tag: String,
    /// Message for the end user; includes the instructions when present.
    pub message: String,
    /// Photography instructions, only for retake-the-photo errors.
    pub remediation: Option<String>,
    pub class: ErrorClass,
    /// Suggested transport status code.
    pub status: u16,
    /// Whether the orchestrator may retry automatically.
    pub retriable: bool,
}

/// Classify a `ScangateError` for the orchestrator.
pub fn classify_error(err: &ScangateError) -> ErrorClass {
    match err {
        ScangateError::Quality(_) | ScangateError::BoundaryNotFound => ErrorClass::RetakePhoto,

        ScangateError::UnreadableInput(_) | ScangateError::Config(_) => ErrorClass::InvalidInput,

        ScangateError::Rectification(_)
        | ScangateError::Encoding(_)
        | ScangateError::Io(_)
        | ScangateError::Serialization(_) => ErrorClass::Internal,
    }
}

/// Convert a `ScangateError` into an `ErrorDescriptor`.
pub fn describe_error(err: &ScangateError) -> ErrorDescriptor {
    let class = classify_error(err);

    let (message, remediation) = match err {
        ScangateError::Quality(failure) => {
            (failure.message(), Some(REMEDIATION_INSTRUCTIONS.to_owned()))
        }

        ScangateError::BoundaryNotFound => (
            format!(
                "Document edges could not be found.\n{}",
                REMEDIATION_INSTRUCTIONS
            ),
            Some(REMEDIATION_INSTRUCTIONS.to_owned()),
        ),

        ScangateError::UnreadableInput(_) => {
            ("Cannot read image. Please provide a valid image file.".to_owned(), None)
        }

        ScangateError::Config(detail) => (format!("Invalid configuration: {detail}"), None),

        ScangateError::Rectification(_) | ScangateError::Encoding(_) => (
            "The image could not be processed. Please try again.".to_owned(),
            None,
        ),

        ScangateError::Io(_) | ScangateError::Serialization(_) => (
            "An internal error occurred. Please try again.".to_owned(),
            None,
        ),
    };

    ErrorDescriptor {
        tag: err.tag().to_owned(),
        message,
        remediation,
        class,
        status: class.http_status(),
        retriable: class.retriable(),
    }
}

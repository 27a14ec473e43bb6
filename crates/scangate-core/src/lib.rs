// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scangate — Core types, threshold profiles, and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::GateConfig;
pub use error::ScangateError;
pub use human_errors::{ErrorDescriptor, classify_error, describe_error};
pub use types::*;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gate configuration. Built once at startup and passed by reference into the
// pipeline; never mutated afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, ScangateError};
use crate::types::{Strictness, ThresholdProfile};

/// Environment variable selecting the severity preset.
pub const STRICTNESS_ENV: &str = "QUALITY_STRICTNESS";

/// Startup settings for the quality gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Which threshold preset the gate enforces.
    pub strictness: Strictness,
}

impl GateConfig {
    pub fn new(strictness: Strictness) -> Self {
        Self { strictness }
    }

    /// Read the preset from `QUALITY_STRICTNESS`.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(STRICTNESS_ENV).ok().as_deref())
    }

    /// Resolve a raw environment value.
    ///
    /// Missing values select the standard preset. Unrecognised values also
    /// fall back to standard, with a warning.
    pub fn from_env_value(value: Option<&str>) -> Self {
        let strictness = match value {
            None => Strictness::default(),
            Some(raw) => Strictness::from_keyword(raw).unwrap_or_else(|| {
                warn!(value = raw, "Unknown QUALITY_STRICTNESS value; using standard");
                Strictness::default()
            }),
        };
        info!(%strictness, "Quality gate configured");
        Self { strictness }
    }

    /// Load settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|err| {
            ScangateError::Config(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        info!(strictness = %config.strictness, "Quality gate configured from file");
        Ok(config)
    }

    /// The threshold bundle for the configured preset.
    pub fn profile(&self) -> &'static ThresholdProfile {
        self.strictness.profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_env_value_selects_standard() {
        assert_eq!(GateConfig::from_env_value(None).strictness, Strictness::Standard);
    }

    #[test]
    fn unknown_env_value_falls_back_to_standard() {
        let config = GateConfig::from_env_value(Some("ultra"));
        assert_eq!(config.strictness, Strictness::Standard);
    }

    #[test]
    fn legacy_env_value_is_honoured() {
        let config = GateConfig::from_env_value(Some("hard"));
        assert_eq!(config.strictness, Strictness::Strict);
        assert_eq!(config.profile(), &ThresholdProfile::STRICT);
    }

    #[test]
    fn json_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "strictness": "lenient" }}"#).unwrap();
        let config = GateConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.strictness, Strictness::Lenient);
    }

    #[test]
    fn json_file_accepts_legacy_keywords() {
        for (keyword, expected) in [
            ("easy", Strictness::Lenient),
            ("medium", Strictness::Standard),
            ("hard", Strictness::Strict),
        ] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(file, r#"{{ "strictness": "{keyword}" }}"#).unwrap();
            let config = GateConfig::from_json_file(file.path()).unwrap();
            assert_eq!(config.strictness, expected, "{keyword}");
        }
    }

    #[test]
    fn empty_json_object_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        let config = GateConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config, GateConfig::default());
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "strictness": "#).unwrap();
        let err = GateConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ScangateError::Serialization(_)));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = GateConfig::from_json_file("/nonexistent/scangate.json").unwrap_err();
        assert!(matches!(err, ScangateError::Config(_)));
    }
}

//! Compiler options consumed by the resolution and inference engines.
//!
//! Options are deserializable from JSON so a driver can load them from a
//! project file; every field has a default so an empty object is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vesta_core::Severity;

mod logging;

pub use logging::LoggingOptions;

/// Source compatibility level governing which inference algorithm runs.
///
/// `Java7` is the legacy algorithm: diamond and method type-argument
/// inference consider only the actual arguments, so an unconstrained type
/// variable collapses to the erasure of its bound (usually `Object`).
/// `Java8` is the improved, target-context-aware algorithm: the expected
/// assignment/return type participates as an additional constraint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLevel {
    Java7,
    #[default]
    Java8,
}

impl SourceLevel {
    /// Whether the target context (expected type) participates in inference.
    pub fn uses_target_context(self) -> bool {
        matches!(self, SourceLevel::Java8)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerOptions {
    /// Source compatibility level (inference algorithm selection).
    pub source_level: SourceLevel,

    /// Severity of the "Redundant specification of type arguments" advisory.
    ///
    /// `None` disables the advisory entirely. It is never an error that
    /// stops resolution, whatever the configured severity.
    pub redundant_type_arguments: Option<Severity>,

    /// Whether unchecked-conversion warnings (raw conversions, generic
    /// varargs) are reported.
    pub report_unchecked: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            source_level: SourceLevel::default(),
            redundant_type_arguments: Some(Severity::Warning),
            report_unchecked: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid compiler options: {0}")]
    Parse(#[from] serde_json::Error),
}

impl CompilerOptions {
    /// Parse options from a JSON document. Unknown fields are rejected so a
    /// typo in a project file fails loudly rather than silently defaulting.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_default() {
        let opts = CompilerOptions::from_json("{}").unwrap();
        assert_eq!(opts, CompilerOptions::default());
        assert_eq!(opts.source_level, SourceLevel::Java8);
        assert!(opts.source_level.uses_target_context());
    }

    #[test]
    fn legacy_level_round_trips() {
        let opts =
            CompilerOptions::from_json(r#"{ "source_level": "java7", "report_unchecked": false }"#)
                .unwrap();
        assert_eq!(opts.source_level, SourceLevel::Java7);
        assert!(!opts.source_level.uses_target_context());
        assert!(!opts.report_unchecked);

        let json = serde_json::to_string(&opts).unwrap();
        let back = CompilerOptions::from_json(&json).unwrap();
        assert_eq!(back, opts);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = CompilerOptions::from_json(r#"{ "sourceLevel": "java8" }"#);
        assert!(err.is_err());
    }

    #[test]
    fn redundancy_advisory_can_be_disabled() {
        let opts =
            CompilerOptions::from_json(r#"{ "redundant_type_arguments": null }"#).unwrap();
        assert_eq!(opts.redundant_type_arguments, None);
    }
}

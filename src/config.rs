//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document (or a section that
//! names only some fields) is a valid configuration.
//!
//! ```toml
//! # Fail fast when both sequences report different lengths.
//! sequence_length_short_circuit = true
//! # Composite values nested deeper than this hash to a constant.
//! hash_depth = 8
//! cycle_placeholder = "..."
//! null_placeholder = "null"
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Compare fast item counts before iterating two sequences.
    pub sequence_length_short_circuit: bool,
    /// How many levels of composite values (arrays, sequences, tuples,
    /// records) hashing descends through. A composite value at this depth
    /// contributes `CYCLE_HASH`; scalars are always hashed.
    ///
    /// Any depth keeps hashing consistent with equality, cycles included.
    /// Larger values spread hashes of deep structures further at the cost of
    /// walking more of the graph.
    pub hash_depth: usize,
    /// Rendered in place of a value that is an active ancestor.
    pub cycle_placeholder: String,
    /// Rendered in place of a null handle.
    pub null_placeholder: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sequence_length_short_circuit: true,
            hash_depth: 8,
            cycle_placeholder: "...".to_string(),
            null_placeholder: "null".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML. Missing fields keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn with_sequence_length_short_circuit(mut self, enabled: bool) -> Self {
        self.sequence_length_short_circuit = enabled;
        self
    }

    pub fn with_hash_depth(mut self, depth: usize) -> Self {
        self.hash_depth = depth;
        self
    }

    pub fn with_cycle_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.cycle_placeholder = placeholder.into();
        self
    }

    pub fn with_null_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.null_placeholder = placeholder.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StructuralError;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn partial_toml_overrides_named_fields_only() {
        let cfg = EngineConfig::from_toml_str(
            "hash_depth = 3\ncycle_placeholder = \"<cycle>\"\n",
        )
        .unwrap();
        assert_eq!(cfg.hash_depth, 3);
        assert_eq!(cfg.cycle_placeholder, "<cycle>");
        assert!(cfg.sequence_length_short_circuit);
        assert_eq!(cfg.null_placeholder, "null");
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = EngineConfig::from_toml_str("hash_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, StructuralError::Config(_)));
    }

    #[test]
    fn builders_set_fields() {
        let cfg = EngineConfig::default()
            .with_sequence_length_short_circuit(false)
            .with_hash_depth(usize::MAX)
            .with_cycle_placeholder("@")
            .with_null_placeholder("nil");
        assert!(!cfg.sequence_length_short_circuit);
        assert_eq!(cfg.hash_depth, usize::MAX);
        assert_eq!(cfg.cycle_placeholder, "@");
        assert_eq!(cfg.null_placeholder, "nil");
    }

    #[test]
    fn json_round_trip_through_serde() {
        let cfg = EngineConfig::default().with_hash_depth(2);
        let text = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }
}

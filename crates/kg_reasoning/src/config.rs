//! Configuration for building a [`Reasoner`](crate::Reasoner).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::contradiction::{MutualExclusionRule, SingleValuedRule};
use crate::engine::DEFAULT_MAX_ITERATIONS;
use crate::error::{Error, Result};
use crate::relation::RelationDefinition;
use crate::rule::InferenceRule;

/// Configuration for a reasoner instance.
///
/// Every field has a default, so a JSON document only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerConfig {
    /// Bound on forward-chaining rounds.
    pub max_iterations: usize,
    /// Seed the default transitive, symmetric and inverse relations.
    pub seed_default_relations: bool,
    /// Seed the generic rule catalog.
    pub seed_builtin_rules: bool,
    /// Seed the default contradiction constraints.
    pub seed_default_constraints: bool,
    /// Additional relations, registered after the defaults.
    pub relations: Vec<RelationDefinition>,
    /// Additional rules, registered after the synthesized ones.
    pub rules: Vec<InferenceRule>,
    /// Additional mutual-exclusion constraints.
    pub mutual_exclusions: Vec<MutualExclusionRule>,
    /// Additional single-valued constraints.
    pub single_valued: Vec<SingleValuedRule>,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed_default_relations: true,
            seed_builtin_rules: true,
            seed_default_constraints: true,
            relations: Vec::new(),
            rules: Vec::new(),
            mutual_exclusions: Vec::new(),
            single_valued: Vec::new(),
        }
    }
}

impl ReasonerConfig {
    /// Returns a configuration with nothing seeded.
    ///
    /// Useful when the caller declares its whole vocabulary explicitly.
    pub fn minimal() -> Self {
        Self {
            seed_default_relations: false,
            seed_builtin_rules: false,
            seed_default_constraints: false,
            ..Self::default()
        }
    }

    /// Sets the iteration bound.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Parses a configuration from JSON and validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks the configuration for values the reasoner cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        for rule in &self.rules {
            rule.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::RelationKind;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ReasonerConfig::default();
        assert_eq!(config.max_iterations, 100);
        assert!(config.seed_default_relations);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config() {
        let config = ReasonerConfig::minimal();
        assert!(!config.seed_default_relations);
        assert!(!config.seed_builtin_rules);
        assert!(!config.seed_default_constraints);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let config = ReasonerConfig::default().with_max_iterations(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let json = r#"{
            "max_iterations": 10,
            "relations": [
                {"name": "adjacentTo", "kind": "symmetric"},
                {"name": "teaches", "kind": "inverse", "inverse_name": "taughtBy"}
            ],
            "single_valued": [{"predicate": "capitalOf"}]
        }"#;
        let config = ReasonerConfig::from_json(json).unwrap();
        assert_eq!(config.max_iterations, 10);
        assert!(config.seed_builtin_rules);
        assert_eq!(config.relations[0].kind, RelationKind::Symmetric);
        assert_eq!(config.relations[1].inverse_name(), Some("taughtBy"));
        assert_eq!(config.single_valued[0].predicate, "capitalOf");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            ReasonerConfig::from_json("{not json"),
            Err(Error::SerializationError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_iterations": 5, "seed_default_constraints": false}}"#).unwrap();

        let config = ReasonerConfig::load(file.path()).unwrap();
        assert_eq!(config.max_iterations, 5);
        assert!(!config.seed_default_constraints);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("reasoner.json");
        assert!(matches!(ReasonerConfig::load(missing), Err(Error::Io(_))));
    }
}

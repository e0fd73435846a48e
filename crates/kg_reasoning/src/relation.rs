//! Relation definitions and their algebraic properties.
//!
//! A relation is a named predicate that may carry an algebraic property the
//! reasoner can exploit: transitivity, symmetry, or pairing with an inverse.
//! The [`RelationRegistry`] owns the definitions for one reasoner instance.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Transitive relations seeded into every default registry.
const DEFAULT_TRANSITIVE: &[(&str, &str)] = &[
    ("partOf", "X is a part of Y"),
    ("subclassOf", "X is a subclass of Y"),
    ("locatedIn", "X is located in Y"),
    ("reportsTo", "X reports to Y"),
    ("ancestorOf", "X is an ancestor of Y"),
];

/// Symmetric relations seeded into every default registry.
const DEFAULT_SYMMETRIC: &[(&str, &str)] = &[
    ("knows", "X knows Y"),
    ("collaboratesWith", "X collaborates with Y"),
    ("relatedTo", "X is related to Y"),
    ("siblingOf", "X is a sibling of Y"),
    ("marriedTo", "X is married to Y"),
];

/// Inverse pairs seeded into every default registry.
const DEFAULT_INVERSE: &[(&str, &str, &str)] = &[
    ("parentOf", "childOf", "X is a parent of Y"),
    ("employs", "employedBy", "X employs Y"),
    ("owns", "ownedBy", "X owns Y"),
    ("manages", "managedBy", "X manages Y"),
    ("creates", "createdBy", "X creates Y"),
    ("contains", "containedIn", "X contains Y"),
];

/// The algebraic property of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelationKind {
    /// `(a R b) ∧ (b R c) ⟹ (a R c)`.
    Transitive,
    /// `(a R b) ⟹ (b R a)`. A symmetric relation is its own inverse.
    Symmetric,
    /// `(a R b) ⟹ (b R' a)` for the named partner `R'`.
    Inverse { inverse_name: String },
    /// No built-in algebra; only user rules apply.
    Custom,
}

impl RelationKind {
    /// Returns `true` when both kinds are the same variant, ignoring any inverse partner.
    pub fn same_variant(&self, other: &RelationKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::Transitive => write!(f, "transitive"),
            RelationKind::Symmetric => write!(f, "symmetric"),
            RelationKind::Inverse { inverse_name } => write!(f, "inverse of {}", inverse_name),
            RelationKind::Custom => write!(f, "custom"),
        }
    }
}

/// A named relation and its algebraic property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDefinition {
    /// The predicate name this definition applies to.
    pub name: String,
    /// The relation's algebraic property.
    #[serde(flatten)]
    pub kind: RelationKind,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

impl RelationDefinition {
    /// Creates a definition of the given kind.
    pub fn new(name: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
        }
    }

    /// Creates a transitive relation definition.
    pub fn transitive(name: impl Into<String>) -> Self {
        Self::new(name, RelationKind::Transitive)
    }

    /// Creates a symmetric relation definition.
    pub fn symmetric(name: impl Into<String>) -> Self {
        Self::new(name, RelationKind::Symmetric)
    }

    /// Creates a relation definition paired with the named inverse.
    pub fn inverse(name: impl Into<String>, inverse_name: impl Into<String>) -> Self {
        Self::new(
            name,
            RelationKind::Inverse {
                inverse_name: inverse_name.into(),
            },
        )
    }

    /// Creates a relation definition with no built-in algebra.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(name, RelationKind::Custom)
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the declared inverse partner, if this is an inverse-kind definition.
    pub fn inverse_name(&self) -> Option<&str> {
        match &self.kind {
            RelationKind::Inverse { inverse_name } => Some(inverse_name),
            _ => None,
        }
    }
}

/// Registry of relation definitions, keyed by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct RelationRegistry {
    relations: IndexMap<String, RelationDefinition>,
}

impl RelationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with the default catalog of transitive,
    /// symmetric and inverse relations.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, description) in DEFAULT_TRANSITIVE {
            registry.insert(RelationDefinition::transitive(*name).with_description(*description));
        }
        for (name, description) in DEFAULT_SYMMETRIC {
            registry.insert(RelationDefinition::symmetric(*name).with_description(*description));
        }
        for (name, inverse, description) in DEFAULT_INVERSE {
            registry.insert(
                RelationDefinition::inverse(*name, *inverse).with_description(*description),
            );
            registry.insert(
                RelationDefinition::inverse(*inverse, *name)
                    .with_description(format!("Inverse of {}", name)),
            );
        }
        registry
    }

    /// Registers a relation definition.
    ///
    /// Registering an identical definition again is a no-op. For an
    /// inverse-kind definition the reciprocal entry is created when missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRelation`] for an empty name or an inverse
    /// that names itself, and [`Error::RelationConflict`] when the definition
    /// would break an existing inverse pairing.
    pub fn register(&mut self, def: RelationDefinition) -> Result<()> {
        if def.name.is_empty() {
            return Err(Error::InvalidRelation("relation name is empty".to_string()));
        }

        if self.relations.get(&def.name) == Some(&def) {
            return Ok(());
        }

        // An existing pairing must not be silently broken from either side.
        if let Some(existing) = self.relations.get(&def.name) {
            if let Some(old_partner) = existing.inverse_name() {
                let paired_back = self
                    .relations
                    .get(old_partner)
                    .and_then(|p| p.inverse_name())
                    == Some(def.name.as_str());
                if paired_back && def.inverse_name() != Some(old_partner) {
                    return Err(Error::RelationConflict {
                        name: def.name.clone(),
                        existing: existing.kind.to_string(),
                        requested: def.kind.to_string(),
                    });
                }
            }
        }

        if let Some(partner) = def.inverse_name() {
            if partner.is_empty() {
                return Err(Error::InvalidRelation(format!(
                    "inverse relation '{}' has an empty inverse name",
                    def.name
                )));
            }
            if partner == def.name {
                return Err(Error::InvalidRelation(format!(
                    "relation '{}' cannot be its own inverse; declare it symmetric",
                    def.name
                )));
            }

            match self.relations.get(partner) {
                Some(existing) if existing.inverse_name() == Some(def.name.as_str()) => {}
                Some(existing) => {
                    return Err(Error::RelationConflict {
                        name: partner.to_string(),
                        existing: existing.kind.to_string(),
                        requested: format!("inverse of {}", def.name),
                    });
                }
                None => {
                    let reciprocal = RelationDefinition::inverse(partner, def.name.clone())
                        .with_description(format!("Inverse of {}", def.name));
                    debug!("Registering reciprocal relation: {}", reciprocal.name);
                    self.insert(reciprocal);
                }
            }
        }

        debug!("Registering relation: {} ({})", def.name, def.kind);
        self.insert(def);
        Ok(())
    }

    fn insert(&mut self, def: RelationDefinition) {
        self.relations.insert(def.name.clone(), def);
    }

    /// Looks up a relation by name.
    pub fn get(&self, name: &str) -> Option<&RelationDefinition> {
        self.relations.get(name)
    }

    /// Returns every relation of the same variant as `kind`, in registration order.
    ///
    /// The inverse partner carried by `RelationKind::Inverse` is ignored.
    pub fn get_by_kind(&self, kind: &RelationKind) -> Vec<&RelationDefinition> {
        self.relations
            .values()
            .filter(|def| def.kind.same_variant(kind))
            .collect()
    }

    /// Returns `true` if the relation is registered as transitive.
    pub fn is_transitive(&self, name: &str) -> bool {
        matches!(
            self.get(name).map(|d| &d.kind),
            Some(RelationKind::Transitive)
        )
    }

    /// Returns `true` if the relation is registered as symmetric.
    pub fn is_symmetric(&self, name: &str) -> bool {
        matches!(
            self.get(name).map(|d| &d.kind),
            Some(RelationKind::Symmetric)
        )
    }

    /// Returns `true` if the relation has an inverse (symmetric relations are their own).
    pub fn has_inverse(&self, name: &str) -> bool {
        self.get_inverse(name).is_some()
    }

    /// Returns the inverse of a relation.
    ///
    /// Symmetric relations return their own name, inverse relations return
    /// their declared partner, everything else returns `None`.
    pub fn get_inverse(&self, name: &str) -> Option<&str> {
        let def = self.get(name)?;
        match &def.kind {
            RelationKind::Symmetric => Some(def.name.as_str()),
            RelationKind::Inverse { inverse_name } => Some(inverse_name.as_str()),
            _ => None,
        }
    }

    /// Iterates over all definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RelationDefinition> {
        self.relations.values()
    }

    /// Returns the registered relation names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.relations.keys().map(String::as_str).collect()
    }

    /// Number of registered relations.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Returns `true` if no relations are registered.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let registry = RelationRegistry::with_defaults();
        assert!(registry.is_transitive("partOf"));
        assert!(registry.is_transitive("ancestorOf"));
        assert!(registry.is_symmetric("marriedTo"));
        assert_eq!(registry.get_inverse("parentOf"), Some("childOf"));
        assert_eq!(registry.get_inverse("containedIn"), Some("contains"));
        // 5 transitive + 5 symmetric + 6 pairs
        assert_eq!(registry.len(), 22);
    }

    #[test]
    fn test_inverse_registers_reciprocal() {
        let mut registry = RelationRegistry::new();
        registry
            .register(RelationDefinition::inverse("teaches", "taughtBy"))
            .unwrap();

        let reciprocal = registry.get("taughtBy").unwrap();
        assert_eq!(reciprocal.inverse_name(), Some("teaches"));
        assert_eq!(reciprocal.description, "Inverse of teaches");
        assert!(registry.has_inverse("taughtBy"));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = RelationRegistry::with_defaults();
        let before = registry.len();
        registry
            .register(RelationDefinition::transitive("partOf").with_description("X is a part of Y"))
            .unwrap();
        registry
            .register(
                RelationDefinition::inverse("parentOf", "childOf")
                    .with_description("X is a parent of Y"),
            )
            .unwrap();
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn test_symmetric_is_own_inverse() {
        let registry = RelationRegistry::with_defaults();
        assert_eq!(registry.get_inverse("knows"), Some("knows"));
        assert!(registry.has_inverse("knows"));
        assert_eq!(registry.get_inverse("partOf"), None);
        assert!(!registry.has_inverse("partOf"));
    }

    #[test]
    fn test_unknown_names_yield_absence() {
        let registry = RelationRegistry::with_defaults();
        assert!(registry.get("unknown").is_none());
        assert!(!registry.is_transitive("unknown"));
        assert!(!registry.is_symmetric("unknown"));
        assert_eq!(registry.get_inverse("unknown"), None);
    }

    #[test]
    fn test_get_by_kind() {
        let registry = RelationRegistry::with_defaults();
        let transitive = registry.get_by_kind(&RelationKind::Transitive);
        assert_eq!(transitive.len(), 5);
        let inverse = registry.get_by_kind(&RelationKind::Inverse {
            inverse_name: String::new(),
        });
        assert_eq!(inverse.len(), 12);
        assert!(registry.get_by_kind(&RelationKind::Custom).is_empty());
    }

    #[test]
    fn test_inverse_conflict_is_rejected() {
        let mut registry = RelationRegistry::new();
        registry
            .register(RelationDefinition::transitive("above"))
            .unwrap();

        let err = registry
            .register(RelationDefinition::inverse("below", "above"))
            .unwrap_err();
        assert!(matches!(err, Error::RelationConflict { .. }));
        assert!(registry.get("below").is_none());
    }

    #[test]
    fn test_breaking_existing_pair_is_rejected() {
        let mut registry = RelationRegistry::with_defaults();
        let err = registry
            .register(RelationDefinition::transitive("childOf"))
            .unwrap_err();
        assert!(matches!(err, Error::RelationConflict { .. }));
        assert_eq!(registry.get_inverse("childOf"), Some("parentOf"));
    }

    #[test]
    fn test_invalid_definitions() {
        let mut registry = RelationRegistry::new();
        assert!(matches!(
            registry.register(RelationDefinition::transitive("")),
            Err(Error::InvalidRelation(_))
        ));
        assert!(matches!(
            registry.register(RelationDefinition::inverse("self", "self")),
            Err(Error::InvalidRelation(_))
        ));
    }

    #[test]
    fn test_definition_serde() {
        let def = RelationDefinition::inverse("owns", "ownedBy");
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["kind"], "inverse");
        assert_eq!(json["inverse_name"], "ownedBy");

        let parsed: RelationDefinition =
            serde_json::from_str(r#"{"name": "partOf", "kind": "transitive"}"#).unwrap();
        assert_eq!(parsed.kind, RelationKind::Transitive);
    }
}

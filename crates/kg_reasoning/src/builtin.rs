//! Built-in rule templates and the generic rule catalog.
//!
//! The templates turn a relation's algebraic property into inference rules:
//! - Transitive: `?x R ?y ∧ ?y R ?z ⟹ ?x R ?z`
//! - Symmetric: `?x R ?y ⟹ ?y R ?x`
//! - Inverse: `?x R ?y ⟹ ?y R' ?x`
//!
//! Rule IDs are derived from the relation names and are distinct for distinct
//! `(kind, relation, partner)` triples, whatever characters the names contain.

use crate::pattern::{Term, TriplePattern};
use crate::relation::{RelationDefinition, RelationKind};
use crate::rule::InferenceRule;

/// Priority given to rules synthesized from relation definitions.
pub const RELATION_RULE_PRIORITY: i32 = 50;

/// A collection of pre-defined rules and rule templates.
pub struct BuiltinRules;

/// Escapes the separator so that an inverse rule ID splits back into exactly
/// one `(relation, partner)` pair.
fn escape_name(name: &str) -> String {
    name.replace('\\', "\\\\").replace('/', "\\/")
}

fn triple(subject: &str, predicate: &str, object: &str) -> TriplePattern {
    TriplePattern::new(Term::var(subject), Term::lit(predicate), Term::var(object))
}

impl BuiltinRules {
    /// Two-condition transitive closure over `relation`.
    pub fn transitive(relation: &str) -> InferenceRule {
        InferenceRule::builder(format!("transitive_{}", relation))
            .name(format!("Transitive {}", relation))
            .description(format!(
                "If A {r} B, and B {r} C, then A {r} C.",
                r = relation
            ))
            .when(triple("x", relation, "y"))
            .when(triple("y", relation, "z"))
            .then(triple("x", relation, "z"))
            .priority(RELATION_RULE_PRIORITY)
            .build()
    }

    /// Symmetry of `relation`.
    pub fn symmetric(relation: &str) -> InferenceRule {
        InferenceRule::builder(format!("symmetric_{}", relation))
            .name(format!("Symmetric {}", relation))
            .description(format!("If A {r} B, then B {r} A.", r = relation))
            .when(triple("x", relation, "y"))
            .then(triple("y", relation, "x"))
            .priority(RELATION_RULE_PRIORITY)
            .build()
    }

    /// One direction of an inverse pair: `relation` implies `inverse` reversed.
    ///
    /// The ID is `inverse_{relation}/{inverse}` with `\` and `/` escaped in
    /// both names.
    pub fn inverse(relation: &str, inverse: &str) -> InferenceRule {
        let id = format!("inverse_{}/{}", escape_name(relation), escape_name(inverse));
        InferenceRule::builder(id)
            .name(format!("Inverse {}/{}", relation, inverse))
            .description(format!("If A {} B, then B {} A.", relation, inverse))
            .when(triple("x", relation, "y"))
            .then(triple("y", inverse, "x"))
            .priority(RELATION_RULE_PRIORITY)
            .build()
    }

    /// Synthesizes the rules licensed by one relation definition.
    ///
    /// An inverse pair yields its forward rule here; the backward rule comes
    /// from the reciprocal definition.
    pub fn for_relation(def: &RelationDefinition) -> Vec<InferenceRule> {
        match &def.kind {
            RelationKind::Transitive => vec![Self::transitive(&def.name)],
            RelationKind::Symmetric => vec![Self::symmetric(&def.name)],
            RelationKind::Inverse { inverse_name } => vec![Self::inverse(&def.name, inverse_name)],
            RelationKind::Custom => Vec::new(),
        }
    }

    /// Generic rules that do not come from a single relation's algebra.
    pub fn catalog() -> Vec<InferenceRule> {
        vec![
            InferenceRule::builder("type_inheritance")
                .name("Subclass Type Inference")
                .description(
                    "If A is of type B, and B is a subclass of C, then A is also of type C.",
                )
                .when(triple("x", "type", "c"))
                .when(triple("c", "subclassOf", "d"))
                .then(triple("x", "type", "d"))
                .priority(60)
                .build(),
            InferenceRule::builder("located_in_part_of")
                .name("Location Through Containment")
                .description("If A is located in B, and B is part of C, then A is located in C.")
                .when(triple("x", "locatedIn", "y"))
                .when(triple("y", "partOf", "z"))
                .then(triple("x", "locatedIn", "z"))
                .priority(40)
                .build(),
        ]
    }
}

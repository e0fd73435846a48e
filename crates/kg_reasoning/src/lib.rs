//! KG Reasoning - Semantic Reasoning Core for Knowledge-Graph Claims
//!
//! This crate derives new facts from a set of `(subject, predicate, object)`
//! facts. Relations carry algebraic properties (transitive, symmetric,
//! inverse) that are turned into inference rules, user rules join over the
//! fact set, and the resulting closure is checked for contradictions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Reasoner                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │              Relation Registry                       │   │
//! │  │  Transitive │ Symmetric │ Inverse │ Custom           │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │ BuiltinRules                    │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │              Rule Engine                             │   │
//! │  │  Pattern Matching │ Join │ Forward Chaining          │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                 │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │              Contradiction Detector                  │   │
//! │  │  Mutual Exclusion │ Single-Valued │ Resolution       │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use kg_reasoning::{Fact, Reasoner};
//!
//! let reasoner = Reasoner::new();
//! let facts = vec![
//!     Fact::new("wheel", "partOf", "car"),
//!     Fact::new("car", "partOf", "fleet"),
//! ];
//!
//! let result = reasoner.infer_default(&facts);
//! assert!(result.facts().contains(&Fact::new("wheel", "partOf", "fleet")));
//! assert!(result.is_consistent());
//! ```

pub mod builtin;
pub mod config;
pub mod contradiction;
pub mod engine;
pub mod error;
pub mod fact;
pub mod pattern;
pub mod reasoner;
pub mod relation;
pub mod rule;

// Re-exports
pub use builtin::BuiltinRules;
pub use config::ReasonerConfig;
pub use contradiction::{
    Contradiction, ContradictionDetector, ContradictionKind, MutualExclusionRule,
    ResolutionContext, ResolutionStrategy, ResolutionSuggestion, SingleValuedRule,
};
pub use engine::{
    ChainOptions, ChainStats, Derivation, Explanation, ForwardChainResult, InferredFact,
    RuleEngine, RuleMatch, DEFAULT_MAX_ITERATIONS,
};
pub use error::{Error, Result};
pub use fact::Fact;
pub use pattern::{apply_bindings, match_condition, Bindings, Term, TriplePattern};
pub use reasoner::{InferenceResult, Reasoner};
pub use relation::{RelationDefinition, RelationKind, RelationRegistry};
pub use rule::{InferenceRule, RuleBuilder, RuleRegistry};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

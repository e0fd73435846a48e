//! The reasoner facade.
//!
//! A [`Reasoner`] owns a relation registry, a rule engine and a contradiction
//! detector. Rules are synthesized from every registered relation, so
//! declaring `partOf` transitive is enough for chains of `partOf` facts to be
//! closed. [`Reasoner::infer`] chains the caller's facts, explains every
//! derived fact and reports contradictions across the resulting set.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::builtin::BuiltinRules;
use crate::config::ReasonerConfig;
use crate::contradiction::{Contradiction, ContradictionDetector};
use crate::engine::{ChainOptions, Explanation, ForwardChainResult, RuleEngine};
use crate::error::{Error, Result};
use crate::fact::Fact;
use crate::relation::{RelationDefinition, RelationRegistry};
use crate::rule::{InferenceRule, RuleRegistry};

/// The outcome of one inference call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// The forward-chaining result.
    pub inferred: ForwardChainResult,
    /// One explanation per derived fact, in derivation order.
    pub explanations: Vec<Explanation>,
    /// Contradictions found across input and derived facts.
    pub contradictions: Vec<Contradiction>,
}

impl InferenceResult {
    /// The complete fact set: input facts followed by derived facts.
    pub fn facts(&self) -> &[Fact] {
        &self.inferred.facts
    }

    /// Iterates over the derived facts only.
    pub fn new_facts(&self) -> impl Iterator<Item = &Fact> {
        self.inferred.new_facts()
    }

    /// Returns `true` if no contradictions were found.
    pub fn is_consistent(&self) -> bool {
        self.contradictions.is_empty()
    }

    /// Returns `true` if forward chaining reached a fixpoint.
    pub fn converged(&self) -> bool {
        self.inferred.converged
    }

    /// Finds the explanation for a derived fact.
    pub fn explain(&self, fact: &Fact) -> Option<&Explanation> {
        self.explanations.iter().find(|e| &e.fact == fact)
    }
}

/// Combines relation semantics, rules and contradiction detection.
#[derive(Debug, Clone)]
pub struct Reasoner {
    relations: RelationRegistry,
    engine: RuleEngine,
    detector: ContradictionDetector,
    options: ChainOptions,
}

impl Reasoner {
    /// Creates a reasoner seeded with the default relations, the generic rule
    /// catalog and the default contradiction constraints.
    pub fn new() -> Self {
        let relations = RelationRegistry::with_defaults();
        let mut rules = RuleRegistry::new();
        // Default relation names are unique and catalog IDs carry no template prefix.
        for rule in relations
            .iter()
            .flat_map(BuiltinRules::for_relation)
            .chain(BuiltinRules::catalog())
        {
            rules.insert(rule);
        }
        Self {
            relations,
            engine: RuleEngine::with_rules(rules),
            detector: ContradictionDetector::with_defaults(),
            options: ChainOptions::default(),
        }
    }

    /// Creates a reasoner over caller-supplied registries.
    ///
    /// Rules for every relation in `relations` are synthesized into `rules`.
    /// The detector starts empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRule`] if a caller rule already uses the ID of a
    /// synthesized rule with a different body.
    pub fn with_registries(relations: RelationRegistry, mut rules: RuleRegistry) -> Result<Self> {
        for def in relations.iter() {
            for rule in BuiltinRules::for_relation(def) {
                add_synthesized(&mut rules, rule)?;
            }
        }
        debug!(
            "Reasoner created with {} relations and {} rules",
            relations.len(),
            rules.len()
        );
        Ok(Self {
            relations,
            engine: RuleEngine::with_rules(rules),
            detector: ContradictionDetector::new(),
            options: ChainOptions::default(),
        })
    }

    /// Builds a reasoner from a validated configuration.
    pub fn from_config(config: &ReasonerConfig) -> Result<Self> {
        config.validate()?;

        let mut relations = if config.seed_default_relations {
            RelationRegistry::with_defaults()
        } else {
            RelationRegistry::new()
        };
        for def in &config.relations {
            relations.register(def.clone())?;
        }

        let mut rules = RuleRegistry::new();
        if config.seed_builtin_rules {
            for rule in BuiltinRules::catalog() {
                rules.register(rule)?;
            }
        }

        let mut reasoner = Self::with_registries(relations, rules)?;
        for rule in &config.rules {
            reasoner.engine.add_rule(rule.clone())?;
        }

        if config.seed_default_constraints {
            reasoner.detector = ContradictionDetector::with_defaults();
        }
        for exclusion in &config.mutual_exclusions {
            reasoner.detector.add_mutual_exclusion(exclusion.clone())?;
        }
        for single in &config.single_valued {
            reasoner.detector.add_single_valued(single.clone())?;
        }

        reasoner.options = ChainOptions::with_max_iterations(config.max_iterations);
        Ok(reasoner)
    }

    /// Replaces the contradiction detector.
    pub fn with_detector(mut self, detector: ContradictionDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Replaces the default chaining options used by [`Reasoner::infer_default`].
    pub fn with_options(mut self, options: ChainOptions) -> Self {
        self.options = options;
        self
    }

    /// Declares a relation and synthesizes the rules it licenses.
    ///
    /// For an inverse pair the rules of both directions are added. When a
    /// relation's kind changes, the rules of its previous kind are removed.
    /// On error neither registry is changed.
    ///
    /// # Errors
    ///
    /// Returns the relation registry's error for an invalid or conflicting
    /// definition, and [`Error::InvalidRule`] if a synthesized rule ID already
    /// holds a different rule.
    pub fn register_relation(&mut self, def: RelationDefinition) -> Result<()> {
        let mut relations = self.relations.clone();
        let mut rules = self.engine.rules().clone();

        let previous = relations.get(&def.name).cloned();
        relations.register(def.clone())?;

        if let Some(previous) = previous.filter(|p| *p != def) {
            for stale in BuiltinRules::for_relation(&previous) {
                rules.unregister(&stale.id);
            }
        }

        let mut names = vec![def.name.clone()];
        if let Some(partner) = def.inverse_name() {
            names.push(partner.to_string());
        }
        for name in names {
            if let Some(registered) = relations.get(&name) {
                for rule in BuiltinRules::for_relation(registered) {
                    add_synthesized(&mut rules, rule)?;
                }
            }
        }

        self.relations = relations;
        *self.engine.rules_mut() = rules;
        Ok(())
    }

    /// Registers a caller-defined rule.
    pub fn register_rule(&mut self, rule: InferenceRule) -> Result<()> {
        self.engine.add_rule(rule)
    }

    /// The relation registry.
    pub fn relations(&self) -> &RelationRegistry {
        &self.relations
    }

    /// The rule registry.
    pub fn rules(&self) -> &RuleRegistry {
        self.engine.rules()
    }

    /// Mutable access to the rule registry, e.g. to disable a rule.
    pub fn rules_mut(&mut self) -> &mut RuleRegistry {
        self.engine.rules_mut()
    }

    /// The rule engine.
    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// The contradiction detector.
    pub fn detector(&self) -> &ContradictionDetector {
        &self.detector
    }

    /// Mutable access to the contradiction detector.
    pub fn detector_mut(&mut self) -> &mut ContradictionDetector {
        &mut self.detector
    }

    /// The chaining options used by [`Reasoner::infer_default`].
    pub fn options(&self) -> &ChainOptions {
        &self.options
    }

    /// Forward-chains `facts`, explains the derived facts and checks the
    /// resulting set for contradictions.
    ///
    /// `facts` is never modified.
    pub fn infer(&self, facts: &[Fact], options: &ChainOptions) -> InferenceResult {
        let inferred = self.engine.forward_chain(facts, options);
        let explanations: Vec<Explanation> =
            inferred.inferred.iter().map(Explanation::from).collect();
        let contradictions = self.detector.detect(&inferred.facts);

        info!(
            "Inference complete: {} derived facts, {} contradictions",
            inferred.new_facts_count,
            contradictions.len()
        );

        InferenceResult {
            inferred,
            explanations,
            contradictions,
        }
    }

    /// Runs [`Reasoner::infer`] with the reasoner's configured options.
    pub fn infer_default(&self, facts: &[Fact]) -> InferenceResult {
        self.infer(facts, &self.options)
    }

    /// Checks a fact set for contradictions without inferring anything.
    pub fn check_consistency(&self, facts: &[Fact]) -> Vec<Contradiction> {
        self.detector.detect(facts)
    }
}

/// Adds a rule synthesized from a relation.
///
/// Re-adding a rule with the same conditions and conclusions leaves the
/// registered one in place, including its enabled flag.
fn add_synthesized(rules: &mut RuleRegistry, rule: InferenceRule) -> Result<()> {
    match rules.get(&rule.id) {
        Some(existing)
            if existing.conditions == rule.conditions
                && existing.conclusions == rule.conclusions =>
        {
            Ok(())
        }
        Some(_) => Err(Error::InvalidRule(format!(
            "rule id '{}' is already registered with a different body",
            rule.id
        ))),
        None => rules.register(rule),
    }
}

impl Default for Reasoner {
    fn default() -> Self {
        Self::new()
    }
}

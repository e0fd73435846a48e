//! Rule engine: multi-condition matching and forward chaining to a fixpoint.
//!
//! Matching is a left-to-right nested-loop join. Starting from one empty
//! binding, each condition extends every live binding with every fact that
//! unifies with it. Conditions sharing a variable are thereby constrained to
//! consistent values, which is how a transitive rule links two facts through
//! their common middle term.

use std::collections::HashSet;
use std::fmt;

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fact::{self, Fact};
use crate::pattern::{apply_bindings, match_condition, Bindings};
use crate::rule::{InferenceRule, RuleRegistry};

/// Default bound on forward-chaining rounds.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Options controlling a forward-chaining run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainOptions {
    /// Maximum number of rounds before the run stops with a partial result.
    pub max_iterations: usize,
}

impl ChainOptions {
    /// Creates options with the given iteration bound.
    pub fn with_max_iterations(max_iterations: usize) -> Self {
        Self { max_iterations }
    }
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// A complete match of one rule against the fact set.
#[derive(Debug, Clone)]
pub struct RuleMatch<'a> {
    /// The rule whose conditions were all satisfied.
    pub rule: &'a InferenceRule,
    /// The completed bindings.
    pub bindings: Bindings,
    /// The fact that satisfied each condition, in condition order.
    pub premises: Vec<&'a Fact>,
}

/// How an inferred fact was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
    /// ID of the rule that produced the fact.
    pub rule_id: String,
    /// Display name of that rule.
    pub rule_name: String,
    /// The bindings under which the rule fired.
    pub bindings: Bindings,
    /// The facts that satisfied the rule's conditions.
    pub premises: Vec<Fact>,
    /// The round (1-based) in which the fact was first derived.
    pub iteration: usize,
}

/// A fact produced by forward chaining, together with its first derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredFact {
    pub fact: Fact,
    pub derivation: Derivation,
}

/// A human-readable account of why an inferred fact holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    /// The inferred fact.
    pub fact: Fact,
    /// ID of the rule that derived it.
    pub rule_id: String,
    /// The round in which it was derived.
    pub iteration: usize,
    /// The supporting facts.
    pub premises: Vec<Fact>,
    /// Rendered explanation text.
    pub text: String,
}

impl From<&InferredFact> for Explanation {
    fn from(inferred: &InferredFact) -> Self {
        let d = &inferred.derivation;
        let premises = d
            .premises
            .iter()
            .map(Fact::to_string)
            .collect::<Vec<_>>()
            .join(" and ");
        let text = format!(
            "{} follows from {} by rule '{}' with {}",
            inferred.fact, premises, d.rule_name, d.bindings
        );
        Self {
            fact: inferred.fact.clone(),
            rule_id: d.rule_id.clone(),
            iteration: d.iteration,
            premises: d.premises.clone(),
            text,
        }
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Counters collected during one forward-chaining run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStats {
    /// Rule evaluations across all rounds.
    pub rules_evaluated: usize,
    /// Complete rule matches across all rounds.
    pub matches_found: usize,
    /// Instantiated conclusions that were already known.
    pub redundant_derivations: usize,
}

/// The result of a forward-chaining run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardChainResult {
    /// The final deduplicated fact set: input facts first, then derived facts.
    pub facts: Vec<Fact>,
    /// Total number of facts derived across all rounds.
    pub new_facts_count: usize,
    /// Rounds actually performed.
    pub iterations: usize,
    /// `false` when the iteration bound was hit before a fixpoint.
    pub converged: bool,
    /// Every derived fact with its derivation, in explanation order.
    pub inferred: Vec<InferredFact>,
    /// Run counters.
    pub stats: ChainStats,
}

impl ForwardChainResult {
    /// Returns `true` if the run stopped before reaching a fixpoint.
    pub fn is_partial(&self) -> bool {
        !self.converged
    }

    /// Checks whether a fact is in the final set.
    pub fn contains(&self, fact: &Fact) -> bool {
        self.facts.contains(fact)
    }

    /// Iterates over the derived facts only.
    pub fn new_facts(&self) -> impl Iterator<Item = &Fact> {
        self.inferred.iter().map(|i| &i.fact)
    }

    /// Converts a partial result into [`Error::NotConverged`].
    pub fn into_converged(self) -> Result<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(Error::NotConverged {
                iterations: self.iterations,
            })
        }
    }
}

/// Joins rules against fact sets and runs forward chaining.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: RuleRegistry,
}

impl RuleEngine {
    /// Creates an engine with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine over the given rule registry.
    pub fn with_rules(rules: RuleRegistry) -> Self {
        Self { rules }
    }

    /// The engine's rules.
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// Mutable access to the engine's rules.
    pub fn rules_mut(&mut self) -> &mut RuleRegistry {
        &mut self.rules
    }

    /// Registers a rule with the engine.
    pub fn add_rule(&mut self, rule: InferenceRule) -> Result<()> {
        self.rules.register(rule)
    }

    /// Finds every `(rule, bindings)` pair for which all of the rule's
    /// conditions are jointly satisfiable against `facts`.
    ///
    /// Rules are visited in priority order.
    pub fn find_matches<'a>(&'a self, facts: &'a [Fact]) -> Vec<RuleMatch<'a>> {
        let mut matches = Vec::new();
        for rule in self.rules.get_all() {
            trace!("Evaluating rule: {}", rule.id);
            matches.extend(join_conditions(rule, facts));
        }
        matches
    }

    /// Forward-chains `facts` to a fixpoint or until `options.max_iterations`
    /// rounds have run.
    ///
    /// Each round matches every enabled rule against the current working set
    /// and stages the instantiated conclusions that are not yet known. A round
    /// that stages nothing ends the run. The input slice is never modified.
    pub fn forward_chain(&self, facts: &[Fact], options: &ChainOptions) -> ForwardChainResult {
        let mut working: Vec<Fact> = fact::dedup(facts).into_iter().collect();
        let mut known: HashSet<Fact> = working.iter().cloned().collect();
        let mut result = ForwardChainResult::default();

        if working.is_empty() || self.rules.get_all().is_empty() {
            result.facts = working;
            result.converged = true;
            return result;
        }

        while result.iterations < options.max_iterations {
            result.iterations += 1;
            let round = result.iterations;
            let mut staged: Vec<InferredFact> = Vec::new();
            let mut staged_keys: HashSet<Fact> = HashSet::new();

            result.stats.rules_evaluated += self.rules.get_all().len();
            for m in self.find_matches(&working) {
                result.stats.matches_found += 1;
                for conclusion in &m.rule.conclusions {
                    // Unbound conclusion variables mean this branch does not fire.
                    let Some(derived) = apply_bindings(conclusion, &m.bindings) else {
                        continue;
                    };
                    if known.contains(&derived) || !staged_keys.insert(derived.clone()) {
                        result.stats.redundant_derivations += 1;
                        continue;
                    }
                    debug!("Forward chain inferred: {} via {}", derived, m.rule.id);
                    staged.push(InferredFact {
                        fact: derived,
                        derivation: Derivation {
                            rule_id: m.rule.id.clone(),
                            rule_name: m.rule.display_name().to_string(),
                            bindings: m.bindings.clone(),
                            premises: m.premises.iter().map(|f| (*f).clone()).collect(),
                            iteration: round,
                        },
                    });
                }
            }

            if staged.is_empty() {
                result.converged = true;
                break;
            }

            for inferred in &staged {
                known.insert(inferred.fact.clone());
                working.push(inferred.fact.clone());
            }
            result.new_facts_count += staged.len();
            result.inferred.extend(staged);
        }

        if !result.converged {
            warn!(
                "Forward chaining stopped at {} iterations without reaching a fixpoint",
                result.iterations
            );
        }
        info!(
            "Forward chaining finished: {} facts, {} new, {} iterations",
            working.len(),
            result.new_facts_count,
            result.iterations
        );

        result.facts = working;
        result
    }
}

/// Left-to-right nested-loop join of a rule's conditions over `facts`.
fn join_conditions<'a>(rule: &'a InferenceRule, facts: &'a [Fact]) -> Vec<RuleMatch<'a>> {
    let mut partial: Vec<(Bindings, Vec<&'a Fact>)> = vec![(Bindings::new(), Vec::new())];

    for condition in &rule.conditions {
        let mut extended = Vec::new();
        for (bindings, premises) in &partial {
            for fact in facts {
                if let Some(next) = match_condition(condition, fact, bindings) {
                    let mut support = premises.clone();
                    support.push(fact);
                    extended.push((next, support));
                }
            }
        }
        if extended.is_empty() {
            return Vec::new();
        }
        partial = extended;
    }

    partial
        .into_iter()
        .map(|(bindings, premises)| RuleMatch {
            rule,
            bindings,
            premises,
        })
        .collect()
}

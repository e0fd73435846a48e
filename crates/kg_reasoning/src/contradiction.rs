//! Contradiction detection over a fact set.
//!
//! The detector checks two kinds of configured constraint:
//! - **Mutual exclusion**: two predicates that must not both hold for the
//!   same subject (and, when object-scoped, the same object).
//! - **Single-valued**: a predicate for which a subject may have at most one
//!   distinct object.
//!
//! Contradictions are reported, never raised, and the fact set is never
//! modified. [`ContradictionDetector::suggest_resolution`] only advises; the
//! caller decides what to do with the authoritative store.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fact::{self, Fact};

/// Object-scoped exclusive predicate pairs seeded by [`ContradictionDetector::with_defaults`].
const DEFAULT_EXCLUSIONS: &[(&str, &str)] = &[
    ("is", "is_not"),
    ("has", "lacks"),
    ("enables", "disables"),
    ("allows", "forbids"),
    ("alive", "dead"),
];

/// Single-valued predicates seeded by [`ContradictionDetector::with_defaults`].
const DEFAULT_SINGLE_VALUED: &[&str] = &["bornIn", "birthDate"];

/// Two predicates that must not both hold for the same subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutualExclusionRule {
    /// First predicate of the pair.
    pub predicate_a: String,
    /// Second predicate of the pair.
    pub predicate_b: String,
    /// When `true`, only facts that also share the object conflict.
    #[serde(default)]
    pub same_object: bool,
    /// Optional human-readable description.
    #[serde(default)]
    pub description: String,
}

impl MutualExclusionRule {
    /// Creates a subject-scoped exclusion.
    pub fn new(predicate_a: impl Into<String>, predicate_b: impl Into<String>) -> Self {
        Self {
            predicate_a: predicate_a.into(),
            predicate_b: predicate_b.into(),
            same_object: false,
            description: String::new(),
        }
    }

    /// Restricts the exclusion to facts that share the object too.
    pub fn object_scoped(mut self) -> Self {
        self.same_object = true;
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A predicate for which a subject may have at most one distinct object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleValuedRule {
    /// The single-valued predicate.
    pub predicate: String,
    /// Optional human-readable description.
    #[serde(default)]
    pub description: String,
}

impl SingleValuedRule {
    /// Creates a single-valued constraint on `predicate`.
    pub fn new(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            description: String::new(),
        }
    }
}

/// The kind of constraint a contradiction violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionKind {
    /// Both predicates of an exclusive pair hold.
    MutualExclusion,
    /// A single-valued predicate has more than one object.
    SingleValued,
}

impl fmt::Display for ContradictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContradictionKind::MutualExclusion => write!(f, "mutual_exclusion"),
            ContradictionKind::SingleValued => write!(f, "single_valued"),
        }
    }
}

/// A set of facts violating one configured constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contradiction {
    /// The violated constraint kind.
    pub kind: ContradictionKind,
    /// The subject all involved facts share.
    pub subject: String,
    /// The facts involved, in input order.
    pub facts: Vec<Fact>,
    /// Human-readable description.
    pub description: String,
}

impl Contradiction {
    /// Distinct objects across the involved facts, in input order.
    pub fn objects(&self) -> Vec<&str> {
        let objects: IndexSet<&str> = self.facts.iter().map(|f| f.object.as_str()).collect();
        objects.into_iter().collect()
    }

    /// Generates a multi-line explanation listing every involved fact.
    pub fn explain(&self) -> String {
        let mut out = format!("Contradiction detected ({}):\n", self.kind);
        for (i, f) in self.facts.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, f));
        }
        out.push_str(&format!("  Reason: {}", self.description));
        out
    }

    /// Returns `true` if `candidate` conflicts with `winner` under this contradiction.
    fn conflicts_with(&self, winner: &Fact, candidate: &Fact) -> bool {
        match self.kind {
            ContradictionKind::MutualExclusion => candidate.predicate != winner.predicate,
            ContradictionKind::SingleValued => candidate.object != winner.object,
        }
    }
}

/// Advisory strategies for resolving a contradiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Keep the fact with the latest timestamp.
    KeepMostRecent,
    /// Keep the fact whose source has the highest priority.
    KeepHighestPrioritySource,
    /// Leave every fact in place and ask a human.
    FlagForReview,
}

/// Caller-supplied metadata about facts, used to rank them during resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    timestamps: HashMap<Fact, DateTime<Utc>>,
    source_priorities: HashMap<Fact, i32>,
}

impl ResolutionContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records when a fact was asserted.
    pub fn with_timestamp(mut self, fact: Fact, at: DateTime<Utc>) -> Self {
        self.timestamps.insert(fact, at);
        self
    }

    /// Records the priority of the source a fact came from.
    pub fn with_source_priority(mut self, fact: Fact, priority: i32) -> Self {
        self.source_priorities.insert(fact, priority);
        self
    }
}

/// An advisory resolution. Nothing is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSuggestion {
    /// The strategy that produced this suggestion.
    pub strategy: ResolutionStrategy,
    /// Facts the strategy would keep.
    pub keep: Vec<Fact>,
    /// Facts the strategy would retract.
    pub retract: Vec<Fact>,
    /// `true` when a human needs to decide.
    pub needs_review: bool,
    /// Why the suggestion was made.
    pub rationale: String,
}

impl ResolutionSuggestion {
    fn review(
        strategy: ResolutionStrategy,
        contradiction: &Contradiction,
        rationale: String,
    ) -> Self {
        Self {
            strategy,
            keep: contradiction.facts.clone(),
            retract: Vec::new(),
            needs_review: true,
            rationale,
        }
    }
}

/// Scans fact sets for configured logical inconsistencies.
#[derive(Debug, Clone, Default)]
pub struct ContradictionDetector {
    mutual_exclusions: Vec<MutualExclusionRule>,
    single_valued: Vec<SingleValuedRule>,
}

impl ContradictionDetector {
    /// Creates a detector with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detector seeded with the default exclusive pairs and
    /// single-valued predicates.
    pub fn with_defaults() -> Self {
        Self {
            mutual_exclusions: DEFAULT_EXCLUSIONS
                .iter()
                .map(|(a, b)| {
                    MutualExclusionRule::new(*a, *b)
                        .object_scoped()
                        .with_description(format!("{} contradicts {}", a, b))
                })
                .collect(),
            single_valued: DEFAULT_SINGLE_VALUED
                .iter()
                .map(|p| SingleValuedRule::new(*p))
                .collect(),
        }
    }

    /// Adds a mutual-exclusion constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a predicate is empty or both are the same.
    pub fn add_mutual_exclusion(&mut self, rule: MutualExclusionRule) -> Result<()> {
        if rule.predicate_a.is_empty() || rule.predicate_b.is_empty() {
            return Err(Error::Config(
                "mutual exclusion predicates must be non-empty".to_string(),
            ));
        }
        if rule.predicate_a == rule.predicate_b {
            return Err(Error::Config(format!(
                "predicate '{}' cannot exclude itself",
                rule.predicate_a
            )));
        }
        debug!(
            "Adding mutual exclusion: {} / {}",
            rule.predicate_a, rule.predicate_b
        );
        self.mutual_exclusions.push(rule);
        Ok(())
    }

    /// Adds a single-valued constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the predicate is empty.
    pub fn add_single_valued(&mut self, rule: SingleValuedRule) -> Result<()> {
        if rule.predicate.is_empty() {
            return Err(Error::Config(
                "single-valued predicate must be non-empty".to_string(),
            ));
        }
        debug!("Adding single-valued predicate: {}", rule.predicate);
        self.single_valued.push(rule);
        Ok(())
    }

    /// The configured mutual-exclusion constraints.
    pub fn mutual_exclusions(&self) -> &[MutualExclusionRule] {
        &self.mutual_exclusions
    }

    /// The configured single-valued constraints.
    pub fn single_valued(&self) -> &[SingleValuedRule] {
        &self.single_valued
    }

    /// Scans `facts` and reports every violated constraint.
    ///
    /// Output order follows configuration order, then the order in which each
    /// subject first appears in the input.
    pub fn detect(&self, facts: &[Fact]) -> Vec<Contradiction> {
        let facts = fact::dedup(facts);
        let mut contradictions = Vec::new();

        for rule in &self.mutual_exclusions {
            self.detect_exclusion(rule, &facts, &mut contradictions);
        }
        for rule in &self.single_valued {
            self.detect_single_valued(rule, &facts, &mut contradictions);
        }

        if !contradictions.is_empty() {
            debug!("Detected {} contradictions", contradictions.len());
        }
        contradictions
    }

    fn detect_exclusion(
        &self,
        rule: &MutualExclusionRule,
        facts: &IndexSet<Fact>,
        out: &mut Vec<Contradiction>,
    ) {
        type Group<'a> = (Vec<&'a Fact>, Vec<&'a Fact>);
        let mut groups: IndexMap<(&str, Option<&str>), Group<'_>> = IndexMap::new();

        for f in facts {
            let is_a = f.predicate == rule.predicate_a;
            if !is_a && f.predicate != rule.predicate_b {
                continue;
            }
            let scope = rule.same_object.then_some(f.object.as_str());
            let group = groups.entry((f.subject.as_str(), scope)).or_default();
            if is_a {
                group.0.push(f);
            } else {
                group.1.push(f);
            }
        }

        for ((subject, object), (with_a, with_b)) in groups {
            if with_a.is_empty() || with_b.is_empty() {
                continue;
            }
            let description = match object {
                Some(object) => format!(
                    "{} cannot both {} and {} {}",
                    subject, rule.predicate_a, rule.predicate_b, object
                ),
                None => format!(
                    "{} cannot hold both {} and {}",
                    subject, rule.predicate_a, rule.predicate_b
                ),
            };
            out.push(Contradiction {
                kind: ContradictionKind::MutualExclusion,
                subject: subject.to_string(),
                facts: with_a.into_iter().chain(with_b).cloned().collect(),
                description,
            });
        }
    }

    fn detect_single_valued(
        &self,
        rule: &SingleValuedRule,
        facts: &IndexSet<Fact>,
        out: &mut Vec<Contradiction>,
    ) {
        let mut groups: IndexMap<&str, Vec<&Fact>> = IndexMap::new();
        for f in facts.iter().filter(|f| f.predicate == rule.predicate) {
            groups.entry(f.subject.as_str()).or_default().push(f);
        }

        for (subject, group) in groups {
            // Facts are deduplicated, so more than one fact means distinct objects.
            if group.len() < 2 {
                continue;
            }
            let values: Vec<&str> = group.iter().map(|f| f.object.as_str()).collect();
            out.push(Contradiction {
                kind: ContradictionKind::SingleValued,
                subject: subject.to_string(),
                description: format!(
                    "{} has conflicting values for single-valued {}: {}",
                    subject,
                    rule.predicate,
                    values.join(", ")
                ),
                facts: group.into_iter().cloned().collect(),
            });
        }
    }

    /// Suggests how a contradiction could be resolved.
    ///
    /// The suggestion is advisory: the fact set is not touched. When the
    /// context lacks the timestamps or source priorities the strategy needs,
    /// or the top candidates tie, the suggestion falls back to review.
    pub fn suggest_resolution(
        contradiction: &Contradiction,
        strategy: ResolutionStrategy,
        context: &ResolutionContext,
    ) -> ResolutionSuggestion {
        match strategy {
            ResolutionStrategy::FlagForReview => ResolutionSuggestion::review(
                strategy,
                contradiction,
                "flagged for manual review".to_string(),
            ),
            ResolutionStrategy::KeepMostRecent => {
                Self::keep_best(contradiction, strategy, &context.timestamps, "timestamp")
            }
            ResolutionStrategy::KeepHighestPrioritySource => Self::keep_best(
                contradiction,
                strategy,
                &context.source_priorities,
                "source priority",
            ),
        }
    }

    fn keep_best<K: Ord + Copy + fmt::Debug>(
        contradiction: &Contradiction,
        strategy: ResolutionStrategy,
        ranks: &HashMap<Fact, K>,
        what: &str,
    ) -> ResolutionSuggestion {
        let mut ranked = Vec::with_capacity(contradiction.facts.len());
        for f in &contradiction.facts {
            match ranks.get(f) {
                Some(rank) => ranked.push((f, *rank)),
                None => {
                    return ResolutionSuggestion::review(
                        strategy,
                        contradiction,
                        format!("no {} known for {}", what, f),
                    )
                }
            }
        }

        let Some(best) = ranked.iter().map(|(_, r)| *r).max() else {
            return ResolutionSuggestion::review(strategy, contradiction, "no facts".to_string());
        };
        let winners: Vec<&Fact> = ranked
            .iter()
            .filter(|(_, r)| *r == best)
            .map(|(f, _)| *f)
            .collect();
        let winner = winners[0];
        if winners
            .iter()
            .any(|w| contradiction.conflicts_with(winner, w))
        {
            return ResolutionSuggestion::review(
                strategy,
                contradiction,
                format!("conflicting facts tie on {}", what),
            );
        }

        let (retract, keep): (Vec<Fact>, Vec<Fact>) = contradiction
            .facts
            .iter()
            .cloned()
            .partition(|f| contradiction.conflicts_with(winner, f));

        ResolutionSuggestion {
            strategy,
            keep,
            retract,
            needs_review: false,
            rationale: format!("{} has the highest {} ({:?})", winner, what, best),
        }
    }
}

//! Inference rules and the registry that stores them.
//!
//! A rule has an ordered list of condition templates and a list of
//! conclusion templates. When every condition is jointly satisfied by facts in
//! the working set, each conclusion is instantiated as a new fact.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pattern::TriplePattern;

/// A forward-chaining inference rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceRule {
    /// Unique identifier for the rule.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Description of what this rule derives.
    #[serde(default)]
    pub description: String,
    /// Condition templates, joined left to right.
    pub conditions: Vec<TriplePattern>,
    /// Conclusion templates instantiated for every complete match.
    pub conclusions: Vec<TriplePattern>,
    /// Priority (higher = evaluated first). Only affects explanation order.
    #[serde(default)]
    pub priority: i32,
    /// Whether this rule is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl InferenceRule {
    /// Creates a new, empty, enabled rule.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            conditions: Vec::new(),
            conclusions: Vec::new(),
            priority: 0,
            enabled: true,
        }
    }

    /// Starts building a rule with the given ID.
    pub fn builder(id: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(id)
    }

    /// Checks that the rule can be registered.
    ///
    /// A conclusion variable that no condition binds is allowed: that
    /// conclusion just never fires.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::InvalidRule("rule id is empty".to_string()));
        }
        if self.conditions.is_empty() {
            return Err(Error::InvalidRule(format!(
                "rule '{}' has no conditions",
                self.id
            )));
        }
        if self.conclusions.is_empty() {
            return Err(Error::InvalidRule(format!(
                "rule '{}' has no conclusions",
                self.id
            )));
        }
        Ok(())
    }

    /// Returns the name, falling back to the ID when no name was given.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// A builder for creating `InferenceRule`s using a fluent API.
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    rule: InferenceRule,
}

impl RuleBuilder {
    /// Creates a new `RuleBuilder` with a given ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            rule: InferenceRule::new(id, ""),
        }
    }

    /// Sets the name for the rule being built.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.rule.name = name.into();
        self
    }

    /// Sets the description for the rule being built.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.rule.description = desc.into();
        self
    }

    /// Appends a condition template.
    pub fn when(mut self, condition: TriplePattern) -> Self {
        self.rule.conditions.push(condition);
        self
    }

    /// Appends a conclusion template.
    pub fn then(mut self, conclusion: TriplePattern) -> Self {
        self.rule.conclusions.push(conclusion);
        self
    }

    /// Sets the priority of the rule.
    pub fn priority(mut self, p: i32) -> Self {
        self.rule.priority = p;
        self
    }

    /// Builds the rule in a disabled state.
    pub fn disabled(mut self) -> Self {
        self.rule.enabled = false;
        self
    }

    /// Builds and returns the final `InferenceRule`.
    pub fn build(self) -> InferenceRule {
        self.rule
    }
}

/// Stores inference rules keyed by ID, remembering registration order.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: IndexMap<String, InferenceRule>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the given rules.
    pub fn with_rules(rules: impl IntoIterator<Item = InferenceRule>) -> Result<Self> {
        let mut registry = Self::new();
        for rule in rules {
            registry.register(rule)?;
        }
        Ok(registry)
    }

    /// Registers a rule, overwriting any rule with the same ID.
    ///
    /// An overwritten rule keeps its original registration position.
    pub fn register(&mut self, rule: InferenceRule) -> Result<()> {
        rule.validate()?;
        debug!("Registering rule: {} (priority {})", rule.id, rule.priority);
        self.insert(rule);
        Ok(())
    }

    /// Stores a rule built from static templates, skipping validation.
    pub(crate) fn insert(&mut self, rule: InferenceRule) {
        self.rules.insert(rule.id.clone(), rule);
    }

    /// Removes a rule. Returns `true` if it was present.
    pub fn unregister(&mut self, id: &str) -> bool {
        self.rules.shift_remove(id).is_some()
    }

    /// Finds a rule by ID, whether enabled or not.
    pub fn get(&self, id: &str) -> Option<&InferenceRule> {
        self.rules.get(id)
    }

    /// Returns `true` if a rule with this ID is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    /// Returns enabled rules, highest priority first, ties in registration order.
    pub fn get_all(&self) -> Vec<&InferenceRule> {
        let mut rules: Vec<_> = self.rules.values().filter(|r| r.enabled).collect();
        // Stable sort keeps registration order among equal priorities.
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        rules
    }

    /// Enables or disables a rule. Returns `false` if the rule is unknown.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        if let Some(rule) = self.rules.get_mut(id) {
            rule.enabled = enabled;
            true
        } else {
            false
        }
    }

    /// Iterates over every rule, enabled or not, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &InferenceRule> {
        self.rules.values()
    }

    /// Number of registered rules, including disabled ones.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Term;

    fn rule(id: &str, priority: i32) -> InferenceRule {
        InferenceRule::builder(id)
            .when(TriplePattern::new(Term::var("x"), Term::lit("p"), Term::var("y")))
            .then(TriplePattern::new(Term::var("y"), Term::lit("q"), Term::var("x")))
            .priority(priority)
            .build()
    }

    #[test]
    fn test_rule_builder() {
        let r = InferenceRule::builder("flip")
            .name("Flip")
            .description("Flips p into q")
            .when(TriplePattern::parse("?x", "p", "?y").unwrap())
            .then(TriplePattern::parse("?y", "q", "?x").unwrap())
            .priority(100)
            .build();

        assert_eq!(r.id, "flip");
        assert_eq!(r.priority, 100);
        assert!(r.enabled);
        assert_eq!(r.display_name(), "Flip");
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let no_conditions = InferenceRule::builder("r")
            .then(TriplePattern::parse("a", "b", "c").unwrap())
            .build();
        assert!(matches!(no_conditions.validate(), Err(Error::InvalidRule(_))));

        let no_conclusions = InferenceRule::builder("r")
            .when(TriplePattern::parse("a", "b", "c").unwrap())
            .build();
        assert!(matches!(no_conclusions.validate(), Err(Error::InvalidRule(_))));

        assert!(matches!(rule("", 0).validate(), Err(Error::InvalidRule(_))));
    }

    #[test]
    fn test_priority_ordering() {
        let registry = RuleRegistry::with_rules([
            rule("r1", 10),
            rule("r2", 20),
            rule("r3", 5),
            rule("r4", 10),
        ])
        .unwrap();

        let ids: Vec<_> = registry.get_all().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r1", "r4", "r3"]);
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = RuleRegistry::new();
        registry.register(rule("r1", 1)).unwrap();
        registry.register(rule("r1", 7)).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("r1").unwrap().priority, 7);
    }

    #[test]
    fn test_overwritten_rule_keeps_tie_position() {
        let mut registry =
            RuleRegistry::with_rules([rule("r1", 5), rule("r2", 5), rule("r3", 5)]).unwrap();

        let mut replacement = rule("r1", 5);
        replacement.description = "replaced".to_string();
        registry.register(replacement).unwrap();

        let ids: Vec<_> = registry.get_all().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
        assert_eq!(registry.get("r1").unwrap().description, "replaced");
    }

    #[test]
    fn test_disabled_rules_are_hidden_from_get_all() {
        let mut registry = RuleRegistry::with_rules([rule("r1", 1), rule("r2", 2)]).unwrap();
        assert!(registry.set_enabled("r2", false));
        assert!(!registry.set_enabled("missing", false));

        let ids: Vec<_> = registry.get_all().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1"]);
        assert!(!registry.get("r2").unwrap().enabled);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unregister() {
        let mut registry = RuleRegistry::with_rules([rule("r1", 1)]).unwrap();
        assert!(registry.unregister("r1"));
        assert!(!registry.unregister("r1"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rule_serde_defaults() {
        let json = r#"{
            "id": "flip",
            "conditions": [
                {
                    "subject": {"variable": "x"},
                    "predicate": {"literal": "p"},
                    "object": {"variable": "y"}
                }
            ],
            "conclusions": [
                {
                    "subject": {"variable": "y"},
                    "predicate": {"literal": "q"},
                    "object": {"variable": "x"}
                }
            ]
        }"#;
        let parsed: InferenceRule = serde_json::from_str(json).unwrap();
        assert!(parsed.enabled);
        assert_eq!(parsed.priority, 0);
        assert_eq!(parsed.conditions[0].subject, Term::var("x"));
    }
}

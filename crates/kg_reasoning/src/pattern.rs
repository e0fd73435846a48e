//! Terms, triple patterns and one-directional unification against facts.
//!
//! Rule templates are triples of [`Term`]s. A term is either a literal that
//! must match exactly or a variable that binds to whatever the fact holds in
//! that position. Facts never carry variables, so matching only ever binds
//! template variables to fact values.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::fact::Fact;

/// Marker distinguishing a variable from a literal in textual templates.
pub const VARIABLE_SIGIL: char = '?';

fn variable_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid variable-name pattern"))
}

/// One position of a rule template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    /// A value the fact must hold exactly.
    Literal(String),
    /// A named variable (stored without the sigil).
    Variable(String),
}

impl Term {
    /// Creates a literal term.
    pub fn lit(value: impl Into<String>) -> Self {
        Term::Literal(value.into())
    }

    /// Creates a variable term from a bare name such as `"x"`.
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    /// Parses the textual form of a term.
    ///
    /// A leading `?` marks a variable; anything else is a literal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTerm`] when a variable name is empty or not an
    /// identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// # use kg_reasoning::Term;
    /// assert_eq!(Term::parse("?x").unwrap(), Term::var("x"));
    /// assert_eq!(Term::parse("alice").unwrap(), Term::lit("alice"));
    /// assert!(Term::parse("?").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        match text.strip_prefix(VARIABLE_SIGIL) {
            Some(name) if variable_name_regex().is_match(name) => Ok(Term::var(name)),
            Some(name) => Err(Error::InvalidTerm(format!(
                "'{}{}' is not a valid variable name",
                VARIABLE_SIGIL, name
            ))),
            None => Ok(Term::lit(text)),
        }
    }

    /// Returns `true` if this term is a variable.
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Returns the variable name, if this term is a variable.
    pub fn variable(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            Term::Literal(_) => None,
        }
    }

    /// Resolves the term under the given bindings.
    ///
    /// Literals resolve to themselves; unbound variables resolve to `None`.
    pub fn resolve<'a>(&'a self, bindings: &'a Bindings) -> Option<&'a str> {
        match self {
            Term::Literal(value) => Some(value),
            Term::Variable(name) => bindings.get(name),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Literal(value) => write!(f, "{}", value),
            Term::Variable(name) => write!(f, "{}{}", VARIABLE_SIGIL, name),
        }
    }
}

/// A `(subject, predicate, object)` template used as a rule condition or conclusion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriplePattern {
    /// Subject position.
    pub subject: Term,
    /// Predicate position.
    pub predicate: Term,
    /// Object position.
    pub object: Term,
}

impl TriplePattern {
    /// Creates a new triple pattern.
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Parses a pattern from the textual form of its three terms.
    ///
    /// ```
    /// # use kg_reasoning::{Term, TriplePattern};
    /// let p = TriplePattern::parse("?x", "knows", "?y").unwrap();
    /// assert_eq!(p.predicate, Term::lit("knows"));
    /// ```
    pub fn parse(subject: &str, predicate: &str, object: &str) -> Result<Self> {
        Ok(Self::new(
            Term::parse(subject)?,
            Term::parse(predicate)?,
            Term::parse(object)?,
        ))
    }

    /// Returns the three terms in subject, predicate, object order.
    pub fn terms(&self) -> [&Term; 3] {
        [&self.subject, &self.predicate, &self.object]
    }

    /// Iterates over the variable names in this pattern, in position order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.terms().into_iter().filter_map(Term::variable)
    }

    /// Matches this pattern against a fact. See [`match_condition`].
    pub fn matches(&self, fact: &Fact, bindings: &Bindings) -> Option<Bindings> {
        match_condition(self, fact, bindings)
    }

    /// Instantiates this pattern into a fact. See [`apply_bindings`].
    pub fn instantiate(&self, bindings: &Bindings) -> Option<Fact> {
        apply_bindings(self, bindings)
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.subject, self.predicate, self.object)
    }
}

/// Variable bindings accumulated while matching a rule, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bindings {
    values: IndexMap<String, String>,
}

impl Bindings {
    /// Creates empty bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of these bindings with one more variable bound.
    pub fn with(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(var.into(), value.into());
        self
    }

    /// Gets a bound value.
    pub fn get(&self, var: &str) -> Option<&str> {
        self.values.get(var).map(String::as_str)
    }

    /// Checks if a variable is bound.
    pub fn is_bound(&self, var: &str) -> bool {
        self.values.contains_key(var)
    }

    /// Iterates over `(variable, value)` pairs in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (var, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}{}={}", VARIABLE_SIGIL, var, value)?;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Unifies one condition template against one fact.
///
/// Each position is checked in turn. A literal must equal the fact's value; a
/// bound variable must equal its bound value; an unbound variable is bound to
/// the fact's value. On success the input bindings are returned extended with
/// the new bindings; existing bindings are never altered. Returns `None` on
/// the first mismatch.
pub fn match_condition(
    condition: &TriplePattern,
    fact: &Fact,
    bindings: &Bindings,
) -> Option<Bindings> {
    let values = [&fact.subject, &fact.predicate, &fact.object];
    let mut extended: Option<Bindings> = None;

    for (term, value) in condition.terms().into_iter().zip(values) {
        match term {
            Term::Literal(expected) => {
                if expected != value {
                    return None;
                }
            }
            Term::Variable(var) => {
                let current = extended.as_ref().unwrap_or(bindings);
                match current.get(var) {
                    Some(bound) if bound == value => {}
                    Some(_) => return None,
                    None => {
                        extended
                            .get_or_insert_with(|| bindings.clone())
                            .values
                            .insert(var.clone(), value.clone());
                    }
                }
            }
        }
    }

    Some(extended.unwrap_or_else(|| bindings.clone()))
}

/// Substitutes bindings into a conclusion template.
///
/// Returns `None` when any variable in the template is unbound; the rule
/// branch simply does not fire for these bindings.
pub fn apply_bindings(conclusion: &TriplePattern, bindings: &Bindings) -> Option<Fact> {
    Some(Fact::new(
        conclusion.subject.resolve(bindings)?,
        conclusion.predicate.resolve(bindings)?,
        conclusion.object.resolve(bindings)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knows_pattern() -> TriplePattern {
        TriplePattern::new(Term::var("x"), Term::lit("knows"), Term::var("y"))
    }

    #[test]
    fn test_match_binds_unbound_variables() {
        let fact = Fact::new("alice", "knows", "bob");
        let bindings = match_condition(&knows_pattern(), &fact, &Bindings::new()).unwrap();
        assert_eq!(bindings.get("x"), Some("alice"));
        assert_eq!(bindings.get("y"), Some("bob"));
    }

    #[test]
    fn test_match_rejects_conflicting_binding() {
        let fact = Fact::new("alice", "knows", "bob");
        let existing = Bindings::new().with("x", "charlie");
        assert!(match_condition(&knows_pattern(), &fact, &existing).is_none());
    }

    #[test]
    fn test_match_keeps_existing_bindings() {
        let fact = Fact::new("alice", "knows", "bob");
        let existing = Bindings::new().with("x", "alice").with("z", "carol");
        let extended = match_condition(&knows_pattern(), &fact, &existing).unwrap();
        assert_eq!(extended.get("z"), Some("carol"));
        assert_eq!(extended.len(), 3);
        // The input is untouched.
        assert_eq!(existing.len(), 2);
    }

    #[test]
    fn test_match_literal_mismatch() {
        let fact = Fact::new("alice", "likes", "bob");
        assert!(match_condition(&knows_pattern(), &fact, &Bindings::new()).is_none());
    }

    #[test]
    fn test_repeated_variable_within_condition() {
        let reflexive = TriplePattern::new(Term::var("x"), Term::lit("knows"), Term::var("x"));
        let self_fact = Fact::new("alice", "knows", "alice");
        let other_fact = Fact::new("alice", "knows", "bob");
        assert!(match_condition(&reflexive, &self_fact, &Bindings::new()).is_some());
        assert!(match_condition(&reflexive, &other_fact, &Bindings::new()).is_none());
    }

    #[test]
    fn test_predicate_variable() {
        let any = TriplePattern::parse("alice", "?p", "?o").unwrap();
        let fact = Fact::new("alice", "owns", "car");
        let bindings = any.matches(&fact, &Bindings::new()).unwrap();
        assert_eq!(bindings.get("p"), Some("owns"));
    }

    #[test]
    fn test_apply_bindings() {
        let conclusion = TriplePattern::new(Term::var("y"), Term::lit("knows"), Term::var("x"));
        let bindings = Bindings::new().with("x", "alice").with("y", "bob");
        assert_eq!(
            apply_bindings(&conclusion, &bindings),
            Some(Fact::new("bob", "knows", "alice"))
        );
    }

    #[test]
    fn test_apply_bindings_unbound_variable() {
        let conclusion = TriplePattern::new(Term::var("x"), Term::lit("knows"), Term::var("z"));
        let bindings = Bindings::new().with("x", "alice");
        assert!(apply_bindings(&conclusion, &bindings).is_none());
    }

    #[test]
    fn test_term_parse() {
        assert_eq!(Term::parse("?person").unwrap(), Term::var("person"));
        assert_eq!(Term::parse("bob").unwrap(), Term::lit("bob"));
        assert!(matches!(Term::parse("?"), Err(Error::InvalidTerm(_))));
        assert!(matches!(Term::parse("?1x"), Err(Error::InvalidTerm(_))));
        assert_eq!(Term::var("x").to_string(), "?x");
    }

    #[test]
    fn test_pattern_variables() {
        let p = TriplePattern::parse("?x", "?p", "bob").unwrap();
        assert_eq!(p.variables().collect::<Vec<_>>(), vec!["x", "p"]);
        assert_eq!(p.to_string(), "(?x ?p bob)");
    }

    #[test]
    fn test_bindings_display() {
        let bindings: Bindings = [("x", "alice"), ("y", "bob")].into_iter().collect();
        assert_eq!(bindings.to_string(), "{?x=alice, ?y=bob}");
    }
}

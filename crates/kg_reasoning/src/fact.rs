//! Facts: the `(subject, predicate, object)` triples the reasoner works over.
//!
//! A fact is an immutable value object. Identifiers are opaque strings; the
//! reasoner never interprets them beyond equality.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single `(subject, predicate, object)` statement.
///
/// Equality and hashing are structural, so a set of facts deduplicates on the
/// full triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fact {
    /// The entity the statement is about.
    pub subject: String,
    /// The relation name.
    pub predicate: String,
    /// The related entity or literal value.
    pub object: String,
}

impl Fact {
    /// Creates a new fact.
    ///
    /// # Examples
    ///
    /// ```
    /// # use kg_reasoning::Fact;
    /// let fact = Fact::new("alice", "knows", "bob");
    /// assert_eq!(fact.predicate, "knows");
    /// ```
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Returns the combined key used for deduplication.
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.subject, &self.predicate, &self.object)
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.subject, self.predicate, self.object)
    }
}

impl<S, P, O> From<(S, P, O)> for Fact
where
    S: Into<String>,
    P: Into<String>,
    O: Into<String>,
{
    fn from((subject, predicate, object): (S, P, O)) -> Self {
        Fact::new(subject, predicate, object)
    }
}

/// Deduplicates facts, keeping the first occurrence of each triple in input order.
pub fn dedup<'a>(facts: impl IntoIterator<Item = &'a Fact>) -> IndexSet<Fact> {
    facts.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Fact::new("alice", "knows", "bob");
        let b = Fact::from(("alice", "knows", "bob"));
        assert_eq!(a, b);
        assert_eq!(a.key(), ("alice", "knows", "bob"));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let facts = vec![
            Fact::new("b", "p", "c"),
            Fact::new("a", "p", "b"),
            Fact::new("b", "p", "c"),
        ];
        let set = dedup(&facts);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get_index(0), Some(&Fact::new("b", "p", "c")));
    }

    #[test]
    fn test_display() {
        let fact = Fact::new("alice", "knows", "bob");
        assert_eq!(fact.to_string(), "(alice knows bob)");
    }
}

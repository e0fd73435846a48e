//! Error types for the reasoning core.

use thiserror::Error;

/// A specialized `Result` type for reasoning operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines the errors that can occur while configuring or running the reasoner.
///
/// Contradictions and rule branches that fail to instantiate are not errors;
/// they are reported as data on the inference result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An inference rule was defined incorrectly.
    #[error("Invalid rule definition: {0}")]
    InvalidRule(String),

    /// A relation definition was malformed.
    #[error("Invalid relation definition: {0}")]
    InvalidRelation(String),

    /// A relation declaration collides with an incompatible existing entry.
    #[error("Relation conflict on '{name}': registered as {existing}, requested {requested}")]
    RelationConflict {
        name: String,
        existing: String,
        requested: String,
    },

    /// A term could not be parsed from its textual form.
    #[error("Invalid term: {0}")]
    InvalidTerm(String),

    /// Forward chaining stopped at its iteration bound before reaching a fixpoint.
    #[error("Forward chaining did not converge within {iterations} iterations")]
    NotConverged { iterations: usize },

    /// The reasoner configuration was invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// An error occurred during data serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

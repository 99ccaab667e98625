//! Error types for the Lingo core library.

use thiserror::Error;

/// Top-level error type for all Lingo operations.
#[derive(Error, Debug)]
pub enum LingoError {
    /// Caller-supplied input failed validation (empty term, bad outcome, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A review quality grade outside 0–5.
    #[error("Invalid review quality: {0} (expected 0-5)")]
    InvalidQuality(u8),

    /// The outcome kind does not match the configured scheduling policy.
    #[error("Outcome {outcome} cannot be applied under the {policy} policy")]
    OutcomeMismatch {
        /// The configured policy.
        policy: crate::scheduler::SchedulingPolicy,
        /// Short description of the rejected outcome.
        outcome: String,
    },

    /// The learner already has a different item with this normalized term.
    #[error("Learner {learner} already saved '{term}'")]
    DuplicateTerm {
        /// Owner of both items.
        learner: crate::LearnerId,
        /// The normalized term.
        term: String,
    },

    /// No vocabulary item with the given ID exists.
    #[error("Vocabulary item not found: {0}")]
    ItemNotFound(crate::ItemId),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, LingoError>;

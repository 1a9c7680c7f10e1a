//! Error types for the quiz builder.

use thiserror::Error;

/// Result type alias for this library.
pub type Result<T> = std::result::Result<T, QuizError>;

/// Main error type for the library.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid problem: {0}")]
    Draft(#[from] DraftError),
}

/// Reasons a problem draft cannot be turned into a stored problem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("question text is empty")]
    EmptyQuestion,

    #[error("a single-choice problem needs at least one option")]
    NoOptions,

    #[error("correct option {index} is out of range for {len} options")]
    CorrectOptionOutOfRange { index: usize, len: usize },

    #[error("a table problem needs at least one row and one column")]
    EmptyTable,
}

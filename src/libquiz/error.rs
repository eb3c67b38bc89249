use std::io;
use thiserror::Error;

/// A structural defect in an authored quiz.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("`name` is missing or blank")]
    MissingName,
    #[error("`variants` is empty")]
    NoVariants,
    #[error("`meta.correctAnswers` refers to variant {index}, but there are only {variants}")]
    CorrectAnswerOutOfRange { index: usize, variants: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("quiz `{name}` is malformed: {violation}")]
    SchemaViolation { name: String, violation: Violation },
    #[error("a quiz named `{0}` is already registered")]
    DuplicateName(String),
    #[error("no quiz named `{0}`")]
    NotFound(String),
    #[error("content database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("malformed content: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read content: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

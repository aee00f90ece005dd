//! Shared error types for the services crate.

use thiserror::Error;

use reading_core::model::{OptionLetter, QuestionId, QuizResultError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("failed to load question set: {0}")]
    DataLoad(#[source] StorageError),
    #[error("session already completed")]
    Completed,
    #[error("session is still running")]
    NotTerminated,
    #[error("question index {index} out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("question {id} has no option {letter}")]
    InvalidOption { id: QuestionId, letter: OptionLetter },
    #[error(transparent)]
    Result(#[from] QuizResultError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DiagnosticService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiagnosticError {
    #[error("no submitted attempt found; take the quiz first")]
    MissingResult,
    #[error("failed to save report: {0}")]
    Persistence(#[source] StorageError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

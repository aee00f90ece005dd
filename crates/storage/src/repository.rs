use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reading_core::model::{DiagnosticReport, QuestionSet, QuizResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(String),
}

//
// ─── QUESTION SOURCE ───────────────────────────────────────────────────────────
//

/// Supplies the passage and questions for an attempt.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Load and validate the question set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no set is available, or
    /// `StorageError::Serialization` if the payload is malformed or fails
    /// validation.
    async fn load_question_set(&self) -> Result<QuestionSet, StorageError>;
}

//
// ─── SNAPSHOTS ─────────────────────────────────────────────────────────────────
//

/// Well-known storage slots for attempt artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKey {
    /// Written on every submission.
    Result,
    /// Written only when the learner asks to save the report.
    Report,
}

impl SnapshotKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SnapshotKey::Result => "reading_result",
            SnapshotKey::Report => "reading_last_report",
        }
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A JSON payload stored under a `SnapshotKey`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub key: SnapshotKey,
    pub payload: String,
    pub saved_at: DateTime<Utc>,
}

/// Key/value persistence for attempt snapshots. Writes overwrite.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Store `payload` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn put_snapshot(
        &self,
        key: SnapshotKey,
        payload: String,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Fetch the snapshot under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn get_snapshot(&self, key: SnapshotKey) -> Result<Option<Snapshot>, StorageError>;
}

/// Typed access to the result and report snapshots.
#[derive(Clone)]
pub struct AttemptStore {
    snapshots: Arc<dyn SnapshotRepository>,
}

impl AttemptStore {
    #[must_use]
    pub fn new(snapshots: Arc<dyn SnapshotRepository>) -> Self {
        Self { snapshots }
    }

    /// Persist a finished attempt under `SnapshotKey::Result`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on serialization or write failure.
    pub async fn save_result(
        &self,
        result: &QuizResult,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let payload = serde_json::to_string(result).map_err(ser)?;
        self.snapshots
            .put_snapshot(SnapshotKey::Result, payload, saved_at)
            .await
    }

    /// Load the last submitted attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored payload is unreadable.
    pub async fn load_result(&self) -> Result<Option<QuizResult>, StorageError> {
        self.load(SnapshotKey::Result).await
    }

    /// Persist a report under `SnapshotKey::Report`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on serialization or write failure.
    pub async fn save_report(
        &self,
        report: &DiagnosticReport,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let payload = serde_json::to_string(report).map_err(ser)?;
        self.snapshots
            .put_snapshot(SnapshotKey::Report, payload, saved_at)
            .await
    }

    /// Load the last explicitly saved report.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored payload is unreadable.
    pub async fn load_report(&self) -> Result<Option<DiagnosticReport>, StorageError> {
        self.load(SnapshotKey::Report).await
    }

    async fn load<T: serde::de::DeserializeOwned>(
        &self,
        key: SnapshotKey,
    ) -> Result<Option<T>, StorageError> {
        self.snapshots
            .get_snapshot(key)
            .await?
            .map(|snapshot| serde_json::from_str(&snapshot.payload).map_err(ser))
            .transpose()
    }
}

fn ser<E: fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    question_set: Arc<Mutex<Option<QuestionSet>>>,
    snapshots: Arc<Mutex<HashMap<SnapshotKey, Snapshot>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository that serves `set` as its question source.
    #[must_use]
    pub fn with_question_set(set: QuestionSet) -> Self {
        let repo = Self::new();
        if let Ok(mut guard) = repo.question_set.lock() {
            *guard = Some(set);
        }
        repo
    }
}

#[async_trait]
impl QuestionSource for InMemoryRepository {
    async fn load_question_set(&self) -> Result<QuestionSet, StorageError> {
        let guard = self
            .question_set
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clone().ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl SnapshotRepository for InMemoryRepository {
    async fn put_snapshot(
        &self,
        key: SnapshotKey,
        payload: String,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(
            key,
            Snapshot {
                key,
                payload,
                saved_at,
            },
        );
        Ok(())
    }

    async fn get_snapshot(&self, key: SnapshotKey) -> Result<Option<Snapshot>, StorageError> {
        let guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }
}

/// Aggregates the question source and snapshot store behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionSource>,
    pub snapshots: Arc<dyn SnapshotRepository>,
}

impl Storage {
    /// In-memory storage serving `set`.
    #[must_use]
    pub fn in_memory(set: QuestionSet) -> Self {
        let repo = InMemoryRepository::with_question_set(set);
        let questions: Arc<dyn QuestionSource> = Arc::new(repo.clone());
        let snapshots: Arc<dyn SnapshotRepository> = Arc::new(repo);
        Self {
            questions,
            snapshots,
        }
    }

    #[must_use]
    pub fn attempts(&self) -> AttemptStore {
        AttemptStore::new(Arc::clone(&self.snapshots))
    }
}

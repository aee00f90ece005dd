use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reading_core::model::{QuestionSet, QuestionSetDraft};

use crate::repository::{QuestionSource, StorageError};

/// Question source backed by a JSON file in the wire format.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse and validate a question set from JSON text.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the text is not valid JSON or the
/// set fails validation.
pub fn parse_question_set(raw: &str) -> Result<QuestionSet, StorageError> {
    let draft: QuestionSetDraft =
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
    draft
        .validate()
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

#[async_trait]
impl QuestionSource for JsonFileSource {
    async fn load_question_set(&self) -> Result<QuestionSet, StorageError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StorageError::NotFound,
                _ => StorageError::Io(format!("{}: {e}", self.path.display())),
            })?;
        parse_question_set(&raw)
    }
}

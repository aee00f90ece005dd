use std::path::Path;
use std::sync::Arc;

use reading_core::model::QuestionSet;
use storage::file::JsonFileSource;
use storage::repository::{QuestionSource, Storage};

use crate::Clock;
use crate::diagnostics::DiagnosticService;
use crate::error::AppServicesError;
use crate::sessions::SessionLoopService;

/// Assembles the session workflow and diagnostics over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    session_loop: Arc<SessionLoopService>,
    diagnostics: Arc<DiagnosticService>,
}

impl AppServices {
    /// Build services with questions from a JSON file and snapshots in `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        questions_path: &Path,
        clock: Clock,
        budget_secs: u32,
    ) -> Result<Self, AppServicesError> {
        let questions: Arc<dyn QuestionSource> = Arc::new(JsonFileSource::new(questions_path));
        let storage = Storage::sqlite(db_url, questions).await?;
        Ok(Self::from_storage(&storage, clock, budget_secs))
    }

    /// Build services over in-memory storage serving `set`.
    #[must_use]
    pub fn in_memory(set: QuestionSet, clock: Clock, budget_secs: u32) -> Self {
        Self::from_storage(&Storage::in_memory(set), clock, budget_secs)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, budget_secs: u32) -> Self {
        let session_loop = Arc::new(
            SessionLoopService::new(clock, Arc::clone(&storage.questions), storage.attempts())
                .with_budget_secs(budget_secs),
        );
        let diagnostics = Arc::new(DiagnosticService::new(clock, storage.attempts()));
        Self {
            session_loop,
            diagnostics,
        }
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }

    #[must_use]
    pub fn diagnostics(&self) -> Arc<DiagnosticService> {
        Arc::clone(&self.diagnostics)
    }
}

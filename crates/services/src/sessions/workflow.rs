use std::sync::Arc;

use reading_core::DEFAULT_TIME_BUDGET_SECS;
use reading_core::model::QuizResult;
use storage::repository::{AttemptStore, QuestionSource};
use tracing::{debug, info, warn};

use super::progress::SessionPhase;
use super::service::SessionService;
use super::view::{SessionEvent, SessionView};
use crate::Clock;
use crate::error::SessionError;

/// Orchestrates session start, event application, and result persistence.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    questions: Arc<dyn QuestionSource>,
    attempts: AttemptStore,
    budget_secs: u32,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, questions: Arc<dyn QuestionSource>, attempts: AttemptStore) -> Self {
        Self {
            clock,
            questions,
            attempts,
            budget_secs: DEFAULT_TIME_BUDGET_SECS,
        }
    }

    #[must_use]
    pub fn with_budget_secs(mut self, budget_secs: u32) -> Self {
        self.budget_secs = budget_secs;
        self
    }

    #[must_use]
    pub fn budget_secs(&self) -> u32 {
        self.budget_secs
    }

    /// Load the question set and start a new attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::DataLoad` if the question set cannot be fetched
    /// or is invalid. No session is created in that case.
    pub async fn start_session(&self) -> Result<SessionService, SessionError> {
        let set = self
            .questions
            .load_question_set()
            .await
            .map_err(|e| {
                warn!(error = %e, "question set failed to load");
                SessionError::DataLoad(e)
            })?;
        let session = SessionService::new(set, self.budget_secs, self.clock.now());
        info!(
            attempt_id = %session.attempt_id(),
            questions = session.len(),
            budget_secs = self.budget_secs,
            "session started"
        );
        Ok(session)
    }

    /// Apply `event`, persisting the result if the event terminated the session.
    ///
    /// # Errors
    ///
    /// Returns the engine's `SessionError`, or `SessionError::Storage` if the
    /// result could not be saved. The session stays terminated either way and
    /// `persist_result` can retry the save.
    pub async fn apply(
        &self,
        session: &mut SessionService,
        event: SessionEvent,
    ) -> Result<SessionView, SessionError> {
        let was_active = session.phase() == SessionPhase::Active;
        let view = session.apply(event, self.clock.now()).map_err(|e| {
            debug!(?event, error = %e, "event rejected");
            e
        })?;
        if was_active && view.phase == SessionPhase::Terminated {
            self.persist_result(session).await?;
        }
        Ok(view)
    }

    /// Submit the attempt and persist its result.
    ///
    /// A session that already terminated returns its existing result without
    /// saving again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if persistence fails.
    pub async fn submit(&self, session: &mut SessionService) -> Result<QuizResult, SessionError> {
        let was_active = !session.is_terminated();
        let result = session.submit(self.clock.now())?.clone();
        if was_active {
            self.persist_result(session).await?;
        }
        Ok(result)
    }

    /// Save the terminated session's result under the well-known result key.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotTerminated` for a running session or
    /// `SessionError::Storage` if the write fails.
    pub async fn persist_result(&self, session: &SessionService) -> Result<(), SessionError> {
        let result = session.result().ok_or(SessionError::NotTerminated)?;
        match self.attempts.save_result(result, self.clock.now()).await {
            Ok(()) => {
                info!(
                    attempt_id = %result.attempt_id(),
                    reason = ?result.reason(),
                    correct = result.correct_count(),
                    total = result.total_count(),
                    elapsed_secs = result.elapsed_secs(),
                    "result saved"
                );
                Ok(())
            }
            Err(e) => {
                warn!(attempt_id = %result.attempt_id(), error = %e, "failed to save result");
                Err(e.into())
            }
        }
    }
}

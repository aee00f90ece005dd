use reading_core::analyze;
use reading_core::model::{DiagnosticReport, QuizResult};
use storage::repository::AttemptStore;
use tracing::{info, warn};

use crate::Clock;
use crate::error::DiagnosticError;

/// Turns stored attempts into diagnostic reports.
#[derive(Clone)]
pub struct DiagnosticService {
    clock: Clock,
    attempts: AttemptStore,
}

impl DiagnosticService {
    #[must_use]
    pub fn new(clock: Clock, attempts: AttemptStore) -> Self {
        Self { clock, attempts }
    }

    /// Analyze an in-memory result.
    #[must_use]
    pub fn report_for(&self, result: &QuizResult) -> DiagnosticReport {
        analyze(result)
    }

    /// Analyze the last submitted attempt.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosticError::MissingResult` if no attempt has been stored,
    /// or `DiagnosticError::Storage` if it cannot be read.
    pub async fn load_report(&self) -> Result<DiagnosticReport, DiagnosticError> {
        let result = self
            .attempts
            .load_result()
            .await?
            .ok_or(DiagnosticError::MissingResult)?;
        Ok(analyze(&result))
    }

    /// Save `report` under the well-known report key.
    ///
    /// Failure leaves `report` untouched so the caller can keep showing it.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosticError::Persistence` if the write fails.
    pub async fn save_report(&self, report: &DiagnosticReport) -> Result<(), DiagnosticError> {
        self.attempts
            .save_report(report, self.clock.now())
            .await
            .map_err(|e| {
                warn!(attempt_id = %report.attempt_id, error = %e, "failed to save report");
                DiagnosticError::Persistence(e)
            })?;
        info!(attempt_id = %report.attempt_id, "report saved");
        Ok(())
    }

    /// The last explicitly saved report, if any.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosticError::Storage` if it cannot be read.
    pub async fn last_saved_report(&self) -> Result<Option<DiagnosticReport>, DiagnosticError> {
        Ok(self.attempts.load_report().await?)
    }
}

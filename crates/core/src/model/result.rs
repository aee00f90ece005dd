use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::countdown::DEFAULT_TIME_BUDGET_SECS;
use crate::model::answer::{AnswerRecord, count_correct};
use crate::model::ids::AttemptId;
use crate::model::question::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizResultError {
    #[error("answer count ({answers}) does not match question count ({questions})")]
    LengthMismatch { questions: usize, answers: usize },

    #[error("answer record {index} does not belong to its question")]
    MisalignedRecord { index: usize },

    #[error("completed_at is before started_at")]
    InvalidTimeRange,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The learner confirmed submission.
    Submitted,
    /// The countdown reached zero.
    TimedOut,
}

/// Immutable snapshot of a terminated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuizResultRecord", into = "QuizResultRecord")]
pub struct QuizResult {
    attempt_id: AttemptId,
    title: String,
    questions: Vec<Question>,
    answers: Vec<AnswerRecord>,
    elapsed_secs: u32,
    time_budget_secs: u32,
    correct_count: u32,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    reason: TerminationReason,
}

impl QuizResult {
    /// Freeze a session's state into a result, grading every answer.
    ///
    /// `elapsed_secs` is clamped to `time_budget_secs`.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError` if the answers are not index-aligned with the
    /// questions or the timestamps are inverted.
    #[allow(clippy::too_many_arguments)]
    pub fn freeze(
        attempt_id: AttemptId,
        title: String,
        questions: Vec<Question>,
        answers: Vec<AnswerRecord>,
        elapsed_secs: u32,
        time_budget_secs: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        reason: TerminationReason,
    ) -> Result<Self, QuizResultError> {
        check_alignment(&questions, &answers)?;
        if completed_at < started_at {
            return Err(QuizResultError::InvalidTimeRange);
        }
        let correct_count = count_correct(&questions, &answers);
        Ok(Self {
            attempt_id,
            title,
            questions,
            answers,
            elapsed_secs: elapsed_secs.min(time_budget_secs),
            time_budget_secs,
            correct_count,
            started_at,
            completed_at,
            reason,
        })
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn time_budget_secs(&self) -> u32 {
        self.time_budget_secs
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn reason(&self) -> TerminationReason {
        self.reason
    }
}

fn check_alignment(
    questions: &[Question],
    answers: &[AnswerRecord],
) -> Result<(), QuizResultError> {
    if questions.len() != answers.len() {
        return Err(QuizResultError::LengthMismatch {
            questions: questions.len(),
            answers: answers.len(),
        });
    }
    if let Some(index) = questions
        .iter()
        .zip(answers)
        .position(|(q, a)| q.id() != a.question_id())
    {
        return Err(QuizResultError::MisalignedRecord { index });
    }
    Ok(())
}

fn default_budget() -> u32 {
    DEFAULT_TIME_BUDGET_SECS
}

/// Persisted shape of a `QuizResult`.
///
/// Elapsed time is stored as recorded; loading does not re-clamp it, so a
/// payload written by another producer keeps its overtime for the penalty.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuizResultRecord {
    attempt_id: AttemptId,
    #[serde(default)]
    title: String,
    questions: Vec<Question>,
    answers: Vec<AnswerRecord>,
    elapsed_secs: u32,
    #[serde(default = "default_budget")]
    time_budget_secs: u32,
    correct_count: u32,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    reason: TerminationReason,
}

impl TryFrom<QuizResultRecord> for QuizResult {
    type Error = QuizResultError;

    fn try_from(r: QuizResultRecord) -> Result<Self, Self::Error> {
        check_alignment(&r.questions, &r.answers)?;
        if r.completed_at < r.started_at {
            return Err(QuizResultError::InvalidTimeRange);
        }
        // The stored count is advisory; regrade so it always agrees with the answers.
        let correct_count = count_correct(&r.questions, &r.answers);
        Ok(Self {
            attempt_id: r.attempt_id,
            title: r.title,
            questions: r.questions,
            answers: r.answers,
            elapsed_secs: r.elapsed_secs,
            time_budget_secs: r.time_budget_secs,
            correct_count,
            started_at: r.started_at,
            completed_at: r.completed_at,
            reason: r.reason,
        })
    }
}

impl From<QuizResult> for QuizResultRecord {
    fn from(r: QuizResult) -> Self {
        Self {
            attempt_id: r.attempt_id,
            title: r.title,
            questions: r.questions,
            answers: r.answers,
            elapsed_secs: r.elapsed_secs,
            time_budget_secs: r.time_budget_secs,
            correct_count: r.correct_count,
            started_at: r.started_at,
            completed_at: r.completed_at,
            reason: r.reason,
        }
    }
}

use chrono::{DateTime, Utc};
use std::fmt;

use reading_core::model::{
    AnswerRecord, AttemptId, OptionLetter, Question, QuestionSet, QuizResult, SelectionOutcome,
    TerminationReason,
};
use reading_core::{Countdown, CountdownTick};

use super::progress::{SessionPhase, SessionProgress};
use crate::error::SessionError;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// What a navigation call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved { from: usize, to: usize },
    Unchanged,
    /// `next` was called on the last question; the caller should confirm and
    /// then `submit`.
    SubmitRequested,
}

/// Counts shown when asking the learner to confirm submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitPrompt {
    pub answered: usize,
    pub unanswered: usize,
    pub marked: usize,
}

/// What a timer tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining_secs: u32 },
    /// The countdown hit zero and the session was terminated by this tick.
    Expired,
    /// The session had already terminated.
    Ignored,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One timed attempt at a passage.
///
/// The engine only exists in the `Active` and `Terminated` phases; loading is
/// the workflow's job. Termination happens once, either by `submit` or by the
/// tick that exhausts the countdown, and freezes a `QuizResult`.
pub struct SessionService {
    attempt_id: AttemptId,
    title: String,
    passage: Vec<String>,
    questions: Vec<Question>,
    answers: Vec<AnswerRecord>,
    current: usize,
    countdown: Countdown,
    started_at: DateTime<Utc>,
    result: Option<QuizResult>,
}

impl SessionService {
    /// Start an attempt over `set` with a countdown of `budget_secs`.
    ///
    /// `started_at` should come from the services layer clock to keep time deterministic.
    #[must_use]
    pub fn new(set: QuestionSet, budget_secs: u32, started_at: DateTime<Utc>) -> Self {
        let (title, passage, questions) = set.into_parts();
        let answers = questions.iter().map(AnswerRecord::new).collect();
        Self {
            attempt_id: AttemptId::generate(),
            title,
            passage,
            questions,
            answers,
            current: 0,
            countdown: Countdown::new(budget_secs),
            started_at,
            result: None,
        }
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
    pub fn passage(&self) -> &[String] {
        &self.passage
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
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn current_answer(&self) -> &AnswerRecord {
        &self.answers[self.current]
    }

    #[must_use]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The frozen result, once terminated.
    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.is_terminated() {
            SessionPhase::Terminated
        } else {
            SessionPhase::Active
        }
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_answered()).count()
    }

    #[must_use]
    pub fn marked_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_marked()).count()
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.len(),
            answered: self.answered_count(),
            marked: self.marked_count(),
            remaining_secs: self.countdown.remaining_secs(),
            is_complete: self.is_terminated(),
        }
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.is_terminated() {
            return Err(SessionError::Completed);
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), SessionError> {
        if index >= self.questions.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        Ok(())
    }

    // ─── NAVIGATION ────────────────────────────────────────────────────────────

    /// Jump to `index`. Out-of-range indices change nothing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` once the session has terminated.
    pub fn go_to(&mut self, index: usize) -> Result<Navigation, SessionError> {
        self.ensure_active()?;
        if index >= self.questions.len() || index == self.current {
            return Ok(Navigation::Unchanged);
        }
        let from = std::mem::replace(&mut self.current, index);
        Ok(Navigation::Moved { from, to: index })
    }

    /// Advance one question, or request submission from the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` once the session has terminated.
    pub fn next(&mut self) -> Result<Navigation, SessionError> {
        self.ensure_active()?;
        if self.current + 1 >= self.questions.len() {
            return Ok(Navigation::SubmitRequested);
        }
        self.go_to(self.current + 1)
    }

    /// Step back one question. No-op on the first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` once the session has terminated.
    pub fn prev(&mut self) -> Result<Navigation, SessionError> {
        self.ensure_active()?;
        match self.current.checked_sub(1) {
            Some(index) => self.go_to(index),
            None => Ok(Navigation::Unchanged),
        }
    }

    // ─── ANSWERS ───────────────────────────────────────────────────────────────

    /// Record a selection of `letter` on question `index`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` once terminated,
    /// `SessionError::IndexOutOfRange` for a bad index, or
    /// `SessionError::InvalidOption` if the question has no such option.
    pub fn record_answer(
        &mut self,
        index: usize,
        letter: OptionLetter,
    ) -> Result<SelectionOutcome, SessionError> {
        self.ensure_active()?;
        self.check_index(index)?;
        let question = &self.questions[index];
        if !question.has_option(letter) {
            return Err(SessionError::InvalidOption {
                id: question.id(),
                letter,
            });
        }
        Ok(self.answers[index].select(letter))
    }

    /// Flip the review mark on question `index` and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` once terminated or
    /// `SessionError::IndexOutOfRange` for a bad index.
    pub fn toggle_mark(&mut self, index: usize) -> Result<bool, SessionError> {
        self.ensure_active()?;
        self.check_index(index)?;
        Ok(self.answers[index].toggle_mark())
    }

    // ─── TERMINATION ───────────────────────────────────────────────────────────

    /// Counts for a submit confirmation. Does not terminate.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` once the session has terminated.
    pub fn request_submit(&self) -> Result<SubmitPrompt, SessionError> {
        self.ensure_active()?;
        let answered = self.answered_count();
        Ok(SubmitPrompt {
            answered,
            unanswered: self.len() - answered,
            marked: self.marked_count(),
        })
    }

    /// Terminate by explicit submission.
    ///
    /// Calling this on a terminated session returns the existing result
    /// unchanged, whichever path terminated it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Result` if the result cannot be frozen.
    pub fn submit(&mut self, completed_at: DateTime<Utc>) -> Result<&QuizResult, SessionError> {
        self.terminate(TerminationReason::Submitted, completed_at)
    }

    /// Deliver one second of wall-clock time.
    ///
    /// The second is credited to the current question. The tick that exhausts
    /// the countdown terminates the session as timed out.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Result` if the result cannot be frozen on expiry.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<TickOutcome, SessionError> {
        if self.is_terminated() {
            return Ok(TickOutcome::Ignored);
        }
        self.answers[self.current].add_time(1);
        match self.countdown.tick() {
            CountdownTick::Running { remaining_secs } => Ok(TickOutcome::Running { remaining_secs }),
            CountdownTick::Expired => {
                self.terminate(TerminationReason::TimedOut, now)?;
                Ok(TickOutcome::Expired)
            }
            CountdownTick::Stopped => Ok(TickOutcome::Ignored),
        }
    }

    fn terminate(
        &mut self,
        reason: TerminationReason,
        completed_at: DateTime<Utc>,
    ) -> Result<&QuizResult, SessionError> {
        if self.result.is_none() {
            self.countdown.stop();
            let result = QuizResult::freeze(
                self.attempt_id,
                self.title.clone(),
                self.questions.clone(),
                self.answers.clone(),
                self.countdown.elapsed_secs(),
                self.countdown.budget_secs(),
                self.started_at,
                completed_at.max(self.started_at),
                reason,
            )?;
            self.result = Some(result);
        }
        self.result.as_ref().ok_or(SessionError::NotTerminated)
    }
}

impl fmt::Debug for SessionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionService")
            .field("attempt_id", &self.attempt_id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("remaining_secs", &self.countdown.remaining_secs())
            .field("started_at", &self.started_at)
            .field("terminated", &self.is_terminated())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

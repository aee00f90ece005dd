//! Event-driven projection of a session for the display layer.
//!
//! The front end turns input and ticks into `SessionEvent`s, applies them,
//! and renders the returned `SessionView`. The view is plain data: no
//! formatted strings and no references into the session.

use chrono::{DateTime, Utc};

use reading_core::model::{
    AnswerRecord, OptionLetter, Question, SelectionMode, SelectionOutcome,
};
use reading_core::passage::{PassageFocus, focus_for};

use super::progress::SessionPhase;
use super::service::{Navigation, SessionService, SubmitPrompt, TickOutcome};
use crate::error::SessionError;

/// A discrete input to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    GoTo(usize),
    Next,
    Prev,
    /// Select an option on the current question.
    Select(OptionLetter),
    /// Toggle the review mark on the current question.
    ToggleMark,
    /// Ask for a submit confirmation without terminating.
    RequestSubmit,
    /// Confirmed submission.
    Submit,
    Tick,
}

/// Something the display should react to beyond redrawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSignal {
    /// Ask the learner to confirm; send `SessionEvent::Submit` if they do.
    ConfirmSubmit(SubmitPrompt),
    /// A selection was dropped because the multi-select cap was reached.
    SelectionCapped,
    Submitted,
    TimedOut,
}

/// Status of one question in the navigator strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorCell {
    pub answered: bool,
    pub marked: bool,
    pub current: bool,
}

/// Snapshot of what the display needs to draw the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub title: String,
    pub index: usize,
    pub total: usize,
    pub question: Question,
    pub record: AnswerRecord,
    pub focus: PassageFocus,
    pub remaining_secs: u32,
    pub warning: bool,
    pub navigator: Vec<NavigatorCell>,
    pub signal: Option<ViewSignal>,
}

impl SessionService {
    /// Build the view of the current state.
    #[must_use]
    pub fn view(&self) -> SessionView {
        let question = self.current_question();
        let navigator = self
            .answers()
            .iter()
            .enumerate()
            .map(|(i, record)| NavigatorCell {
                answered: record.is_answered(),
                marked: record.is_marked(),
                current: i == self.current_index(),
            })
            .collect();
        SessionView {
            phase: self.phase(),
            title: self.title().to_owned(),
            index: self.current_index(),
            total: self.len(),
            question: question.clone(),
            record: self.current_answer().clone(),
            focus: focus_for(question, self.passage()),
            remaining_secs: self.countdown().remaining_secs(),
            warning: self.countdown().is_warning(),
            navigator,
            signal: None,
        }
    }

    /// Apply `event` and return the resulting view.
    ///
    /// `now` stamps the result if this event terminates the session.
    ///
    /// # Errors
    ///
    /// Propagates the `SessionError` of the underlying operation; the session
    /// is unchanged when an error is returned.
    pub fn apply(
        &mut self,
        event: SessionEvent,
        now: DateTime<Utc>,
    ) -> Result<SessionView, SessionError> {
        let signal = match event {
            SessionEvent::GoTo(index) => {
                self.go_to(index)?;
                None
            }
            SessionEvent::Next => match self.next()? {
                Navigation::SubmitRequested => {
                    Some(ViewSignal::ConfirmSubmit(self.request_submit()?))
                }
                Navigation::Moved { .. } | Navigation::Unchanged => None,
            },
            SessionEvent::Prev => {
                self.prev()?;
                None
            }
            SessionEvent::Select(letter) => {
                let outcome = self.record_answer(self.current_index(), letter)?;
                let multi = self.current_question().selection_mode() == SelectionMode::Multi;
                (multi && outcome == SelectionOutcome::Ignored).then_some(ViewSignal::SelectionCapped)
            }
            SessionEvent::ToggleMark => {
                self.toggle_mark(self.current_index())?;
                None
            }
            SessionEvent::RequestSubmit => Some(ViewSignal::ConfirmSubmit(self.request_submit()?)),
            SessionEvent::Submit => {
                self.submit(now)?;
                Some(ViewSignal::Submitted)
            }
            SessionEvent::Tick => match self.tick(now)? {
                TickOutcome::Expired => Some(ViewSignal::TimedOut),
                TickOutcome::Running { .. } | TickOutcome::Ignored => None,
            },
        };
        let mut view = self.view();
        view.signal = signal;
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reading_core::model::{
        AnswerKey, QuestionDraft, QuestionId, QuestionSetDraft, QuestionType,
    };
    use reading_core::time::fixed_now;

    fn letter(c: char) -> OptionLetter {
        OptionLetter::from_char(c).unwrap()
    }

    fn session(budget: u32) -> SessionService {
        let set = QuestionSetDraft {
            title: "Glaciers".into(),
            passage: vec!["Ice moves.".into(), "The ice is \"vast\".".into()],
            questions: vec![
                QuestionDraft {
                    id: QuestionId::new(1),
                    kind: QuestionType::Vocabulary,
                    text: "The word \"vast\" is closest in meaning to".into(),
                    options: vec!["A. huge".into(), "B. tiny".into()],
                    explanation: None,
                    answer: AnswerKey::Single(letter('A')),
                },
                QuestionDraft {
                    id: QuestionId::new(2),
                    kind: QuestionType::ProseSummary,
                    text: "Summary".into(),
                    options: ["A", "B", "C", "D", "E", "F"].map(String::from).to_vec(),
                    explanation: None,
                    answer: AnswerKey::multi([letter('A'), letter('B'), letter('C')]).unwrap(),
                },
            ],
        }
        .validate()
        .unwrap();
        SessionService::new(set, budget, fixed_now())
    }

    #[test]
    fn view_reflects_current_question_and_focus() {
        let session = session(120);
        let view = session.view();
        assert_eq!(view.phase, SessionPhase::Active);
        assert_eq!(view.index, 0);
        assert_eq!(view.total, 2);
        assert_eq!(view.focus.paragraphs, Some(vec![1]));
        assert_eq!(view.focus.highlight.as_deref(), Some("vast"));
        assert!(view.navigator[0].current);
        assert!(!view.warning);
    }

    #[test]
    fn next_on_last_question_asks_for_confirmation() {
        let mut session = session(120);
        session.apply(SessionEvent::Next, fixed_now()).unwrap();
        let view = session.apply(SessionEvent::Next, fixed_now()).unwrap();
        assert!(matches!(view.signal, Some(ViewSignal::ConfirmSubmit(_))));
        assert_eq!(view.phase, SessionPhase::Active);

        let view = session.apply(SessionEvent::Submit, fixed_now()).unwrap();
        assert_eq!(view.signal, Some(ViewSignal::Submitted));
        assert_eq!(view.phase, SessionPhase::Terminated);
    }

    #[test]
    fn fourth_selection_is_signalled_as_capped() {
        let mut session = session(120);
        session.apply(SessionEvent::GoTo(1), fixed_now()).unwrap();
        for c in ['A', 'B', 'C'] {
            let view = session.apply(SessionEvent::Select(letter(c)), fixed_now()).unwrap();
            assert_eq!(view.signal, None);
        }
        let view = session
            .apply(SessionEvent::Select(letter('D')), fixed_now())
            .unwrap();
        assert_eq!(view.signal, Some(ViewSignal::SelectionCapped));
        assert_eq!(view.record.answer().letters().len(), 3);
        assert!(view.navigator[1].answered);
    }

    #[test]
    fn final_tick_signals_timeout() {
        let mut session = session(2);
        let view = session.apply(SessionEvent::Tick, fixed_now()).unwrap();
        assert!(view.warning);
        assert_eq!(view.remaining_secs, 1);
        let view = session.apply(SessionEvent::Tick, fixed_now()).unwrap();
        assert_eq!(view.signal, Some(ViewSignal::TimedOut));
        assert_eq!(view.phase, SessionPhase::Terminated);
    }
}

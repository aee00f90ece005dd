use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::QuestionId;
use crate::model::question::{
    AnswerKey, MAX_SUMMARY_SELECTIONS, OptionLetter, Question, SelectionMode,
};

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// A learner's recorded answer.
///
/// Serialized as `null` / `"B"` for single-select questions and as a letter
/// array for multi-select questions. Multi answers keep selection order;
/// grading compares them as sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Multi(Vec<OptionLetter>),
    Single(Option<OptionLetter>),
}

impl Answer {
    /// Empty answer for a question answered in `mode`.
    #[must_use]
    pub fn empty(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Single => Self::Single(None),
            SelectionMode::Multi => Self::Multi(Vec::new()),
        }
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        match self {
            Self::Single(letter) => letter.is_some(),
            Self::Multi(letters) => !letters.is_empty(),
        }
    }

    #[must_use]
    pub fn contains(&self, letter: OptionLetter) -> bool {
        match self {
            Self::Single(current) => *current == Some(letter),
            Self::Multi(letters) => letters.contains(&letter),
        }
    }

    /// Selected letters in selection order.
    #[must_use]
    pub fn letters(&self) -> &[OptionLetter] {
        match self {
            Self::Single(Some(letter)) => std::slice::from_ref(letter),
            Self::Single(None) => &[],
            Self::Multi(letters) => letters,
        }
    }

    /// Exact match against the key. Multi answers must equal the key as a set;
    /// there is no partial credit.
    #[must_use]
    pub fn matches(&self, key: &AnswerKey) -> bool {
        match (self, key) {
            (Self::Single(Some(letter)), AnswerKey::Single(expected)) => letter == expected,
            (Self::Multi(letters), AnswerKey::Multi(expected)) => {
                let mut sorted = letters.clone();
                sorted.sort();
                sorted.dedup();
                sorted == *expected
            }
            _ => false,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters = self.letters();
        if letters.is_empty() {
            return f.write_str("-");
        }
        for (i, letter) in letters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{letter}")?;
        }
        Ok(())
    }
}

//
// ─── ANSWER RECORD ─────────────────────────────────────────────────────────────
//

/// What a selection call did to the stored answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The letter was added (or set on an empty single answer).
    Selected,
    /// A single answer was replaced by a different letter.
    Replaced,
    /// The letter was removed from a multi answer.
    Deselected,
    /// Nothing changed: same single letter again, or the multi cap was hit.
    Ignored,
}

/// Per-question answer state within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    question_id: QuestionId,
    answer: Answer,
    marked: bool,
    time_spent_secs: u32,
}

impl AnswerRecord {
    /// Empty record for `question`.
    #[must_use]
    pub fn new(question: &Question) -> Self {
        Self {
            question_id: question.id(),
            answer: Answer::empty(question.selection_mode()),
            marked: false,
            time_spent_secs: 0,
        }
    }

    /// Rehydrate a record from persisted parts.
    #[must_use]
    pub fn from_persisted(
        question_id: QuestionId,
        answer: Answer,
        marked: bool,
        time_spent_secs: u32,
    ) -> Self {
        Self {
            question_id,
            answer,
            marked,
            time_spent_secs,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn answer(&self) -> &Answer {
        &self.answer
    }

    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    #[must_use]
    pub fn time_spent_secs(&self) -> u32 {
        self.time_spent_secs
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answer.is_answered()
    }

    /// Apply one selection of `letter`.
    ///
    /// Single answers are replaced. Multi answers toggle membership; adding a
    /// fourth letter is silently ignored.
    pub fn select(&mut self, letter: OptionLetter) -> SelectionOutcome {
        match &mut self.answer {
            Answer::Single(current) => match *current {
                Some(existing) if existing == letter => SelectionOutcome::Ignored,
                Some(_) => {
                    *current = Some(letter);
                    SelectionOutcome::Replaced
                }
                None => {
                    *current = Some(letter);
                    SelectionOutcome::Selected
                }
            },
            Answer::Multi(letters) => {
                if let Some(pos) = letters.iter().position(|l| *l == letter) {
                    letters.remove(pos);
                    SelectionOutcome::Deselected
                } else if letters.len() >= MAX_SUMMARY_SELECTIONS {
                    SelectionOutcome::Ignored
                } else {
                    letters.push(letter);
                    SelectionOutcome::Selected
                }
            }
        }
    }

    /// Flip the review mark and return the new value.
    pub fn toggle_mark(&mut self) -> bool {
        self.marked = !self.marked;
        self.marked
    }

    pub fn add_time(&mut self, secs: u32) {
        self.time_spent_secs = self.time_spent_secs.saturating_add(secs);
    }
}

/// Grade a record against its question.
#[must_use]
pub fn is_correct(question: &Question, record: &AnswerRecord) -> bool {
    record.answer().matches(question.answer_key())
}

/// Number of correctly answered questions in index-aligned slices.
#[must_use]
pub fn count_correct(questions: &[Question], records: &[AnswerRecord]) -> u32 {
    let correct = questions
        .iter()
        .zip(records)
        .filter(|(q, r)| is_correct(q, r))
        .count();
    u32::try_from(correct).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::{QuestionDraft, QuestionType};

    fn letter(c: char) -> OptionLetter {
        OptionLetter::from_char(c).unwrap()
    }

    fn question(answer: AnswerKey, kind: QuestionType) -> Question {
        QuestionDraft {
            id: QuestionId::new(1),
            kind,
            text: "q".into(),
            options: ["A", "B", "C", "D", "E", "F"].map(String::from).to_vec(),
            explanation: None,
            answer,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn single_select_replaces() {
        let q = question(AnswerKey::Single(letter('B')), QuestionType::Detail);
        let mut record = AnswerRecord::new(&q);
        assert!(!record.is_answered());

        assert_eq!(record.select(letter('A')), SelectionOutcome::Selected);
        assert_eq!(record.select(letter('B')), SelectionOutcome::Replaced);
        assert_eq!(record.select(letter('B')), SelectionOutcome::Ignored);
        assert_eq!(record.answer(), &Answer::Single(Some(letter('B'))));
        assert!(is_correct(&q, &record));
    }

    #[test]
    fn multi_select_caps_at_three() {
        let key = AnswerKey::multi([letter('A'), letter('C')]).unwrap();
        let q = question(key, QuestionType::Summary);
        let mut record = AnswerRecord::new(&q);

        for c in ['A', 'B', 'C'] {
            assert_eq!(record.select(letter(c)), SelectionOutcome::Selected);
        }
        assert_eq!(record.select(letter('D')), SelectionOutcome::Ignored);
        assert_eq!(record.answer().letters(), &[letter('A'), letter('B'), letter('C')]);
        assert!(!is_correct(&q, &record));

        assert_eq!(record.select(letter('B')), SelectionOutcome::Deselected);
        assert!(is_correct(&q, &record));
    }

    #[test]
    fn multi_select_cap_holds_over_long_toggle_runs() {
        let key = AnswerKey::multi([letter('A'), letter('C'), letter('E')]).unwrap();
        let q = question(key, QuestionType::ProseSummary);
        let mut record = AnswerRecord::new(&q);
        let mut held: Vec<OptionLetter> = Vec::new();

        for step in 0..72_usize {
            let c = b"ABCDEF"[(step * 7 + step / 4) % 6] as char;
            let pick = letter(c);
            let expected = if held.contains(&pick) {
                held.retain(|l| *l != pick);
                SelectionOutcome::Deselected
            } else if held.len() == MAX_SUMMARY_SELECTIONS {
                SelectionOutcome::Ignored
            } else {
                held.push(pick);
                SelectionOutcome::Selected
            };

            assert_eq!(record.select(pick), expected, "step {step}, letter {c}");
            let letters = record.answer().letters();
            assert!(letters.len() <= MAX_SUMMARY_SELECTIONS, "step {step}");
            assert_eq!(letters.len(), held.len(), "step {step}");
            assert!(held.iter().all(|l| letters.contains(l)), "step {step}");
        }
    }

    #[test]
    fn multi_grading_ignores_order() {
        let key = AnswerKey::multi([letter('B'), letter('D'), letter('F')]).unwrap();
        let q = question(key, QuestionType::ProseSummary);
        let mut record = AnswerRecord::new(&q);
        for c in ['F', 'B', 'D'] {
            record.select(letter(c));
        }
        assert!(is_correct(&q, &record));
    }

    #[test]
    fn mark_and_time_accumulate() {
        let q = question(AnswerKey::Single(letter('A')), QuestionType::Detail);
        let mut record = AnswerRecord::new(&q);
        assert!(record.toggle_mark());
        assert!(!record.toggle_mark());
        record.add_time(3);
        record.add_time(2);
        assert_eq!(record.time_spent_secs(), 5);
    }

    #[test]
    fn answer_wire_shapes() {
        let none: Answer = serde_json::from_str("null").unwrap();
        assert_eq!(none, Answer::Single(None));
        let one: Answer = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(one, Answer::Single(Some(letter('C'))));
        let many: Answer = serde_json::from_str("[\"A\",\"E\"]").unwrap();
        assert_eq!(many, Answer::Multi(vec![letter('A'), letter('E')]));
        assert_eq!(serde_json::to_string(&many).unwrap(), "[\"A\",\"E\"]");
    }
}

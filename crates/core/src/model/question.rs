use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Maximum number of simultaneous selections for a multi-select question.
pub const MAX_SUMMARY_SELECTIONS: usize = 3;

/// Option letters run from `A` to `Z`.
pub const MAX_OPTIONS: usize = 26;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OptionLetterError {
    #[error("option letter must be a single character A-Z, got {raw:?}")]
    Invalid { raw: String },

    #[error("option index {index} is out of range")]
    IndexOutOfRange { index: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error(transparent)]
    Letter(#[from] OptionLetterError),

    #[error("answer key must hold 1 to {max} distinct letters, got {len}")]
    AnswerKeySize { len: usize, max: usize },

    #[error("question {id}: text cannot be empty")]
    EmptyText { id: QuestionId },

    #[error("question {id}: at least one option is required")]
    NoOptions { id: QuestionId },

    #[error("question {id}: too many options ({len})")]
    TooManyOptions { id: QuestionId, len: usize },

    #[error("question {id}: answer letter {letter} has no matching option")]
    AnswerOutOfRange { id: QuestionId, letter: OptionLetter },

    #[error("question {id}: type {kind} expects a {expected} answer")]
    ArityMismatch {
        id: QuestionId,
        kind: String,
        expected: Arity,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionSetError {
    #[error("question set contains no questions")]
    Empty,

    #[error("duplicate question id {0}")]
    DuplicateId(QuestionId),

    #[error(transparent)]
    Question(#[from] QuestionError),
}

//
// ─── OPTION LETTER ─────────────────────────────────────────────────────────────
//

/// Positional option label (`A` for the first option, `B` for the second, ...).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionLetter(u8);

impl OptionLetter {
    /// Letter for the option at `index` (0-based).
    ///
    /// # Errors
    ///
    /// Returns `OptionLetterError::IndexOutOfRange` past `Z`.
    pub fn from_index(index: usize) -> Result<Self, OptionLetterError> {
        u8::try_from(index)
            .ok()
            .filter(|i| usize::from(*i) < MAX_OPTIONS)
            .map(Self)
            .ok_or(OptionLetterError::IndexOutOfRange { index })
    }

    /// Parses a letter, accepting lowercase input.
    ///
    /// # Errors
    ///
    /// Returns `OptionLetterError::Invalid` for anything outside `A-Z`.
    pub fn from_char(c: char) -> Result<Self, OptionLetterError> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Ok(Self(upper as u8 - b'A'))
        } else {
            Err(OptionLetterError::Invalid { raw: c.to_string() })
        }
    }

    /// Parses a one-character string such as `"B"`.
    ///
    /// # Errors
    ///
    /// Returns `OptionLetterError::Invalid` unless the trimmed input is one letter.
    pub fn parse(raw: &str) -> Result<Self, OptionLetterError> {
        let mut chars = raw.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => Err(OptionLetterError::Invalid {
                raw: raw.to_owned(),
            }),
        }
    }

    /// Zero-based option index.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    #[must_use]
    pub fn as_char(self) -> char {
        char::from(b'A' + self.0)
    }
}

impl fmt::Debug for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OptionLetter({})", self.as_char())
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Serialize for OptionLetter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OptionLetter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

//
// ─── QUESTION TYPE ─────────────────────────────────────────────────────────────
//

/// Expected shape of a question's correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Single,
    Multi,
    /// The combined `summary` tag covers both single-answer simplification
    /// and multi-answer prose summary questions.
    Either,
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Arity::Single => "single-letter",
            Arity::Multi => "multi-letter",
            Arity::Either => "single- or multi-letter",
        })
    }
}

/// Question category used to bucket accuracy in the diagnostic report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum QuestionType {
    Detail,
    NegativeDetail,
    Vocabulary,
    Inference,
    SentenceSimplification,
    Insertion,
    ProseSummary,
    Reference,
    RhetoricalPurpose,
    Summary,
    /// Bucket for questions without a type tag.
    #[default]
    General,
    /// Unrecognized tag, kept verbatim.
    Other(String),
}

impl QuestionType {
    /// Maps a wire tag to a type. Empty tags land in `General`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "" | "General" => Self::General,
            "detail" => Self::Detail,
            "negative-detail" => Self::NegativeDetail,
            "vocabulary" => Self::Vocabulary,
            "inference" => Self::Inference,
            "sentence-simplification" => Self::SentenceSimplification,
            "insertion" | "insert-text" => Self::Insertion,
            "prose-summary" => Self::ProseSummary,
            "reference" => Self::Reference,
            "rhetorical-purpose" => Self::RhetoricalPurpose,
            "summary" => Self::Summary,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Detail => "detail",
            Self::NegativeDetail => "negative-detail",
            Self::Vocabulary => "vocabulary",
            Self::Inference => "inference",
            Self::SentenceSimplification => "sentence-simplification",
            Self::Insertion => "insertion",
            Self::ProseSummary => "prose-summary",
            Self::Reference => "reference",
            Self::RhetoricalPurpose => "rhetorical-purpose",
            Self::Summary => "summary",
            Self::General => "General",
            Self::Other(tag) => tag,
        }
    }

    /// Human-readable label shown in reports.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Detail => "Factual Information",
            Self::NegativeDetail => "Negative Factual Information",
            Self::Vocabulary => "Vocabulary",
            Self::Inference => "Inference",
            Self::SentenceSimplification => "Sentence Simplification",
            Self::Insertion => "Insert Text",
            Self::ProseSummary => "Prose Summary",
            Self::Reference => "Reference",
            Self::RhetoricalPurpose => "Rhetorical Purpose",
            Self::Summary => "Prose Summary / Sentence Simplification",
            Self::General => "General",
            Self::Other(tag) => tag,
        }
    }

    #[must_use]
    pub fn expected_arity(&self) -> Arity {
        match self {
            Self::ProseSummary => Arity::Multi,
            Self::Summary => Arity::Either,
            _ => Arity::Single,
        }
    }
}

impl Serialize for QuestionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for QuestionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or(Self::General, |tag| Self::from_tag(&tag)))
    }
}

//
// ─── ANSWER KEY ────────────────────────────────────────────────────────────────
//

/// How a question is answered: one letter (radio) or a capped set (checkbox).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Single,
    Multi,
}

/// Correct-answer specification of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAnswerKey", into = "RawAnswerKey")]
pub enum AnswerKey {
    Single(OptionLetter),
    /// Sorted, distinct, 1..=3 letters.
    Multi(Vec<OptionLetter>),
}

impl AnswerKey {
    /// Builds a multi-letter key, sorting and de-duplicating the letters.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::AnswerKeySize` unless 1 to 3 distinct letters remain.
    pub fn multi(letters: impl IntoIterator<Item = OptionLetter>) -> Result<Self, QuestionError> {
        let mut letters: Vec<OptionLetter> = letters.into_iter().collect();
        letters.sort();
        letters.dedup();
        if letters.is_empty() || letters.len() > MAX_SUMMARY_SELECTIONS {
            return Err(QuestionError::AnswerKeySize {
                len: letters.len(),
                max: MAX_SUMMARY_SELECTIONS,
            });
        }
        Ok(Self::Multi(letters))
    }

    #[must_use]
    pub fn selection_mode(&self) -> SelectionMode {
        match self {
            Self::Single(_) => SelectionMode::Single,
            Self::Multi(_) => SelectionMode::Multi,
        }
    }

    /// All letters in the key, in ascending order.
    #[must_use]
    pub fn letters(&self) -> Vec<OptionLetter> {
        match self {
            Self::Single(letter) => vec![*letter],
            Self::Multi(letters) => letters.clone(),
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(letter) => write!(f, "{letter}"),
            Self::Multi(letters) => {
                for (i, letter) in letters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{letter}")?;
                }
                Ok(())
            }
        }
    }
}

/// Wire shape: `"B"`, `"BDF"`, or `["B", "D", "F"]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawAnswerKey {
    Text(String),
    List(Vec<String>),
}

impl TryFrom<RawAnswerKey> for AnswerKey {
    type Error = QuestionError;

    fn try_from(raw: RawAnswerKey) -> Result<Self, Self::Error> {
        match raw {
            RawAnswerKey::Text(text) => {
                let letters = text
                    .trim()
                    .chars()
                    .map(OptionLetter::from_char)
                    .collect::<Result<Vec<_>, _>>()?;
                match letters.as_slice() {
                    [] => Err(QuestionError::AnswerKeySize {
                        len: 0,
                        max: MAX_SUMMARY_SELECTIONS,
                    }),
                    [single] => Ok(Self::Single(*single)),
                    _ => Self::multi(letters),
                }
            }
            RawAnswerKey::List(items) => {
                let letters = items
                    .iter()
                    .map(|item| OptionLetter::parse(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Self::multi(letters)
            }
        }
    }
}

impl From<AnswerKey> for RawAnswerKey {
    fn from(key: AnswerKey) -> Self {
        match key {
            AnswerKey::Single(letter) => RawAnswerKey::Text(letter.to_string()),
            AnswerKey::Multi(letters) => {
                RawAnswerKey::List(letters.iter().map(ToString::to_string).collect())
            }
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Unvalidated question as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub id: QuestionId,
    #[serde(rename = "type", default)]
    pub kind: QuestionType,
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub answer: AnswerKey,
}

impl QuestionDraft {
    /// Validate the draft into a `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text is empty, the options are missing or
    /// too many, an answer letter has no option, or the answer arity does not
    /// match the question type.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let id = self.id;
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText { id });
        }
        if self.options.is_empty() {
            return Err(QuestionError::NoOptions { id });
        }
        if self.options.len() > MAX_OPTIONS {
            return Err(QuestionError::TooManyOptions {
                id,
                len: self.options.len(),
            });
        }
        if let Some(letter) = self
            .answer
            .letters()
            .into_iter()
            .find(|letter| letter.index() >= self.options.len())
        {
            return Err(QuestionError::AnswerOutOfRange { id, letter });
        }

        let expected = self.kind.expected_arity();
        let matches = match (expected, self.answer.selection_mode()) {
            (Arity::Either, _)
            | (Arity::Single, SelectionMode::Single)
            | (Arity::Multi, SelectionMode::Multi) => true,
            _ => false,
        };
        if !matches {
            return Err(QuestionError::ArityMismatch {
                id,
                kind: self.kind.tag().to_owned(),
                expected,
            });
        }

        Ok(Question {
            id,
            kind: self.kind,
            text: self.text,
            options: self.options,
            explanation: self.explanation,
            answer: self.answer,
        })
    }
}

/// A validated multiple-choice or multi-select question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionDraft", into = "QuestionDraft")]
pub struct Question {
    id: QuestionId,
    kind: QuestionType,
    text: String,
    options: Vec<String>,
    explanation: Option<String>,
    answer: AnswerKey,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &QuestionType {
        &self.kind
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn answer_key(&self) -> &AnswerKey {
        &self.answer
    }

    #[must_use]
    pub fn selection_mode(&self) -> SelectionMode {
        self.answer.selection_mode()
    }

    /// Whether `letter` names one of this question's options.
    #[must_use]
    pub fn has_option(&self, letter: OptionLetter) -> bool {
        letter.index() < self.options.len()
    }

    /// Option text for `letter`, if present.
    #[must_use]
    pub fn option(&self, letter: OptionLetter) -> Option<&str> {
        self.options.get(letter.index()).map(String::as_str)
    }
}

impl TryFrom<QuestionDraft> for Question {
    type Error = QuestionError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<Question> for QuestionDraft {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            kind: q.kind,
            text: q.text,
            options: q.options,
            explanation: q.explanation,
            answer: q.answer,
        }
    }
}

//
// ─── QUESTION SET ──────────────────────────────────────────────────────────────
//

/// Unvalidated question set as loaded from a source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSetDraft {
    pub title: String,
    #[serde(default)]
    pub passage: Vec<String>,
    pub questions: Vec<QuestionDraft>,
}

impl QuestionSetDraft {
    /// Validate every question and the set-level invariants.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::Empty` for a set without questions,
    /// `QuestionSetError::DuplicateId` for repeated ids, or the first
    /// question validation failure.
    pub fn validate(self) -> Result<QuestionSet, QuestionSetError> {
        if self.questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }
        let mut seen = HashSet::with_capacity(self.questions.len());
        let mut questions = Vec::with_capacity(self.questions.len());
        for draft in self.questions {
            if !seen.insert(draft.id) {
                return Err(QuestionSetError::DuplicateId(draft.id));
            }
            questions.push(draft.validate()?);
        }
        Ok(QuestionSet {
            title: self.title,
            passage: self.passage,
            questions,
        })
    }
}

/// Passage plus its ordered questions; the input of a quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionSetDraft", into = "QuestionSetDraft")]
pub struct QuestionSet {
    title: String,
    passage: Vec<String>,
    questions: Vec<Question>,
}

impl QuestionSet {
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
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Splits the set into its parts.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<String>, Vec<Question>) {
        (self.title, self.passage, self.questions)
    }
}

impl TryFrom<QuestionSetDraft> for QuestionSet {
    type Error = QuestionSetError;

    fn try_from(draft: QuestionSetDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<QuestionSet> for QuestionSetDraft {
    fn from(set: QuestionSet) -> Self {
        Self {
            title: set.title,
            passage: set.passage,
            questions: set.questions.into_iter().map(QuestionDraft::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(c: char) -> OptionLetter {
        OptionLetter::from_char(c).unwrap()
    }

    fn draft(kind: QuestionType, answer: AnswerKey) -> QuestionDraft {
        QuestionDraft {
            id: QuestionId::new(1),
            kind,
            text: "Which is true?".into(),
            options: (0..6).map(|i| format!("option {i}")).collect(),
            explanation: None,
            answer,
        }
    }

    #[test]
    fn option_letter_maps_indices() {
        assert_eq!(OptionLetter::from_index(0).unwrap().as_char(), 'A');
        assert_eq!(OptionLetter::from_index(3).unwrap().to_string(), "D");
        assert_eq!(letter('c').index(), 2);
        assert!(OptionLetter::from_index(26).is_err());
        assert!(OptionLetter::parse("AB").is_err());
        assert!(OptionLetter::from_char('1').is_err());
    }

    #[test]
    fn type_tags_round_trip_with_aliases() {
        assert_eq!(QuestionType::from_tag("insert-text"), QuestionType::Insertion);
        assert_eq!(QuestionType::from_tag(""), QuestionType::General);
        assert_eq!(
            QuestionType::from_tag("main-idea"),
            QuestionType::Other("main-idea".into())
        );
        assert_eq!(QuestionType::Other("main-idea".into()).label(), "main-idea");
        assert_eq!(QuestionType::NegativeDetail.tag(), "negative-detail");
    }

    #[test]
    fn answer_key_accepts_all_wire_shapes() {
        let single: AnswerKey = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(single, AnswerKey::Single(letter('B')));

        let packed: AnswerKey = serde_json::from_str("\"FBD\"").unwrap();
        assert_eq!(
            packed,
            AnswerKey::Multi(vec![letter('B'), letter('D'), letter('F')])
        );

        let listed: AnswerKey = serde_json::from_str("[\"C\", \"A\"]").unwrap();
        assert_eq!(listed, AnswerKey::Multi(vec![letter('A'), letter('C')]));

        assert!(serde_json::from_str::<AnswerKey>("\"ABCD\"").is_err());
        assert!(serde_json::from_str::<AnswerKey>("\"\"").is_err());
    }

    #[test]
    fn prose_summary_requires_multi_key() {
        let err = draft(QuestionType::ProseSummary, AnswerKey::Single(letter('A')))
            .validate()
            .unwrap_err();
        assert!(matches!(err, QuestionError::ArityMismatch { .. }));
    }

    #[test]
    fn detail_rejects_multi_key() {
        let key = AnswerKey::multi([letter('A'), letter('B')]).unwrap();
        let err = draft(QuestionType::Detail, key).validate().unwrap_err();
        assert!(matches!(err, QuestionError::ArityMismatch { .. }));
    }

    #[test]
    fn summary_accepts_either_arity() {
        assert!(
            draft(QuestionType::Summary, AnswerKey::Single(letter('A')))
                .validate()
                .is_ok()
        );
        let key = AnswerKey::multi([letter('A'), letter('C'), letter('E')]).unwrap();
        let q = draft(QuestionType::Summary, key).validate().unwrap();
        assert_eq!(q.selection_mode(), SelectionMode::Multi);
    }

    #[test]
    fn answer_must_reference_existing_option() {
        let mut d = draft(QuestionType::Detail, AnswerKey::Single(letter('H')));
        d.options.truncate(4);
        let err = d.validate().unwrap_err();
        assert!(matches!(err, QuestionError::AnswerOutOfRange { .. }));
    }

    #[test]
    fn question_set_parses_source_json() {
        let json = r#"{
            "title": "The Origin of the K-T Asteroid",
            "passage": ["First paragraph.", "Second paragraph."],
            "questions": [
                {"id": 1, "type": "vocabulary", "text": "The word \"vast\" is closest in meaning to",
                 "options": ["A. huge", "B. small", "C. old", "D. new"], "answer": "A"},
                {"id": 2, "text": "Untagged question",
                 "options": ["A. x", "B. y"], "answer": "B"},
                {"id": 3, "type": "summary", "text": "Select THREE answers",
                 "options": ["A", "B", "C", "D", "E", "F"], "answer": "ACE",
                 "explanation": "Main ideas"}
            ]
        }"#;
        let set: QuestionSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.passage().len(), 2);
        assert_eq!(set.questions()[1].kind(), &QuestionType::General);
        assert_eq!(set.questions()[2].selection_mode(), SelectionMode::Multi);
        assert_eq!(set.questions()[2].explanation(), Some("Main ideas"));
    }

    #[test]
    fn question_set_rejects_duplicates_and_empty() {
        let empty = QuestionSetDraft {
            title: "t".into(),
            passage: vec![],
            questions: vec![],
        };
        assert_eq!(empty.validate().unwrap_err(), QuestionSetError::Empty);

        let q = draft(QuestionType::Detail, AnswerKey::Single(letter('A')));
        let dup = QuestionSetDraft {
            title: "t".into(),
            passage: vec![],
            questions: vec![q.clone(), q],
        };
        assert_eq!(
            dup.validate().unwrap_err(),
            QuestionSetError::DuplicateId(QuestionId::new(1))
        );
    }
}

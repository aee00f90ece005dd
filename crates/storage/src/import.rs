//! Plain-text question dump importer.
//!
//! Layout: the first non-empty line is the title, lines before the first
//! `1.` line are passage paragraphs, then numbered questions with `A.`-`F.`
//! option lines and a `Correct Answer: X` line. Assignment-history annotations
//! are dropped. Other unrecognized lines extend the question text until
//! options start, then extend the last option.

use std::sync::LazyLock;

use regex::Regex;
use reading_core::model::{
    AnswerKey, OptionLetter, QuestionDraft, QuestionId, QuestionSet, QuestionSetDraft,
    QuestionError, QuestionSetError, QuestionType,
};
use thiserror::Error;

/// Assignment-history annotation some dumps interleave with questions.
const HISTORY_MARKER: &str = "该题布置历史";

static QUESTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*(.*)$").expect("question pattern is valid"));
static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-F]\.").expect("option pattern is valid"));
static ANSWER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Correct Answer[:：]\s*([A-F]+)").expect("answer pattern is valid")
});

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("input is empty")]
    Empty,

    #[error("no numbered question found")]
    NoQuestions,

    #[error("question {id}: missing correct answer")]
    MissingAnswer { id: u32 },

    #[error("question number `{raw}` is not a valid id")]
    InvalidNumber { raw: String },

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error(transparent)]
    Invalid(#[from] QuestionSetError),
}

/// Infer a type from the wording of the question stem.
#[must_use]
pub fn infer_type(text: &str) -> QuestionType {
    if text.contains("closest in meaning") {
        QuestionType::Vocabulary
    } else if text.contains("EXCEPT") {
        QuestionType::NegativeDetail
    } else if ["infer", "imply", "implies"].iter().any(|w| text.contains(w)) {
        QuestionType::Inference
    } else if text.contains("summary") || text.contains("essential information") {
        QuestionType::Summary
    } else if text.contains("where the following sentence could be added") {
        QuestionType::Insertion
    } else {
        QuestionType::Detail
    }
}

struct PendingQuestion {
    id: u32,
    text: String,
    options: Vec<String>,
    answer: Option<String>,
}

impl PendingQuestion {
    fn into_draft(self) -> Result<QuestionDraft, ImportError> {
        let raw = self
            .answer
            .ok_or(ImportError::MissingAnswer { id: self.id })?;
        let letters = raw
            .chars()
            .map(OptionLetter::from_char)
            .collect::<Result<Vec<_>, _>>()
            .map_err(QuestionError::from)?;
        let kind = infer_type(&self.text);
        let answer = match letters.as_slice() {
            [one] => AnswerKey::Single(*one),
            _ => AnswerKey::multi(letters)?,
        };
        Ok(QuestionDraft {
            id: QuestionId::new(self.id),
            kind,
            text: self.text,
            options: self.options,
            explanation: None,
            answer,
        })
    }
}

/// Parse a plain-text dump into a validated question set.
///
/// # Errors
///
/// Returns `ImportError` if the dump has no title or no numbered questions, a
/// question lacks a correct answer, or the resulting set fails validation.
pub fn parse_text(input: &str) -> Result<QuestionSet, ImportError> {
    let lines: Vec<&str> = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let (title, rest) = lines.split_first().ok_or(ImportError::Empty)?;
    let start = rest
        .iter()
        .position(|line| line.starts_with("1."))
        .ok_or(ImportError::NoQuestions)?;
    let passage = rest[..start].iter().map(|line| (*line).to_owned()).collect();

    let mut pending: Vec<PendingQuestion> = Vec::new();
    for line in &rest[start..] {
        if line.contains(HISTORY_MARKER) {
            continue;
        }
        if let Some(caps) = QUESTION_LINE.captures(line) {
            let raw = &caps[1];
            let id = raw.parse().map_err(|_| ImportError::InvalidNumber {
                raw: raw.to_owned(),
            })?;
            pending.push(PendingQuestion {
                id,
                text: caps[2].to_owned(),
                options: Vec::new(),
                answer: None,
            });
            continue;
        }
        let Some(current) = pending.last_mut() else {
            continue;
        };
        if OPTION_LINE.is_match(line) {
            current.options.push((*line).to_owned());
        } else if line.contains("Correct Answer") {
            if let Some(caps) = ANSWER_LINE.captures(line) {
                current.answer = Some(caps[1].to_owned());
            }
        } else if let Some(last) = current.options.last_mut() {
            last.push(' ');
            last.push_str(line);
        } else {
            current.text.push(' ');
            current.text.push_str(line);
        }
    }

    let questions = pending
        .into_iter()
        .map(PendingQuestion::into_draft)
        .collect::<Result<Vec<_>, _>>()?;
    let set = QuestionSetDraft {
        title: (*title).to_owned(),
        passage,
        questions,
    }
    .validate()?;
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reading_core::model::SelectionMode;

    const DUMP: &str = "\
The Rise of Cities

Early settlements grew along rivers.
Trade routes connected them.

1. The word \"grew\" in paragraph 1 is closest in meaning to
A. expanded
B. shrank
C. moved
D. vanished
Correct Answer: A

2. According to paragraph 2, all of the following are true EXCEPT
A. routes existed
B. trade happened
C. cities were isolated
that is, entirely cut off
D. rivers mattered
该题布置历史 2 次
Correct Answer：C

3. What can be inferred about trade?
A. It was rare
B. It was common
Correct Answer: B
该题布置历史：暂无
";

    #[test]
    fn parses_title_passage_and_questions() {
        let set = parse_text(DUMP).unwrap();
        assert_eq!(set.title(), "The Rise of Cities");
        assert_eq!(set.passage().len(), 2);
        assert_eq!(set.len(), 3);

        let q2 = &set.questions()[1];
        assert_eq!(q2.kind(), &QuestionType::NegativeDetail);
        assert_eq!(q2.options()[2], "C. cities were isolated that is, entirely cut off");
        assert_eq!(q2.answer_key().to_string(), "C");
        assert_eq!(q2.options()[3], "D. rivers mattered");

        let q3 = &set.questions()[2];
        assert_eq!(q3.text(), "What can be inferred about trade?");
        assert_eq!(q3.options()[1], "B. It was common");
    }

    #[test]
    fn infers_types_from_wording() {
        assert_eq!(infer_type("is closest in meaning to"), QuestionType::Vocabulary);
        assert_eq!(infer_type("What does the author imply"), QuestionType::Inference);
        assert_eq!(
            infer_type("Which sentence best expresses the essential information"),
            QuestionType::Summary
        );
        assert_eq!(
            infer_type("Look at where the following sentence could be added"),
            QuestionType::Insertion
        );
        assert_eq!(infer_type("According to paragraph 3"), QuestionType::Detail);
    }

    #[test]
    fn multi_letter_answers_become_sets() {
        let dump = "T\nP\n1. An introductory sentence for a brief summary is provided.\nA. a\nB. b\nC. c\nD. d\nE. e\nF. f\nCorrect Answer: ACE\n";
        let set = parse_text(dump).unwrap();
        let q = &set.questions()[0];
        assert_eq!(q.kind(), &QuestionType::Summary);
        assert_eq!(q.selection_mode(), SelectionMode::Multi);
    }

    #[test]
    fn missing_answer_is_reported() {
        let dump = "T\n1. According to the passage\nA. a\nB. b\n";
        let err = parse_text(dump).unwrap_err();
        assert!(matches!(err, ImportError::MissingAnswer { id: 1 }));
    }

    #[test]
    fn dump_without_questions_is_rejected() {
        assert!(matches!(parse_text(""), Err(ImportError::Empty)));
        assert!(matches!(
            parse_text("Title\nJust prose."),
            Err(ImportError::NoQuestions)
        ));
    }
}

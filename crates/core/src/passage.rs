//! Locates the passage paragraphs a question is about.
//!
//! This is a display aid only. Sessions and grading never depend on it.

use regex::Regex;
use std::sync::LazyLock;

use crate::model::{Question, QuestionType};

static PARAGRAPH_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)paragraph\s+(\d+)").expect("paragraph pattern is valid")
});

static QUOTED_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["“](.*?)["”]"#).expect("quote pattern is valid"));

/// Which paragraphs to show for a question, and which term to highlight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassageFocus {
    /// Zero-based paragraph indices; `None` means show the whole passage.
    pub paragraphs: Option<Vec<usize>>,
    pub highlight: Option<String>,
}

impl PassageFocus {
    /// Whether paragraph `index` should be displayed.
    #[must_use]
    pub fn shows(&self, index: usize) -> bool {
        self.paragraphs
            .as_ref()
            .is_none_or(|indices| indices.contains(&index))
    }
}

/// First quoted term in `text`, accepting straight or curly quotes.
#[must_use]
pub fn quoted_term(text: &str) -> Option<&str> {
    QUOTED_TERM
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|term| !term.trim().is_empty())
}

fn whole_word(term: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term))).ok()
}

/// Wrap every whole-word, case-insensitive occurrence of `term` in
/// `paragraph` with `open` and `close`, keeping the matched text as written.
#[must_use]
pub fn mark_term(paragraph: &str, term: &str, open: &str, close: &str) -> String {
    if term.trim().is_empty() {
        return paragraph.to_owned();
    }
    match whole_word(term) {
        Some(word) => word
            .replace_all(paragraph, |caps: &regex::Captures<'_>| {
                format!("{open}{}{close}", &caps[0])
            })
            .into_owned(),
        None => paragraph.to_owned(),
    }
}

/// Resolve the focus for `question` against `passage`.
///
/// An explicit "paragraph N" reference wins. Otherwise vocabulary questions
/// focus on the paragraphs containing their quoted term as a whole word.
#[must_use]
pub fn focus_for(question: &Question, passage: &[String]) -> PassageFocus {
    let highlight = (question.kind() == &QuestionType::Vocabulary)
        .then(|| quoted_term(question.text()))
        .flatten()
        .map(str::to_owned);

    PassageFocus {
        paragraphs: relevant_paragraphs(question, passage),
        highlight,
    }
}

#[must_use]
pub fn relevant_paragraphs(question: &Question, passage: &[String]) -> Option<Vec<usize>> {
    if let Some(index) = PARAGRAPH_REF
        .captures(question.text())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .and_then(|n| n.checked_sub(1))
        .filter(|i| *i < passage.len())
    {
        return Some(vec![index]);
    }

    if question.kind() != &QuestionType::Vocabulary {
        return None;
    }
    let term = quoted_term(question.text())?;
    let word = whole_word(term)?;
    let indices: Vec<usize> = passage
        .iter()
        .enumerate()
        .filter(|(_, para)| word.is_match(para))
        .map(|(i, _)| i)
        .collect();
    (!indices.is_empty()).then_some(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerKey, OptionLetter, QuestionDraft, QuestionId};

    fn question(kind: QuestionType, text: &str) -> Question {
        QuestionDraft {
            id: QuestionId::new(1),
            kind,
            text: text.into(),
            options: vec!["A".into(), "B".into()],
            explanation: None,
            answer: AnswerKey::Single(OptionLetter::from_char('A').unwrap()),
        }
        .validate()
        .unwrap()
    }

    fn passage() -> Vec<String> {
        vec![
            "The impact was vast and sudden.".into(),
            "Scientists debated the crater.".into(),
            "A Vast cloud of dust spread; vastly more than expected.".into(),
        ]
    }

    #[test]
    fn explicit_paragraph_reference_wins() {
        let q = question(
            QuestionType::Vocabulary,
            "The word \"vast\" in Paragraph 2 is closest in meaning to",
        );
        let focus = focus_for(&q, &passage());
        assert_eq!(focus.paragraphs, Some(vec![1]));
        assert_eq!(focus.highlight.as_deref(), Some("vast"));
        assert!(focus.shows(1));
        assert!(!focus.shows(0));
    }

    #[test]
    fn vocabulary_term_matches_whole_words_only() {
        let q = question(
            QuestionType::Vocabulary,
            "The word “vast” is closest in meaning to",
        );
        assert_eq!(relevant_paragraphs(&q, &passage()), Some(vec![0, 2]));
    }

    #[test]
    fn marks_term_in_any_case_but_not_inside_longer_words() {
        let marked = mark_term(
            "A Vast cloud spread; vastly more than expected, truly vast.",
            "vast",
            "[",
            "]",
        );
        assert_eq!(
            marked,
            "A [Vast] cloud spread; vastly more than expected, truly [vast]."
        );
        assert_eq!(mark_term("Nothing here.", " ", "[", "]"), "Nothing here.");
    }

    #[test]
    fn out_of_range_paragraph_falls_through() {
        let q = question(QuestionType::Detail, "According to paragraph 9, what happened?");
        let focus = focus_for(&q, &passage());
        assert_eq!(focus, PassageFocus::default());
        assert!(focus.shows(2));
    }

    #[test]
    fn non_vocabulary_quotes_are_ignored() {
        let q = question(QuestionType::Inference, "What does \"vast\" imply?");
        let focus = focus_for(&q, &passage());
        assert_eq!(focus.paragraphs, None);
        assert_eq!(focus.highlight, None);
    }
}

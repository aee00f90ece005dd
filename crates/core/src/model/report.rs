use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::answer::Answer;
use crate::model::ids::{AttemptId, QuestionId};
use crate::model::question::{AnswerKey, QuestionType};

/// Accuracy of one question type within an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAccuracy {
    pub kind: QuestionType,
    pub label: String,
    pub total: u32,
    pub correct: u32,
    /// Percentage in `[0, 100]`.
    pub accuracy: f64,
}

/// Estimated section score on the 0–30 scale with its ±2 display band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEstimate {
    pub score: u32,
    pub low: u32,
    pub high: u32,
}

impl ScoreEstimate {
    /// Display range such as `"19-23"`.
    #[must_use]
    pub fn range_label(&self) -> String {
        format!("{}-{}", self.low, self.high)
    }
}

impl fmt::Display for ScoreEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    /// Score below 15.
    Foundation,
    /// Score 15 through 21.
    Technique,
    /// Score 22 and above.
    MockExam,
}

/// Canned preparation advice for a score tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlan {
    pub tier: PlanTier,
    pub focus: String,
    pub material: String,
    pub pacing: String,
}

/// One line of the per-question review, in question order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionReview {
    pub number: usize,
    pub question_id: QuestionId,
    pub kind_label: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct: bool,
    pub user_answer: Answer,
    pub correct_answer: AnswerKey,
    pub explanation: Option<String>,
    pub marked: bool,
}

/// Diagnostic analysis of one finished attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub attempt_id: AttemptId,
    pub title: String,
    pub completed_at: DateTime<Utc>,
    pub correct_count: u32,
    pub total_count: u32,
    pub elapsed_secs: u32,
    pub time_budget_secs: u32,
    /// Sorted ascending by accuracy; ties keep encounter order.
    pub type_accuracy: Vec<TypeAccuracy>,
    pub weak_points: Vec<String>,
    pub strong_points: Vec<String>,
    pub estimate: ScoreEstimate,
    pub plan: StudyPlan,
    pub questions: Vec<QuestionReview>,
}

impl DiagnosticReport {
    #[must_use]
    pub fn score_range(&self) -> String {
        self.estimate.range_label()
    }

    /// Share of the time budget used, as a percentage capped at 100.
    #[must_use]
    pub fn time_used_percent(&self) -> f64 {
        if self.time_budget_secs == 0 {
            return 100.0;
        }
        (f64::from(self.elapsed_secs) / f64::from(self.time_budget_secs) * 100.0).min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_label_formats_bounds() {
        let estimate = ScoreEstimate {
            score: 21,
            low: 19,
            high: 23,
        };
        assert_eq!(estimate.range_label(), "19-23");
        assert_eq!(estimate.to_string(), "19-23");
    }
}

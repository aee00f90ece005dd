use std::cmp::Ordering;

use crate::model::{
    DiagnosticReport, PlanTier, QuestionReview, QuestionType, QuizResult, ScoreEstimate,
    StudyPlan, TypeAccuracy, is_correct,
};

//
// ─── THRESHOLDS ────────────────────────────────────────────────────────────────
//

/// Types below this accuracy (percent) are weak points.
pub const WEAK_BELOW_PERCENT: f64 = 60.0;

/// Types at or above this accuracy (percent) are strong points.
pub const STRONG_FROM_PERCENT: f64 = 80.0;

pub const MAX_SCORE: u32 = 30;
pub const POINTS_PER_CORRECT: u32 = 3;
pub const OVERTIME_PENALTY: u32 = 2;
pub const SCORE_BAND: u32 = 2;

/// Scores below this use the foundation plan.
pub const TECHNIQUE_TIER_FROM: u32 = 15;
/// Scores at or above this use the mock-exam plan.
pub const MOCK_EXAM_TIER_FROM: u32 = 22;

pub const WEAK_FALLBACK_NEEDS_WORK: &str = "Detail comprehension needs work";
pub const WEAK_FALLBACK_NONE: &str = "No significant weakness";
pub const STRONG_FALLBACK_NONE: &str = "No significant strength yet";
/// Focus of the technique plan when no type is weak.
pub const TECHNIQUE_FALLBACK_FOCUS: &str = "Inference";

//
// ─── ANALYSIS ──────────────────────────────────────────────────────────────────
//

/// Derive the diagnostic report for a finished attempt.
///
/// Pure and deterministic: the report depends only on `result`, so analysing
/// the same result twice yields identical reports.
#[must_use]
pub fn analyze(result: &QuizResult) -> DiagnosticReport {
    let questions = result.questions();
    let answers = result.answers();

    let mut groups: Vec<(QuestionType, u32, u32)> = Vec::new();
    let mut reviews = Vec::with_capacity(questions.len());
    let mut correct_count = 0_u32;

    for (index, (question, record)) in questions.iter().zip(answers).enumerate() {
        let correct = is_correct(question, record);
        if correct {
            correct_count = correct_count.saturating_add(1);
        }

        let kind = question.kind();
        match groups.iter_mut().find(|(k, _, _)| k == kind) {
            Some((_, total, hits)) => {
                *total += 1;
                *hits += u32::from(correct);
            }
            None => groups.push((kind.clone(), 1, u32::from(correct))),
        }

        reviews.push(QuestionReview {
            number: index + 1,
            question_id: question.id(),
            kind_label: kind.label().to_owned(),
            text: question.text().to_owned(),
            options: question.options().to_vec(),
            correct,
            user_answer: record.answer().clone(),
            correct_answer: question.answer_key().clone(),
            explanation: question.explanation().map(str::to_owned),
            marked: record.is_marked(),
        });
    }

    let type_accuracy = rank_by_accuracy(groups);
    let total_count = u32::try_from(questions.len()).unwrap_or(u32::MAX);
    let (weak_points, strong_points) =
        classify(&type_accuracy, correct_count < total_count);

    let estimate = estimate_score(
        correct_count,
        result.elapsed_secs(),
        result.time_budget_secs(),
    );
    let lowest_weak = type_accuracy
        .iter()
        .find(|t| t.accuracy < WEAK_BELOW_PERCENT)
        .map(|t| t.label.as_str());
    let plan = select_plan(estimate.score, lowest_weak);

    DiagnosticReport {
        attempt_id: result.attempt_id(),
        title: result.title().to_owned(),
        completed_at: result.completed_at(),
        correct_count,
        total_count,
        elapsed_secs: result.elapsed_secs(),
        time_budget_secs: result.time_budget_secs(),
        type_accuracy,
        weak_points,
        strong_points,
        estimate,
        plan,
        questions: reviews,
    }
}

fn rank_by_accuracy(groups: Vec<(QuestionType, u32, u32)>) -> Vec<TypeAccuracy> {
    let mut ranked: Vec<TypeAccuracy> = groups
        .into_iter()
        .map(|(kind, total, correct)| TypeAccuracy {
            label: kind.label().to_owned(),
            accuracy: f64::from(correct) / f64::from(total) * 100.0,
            kind,
            total,
            correct,
        })
        .collect();
    // `sort_by` is stable, so equal accuracies keep encounter order.
    ranked.sort_by(|a, b| {
        a.accuracy
            .partial_cmp(&b.accuracy)
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

fn classify(ranked: &[TypeAccuracy], any_incorrect: bool) -> (Vec<String>, Vec<String>) {
    let mut weak: Vec<String> = ranked
        .iter()
        .filter(|t| t.accuracy < WEAK_BELOW_PERCENT)
        .map(|t| t.label.clone())
        .collect();
    let mut strong: Vec<String> = ranked
        .iter()
        .filter(|t| t.accuracy >= STRONG_FROM_PERCENT)
        .map(|t| t.label.clone())
        .collect();

    if weak.is_empty() {
        let fallback = if any_incorrect {
            WEAK_FALLBACK_NEEDS_WORK
        } else {
            WEAK_FALLBACK_NONE
        };
        weak.push(fallback.to_owned());
    }
    if strong.is_empty() {
        strong.push(STRONG_FALLBACK_NONE.to_owned());
    }
    (weak, strong)
}

/// Heuristic 0–30 score: three points per correct answer, minus two when the
/// attempt ran over its budget, with a ±2 band.
#[must_use]
pub fn estimate_score(correct_count: u32, elapsed_secs: u32, budget_secs: u32) -> ScoreEstimate {
    let mut raw = correct_count.saturating_mul(POINTS_PER_CORRECT);
    if elapsed_secs > budget_secs {
        raw = raw.saturating_sub(OVERTIME_PENALTY);
    }
    let score = raw.min(MAX_SCORE);
    ScoreEstimate {
        score,
        low: score.saturating_sub(SCORE_BAND),
        high: (score + SCORE_BAND).min(MAX_SCORE),
    }
}

#[must_use]
pub fn plan_tier(score: u32) -> PlanTier {
    if score < TECHNIQUE_TIER_FROM {
        PlanTier::Foundation
    } else if score < MOCK_EXAM_TIER_FROM {
        PlanTier::Technique
    } else {
        PlanTier::MockExam
    }
}

/// Pick the canned plan for `score`.
///
/// The technique tier names `weakest_type` in its focus, falling back to
/// inference questions when the attempt has no weak type.
#[must_use]
pub fn select_plan(score: u32, weakest_type: Option<&str>) -> StudyPlan {
    let tier = plan_tier(score);
    match tier {
        PlanTier::Foundation => StudyPlan {
            tier,
            focus: "Vocabulary and complex sentences. Your foundation is still weak: go back to \
                    core word lists (high-school, CET-4 and TOEFL core vocabulary) and analyze \
                    long, difficult sentences every day."
                .to_owned(),
            material: "TOEFL Vocabulary by Category + close reading of TPO 1-20 passages"
                .to_owned(),
            pacing: "Do not chase speed yet; understanding comes first. Allow up to 25 minutes \
                     per passage in practice and tighten gradually."
                .to_owned(),
        },
        PlanTier::Technique => {
            let label = weakest_type.unwrap_or(TECHNIQUE_FALLBACK_FOCUS);
            StudyPlan {
                tier,
                focus: format!(
                    "Question-type technique. Concentrate on {label} questions and on reviewing \
                     mistakes to learn the logic behind how questions are written."
                ),
                material: "TPO 30-50 drills by question type + an error log".to_owned(),
                pacing: "Keep strict time. Limit each passage to 20 minutes, do not reread, and \
                         learn to pick out each paragraph's main idea."
                    .to_owned(),
            }
        }
        PlanTier::MockExam => StudyPlan {
            tier,
            focus: "Full mock exams and focus under pressure. Keep your form and build the \
                    stamina to finish three passages in a row under real test conditions."
                .to_owned(),
            material: "TPO 50-70 full mock tests + the latest recalled-exam predictions"
                .to_owned(),
            pacing: "Push the limit. Aim for 16-17 minutes per passage to leave a buffer for \
                     checking and hard questions."
                .to_owned(),
        },
    }
}

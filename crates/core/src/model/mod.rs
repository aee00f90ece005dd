mod answer;
mod ids;
mod question;
mod report;
mod result;

pub use ids::{AttemptId, ParseIdError, QuestionId};

pub use answer::{Answer, AnswerRecord, SelectionOutcome, count_correct, is_correct};
pub use question::{
    AnswerKey, Arity, MAX_OPTIONS, MAX_SUMMARY_SELECTIONS, OptionLetter, OptionLetterError,
    Question, QuestionDraft, QuestionError, QuestionSet, QuestionSetDraft, QuestionSetError,
    QuestionType, SelectionMode,
};
pub use report::{
    DiagnosticReport, PlanTier, QuestionReview, ScoreEstimate, StudyPlan, TypeAccuracy,
};
pub use result::{QuizResult, QuizResultError, TerminationReason};

use thiserror::Error;

use crate::model::{OptionLetterError, QuestionError, QuestionSetError, QuizResultError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    OptionLetter(#[from] OptionLetterError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    QuestionSet(#[from] QuestionSetError),
    #[error(transparent)]
    Result(#[from] QuizResultError),
}

use thiserror::Error;

use crate::model::{MockTestError, QuestionError, SubmissionError};
use crate::session::SessionError;

/// Any validation failure raised by the domain crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    MockTest(#[from] MockTestError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

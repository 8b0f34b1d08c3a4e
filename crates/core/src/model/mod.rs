mod countdown;
mod ids;
mod question;
mod submission;

pub use countdown::{Countdown, TickOutcome};
pub use ids::{AttemptId, MockTestId, ParseIdError, QuestionId};
pub use mock_test::{MockTest, MockTestError};
pub use question::{Question, QuestionError};
pub use submission::{AnswerMap, SubmissionError, SubmissionSummary, count_answered};

mod mock_test_vm;
mod quiz_vm;
mod result_vm;
mod time_fmt;

pub use mock_test_vm::{MockTestCardVm, map_mock_test_cards};
pub use quiz_vm::{
    OptionVm, QUIZ_ROOT_ID, QuestionTileVm, QuizVm, focus_script, quiz_key_from,
};
pub use result_vm::{AnswerLineVm, SubmissionCardVm, SubmissionDetailVm, map_submission_cards};
pub use time_fmt::{format_datetime, format_remaining};

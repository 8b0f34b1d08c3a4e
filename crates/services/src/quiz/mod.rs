mod active;
mod sink;
mod ticker;
mod view;
mod workflow;

pub use active::{ActiveQuiz, OptionSnapshot, QuizSnapshot, QuizStatus};
pub use sink::{LogSink, StoredSink, SubmissionReceipt, SubmissionSink};
pub use ticker::{CountdownTicker, TICK_PERIOD};
pub use view::SubmissionService;
pub use workflow::QuizLoopService;

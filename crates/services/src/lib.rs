#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod quiz;

pub use quiz_core::Clock;

pub use app_services::{AppServices, QuizOptions};
pub use error::{AppServicesError, QuizError};
pub use quiz::{
    ActiveQuiz, LogSink, OptionSnapshot, QuizLoopService, QuizSnapshot, QuizStatus, StoredSink,
    SubmissionReceipt, SubmissionService, SubmissionSink,
};
pub use storage::repository::{MockTestListItem, SubmissionRow};

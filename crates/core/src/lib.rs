#![forbid(unsafe_code)]

pub mod error;
pub mod input;
pub mod model;
pub mod session;
pub mod time;

pub use error::Error;
pub use input::{QuizCommand, QuizKey};
pub use session::{QuizSession, SessionError, SessionPhase};
pub use time::Clock;

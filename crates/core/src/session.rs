//! Timed multi-question quiz attempt.
//!
//! A [`QuizSession`] holds a fixed, ordered list of questions, a pointer to the
//! question on screen, a multi-select answer set per touched question, and a
//! whole-second countdown. Navigation clamps, selection toggles, and time never
//! goes below zero. Submitting consumes the session.

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

use crate::input::{QuizCommand, QuizKey, command_for_key};
use crate::model::{
    AnswerMap, AttemptId, Countdown, Question, SubmissionSummary, TickOutcome, count_answered,
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("invalid session config: {0}")]
    InvalidSessionConfig(&'static str),

    #[error("question index {index} out of range (0..{count})")]
    QuestionOutOfRange { index: usize, count: usize },

    #[error("option index {option} out of range for question {question} (0..{count})")]
    OptionOutOfRange {
        question: usize,
        option: usize,
        count: usize,
    },
}

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle phase of a live session. `Submitted` is represented by the
/// session having been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    /// Time ran out. Navigation and selection stay enabled and nothing is
    /// submitted automatically.
    Expired,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    attempt_id: AttemptId,
    questions: Vec<Question>,
    current: usize,
    answers: AnswerMap,
    countdown: Countdown,
    started_at: DateTime<Utc>,
}

impl QuizSession {
    /// Start a new attempt at the first question with the full duration.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidSessionConfig` if `questions` is empty or
    /// contains duplicate question ids.
    pub fn start(
        questions: Vec<Question>,
        duration_secs: u32,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::InvalidSessionConfig(
                "a quiz session needs at least one question",
            ));
        }
        let mut seen = HashSet::with_capacity(questions.len());
        if !questions.iter().all(|q| seen.insert(q.id())) {
            return Err(SessionError::InvalidSessionConfig(
                "question ids must be unique within a session",
            ));
        }

        Ok(Self {
            attempt_id: AttemptId::generate(),
            questions,
            current: 0,
            answers: AnswerMap::new(),
            countdown: Countdown::new(duration_secs),
            started_at,
        })
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        // `current` is kept in range by every mutator and the list is never empty.
        &self.questions[self.current]
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    /// Selected options for a question, or `None` if it was never touched.
    #[must_use]
    pub fn answer_for(&self, question: usize) -> Option<&BTreeSet<usize>> {
        self.answers.get(&question)
    }

    #[must_use]
    pub fn is_selected(&self, question: usize, option: usize) -> bool {
        self.answers
            .get(&question)
            .is_some_and(|set| set.contains(&option))
    }

    #[must_use]
    pub fn is_answered(&self, question: usize) -> bool {
        self.answers.get(&question).is_some_and(|set| !set.is_empty())
    }

    /// Number of questions with at least one selected option.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        count_answered(&self.answers)
    }

    #[must_use]
    pub fn time_remaining_secs(&self) -> u32 {
        self.countdown.remaining()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.countdown.is_expired() {
            SessionPhase::Expired
        } else {
            SessionPhase::Active
        }
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    //
    // ─── MUTATORS ──────────────────────────────────────────────────────────────
    //

    /// Advance the countdown by one elapsed second.
    pub fn tick(&mut self) -> TickOutcome {
        self.countdown.tick()
    }

    /// Toggle `option` in the answer set of `question`.
    ///
    /// Returns `true` if the option is selected afterwards. There is no
    /// single-answer rule: selecting a second option keeps the first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QuestionOutOfRange` or
    /// `SessionError::OptionOutOfRange` for indices the question list does not
    /// contain. State is left untouched in that case.
    pub fn select_option(&mut self, question: usize, option: usize) -> Result<bool, SessionError> {
        let count = self
            .questions
            .get(question)
            .ok_or(SessionError::QuestionOutOfRange {
                index: question,
                count: self.questions.len(),
            })?
            .option_count();
        if option >= count {
            return Err(SessionError::OptionOutOfRange {
                question,
                option,
                count,
            });
        }

        let set = self.answers.entry(question).or_default();
        if set.remove(&option) {
            Ok(false)
        } else {
            set.insert(option);
            Ok(true)
        }
    }

    /// Move one question back; stays put on the first question.
    pub fn go_to_previous(&mut self) -> bool {
        let before = self.current;
        self.current = self.current.saturating_sub(1);
        before != self.current
    }

    /// Move one question forward; stays put on the last question.
    pub fn go_to_next(&mut self) -> bool {
        let before = self.current;
        self.current = (self.current + 1).min(self.questions.len() - 1);
        before != self.current
    }

    /// Jump straight to `index`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QuestionOutOfRange` if `index` is not a valid
    /// question position.
    pub fn go_to_question(&mut self, index: usize) -> Result<bool, SessionError> {
        if index >= self.questions.len() {
            return Err(SessionError::QuestionOutOfRange {
                index,
                count: self.questions.len(),
            });
        }
        let before = self.current;
        self.current = index;
        Ok(before != index)
    }

    /// Execute a command, reporting whether any state changed.
    ///
    /// # Errors
    ///
    /// Propagates index errors from `go_to_question` and `select_option`.
    pub fn apply(&mut self, command: QuizCommand) -> Result<bool, SessionError> {
        match command {
            QuizCommand::Previous => Ok(self.go_to_previous()),
            QuizCommand::Next => Ok(self.go_to_next()),
            QuizCommand::Jump { question } => self.go_to_question(question),
            QuizCommand::Toggle { question, option } => {
                self.select_option(question, option).map(|_| true)
            }
        }
    }

    /// Map a key press against the current question and apply it.
    ///
    /// Keys without a binding, or digit keys past the current question's
    /// option count, change nothing.
    pub fn handle_key(&mut self, key: QuizKey) -> bool {
        let option_count = self.current_question().option_count();
        command_for_key(key, self.current, option_count)
            .is_some_and(|command| self.apply(command).unwrap_or(false))
    }

    /// End the attempt and produce its summary.
    #[must_use]
    pub fn submit(self, submitted_at: DateTime<Utc>) -> SubmissionSummary {
        SubmissionSummary::from_session(
            self.attempt_id,
            self.started_at,
            submitted_at,
            self.countdown.remaining(),
            self.questions.len(),
            self.answers,
        )
    }
}

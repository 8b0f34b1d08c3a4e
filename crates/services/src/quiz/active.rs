use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use quiz_core::model::{AttemptId, MockTestId, SubmissionSummary, TickOutcome};
use quiz_core::{Clock, QuizKey, QuizSession, SessionPhase};

use super::sink::{SubmissionReceipt, SubmissionSink};
use super::ticker::{CountdownTicker, TICK_PERIOD};
use crate::error::QuizError;

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    Active,
    Expired,
    Submitted,
}

impl QuizStatus {
    #[must_use]
    pub fn is_submitted(self) -> bool {
        matches!(self, Self::Submitted)
    }
}

impl From<SessionPhase> for QuizStatus {
    fn from(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::Active => Self::Active,
            SessionPhase::Expired => Self::Expired,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSnapshot {
    pub index: usize,
    pub label: String,
    pub selected: bool,
}

/// Read-only view of an attempt, published after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizSnapshot {
    pub attempt_id: AttemptId,
    pub title: String,
    pub status: QuizStatus,
    pub current_index: usize,
    pub question_count: usize,
    pub prompt: String,
    pub options: Vec<OptionSnapshot>,
    /// One flag per question, `true` when its answer set is non-empty.
    pub answered: Vec<bool>,
    pub answered_count: usize,
    pub time_remaining_secs: u32,
    pub is_first: bool,
    pub is_last: bool,
}

impl QuizSnapshot {
    #[must_use]
    pub fn from_session(title: &str, session: &QuizSession) -> Self {
        let current = session.current_index();
        let question = session.current_question();
        let options = question
            .options()
            .iter()
            .enumerate()
            .map(|(index, label)| OptionSnapshot {
                index,
                label: label.clone(),
                selected: session.is_selected(current, index),
            })
            .collect();

        Self {
            attempt_id: session.attempt_id(),
            title: title.to_string(),
            status: session.phase().into(),
            current_index: current,
            question_count: session.question_count(),
            prompt: question.prompt().to_string(),
            options,
            answered: (0..session.question_count())
                .map(|i| session.is_answered(i))
                .collect(),
            answered_count: session.answered_count(),
            time_remaining_secs: session.time_remaining_secs(),
            is_first: session.is_first(),
            is_last: session.is_last(),
        }
    }

    #[must_use]
    pub fn question_number(&self) -> usize {
        self.current_index + 1
    }
}

//
// ─── ACTIVE QUIZ ───────────────────────────────────────────────────────────────
//

struct Shared {
    title: String,
    session: Mutex<Option<QuizSession>>,
    snapshots: watch::Sender<QuizSnapshot>,
}

impl Shared {
    fn session(&self) -> MutexGuard<'_, Option<QuizSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, session: &QuizSession) {
        self.snapshots
            .send_replace(QuizSnapshot::from_session(&self.title, session));
    }

    fn tick(&self) -> TickOutcome {
        let mut guard = self.session();
        let Some(session) = guard.as_mut() else {
            return TickOutcome::Idle;
        };
        let outcome = session.tick();
        if outcome != TickOutcome::Idle {
            self.publish(session);
        }
        if outcome == TickOutcome::Expired {
            tracing::info!(attempt = %session.attempt_id(), "quiz time expired");
        }
        outcome
    }

    /// Run `f` against the live session and publish when it reports a change.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut QuizSession) -> Result<(T, bool), QuizError>,
    ) -> Result<T, QuizError> {
        let mut guard = self.session();
        let session = guard.as_mut().ok_or(QuizError::AlreadySubmitted)?;
        let (value, changed) = f(session)?;
        if changed {
            self.publish(session);
        }
        Ok(value)
    }
}

#[derive(Default)]
struct Delivery {
    pending: Option<SubmissionSummary>,
    receipt: Option<SubmissionReceipt>,
}

/// A running quiz attempt with its countdown task.
///
/// All operations go through a shared lock, so the countdown and user input
/// never interleave mid-update. Dropping the value cancels the countdown.
pub struct ActiveQuiz {
    shared: Arc<Shared>,
    ticker: Mutex<CountdownTicker>,
    delivery: tokio::sync::Mutex<Delivery>,
    sink: Arc<dyn SubmissionSink>,
    clock: Clock,
    mock_test_id: Option<MockTestId>,
}

impl ActiveQuiz {
    /// Wrap a freshly started session and begin ticking once per second.
    ///
    /// Sessions that start with no time left get no ticker.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Unbound` when the sink only stores attempts of a
    /// mock test and none is given, and `QuizError::NoRuntime` if called
    /// outside a tokio runtime.
    pub fn launch(
        title: impl Into<String>,
        session: QuizSession,
        mock_test_id: Option<MockTestId>,
        clock: Clock,
        sink: Arc<dyn SubmissionSink>,
    ) -> Result<Self, QuizError> {
        if mock_test_id.is_none() && sink.requires_mock_test() {
            return Err(QuizError::Unbound);
        }
        let title = title.into();
        let running = session.phase() == SessionPhase::Active;
        let (snapshots, _) = watch::channel(QuizSnapshot::from_session(&title, &session));
        let shared = Arc::new(Shared {
            title,
            session: Mutex::new(Some(session)),
            snapshots,
        });

        let ticker = if running {
            let shared = Arc::clone(&shared);
            CountdownTicker::spawn(TICK_PERIOD, move || shared.tick())?
        } else {
            CountdownTicker::idle()
        };

        Ok(Self {
            shared,
            ticker: Mutex::new(ticker),
            delivery: tokio::sync::Mutex::new(Delivery::default()),
            sink,
            clock,
            mock_test_id,
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.shared.title
    }

    #[must_use]
    pub fn mock_test_id(&self) -> Option<MockTestId> {
        self.mock_test_id
    }

    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        self.shared.snapshots.borrow().clone()
    }

    /// Receiver that wakes on every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<QuizSnapshot> {
        self.shared.snapshots.subscribe()
    }

    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.ticker_guard().is_running()
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.shared.session().is_none()
    }

    /// # Errors
    ///
    /// Returns `QuizError::AlreadySubmitted` once the attempt is submitted.
    pub fn previous(&self) -> Result<bool, QuizError> {
        self.shared.mutate(|s| {
            let moved = s.go_to_previous();
            Ok((moved, moved))
        })
    }

    /// # Errors
    ///
    /// Returns `QuizError::AlreadySubmitted` once the attempt is submitted.
    pub fn next(&self) -> Result<bool, QuizError> {
        self.shared.mutate(|s| {
            let moved = s.go_to_next();
            Ok((moved, moved))
        })
    }

    /// # Errors
    ///
    /// Returns `QuizError::Session` for an out-of-range index and
    /// `QuizError::AlreadySubmitted` once the attempt is submitted.
    pub fn go_to(&self, index: usize) -> Result<bool, QuizError> {
        self.shared.mutate(|s| {
            let moved = s.go_to_question(index)?;
            Ok((moved, moved))
        })
    }

    /// Toggle an option and return whether it is selected afterwards.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` for out-of-range indices and
    /// `QuizError::AlreadySubmitted` once the attempt is submitted.
    pub fn toggle(&self, question: usize, option: usize) -> Result<bool, QuizError> {
        self.shared
            .mutate(|s| Ok((s.select_option(question, option)?, true)))
    }

    /// Toggle an option on the question currently on screen.
    ///
    /// # Errors
    ///
    /// Same as [`ActiveQuiz::toggle`].
    pub fn toggle_current(&self, option: usize) -> Result<bool, QuizError> {
        self.shared.mutate(|s| {
            let current = s.current_index();
            Ok((s.select_option(current, option)?, true))
        })
    }

    /// Apply a key press. Unbound keys, and every key after submission, are
    /// ignored.
    pub fn handle_key(&self, key: QuizKey) -> bool {
        self.shared
            .mutate(|s| {
                let changed = s.handle_key(key);
                Ok((changed, changed))
            })
            .unwrap_or(false)
    }

    /// End the attempt and hand the answers to the sink.
    ///
    /// The countdown stops before delivery. If the sink fails, the summary is
    /// kept and the next call retries delivery of the same attempt.
    ///
    /// # Errors
    ///
    /// Returns the sink's error on a failed delivery and
    /// `QuizError::AlreadySubmitted` once delivery has succeeded.
    pub async fn submit(&self) -> Result<SubmissionReceipt, QuizError> {
        let mut delivery = self.delivery.lock().await;
        if delivery.receipt.is_some() {
            return Err(QuizError::AlreadySubmitted);
        }

        let summary = match delivery.pending.clone() {
            Some(summary) => summary,
            None => {
                let session = self
                    .shared
                    .session()
                    .take()
                    .ok_or(QuizError::AlreadySubmitted)?;
                self.ticker_guard().cancel();
                let summary = session.submit(self.clock.now());
                self.shared
                    .snapshots
                    .send_modify(|snap| snap.status = QuizStatus::Submitted);
                delivery.pending = Some(summary.clone());
                summary
            }
        };

        let receipt = self.sink.accept(self.mock_test_id, &summary).await?;
        delivery.pending = None;
        delivery.receipt = Some(receipt.clone());
        Ok(receipt)
    }

    /// Receipt of the delivered submission, if any.
    pub async fn receipt(&self) -> Option<SubmissionReceipt> {
        self.delivery.lock().await.receipt.clone()
    }

    fn ticker_guard(&self) -> MutexGuard<'_, CountdownTicker> {
        self.ticker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

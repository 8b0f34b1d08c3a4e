use std::time::Duration;

use quiz_core::model::TickOutcome;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::error::QuizError;

/// Period between countdown ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Owned handle to the recurring one-second countdown task.
///
/// The task stops on its own once a tick reports that time is up. Dropping
/// or cancelling the handle aborts it, so a discarded session can never be
/// ticked.
#[derive(Debug, Default)]
pub struct CountdownTicker {
    handle: Option<JoinHandle<()>>,
}

impl CountdownTicker {
    /// A ticker that never runs, for sessions that start with no time left.
    #[must_use]
    pub fn idle() -> Self {
        Self { handle: None }
    }

    /// Spawn the recurring task on the current tokio runtime.
    ///
    /// The first tick fires one full period after spawning. Late ticks are
    /// not replayed: a delayed tick still advances the countdown by one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoRuntime` when called outside a tokio runtime.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Result<Self, QuizError>
    where
        F: FnMut() -> TickOutcome + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| QuizError::NoRuntime)?;
        let handle = runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !on_tick().keeps_running() {
                    break;
                }
            }
        });
        Ok(Self {
            handle: Some(handle),
        })
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Abort the task. Later calls are no-ops.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("countdown ticker cancelled");
        }
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

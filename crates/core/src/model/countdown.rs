use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of advancing a countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time was decremented and some remains.
    Running { remaining: u32 },
    /// This tick consumed the last second.
    Expired,
    /// The countdown was already at zero; nothing changed.
    Idle,
}

impl TickOutcome {
    /// Whether a driver should keep scheduling ticks after this one.
    #[must_use]
    pub fn keeps_running(self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Whole-second countdown floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    #[must_use]
    pub fn new(seconds: u32) -> Self {
        Self { remaining: seconds }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Decrement by exactly one second; never goes below zero.
    pub fn tick(&mut self) -> TickOutcome {
        match self.remaining {
            0 => TickOutcome::Idle,
            1 => {
                self.remaining = 0;
                TickOutcome::Expired
            }
            n => {
                self.remaining = n - 1;
                TickOutcome::Running {
                    remaining: self.remaining,
                }
            }
        }
    }
}

/// `HH:MM:SS` when at least an hour remains, `MM:SS` otherwise.
impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.remaining / 3600;
        let minutes = (self.remaining % 3600) / 60;
        let seconds = self.remaining % 60;
        if hours > 0 {
            write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
        } else {
            write!(f, "{minutes:02}:{seconds:02}")
        }
    }
}

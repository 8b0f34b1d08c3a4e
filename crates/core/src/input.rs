//! Keyboard shortcuts for the quiz view, independent of any UI toolkit.

/// Keys the quiz view reacts to. Anything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizKey {
    ArrowLeft,
    ArrowRight,
    Digit(u8),
    Other,
}

impl QuizKey {
    /// Interpret a single-character key label.
    #[must_use]
    pub fn from_char(c: char) -> Self {
        c.to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .map_or(Self::Other, Self::Digit)
    }
}

/// An engine operation triggered by user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizCommand {
    Previous,
    Next,
    Jump { question: usize },
    Toggle { question: usize, option: usize },
}

/// Digits `1` through this value select options by position.
pub const MAX_OPTION_SHORTCUT: u8 = 4;

/// Translate a key press into a command for the question at `current`.
///
/// Digit shortcuts only apply when the option exists on that question.
#[must_use]
pub fn command_for_key(key: QuizKey, current: usize, option_count: usize) -> Option<QuizCommand> {
    match key {
        QuizKey::ArrowLeft => Some(QuizCommand::Previous),
        QuizKey::ArrowRight => Some(QuizCommand::Next),
        QuizKey::Digit(d @ 1..=MAX_OPTION_SHORTCUT) => {
            let option = usize::from(d - 1);
            (option < option_count).then_some(QuizCommand::Toggle {
                question: current,
                option,
            })
        }
        QuizKey::Digit(_) | QuizKey::Other => None,
    }
}

use dioxus::prelude::Key;
use quiz_core::QuizKey;
use services::{QuizSnapshot, QuizStatus};

use crate::vm::time_fmt::format_remaining;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub index: usize,
    /// Keyboard shortcut shown next to the option, when one exists.
    pub shortcut: Option<u8>,
    pub label: String,
    pub selected: bool,
}

impl OptionVm {
    #[must_use]
    pub fn class(&self) -> &'static str {
        if self.selected {
            "quiz-option quiz-option--selected"
        } else {
            "quiz-option"
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuestionTileVm {
    pub index: usize,
    pub number: usize,
    pub answered: bool,
    pub current: bool,
}

impl QuestionTileVm {
    #[must_use]
    pub fn class(self) -> &'static str {
        match (self.current, self.answered) {
            (true, _) => "quiz-map__tile quiz-map__tile--current",
            (false, true) => "quiz-map__tile quiz-map__tile--answered",
            (false, false) => "quiz-map__tile",
        }
    }
}

/// Display-ready projection of a quiz snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizVm {
    pub title: String,
    pub status: QuizStatus,
    pub progress_label: String,
    pub answered_label: String,
    pub timer_label: String,
    pub prompt: String,
    pub options: Vec<OptionVm>,
    pub tiles: Vec<QuestionTileVm>,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub answered_count: usize,
    pub unanswered_count: usize,
}

impl From<&QuizSnapshot> for QuizVm {
    fn from(snap: &QuizSnapshot) -> Self {
        let options = snap
            .options
            .iter()
            .map(|o| OptionVm {
                index: o.index,
                shortcut: shortcut_for(o.index),
                label: o.label.clone(),
                selected: o.selected,
            })
            .collect();
        let tiles = snap
            .answered
            .iter()
            .enumerate()
            .map(|(index, &answered)| QuestionTileVm {
                index,
                number: index + 1,
                answered,
                current: index == snap.current_index,
            })
            .collect();
        let frozen = snap.status.is_submitted();

        Self {
            title: snap.title.clone(),
            status: snap.status,
            progress_label: format!(
                "Question {} of {}",
                snap.question_number(),
                snap.question_count
            ),
            answered_label: format!("Answered: {} / {}", snap.answered_count, snap.question_count),
            timer_label: format_remaining(snap.time_remaining_secs),
            prompt: snap.prompt.clone(),
            options,
            tiles,
            can_go_previous: !frozen && !snap.is_first,
            can_go_next: !frozen && !snap.is_last,
            answered_count: snap.answered_count,
            unanswered_count: snap.question_count - snap.answered_count,
        }
    }
}

impl QuizVm {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.status == QuizStatus::Expired
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.status.is_submitted()
    }

    #[must_use]
    pub fn timer_class(&self) -> &'static str {
        if self.is_expired() {
            "quiz-timer quiz-timer--expired"
        } else {
            "quiz-timer"
        }
    }

    #[must_use]
    pub fn confirm_message(&self) -> String {
        if self.unanswered_count == 0 {
            "All questions answered. Submit now?".to_string()
        } else {
            format!(
                "{} of {} questions unanswered. Submit anyway?",
                self.unanswered_count,
                self.tiles.len()
            )
        }
    }
}

/// Element that receives keyboard shortcuts while a quiz is on screen.
pub const QUIZ_ROOT_ID: &str = "quiz-root";

/// Script that moves keyboard focus to the element with `id`.
#[must_use]
pub fn focus_script(id: &str) -> String {
    format!("document.getElementById({id:?})?.focus();")
}

fn shortcut_for(index: usize) -> Option<u8> {
    u8::try_from(index + 1)
        .ok()
        .filter(|&d| d <= quiz_core::input::MAX_OPTION_SHORTCUT)
}

/// Translate a keyboard event key into the engine's key vocabulary.
#[must_use]
pub fn quiz_key_from(key: &Key) -> QuizKey {
    match key {
        Key::ArrowLeft => QuizKey::ArrowLeft,
        Key::ArrowRight => QuizKey::ArrowRight,
        Key::Character(value) => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => QuizKey::from_char(c),
                _ => QuizKey::Other,
            }
        }
        _ => QuizKey::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::QuizSession;
    use quiz_core::model::{Question, QuestionId};
    use quiz_core::time::fixed_now;

    fn snapshot() -> QuizSnapshot {
        let questions = (1..=3)
            .map(|id| {
                Question::with_options(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    &["A", "B", "C", "D", "E"],
                )
                .unwrap()
            })
            .collect();
        let mut session = QuizSession::start(questions, 3_600, fixed_now()).unwrap();
        session.select_option(0, 4).unwrap();
        session.go_to_next();
        QuizSnapshot::from_session("Sample", &session)
    }

    #[test]
    fn maps_progress_timer_and_tiles() {
        let vm = QuizVm::from(&snapshot());
        assert_eq!(vm.progress_label, "Question 2 of 3");
        assert_eq!(vm.answered_label, "Answered: 1 / 3");
        assert_eq!(vm.timer_label, "01:00:00");
        assert_eq!(vm.tiles[0].class(), "quiz-map__tile quiz-map__tile--answered");
        assert_eq!(vm.tiles[1].class(), "quiz-map__tile quiz-map__tile--current");
        assert_eq!(vm.tiles[2].class(), "quiz-map__tile");
        assert!(vm.can_go_previous);
        assert!(vm.can_go_next);
        assert_eq!(vm.confirm_message(), "2 of 3 questions unanswered. Submit anyway?");
    }

    #[test]
    fn only_first_four_options_get_shortcuts() {
        let vm = QuizVm::from(&snapshot());
        let shortcuts: Vec<_> = vm.options.iter().map(|o| o.shortcut).collect();
        assert_eq!(shortcuts, vec![Some(1), Some(2), Some(3), Some(4), None]);
    }

    #[test]
    fn submitted_snapshot_disables_navigation() {
        let mut snap = snapshot();
        snap.status = QuizStatus::Submitted;
        let vm = QuizVm::from(&snap);
        assert!(vm.is_submitted());
        assert!(!vm.can_go_previous);
        assert!(!vm.can_go_next);
    }

    #[test]
    fn focus_script_targets_quiz_root() {
        assert_eq!(
            focus_script(QUIZ_ROOT_ID),
            "document.getElementById(\"quiz-root\")?.focus();"
        );
    }

    #[test]
    fn keys_map_to_quiz_keys() {
        assert_eq!(quiz_key_from(&Key::ArrowLeft), QuizKey::ArrowLeft);
        assert_eq!(quiz_key_from(&Key::ArrowRight), QuizKey::ArrowRight);
        assert_eq!(quiz_key_from(&Key::Character("3".into())), QuizKey::Digit(3));
        assert_eq!(quiz_key_from(&Key::Character("x".into())), QuizKey::Other);
        assert_eq!(quiz_key_from(&Key::Character("12".into())), QuizKey::Other);
        assert_eq!(quiz_key_from(&Key::Enter), QuizKey::Other);
    }
}

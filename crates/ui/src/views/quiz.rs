use std::sync::Arc;

use dioxus::document::eval;
use dioxus::prelude::*;
use dioxus_router::use_navigator;

use quiz_core::model::MockTestId;
use services::ActiveQuiz;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{QUIZ_ROOT_ID, QuestionTileVm, QuizVm, focus_script, quiz_key_from};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QuizIntent {
    Previous,
    Next,
    Jump(usize),
    Toggle(usize),
}

/// Runs one attempt. The attempt, and with it the countdown, lives exactly as
/// long as this view stays mounted.
#[component]
pub fn QuizView(mock_test_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let quiz_loop = ctx.quiz_loop();

    let quiz = use_signal(|| None::<Arc<ActiveQuiz>>);
    let vm = use_signal(|| None::<QuizVm>);
    let mut error = use_signal(|| None::<ViewError>);
    let mut confirming = use_signal(|| false);
    let mut submitting = use_signal(|| false);
    let mut did_focus = use_signal(|| false);

    let resource = use_resource(move || {
        let quiz_loop = quiz_loop.clone();
        let mut quiz = quiz;
        let mut vm = vm;

        async move {
            let started = quiz_loop
                .start_quiz(MockTestId::new(mock_test_id))
                .await
                .map_err(|e| ViewError::from_quiz(&e))?;
            let mut updates = started.subscribe();
            vm.set(Some(QuizVm::from(&started.snapshot())));
            quiz.set(Some(Arc::new(started)));

            // Ends when the attempt is dropped and its sender closes.
            spawn(async move {
                while updates.changed().await.is_ok() {
                    let next = QuizVm::from(&*updates.borrow_and_update());
                    vm.set(Some(next));
                }
            });
            Ok::<_, ViewError>(())
        }
    });
    let state = view_state_from_resource(&resource);

    // Shortcuts only reach the root once it holds focus.
    use_effect(move || {
        if did_focus() || vm.read().is_none() {
            return;
        }
        did_focus.set(true);
        let _ = eval(&focus_script(QUIZ_ROOT_ID));
    });

    let dispatch = use_callback(move |intent: QuizIntent| {
        let Some(active) = quiz.read().clone() else {
            return;
        };
        let result = match intent {
            QuizIntent::Previous => active.previous(),
            QuizIntent::Next => active.next(),
            QuizIntent::Jump(index) => active.go_to(index),
            QuizIntent::Toggle(option) => active.toggle_current(option),
        };
        if result.is_err() {
            error.set(Some(ViewError::Unknown));
        }
    });

    let submit = use_callback(move |()| {
        let Some(active) = quiz.read().clone() else {
            return;
        };
        confirming.set(false);
        submitting.set(true);
        spawn(async move {
            let mut submitting = submitting;
            let mut error = error;
            let result = active.submit().await;
            submitting.set(false);
            match result {
                Ok(receipt) => {
                    error.set(None);
                    let _ = match receipt.submission_id {
                        Some(submission_id) => navigator.push(Route::Submission { submission_id }),
                        None => navigator.push(Route::Home {}),
                    };
                }
                Err(_) => error.set(Some(ViewError::SubmitFailed)),
            }
        });
    });

    let on_key = use_callback(move |evt: KeyboardEvent| {
        if confirming() {
            return;
        }
        let Some(active) = quiz.read().clone() else {
            return;
        };
        if active.handle_key(quiz_key_from(&evt.data.key())) {
            evt.prevent_default();
        }
    });

    let vm_read = vm.read();

    rsx! {
        div { class: "page quiz-page", id: QUIZ_ROOT_ID, tabindex: "0", onkeydown: on_key,
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
                ViewState::Ready(()) => rsx! {
                    if let Some(data) = vm_read.as_ref() {
                        header { class: "quiz-header",
                            h2 { class: "quiz-title", "{data.title}" }
                            span {
                                class: data.timer_class(),
                                id: "quiz-timer",
                                "{data.timer_label}"
                            }
                        }
                        if data.is_expired() {
                            p { class: "quiz-expired", "Time is up. Review your answers and submit when ready." }
                        }
                        if let Some(err) = *error.read() {
                            p { class: "quiz-error", "{err.message()}" }
                        }
                        p { class: "quiz-progress", "{data.progress_label}" }
                        div { class: "quiz-question",
                            p { class: "quiz-prompt", "{data.prompt}" }
                            ul { class: "quiz-options",
                                for option in data.options.clone() {
                                    li { key: "{option.index}",
                                        button {
                                            class: option.class(),
                                            r#type: "button",
                                            aria_pressed: "{option.selected}",
                                            disabled: data.is_submitted(),
                                            onclick: move |_| dispatch.call(QuizIntent::Toggle(option.index)),
                                            if let Some(shortcut) = option.shortcut {
                                                span { class: "quiz-option__key", "{shortcut}" }
                                            }
                                            span { class: "quiz-option__label", "{option.label}" }
                                        }
                                    }
                                }
                            }
                        }
                        nav { class: "quiz-nav",
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                disabled: !data.can_go_previous,
                                onclick: move |_| dispatch.call(QuizIntent::Previous),
                                "Previous"
                            }
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                disabled: !data.can_go_next,
                                onclick: move |_| dispatch.call(QuizIntent::Next),
                                "Next"
                            }
                        }
                        QuestionMap { tiles: data.tiles.clone(), on_intent: dispatch }
                        footer { class: "quiz-footer",
                            span { class: "quiz-answered", "{data.answered_label}" }
                            button {
                                class: "btn btn-primary",
                                id: "quiz-submit",
                                r#type: "button",
                                disabled: data.is_submitted() || submitting(),
                                onclick: move |_| confirming.set(true),
                                "Submit"
                            }
                        }
                        if confirming() {
                            div { class: "quiz-confirm", role: "dialog", aria_modal: "true",
                                p { "{data.confirm_message()}" }
                                button {
                                    class: "btn btn-primary",
                                    r#type: "button",
                                    onclick: move |_| submit.call(()),
                                    "Submit answers"
                                }
                                button {
                                    class: "btn btn-secondary",
                                    r#type: "button",
                                    onclick: move |_| confirming.set(false),
                                    "Keep working"
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn QuestionMap(tiles: Vec<QuestionTileVm>, on_intent: EventHandler<QuizIntent>) -> Element {
    rsx! {
        ol { class: "quiz-map",
            for tile in tiles {
                li { key: "{tile.index}",
                    button {
                        class: tile.class(),
                        r#type: "button",
                        onclick: move |_| on_intent.call(QuizIntent::Jump(tile.index)),
                        "{tile.number}"
                    }
                }
            }
        }
    }
}

use dioxus::prelude::*;
use dioxus_router::use_navigator;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::SubmissionDetailVm;

#[component]
pub fn ResultView(submission_id: i64) -> Element {
    let ctx = use_context::<AppContext>();
    let submissions = ctx.submissions();
    let navigator = use_navigator();

    let resource = use_resource(move || {
        let submissions = submissions.clone();
        async move {
            let row = submissions
                .get(submission_id)
                .await
                .map_err(|e| ViewError::from_quiz(&e))?;
            Ok::<_, ViewError>(SubmissionDetailVm::from(&row))
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "Quiz Result" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(detail) => rsx! {
                    ResultDetails { detail: detail.clone() }
                    div { class: "result-actions",
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            onclick: move |_| {
                                let _ = navigator.push(Route::Quiz { mock_test_id: detail.mock_test_id });
                            },
                            "Try again"
                        }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| {
                                let _ = navigator.push(Route::Home {});
                            },
                            "Home"
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
            }
        }
    }
}

#[component]
fn ResultDetails(detail: SubmissionDetailVm) -> Element {
    rsx! {
        dl { class: "summary",
            dt { "Answered" }
            dd { "{detail.answered} of {detail.total}" }

            dt { "Unanswered" }
            dd { "{detail.unanswered}" }

            dt { "Time left" }
            dd { "{detail.time_left_str}" }

            dt { "Started" }
            dd { "{detail.started_at_str}" }

            dt { "Submitted" }
            dd { "{detail.submitted_at_str}" }
        }
        if detail.timed_out {
            p { class: "result-note", "Submitted after time ran out." }
        }
        ol { class: "result-answers",
            for line in detail.answers {
                li { key: "{line.number}",
                    span { class: "result-answers__label", "Question {line.number}: " }
                    span { "{line.label}" }
                }
            }
        }
    }
}

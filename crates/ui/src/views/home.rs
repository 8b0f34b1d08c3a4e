use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{MockTestCardVm, SubmissionCardVm, map_mock_test_cards, map_submission_cards};

#[derive(Clone, Debug, PartialEq)]
struct HomeData {
    mock_tests: Vec<MockTestCardVm>,
    recent: Vec<SubmissionCardVm>,
}

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let quiz_loop = ctx.quiz_loop();
    let submissions = ctx.submissions();
    let mock_test_id = ctx.current_mock_test_id();

    let resource = use_resource(move || {
        let quiz_loop = quiz_loop.clone();
        let submissions = submissions.clone();
        async move {
            let items = quiz_loop
                .list_mock_tests(50)
                .await
                .map_err(|e| ViewError::from_quiz(&e))?;
            let rows = submissions
                .recent(mock_test_id, 5)
                .await
                .map_err(|e| ViewError::from_quiz(&e))?;
            Ok::<_, ViewError>(HomeData {
                mock_tests: map_mock_test_cards(&items),
                recent: map_submission_cards(&rows),
            })
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "Mock Tests" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    if data.mock_tests.is_empty() {
                        p { "No mock tests yet. Run the seed command to add one." }
                    } else {
                        ul { class: "mock-tests",
                            for card in data.mock_tests {
                                MockTestCard { card }
                            }
                        }
                    }
                    h3 { "Recent results" }
                    if data.recent.is_empty() {
                        p { "No submissions yet." }
                    } else {
                        ul { class: "recent-results",
                            for card in data.recent {
                                li { key: "{card.id}",
                                    Link { to: Route::Submission { submission_id: card.id },
                                        span { class: "result-date", "{card.submitted_at_str}" }
                                    }
                                    span { class: "result-score", " {card.score_label}" }
                                }
                            }
                        }
                    }
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
            }
        }
    }
}

#[component]
fn MockTestCard(card: MockTestCardVm) -> Element {
    let navigator = use_navigator();
    let mock_test_id = card.id;

    rsx! {
        li { class: "mock-test-card",
            div { class: "mock-test-card__text",
                span { class: "mock-test-card__title", "{card.title}" }
                span { class: "mock-test-card__detail", "{card.detail}" }
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                onclick: move |_| {
                    let _ = navigator.push(Route::Quiz { mock_test_id });
                },
                "Start"
            }
        }
    }
}

use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::MockTestId;
use quiz_core::time::fixed_now;
use services::{Clock, LogSink, QuizLoopService, SubmissionService};
use storage::repository::{MockTestRepository, Storage, SubmissionRepository};
use storage::sample::{SAMPLE_MOCK_TEST_ID, sample_mock_test};

use crate::context::{UiApp, build_app_context};
use crate::views::{HomeView, QuizView, ResultView};

#[derive(Clone)]
struct TestApp {
    mock_test_id: MockTestId,
    quiz_loop: Arc<QuizLoopService>,
    submissions: Arc<SubmissionService>,
}

impl UiApp for TestApp {
    fn current_mock_test_id(&self) -> MockTestId {
        self.mock_test_id
    }

    fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    fn submissions(&self) -> Arc<SubmissionService> {
        Arc::clone(&self.submissions)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Quiz(u64),
    Result(i64),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Quiz(mock_test_id) => rsx! { QuizView { mock_test_id } },
        ViewKind::Result(submission_id) => rsx! { ResultView { submission_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    pub mock_test_id: MockTestId,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Harness over in-memory storage seeded with the sample mock test.
pub async fn setup_view_harness(view: ViewKind) -> ViewHarness {
    let storage = Storage::in_memory();
    storage
        .mock_tests
        .upsert_mock_test(&sample_mock_test())
        .await
        .expect("seed sample");
    setup_view_harness_with_submissions(view, storage.clone(), storage.submissions).await
}

pub async fn setup_view_harness_with_submissions(
    view: ViewKind,
    storage: Storage,
    submissions: Arc<dyn SubmissionRepository>,
) -> ViewHarness {
    let clock = Clock::fixed(fixed_now());
    let mock_test_id = MockTestId::new(SAMPLE_MOCK_TEST_ID);
    let quiz_loop = Arc::new(QuizLoopService::new(
        clock,
        Arc::clone(&storage.mock_tests),
        Arc::new(LogSink),
    ));
    let app = Arc::new(TestApp {
        mock_test_id,
        quiz_loop,
        submissions: Arc::new(SubmissionService::new(submissions)),
    });

    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });

    ViewHarness {
        dom,
        storage,
        mock_test_id,
    }
}

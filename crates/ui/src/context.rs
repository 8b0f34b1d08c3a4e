use std::sync::Arc;

use quiz_core::model::MockTestId;
use services::{QuizLoopService, SubmissionService};

pub trait UiApp: Send + Sync {
    fn current_mock_test_id(&self) -> MockTestId;

    fn quiz_loop(&self) -> Arc<QuizLoopService>;
    fn submissions(&self) -> Arc<SubmissionService>;
}

#[derive(Clone)]
pub struct AppContext {
    current_mock_test_id: MockTestId,
    quiz_loop: Arc<QuizLoopService>,
    submissions: Arc<SubmissionService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            current_mock_test_id: app.current_mock_test_id(),
            quiz_loop: app.quiz_loop(),
            submissions: app.submissions(),
        }
    }

    #[must_use]
    pub fn current_mock_test_id(&self) -> MockTestId {
        self.current_mock_test_id
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn submissions(&self) -> Arc<SubmissionService> {
        Arc::clone(&self.submissions)
    }
}

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}

use std::sync::Arc;

use quiz_core::QuizSession;
use quiz_core::model::{MockTestId, SubmissionSummary};
use quiz_core::time::fixed_now;
use storage::repository::{
    MockTestRepository, Storage, StorageError, SubmissionRepository, SubmissionRow,
};
use storage::sample::sample_mock_test;

use super::test_harness::{ViewKind, setup_view_harness, setup_view_harness_with_submissions};

fn sample_summary() -> SubmissionSummary {
    let (questions, duration) = sample_mock_test().into_parts();
    let mut session = QuizSession::start(questions, duration, fixed_now()).unwrap();
    session.select_option(0, 1).unwrap();
    session.select_option(2, 0).unwrap();
    session.select_option(2, 2).unwrap();
    session.submit(fixed_now())
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_lists_mock_tests_and_results() {
    let mut harness = setup_view_harness(ViewKind::Home).await;
    harness
        .storage
        .submissions
        .append_submission(harness.mock_test_id, &sample_summary())
        .await
        .expect("append submission");

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("General Knowledge"), "missing title in {html}");
    assert!(html.contains("10 questions"), "missing count in {html}");
    assert!(html.contains("Start"), "missing start in {html}");
    assert!(html.contains("2 / 10 answered"), "missing result in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_renders_first_question() {
    let mut harness = setup_view_harness(ViewKind::Quiz(1)).await;
    harness.rebuild();
    harness.drive_async().await;
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Question 1 of 10"), "missing progress in {html}");
    assert!(
        html.contains("Which planet is known as the Red Planet?"),
        "missing prompt in {html}"
    );
    assert!(html.contains("Mars"), "missing option in {html}");
    assert!(html.contains("14:4"), "missing timer in {html}");
    assert!(html.contains("Answered: 0 / 10"), "missing answered in {html}");
    assert!(
        html.contains(r#"id="quiz-root""#) && html.contains(r#"tabindex="0""#),
        "missing focusable key target in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_reports_missing_mock_test() {
    let mut harness = setup_view_harness(ViewKind::Quiz(404)).await;
    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("could not be found"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn result_view_smoke_renders_answer_breakdown() {
    let storage = Storage::in_memory();
    storage
        .mock_tests
        .upsert_mock_test(&sample_mock_test())
        .await
        .unwrap();
    let id = storage
        .submissions
        .append_submission(MockTestId::new(1), &sample_summary())
        .await
        .unwrap();

    let submissions = Arc::clone(&storage.submissions);
    let mut harness =
        setup_view_harness_with_submissions(ViewKind::Result(id), storage, submissions).await;
    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Quiz Result"), "missing title in {html}");
    assert!(html.contains("2 of 10"), "missing answered in {html}");
    assert!(html.contains("A, C"), "missing selection in {html}");
    assert!(html.contains("Not answered"), "missing unanswered in {html}");
}

struct FailingSubmissions;

#[async_trait::async_trait]
impl SubmissionRepository for FailingSubmissions {
    async fn append_submission(
        &self,
        _mock_test_id: MockTestId,
        _summary: &SubmissionSummary,
    ) -> Result<i64, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn get_submission(&self, _id: i64) -> Result<SubmissionRow, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn list_submissions(
        &self,
        _mock_test_id: MockTestId,
        _limit: u32,
    ) -> Result<Vec<SubmissionRow>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_error_state() {
    let mut harness = setup_view_harness_with_submissions(
        ViewKind::Home,
        Storage::in_memory(),
        Arc::new(FailingSubmissions),
    )
    .await;
    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Something went wrong"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

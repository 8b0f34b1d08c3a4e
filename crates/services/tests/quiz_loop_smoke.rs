use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::QuizKey;
use quiz_core::model::{MockTest, MockTestId, Question, QuestionId, SubmissionSummary};
use quiz_core::time::fixed_now;
use services::{
    Clock, QuizError, QuizLoopService, QuizStatus, StoredSink, SubmissionReceipt, SubmissionSink,
};
use storage::repository::{
    InMemoryRepository, MockTestRepository, StorageError, SubmissionRepository,
};

fn abcd_test(id: u64, questions: u64, duration: u32) -> MockTest {
    let questions = (1..=questions)
        .map(|q| {
            Question::with_options(QuestionId::new(q), format!("Q{q}"), &["A", "B", "C", "D"])
                .unwrap()
        })
        .collect();
    MockTest::new(MockTestId::new(id), "Smoke Test", duration, questions).unwrap()
}

async fn stored_loop(repo: &InMemoryRepository, duration: u32) -> QuizLoopService {
    repo.upsert_mock_test(&abcd_test(1, 3, duration)).await.unwrap();
    QuizLoopService::new(
        Clock::fixed(fixed_now()),
        Arc::new(repo.clone()),
        Arc::new(StoredSink::new(Arc::new(repo.clone()))),
    )
}

#[tokio::test(start_paused = true)]
async fn walkthrough_persists_answer_map() {
    let repo = InMemoryRepository::new();
    let quiz = stored_loop(&repo, 53_040)
        .await
        .start_quiz(MockTestId::new(1))
        .await
        .unwrap();

    quiz.toggle_current(1).unwrap();
    quiz.toggle_current(3).unwrap();
    quiz.next().unwrap();
    quiz.toggle_current(0).unwrap();
    quiz.toggle_current(0).unwrap();
    quiz.go_to(2).unwrap();
    assert!(quiz.handle_key(QuizKey::Digit(3)));
    assert!(quiz.handle_key(QuizKey::ArrowLeft));

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    let snap = quiz.snapshot();
    assert_eq!(snap.current_index, 1);
    assert_eq!(snap.answered_count, 2);
    assert_eq!(snap.time_remaining_secs, 53_037);

    let receipt = quiz.submit().await.unwrap();
    let id = receipt.submission_id.expect("stored sink returns a row id");
    let row = repo.get_submission(id).await.unwrap();
    let summary = row.summary;

    assert_eq!(summary.total_questions(), 3);
    assert_eq!(summary.answered_count(), 2);
    assert_eq!(summary.time_remaining_secs(), 53_037);
    assert_eq!(summary.answers()[&0].iter().copied().collect::<Vec<_>>(), vec![1, 3]);
    assert!(summary.answers()[&1].is_empty());
    assert_eq!(summary.answers()[&2].iter().copied().collect::<Vec<_>>(), vec![2]);
}

#[tokio::test(start_paused = true)]
async fn expiry_keeps_quiz_open_until_submitted() {
    let repo = InMemoryRepository::new();
    let quiz = stored_loop(&repo, 2)
        .await
        .start_quiz(MockTestId::new(1))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;
    let snap = quiz.snapshot();
    assert_eq!(snap.status, QuizStatus::Expired);
    assert_eq!(snap.time_remaining_secs, 0);
    assert!(!quiz.is_ticking());
    assert!(repo.list_submissions(MockTestId::new(1), 10).await.unwrap().is_empty());

    assert!(quiz.toggle_current(2).unwrap());
    let receipt = quiz.submit().await.unwrap();
    assert_eq!(receipt.answered_count, 1);

    let rows = repo.list_submissions(MockTestId::new(1), 10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].summary.timed_out());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_quiz_cancels_its_countdown() {
    let repo = InMemoryRepository::new();
    let quiz = stored_loop(&repo, 60)
        .await
        .start_quiz(MockTestId::new(1))
        .await
        .unwrap();
    let mut rx = quiz.subscribe();

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(rx.borrow_and_update().time_remaining_secs, 59);

    drop(quiz);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(rx.borrow().time_remaining_secs, 59);
}

#[tokio::test(start_paused = true)]
async fn submit_stops_the_countdown_and_is_final() {
    let repo = InMemoryRepository::new();
    let quiz = stored_loop(&repo, 60)
        .await
        .start_quiz(MockTestId::new(1))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    quiz.submit().await.unwrap();
    let frozen = quiz.snapshot();
    assert_eq!(frozen.status, QuizStatus::Submitted);
    assert_eq!(frozen.time_remaining_secs, 58);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(quiz.snapshot(), frozen);
    assert!(matches!(quiz.submit().await, Err(QuizError::AlreadySubmitted)));
    assert!(matches!(quiz.toggle(0, 0), Err(QuizError::AlreadySubmitted)));
    assert_eq!(
        repo.list_submissions(MockTestId::new(1), 10).await.unwrap().len(),
        1
    );
}

/// Fails the first delivery, then succeeds.
struct FlakySink {
    calls: AtomicU32,
}

#[async_trait]
impl SubmissionSink for FlakySink {
    async fn accept(
        &self,
        _mock_test_id: Option<MockTestId>,
        summary: &SubmissionSummary,
    ) -> Result<SubmissionReceipt, QuizError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(QuizError::Storage(StorageError::Connection(
                "offline".to_string(),
            )));
        }
        Ok(SubmissionReceipt::for_summary(summary, None))
    }
}

#[tokio::test(start_paused = true)]
async fn failed_delivery_is_retried_with_same_attempt() {
    let repo = InMemoryRepository::new();
    repo.upsert_mock_test(&abcd_test(1, 2, 60)).await.unwrap();
    let sink = Arc::new(FlakySink {
        calls: AtomicU32::new(0),
    });
    let quiz = QuizLoopService::new(Clock::fixed(fixed_now()), Arc::new(repo), sink.clone())
        .start_quiz(MockTestId::new(1))
        .await
        .unwrap();
    let attempt = quiz.snapshot().attempt_id;
    quiz.toggle_current(0).unwrap();

    assert!(matches!(quiz.submit().await, Err(QuizError::Storage(_))));
    assert!(quiz.is_submitted());
    assert!(!quiz.is_ticking());

    let receipt = quiz.submit().await.unwrap();
    assert_eq!(receipt.attempt_id, attempt);
    assert_eq!(receipt.answered_count, 1);
    assert_eq!(sink.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn ad_hoc_quiz_is_rejected_before_it_starts_with_stored_sink() {
    let repo = InMemoryRepository::new();
    let service = stored_loop(&repo, 60).await;
    let err = service
        .start_with(
            "Scratch",
            vec![Question::with_options(QuestionId::new(1), "Only?", &["Yes", "No"]).unwrap()],
            30,
        )
        .err()
        .unwrap();
    assert!(matches!(err, QuizError::Unbound));

    let quiz = service.start_quiz(MockTestId::new(1)).await.unwrap();
    assert!(quiz.toggle_current(0).unwrap());
    assert!(quiz.next().unwrap());
    assert!(!quiz.is_submitted());
    let receipt = quiz.submit().await.unwrap();
    assert!(receipt.submission_id.is_some());
    assert_eq!(
        repo.list_submissions(MockTestId::new(1), 10).await.unwrap().len(),
        1
    );
}

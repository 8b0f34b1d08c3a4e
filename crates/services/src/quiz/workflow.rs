use rand::seq::SliceRandom;
use std::sync::Arc;

use quiz_core::model::{MockTestId, Question};
use quiz_core::{Clock, QuizSession};
use storage::repository::{MockTestListItem, MockTestRepository};

use super::active::ActiveQuiz;
use super::sink::SubmissionSink;
use crate::error::QuizError;

/// Starts quiz attempts from stored mock tests.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    mock_tests: Arc<dyn MockTestRepository>,
    sink: Arc<dyn SubmissionSink>,
    duration_override: Option<u32>,
    shuffle_questions: bool,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        mock_tests: Arc<dyn MockTestRepository>,
        sink: Arc<dyn SubmissionSink>,
    ) -> Self {
        Self {
            clock,
            mock_tests,
            sink,
            duration_override: None,
            shuffle_questions: false,
        }
    }

    /// Use a fixed time limit instead of each mock test's own.
    #[must_use]
    pub fn with_duration_override(mut self, duration_secs: Option<u32>) -> Self {
        self.duration_override = duration_secs;
        self
    }

    /// Shuffle question order once when an attempt starts.
    #[must_use]
    pub fn with_shuffle_questions(mut self, shuffle: bool) -> Self {
        self.shuffle_questions = shuffle;
        self
    }

    /// List mock tests available to start.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the repository query fails.
    pub async fn list_mock_tests(&self, limit: u32) -> Result<Vec<MockTestListItem>, QuizError> {
        Ok(self.mock_tests.list_mock_tests(limit).await?)
    }

    /// Load a mock test and start an attempt at its first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the mock test cannot be loaded,
    /// `QuizError::Session` if it cannot start a session, and
    /// `QuizError::NoRuntime` outside a tokio runtime.
    pub async fn start_quiz(&self, mock_test_id: MockTestId) -> Result<ActiveQuiz, QuizError> {
        let test = self.mock_tests.get_mock_test(mock_test_id).await?;
        let title = test.title().to_string();
        let (questions, duration) = test.into_parts();
        self.launch(title, questions, duration, Some(mock_test_id))
    }

    /// Start an attempt over an ad-hoc question list that is not stored.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` for an invalid question list,
    /// `QuizError::Unbound` when the sink only stores mock-test attempts, and
    /// `QuizError::NoRuntime` outside a tokio runtime.
    pub fn start_with(
        &self,
        title: impl Into<String>,
        questions: Vec<Question>,
        duration_secs: u32,
    ) -> Result<ActiveQuiz, QuizError> {
        self.launch(title.into(), questions, duration_secs, None)
    }

    fn launch(
        &self,
        title: String,
        mut questions: Vec<Question>,
        duration_secs: u32,
        mock_test_id: Option<MockTestId>,
    ) -> Result<ActiveQuiz, QuizError> {
        if self.shuffle_questions {
            questions.shuffle(&mut rand::rng());
        }
        let duration = self.duration_override.unwrap_or(duration_secs);
        let session = QuizSession::start(questions, duration, self.clock.now())?;
        tracing::info!(
            attempt = %session.attempt_id(),
            mock_test = ?mock_test_id,
            questions = session.question_count(),
            duration_secs = duration,
            "quiz started"
        );
        ActiveQuiz::launch(
            title,
            session,
            mock_test_id,
            self.clock,
            Arc::clone(&self.sink),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::sink::LogSink;
    use quiz_core::time::fixed_clock;
    use storage::Storage;
    use storage::sample::{SAMPLE_DURATION_SECS, SAMPLE_MOCK_TEST_ID, sample_mock_test};

    async fn service() -> QuizLoopService {
        let storage = Storage::in_memory();
        storage
            .mock_tests
            .upsert_mock_test(&sample_mock_test())
            .await
            .unwrap();
        QuizLoopService::new(fixed_clock(), storage.mock_tests, Arc::new(LogSink))
    }

    #[tokio::test(start_paused = true)]
    async fn starts_stored_mock_test_at_first_question() {
        let quiz = service()
            .await
            .start_quiz(MockTestId::new(SAMPLE_MOCK_TEST_ID))
            .await
            .unwrap();
        let snap = quiz.snapshot();
        assert_eq!(snap.current_index, 0);
        assert_eq!(snap.question_count, 10);
        assert_eq!(snap.time_remaining_secs, SAMPLE_DURATION_SECS);
        assert_eq!(snap.answered_count, 0);
        assert_eq!(quiz.mock_test_id(), Some(MockTestId::new(SAMPLE_MOCK_TEST_ID)));
    }

    #[tokio::test(start_paused = true)]
    async fn duration_override_replaces_stored_limit() {
        let quiz = service()
            .await
            .with_duration_override(Some(90))
            .start_quiz(MockTestId::new(SAMPLE_MOCK_TEST_ID))
            .await
            .unwrap();
        assert_eq!(quiz.snapshot().time_remaining_secs, 90);
    }

    #[tokio::test(start_paused = true)]
    async fn shuffle_keeps_every_question() {
        let quiz = service()
            .await
            .with_shuffle_questions(true)
            .start_quiz(MockTestId::new(SAMPLE_MOCK_TEST_ID))
            .await
            .unwrap();
        assert_eq!(quiz.snapshot().question_count, 10);
    }

    #[tokio::test]
    async fn unknown_mock_test_is_a_storage_error() {
        let err = service()
            .await
            .start_quiz(MockTestId::new(999))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, QuizError::Storage(_)));
    }

    #[tokio::test]
    async fn empty_question_list_is_rejected() {
        let err = service()
            .await
            .start_with("Empty", Vec::new(), 60)
            .err()
            .unwrap();
        assert!(matches!(err, QuizError::Session(_)));
    }
}

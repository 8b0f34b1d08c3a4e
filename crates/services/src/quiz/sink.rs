use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use quiz_core::model::{AttemptId, MockTestId, SubmissionSummary};
use storage::repository::SubmissionRepository;

use crate::error::QuizError;

/// Acknowledgement returned once a sink has taken a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub attempt_id: AttemptId,
    /// Storage row id, when the sink persisted the submission.
    pub submission_id: Option<i64>,
    pub total_questions: usize,
    pub answered_count: usize,
}

impl SubmissionReceipt {
    #[must_use]
    pub fn for_summary(summary: &SubmissionSummary, submission_id: Option<i64>) -> Self {
        Self {
            attempt_id: summary.attempt_id(),
            submission_id,
            total_questions: summary.total_questions(),
            answered_count: summary.answered_count(),
        }
    }
}

/// Receives the final answer map of a quiz attempt for grading or storage.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Whether this sink can only accept attempts of a stored mock test.
    fn requires_mock_test(&self) -> bool {
        false
    }

    /// # Errors
    ///
    /// Returns `QuizError` if the submission could not be accepted. The caller
    /// keeps the summary and may deliver it again.
    async fn accept(
        &self,
        mock_test_id: Option<MockTestId>,
        summary: &SubmissionSummary,
    ) -> Result<SubmissionReceipt, QuizError>;
}

/// Logs the answer map and keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl SubmissionSink for LogSink {
    async fn accept(
        &self,
        mock_test_id: Option<MockTestId>,
        summary: &SubmissionSummary,
    ) -> Result<SubmissionReceipt, QuizError> {
        let answers = serde_json::to_string(summary.answers())
            .unwrap_or_else(|e| format!("<unserializable answers: {e}>"));
        tracing::info!(
            attempt = %summary.attempt_id(),
            mock_test = ?mock_test_id,
            total = summary.total_questions(),
            answered = summary.answered_count(),
            remaining_secs = summary.time_remaining_secs(),
            %answers,
            "quiz submitted"
        );
        Ok(SubmissionReceipt::for_summary(summary, None))
    }
}

/// Persists submissions through a `SubmissionRepository`.
#[derive(Clone)]
pub struct StoredSink {
    submissions: Arc<dyn SubmissionRepository>,
}

impl StoredSink {
    #[must_use]
    pub fn new(submissions: Arc<dyn SubmissionRepository>) -> Self {
        Self { submissions }
    }
}

#[async_trait]
impl SubmissionSink for StoredSink {
    fn requires_mock_test(&self) -> bool {
        true
    }

    async fn accept(
        &self,
        mock_test_id: Option<MockTestId>,
        summary: &SubmissionSummary,
    ) -> Result<SubmissionReceipt, QuizError> {
        let mock_test_id = mock_test_id.ok_or(QuizError::Unbound)?;
        let id = self
            .submissions
            .append_submission(mock_test_id, summary)
            .await
            .inspect_err(|e| {
                tracing::warn!(attempt = %summary.attempt_id(), error = %e, "storing submission failed");
            })?;
        tracing::info!(
            attempt = %summary.attempt_id(),
            submission_id = id,
            answered = summary.answered_count(),
            total = summary.total_questions(),
            "quiz submission stored"
        );
        Ok(SubmissionReceipt::for_summary(summary, Some(id)))
    }
}

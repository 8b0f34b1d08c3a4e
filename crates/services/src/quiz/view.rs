use std::sync::Arc;

use quiz_core::model::MockTestId;
use storage::repository::{SubmissionRepository, SubmissionRow};

use crate::error::QuizError;

/// Read access to stored submissions for result and history screens.
#[derive(Clone)]
pub struct SubmissionService {
    submissions: Arc<dyn SubmissionRepository>,
}

impl SubmissionService {
    #[must_use]
    pub fn new(submissions: Arc<dyn SubmissionRepository>) -> Self {
        Self { submissions }
    }

    /// Fetch one stored submission.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the row is missing or cannot be read.
    pub async fn get(&self, id: i64) -> Result<SubmissionRow, QuizError> {
        Ok(self.submissions.get_submission(id).await?)
    }

    /// Most recent submissions for a mock test, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the query fails.
    pub async fn recent(
        &self,
        mock_test_id: MockTestId,
        limit: u32,
    ) -> Result<Vec<SubmissionRow>, QuizError> {
        Ok(self.submissions.list_submissions(mock_test_id, limit).await?)
    }
}

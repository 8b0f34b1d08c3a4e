use quiz_core::model::{MockTestId, SubmissionSummary};

use super::SqliteRepository;
use super::mapping::{id_to_i64, map_submission_row, read_err, ser, usize_to_i64, write_err};
use crate::repository::{StorageError, SubmissionRepository, SubmissionRow};

const SELECT_SUBMISSION: &str = r"
    SELECT
        id, mock_test_id, attempt_id, started_at, submitted_at,
        time_remaining_secs, total_questions, answered_count, answers
    FROM submissions
";

#[async_trait::async_trait]
impl SubmissionRepository for SqliteRepository {
    async fn append_submission(
        &self,
        mock_test_id: MockTestId,
        summary: &SubmissionSummary,
    ) -> Result<i64, StorageError> {
        let answers = serde_json::to_string(summary.answers()).map_err(ser)?;

        let res = sqlx::query(
            r"
                INSERT INTO submissions (
                    mock_test_id, attempt_id, started_at, submitted_at,
                    time_remaining_secs, total_questions, answered_count, answers
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(id_to_i64("mock_test_id", mock_test_id.value())?)
        .bind(summary.attempt_id().to_string())
        .bind(summary.started_at())
        .bind(summary.submitted_at())
        .bind(i64::from(summary.time_remaining_secs()))
        .bind(usize_to_i64("total_questions", summary.total_questions())?)
        .bind(usize_to_i64("answered_count", summary.answered_count())?)
        .bind(answers)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(res.last_insert_rowid())
    }

    async fn get_submission(&self, id: i64) -> Result<SubmissionRow, StorageError> {
        let sql = format!("{SELECT_SUBMISSION} WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_err)?
            .ok_or(StorageError::NotFound)?;

        map_submission_row(&row)
    }

    async fn list_submissions(
        &self,
        mock_test_id: MockTestId,
        limit: u32,
    ) -> Result<Vec<SubmissionRow>, StorageError> {
        let sql = format!(
            "{SELECT_SUBMISSION} WHERE mock_test_id = ?1 ORDER BY submitted_at DESC, id DESC LIMIT ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(id_to_i64("mock_test_id", mock_test_id.value())?)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(read_err)?;

        rows.iter().map(map_submission_row).collect()
    }
}

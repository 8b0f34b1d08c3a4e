use quiz_core::model::{
    AnswerMap, AttemptId, MockTestId, Question, QuestionId, SubmissionSummary,
};
use sqlx::Row;

use crate::repository::{StorageError, SubmissionRow};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Maps a write failure, turning constraint violations into domain errors.
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return StorageError::Conflict;
        }
        if db.is_foreign_key_violation() {
            return StorageError::NotFound;
        }
    }
    StorageError::Connection(e.to_string())
}

pub(crate) fn read_err(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn i64_to_usize(field: &'static str, v: i64) -> Result<usize, StorageError> {
    usize::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn usize_to_i64(field: &'static str, v: usize) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn mock_test_id_from_i64(v: i64) -> Result<MockTestId, StorageError> {
    Ok(MockTestId::new(i64_to_u64("mock_test_id", v)?))
}

pub(crate) fn duration_from_i64(v: i64) -> Result<u32, StorageError> {
    i64_to_u32("duration_secs", v)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let id = QuestionId::new(i64_to_u64("question id", row.try_get("id").map_err(ser)?)?);
    let prompt: String = row.try_get("prompt").map_err(ser)?;
    let options_json: String = row.try_get("options").map_err(ser)?;
    let options: Vec<String> = serde_json::from_str(&options_json).map_err(ser)?;
    Question::new(id, prompt, options).map_err(|e| ser(quiz_core::Error::from(e)))
}

pub(crate) fn map_submission_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SubmissionRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let mock_test_id = mock_test_id_from_i64(row.try_get("mock_test_id").map_err(ser)?)?;
    let attempt_id: AttemptId = row
        .try_get::<String, _>("attempt_id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let started_at = row.try_get("started_at").map_err(ser)?;
    let submitted_at = row.try_get("submitted_at").map_err(ser)?;
    let time_remaining_secs = i64_to_u32(
        "time_remaining_secs",
        row.try_get("time_remaining_secs").map_err(ser)?,
    )?;
    let total_questions =
        i64_to_usize("total_questions", row.try_get("total_questions").map_err(ser)?)?;
    let answered_count =
        i64_to_usize("answered_count", row.try_get("answered_count").map_err(ser)?)?;
    let answers: AnswerMap =
        serde_json::from_str(&row.try_get::<String, _>("answers").map_err(ser)?).map_err(ser)?;

    let summary = SubmissionSummary::from_persisted(
        attempt_id,
        started_at,
        submitted_at,
        time_remaining_secs,
        total_questions,
        answered_count,
        answers,
    )
    .map_err(|e| ser(quiz_core::Error::from(e)))?;

    Ok(SubmissionRow {
        id,
        mock_test_id,
        summary,
    })
}

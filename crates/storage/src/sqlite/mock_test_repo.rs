use quiz_core::model::{MockTest, MockTestId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    duration_from_i64, id_to_i64, map_question_row, mock_test_id_from_i64, read_err, ser,
    usize_to_i64, write_err,
};
use crate::repository::{MockTestListItem, MockTestRepository, StorageError};

#[async_trait::async_trait]
impl MockTestRepository for SqliteRepository {
    async fn upsert_mock_test(&self, test: &MockTest) -> Result<(), StorageError> {
        let id = id_to_i64("mock_test_id", test.id().value())?;
        let mut tx = self.pool.begin().await.map_err(read_err)?;

        sqlx::query(
            r"
            INSERT INTO mock_tests (id, title, duration_secs)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                duration_secs = excluded.duration_secs
            ",
        )
        .bind(id)
        .bind(test.title())
        .bind(i64::from(test.duration_secs()))
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;

        // Questions are replaced wholesale so positions stay contiguous.
        sqlx::query("DELETE FROM questions WHERE mock_test_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;

        for (position, question) in test.questions().iter().enumerate() {
            let options = serde_json::to_string(question.options()).map_err(ser)?;
            sqlx::query(
                r"
                INSERT INTO questions (mock_test_id, position, id, prompt, options)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )
            .bind(id)
            .bind(usize_to_i64("position", position)?)
            .bind(id_to_i64("question_id", question.id().value())?)
            .bind(question.prompt())
            .bind(options)
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;
        }

        tx.commit().await.map_err(write_err)?;
        Ok(())
    }

    async fn get_mock_test(&self, id: MockTestId) -> Result<MockTest, StorageError> {
        let raw_id = id_to_i64("mock_test_id", id.value())?;
        let row = sqlx::query("SELECT id, title, duration_secs FROM mock_tests WHERE id = ?1")
            .bind(raw_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_err)?
            .ok_or(StorageError::NotFound)?;

        let title: String = row.try_get("title").map_err(ser)?;
        let duration_secs = duration_from_i64(row.try_get("duration_secs").map_err(ser)?)?;

        let question_rows = sqlx::query(
            r"
            SELECT id, prompt, options
            FROM questions
            WHERE mock_test_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(raw_id)
        .fetch_all(&self.pool)
        .await
        .map_err(read_err)?;

        let questions = question_rows
            .iter()
            .map(map_question_row)
            .collect::<Result<Vec<_>, _>>()?;

        MockTest::new(id, title, duration_secs, questions)
            .map_err(|e| ser(quiz_core::Error::from(e)))
    }

    async fn list_mock_tests(&self, limit: u32) -> Result<Vec<MockTestListItem>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                t.id, t.title, t.duration_secs,
                (SELECT COUNT(*) FROM questions q WHERE q.mock_test_id = t.id) AS question_count
            FROM mock_tests t
            ORDER BY t.id ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(read_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let question_count: i64 = row.try_get("question_count").map_err(ser)?;
            out.push(MockTestListItem {
                id: mock_test_id_from_i64(row.try_get("id").map_err(ser)?)?,
                title: row.try_get("title").map_err(ser)?,
                duration_secs: duration_from_i64(row.try_get("duration_secs").map_err(ser)?)?,
                question_count: usize::try_from(question_count).map_err(ser)?,
            });
        }
        Ok(out)
    }
}

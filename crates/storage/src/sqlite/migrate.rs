use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs versioned migrations for the current schema.
///
/// Version 1 creates mock tests, their ordered questions, and submissions.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS mock_tests (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    duration_secs INTEGER NOT NULL CHECK (duration_secs >= 0)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS questions (
                    mock_test_id INTEGER NOT NULL,
                    position INTEGER NOT NULL CHECK (position >= 0),
                    id INTEGER NOT NULL,
                    prompt TEXT NOT NULL,
                    options TEXT NOT NULL,
                    PRIMARY KEY (mock_test_id, position),
                    UNIQUE (mock_test_id, id),
                    FOREIGN KEY (mock_test_id) REFERENCES mock_tests(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS submissions (
                    id INTEGER PRIMARY KEY,
                    mock_test_id INTEGER NOT NULL,
                    attempt_id TEXT NOT NULL UNIQUE,
                    started_at TEXT NOT NULL,
                    submitted_at TEXT NOT NULL,
                    time_remaining_secs INTEGER NOT NULL CHECK (time_remaining_secs >= 0),
                    total_questions INTEGER NOT NULL CHECK (total_questions >= 0),
                    answered_count INTEGER NOT NULL CHECK (answered_count >= 0),
                    answers TEXT NOT NULL,
                    FOREIGN KEY (mock_test_id) REFERENCES mock_tests(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_submissions_mock_test_submitted
                    ON submissions (mock_test_id, submitted_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(version = 1, "applied sqlite migration");
    }

    Ok(())
}

use std::sync::Arc;

use quiz_core::model::MockTestId;
use storage::repository::{MockTestRepository, Storage, StorageError};
use storage::sample::sample_mock_test;

use crate::Clock;
use crate::error::AppServicesError;
use crate::quiz::{QuizLoopService, StoredSink, SubmissionService};

/// Launch options that shape every attempt started from the app.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizOptions {
    pub duration_override: Option<u32>,
    pub shuffle_questions: bool,
}

/// Assembles app-facing services and resolves a usable mock test id.
#[derive(Clone)]
pub struct AppServices {
    mock_test_id: MockTestId,
    quiz_loop: Arc<QuizLoopService>,
    submissions: Arc<SubmissionService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or default mock
    /// test setup fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        preferred_id: MockTestId,
        options: QuizOptions,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, clock, preferred_id, options).await
    }

    /// Build services over an existing storage aggregate.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the default mock test cannot be resolved
    /// or seeded.
    pub async fn from_storage(
        storage: Storage,
        clock: Clock,
        preferred_id: MockTestId,
        options: QuizOptions,
    ) -> Result<Self, AppServicesError> {
        let mock_test_id = ensure_default_mock_test(storage.mock_tests.as_ref(), preferred_id).await?;

        let sink = Arc::new(StoredSink::new(Arc::clone(&storage.submissions)));
        let quiz_loop = Arc::new(
            QuizLoopService::new(clock, Arc::clone(&storage.mock_tests), sink)
                .with_duration_override(options.duration_override)
                .with_shuffle_questions(options.shuffle_questions),
        );
        let submissions = Arc::new(SubmissionService::new(Arc::clone(&storage.submissions)));

        Ok(Self {
            mock_test_id,
            quiz_loop,
            submissions,
        })
    }

    #[must_use]
    pub fn mock_test_id(&self) -> MockTestId {
        self.mock_test_id
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

async fn ensure_default_mock_test(
    mock_tests: &dyn MockTestRepository,
    preferred_id: MockTestId,
) -> Result<MockTestId, AppServicesError> {
    match mock_tests.get_mock_test(preferred_id).await {
        Ok(_) => return Ok(preferred_id),
        Err(StorageError::NotFound) => {}
        Err(e) => return Err(e.into()),
    }

    let existing = mock_tests.list_mock_tests(128).await?;
    if let Some(first) = existing.first() {
        tracing::warn!(
            requested = %preferred_id,
            using = %first.id,
            "mock test not found, falling back to first stored"
        );
        return Ok(first.id);
    }

    let sample = sample_mock_test();
    mock_tests.upsert_mock_test(&sample).await?;
    tracing::info!(id = %sample.id(), "seeded sample mock test");
    Ok(sample.id())
}

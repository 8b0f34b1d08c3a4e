use async_trait::async_trait;
use quiz_core::model::{MockTest, MockTestId, SubmissionSummary};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Lightweight listing entry so pickers do not load every question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTestListItem {
    pub id: MockTestId,
    pub title: String,
    pub duration_secs: u32,
    pub question_count: usize,
}

impl MockTestListItem {
    #[must_use]
    pub fn from_mock_test(test: &MockTest) -> Self {
        Self {
            id: test.id(),
            title: test.title().to_string(),
            duration_secs: test.duration_secs(),
            question_count: test.question_count(),
        }
    }
}

/// A stored submission with its row id and the mock test it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRow {
    pub id: i64,
    pub mock_test_id: MockTestId,
    pub summary: SubmissionSummary,
}

/// Question source: timed question banks.
#[async_trait]
pub trait MockTestRepository: Send + Sync {
    /// Persist or replace a mock test together with its questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the mock test cannot be stored.
    async fn upsert_mock_test(&self, test: &MockTest) -> Result<(), StorageError>;

    /// Fetch a mock test with its questions in display order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_mock_test(&self, id: MockTestId) -> Result<MockTest, StorageError>;

    /// List mock tests ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn list_mock_tests(&self, limit: u32) -> Result<Vec<MockTestListItem>, StorageError>;
}

/// Submission sink backing store.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Append a submission and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the mock test does not exist and
    /// `StorageError::Conflict` if the attempt was already stored.
    async fn append_submission(
        &self,
        mock_test_id: MockTestId,
        summary: &SubmissionSummary,
    ) -> Result<i64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no submission has this id.
    async fn get_submission(&self, id: i64) -> Result<SubmissionRow, StorageError>;

    /// Most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn list_submissions(
        &self,
        mock_test_id: MockTestId,
        limit: u32,
    ) -> Result<Vec<SubmissionRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    mock_tests: Arc<Mutex<BTreeMap<MockTestId, MockTest>>>,
    submissions: Arc<Mutex<Vec<SubmissionRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl MockTestRepository for InMemoryRepository {
    async fn upsert_mock_test(&self, test: &MockTest) -> Result<(), StorageError> {
        let mut guard = self.mock_tests.lock().map_err(poisoned)?;
        guard.insert(test.id(), test.clone());
        Ok(())
    }

    async fn get_mock_test(&self, id: MockTestId) -> Result<MockTest, StorageError> {
        let guard = self.mock_tests.lock().map_err(poisoned)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_mock_tests(&self, limit: u32) -> Result<Vec<MockTestListItem>, StorageError> {
        let guard = self.mock_tests.lock().map_err(poisoned)?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard
            .values()
            .take(limit)
            .map(MockTestListItem::from_mock_test)
            .collect())
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryRepository {
    async fn append_submission(
        &self,
        mock_test_id: MockTestId,
        summary: &SubmissionSummary,
    ) -> Result<i64, StorageError> {
        if !self
            .mock_tests
            .lock()
            .map_err(poisoned)?
            .contains_key(&mock_test_id)
        {
            return Err(StorageError::NotFound);
        }

        let mut guard = self.submissions.lock().map_err(poisoned)?;
        if guard
            .iter()
            .any(|row| row.summary.attempt_id() == summary.attempt_id())
        {
            return Err(StorageError::Conflict);
        }
        let id = i64::try_from(guard.len() + 1)
            .map_err(|_| StorageError::Serialization("submission id overflow".into()))?;
        guard.push(SubmissionRow {
            id,
            mock_test_id,
            summary: summary.clone(),
        });
        Ok(id)
    }

    async fn get_submission(&self, id: i64) -> Result<SubmissionRow, StorageError> {
        let guard = self.submissions.lock().map_err(poisoned)?;
        guard
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_submissions(
        &self,
        mock_test_id: MockTestId,
        limit: u32,
    ) -> Result<Vec<SubmissionRow>, StorageError> {
        let guard = self.submissions.lock().map_err(poisoned)?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard
            .iter()
            .rev()
            .filter(|row| row.mock_test_id == mock_test_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub mock_tests: Arc<dyn MockTestRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let mock_tests: Arc<dyn MockTestRepository> = Arc::new(repo.clone());
        let submissions: Arc<dyn SubmissionRepository> = Arc::new(repo);
        Self {
            mock_tests,
            submissions,
        }
    }
}

#![forbid(unsafe_code)]

pub mod repository;
pub mod sample;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, MockTestListItem, MockTestRepository, Storage, StorageError,
    SubmissionRepository, SubmissionRow,
};

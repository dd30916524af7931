//! Shared error types for the services crate.

use thiserror::Error;

use prep_core::model::{ClientSettingsError, NewTestError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the persisted stores.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ApiClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    InvalidRequest(#[from] NewTestError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while taking or submitting a test.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("question {index} is outside the test ({count} questions)")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("question {0} was already answered")]
    AnswerLocked(usize),
    #[error("hints are not available in this mode")]
    HintsUnavailable,
    #[error("test has no questions")]
    EmptyTest,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Settings(#[from] ClientSettingsError),
}

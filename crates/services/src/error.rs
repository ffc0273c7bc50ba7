//! Shared error types for the services crate.

use thiserror::Error;

use count_core::model::SummaryError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `RewardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RewardError {
    #[error("incorrect passcode")]
    WrongPasscode,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by practice sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Summary(#[from] SummaryError),
    #[error(transparent)]
    Reward(#[from] RewardError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PracticeHistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Reward(#[from] RewardError),
}

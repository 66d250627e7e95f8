//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use storage::BankLoadError;

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode stats export: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Errors emitted while importing a stats export.
///
/// Every variant leaves the stored records untouched.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("import payload is empty")]
    Empty,
    #[error("import payload must be a JSON object with `stats` and/or `profile`")]
    NotAnObject,
    #[error("import payload is not valid stats JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Stats(#[from] StatsServiceError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    BankLoad(#[from] BankLoadError),
}

use std::path::{Path, PathBuf};

use quiz_core::model::{BankError, QuestionBank};
use thiserror::Error;
use tracing::info;

/// Failure to obtain the question bank. Without a bank no quiz can run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankLoadError {
    #[error("failed to read question bank {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("question bank {} is invalid: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: BankError,
    },
}

/// Read and validate a JSON question bank from disk.
///
/// # Errors
///
/// Returns `BankLoadError::Io` if the file cannot be read and
/// `BankLoadError::Invalid` if its contents are not a valid bank.
pub async fn load_question_bank(path: impl AsRef<Path>) -> Result<QuestionBank, BankLoadError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BankLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let bank = QuestionBank::from_json(&raw).map_err(|source| BankLoadError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), questions = bank.len(), "question bank loaded");
    Ok(bank)
}

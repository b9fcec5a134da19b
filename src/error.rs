use thiserror::Error;

use crate::source::SourceError;

/// Failures that stop a search before a result exists.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search word is empty")]
    EmptyWord,
    #[error("source error: {0}")]
    Source(#[from] SourceError),
}

/// Why a worker contributed nothing to the total.
///
/// Worker failures never abort a search; they are reported next to the
/// result instead.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum WorkerFailure {
    #[error("failed to open source: {0}")]
    Open(String),
    #[error("seek failed: {0}")]
    Seek(String),
    #[error("read failed: {0}")]
    Read(String),
    #[error("worker thread could not be launched")]
    NotLaunched,
    #[error("worker thread panicked")]
    Panicked,
}

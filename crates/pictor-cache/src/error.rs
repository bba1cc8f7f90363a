#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("worker is gone")]
    WorkerGone,
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

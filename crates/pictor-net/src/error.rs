#![forbid(unsafe_code)]

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("HTTP error {status} for {url}")]
    HttpError {
        url: Url,
        status: u16,
        body: Option<String>,
    },
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl NetError {
    pub fn http_error(status: u16, url: Url, body: Option<String>) -> Self {
        Self::HttpError { url, status, body }
    }

    /// Status code for HTTP-level failures, `None` for transport-level
    /// ones.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetError::Timeout
        } else {
            NetError::Transport(err.to_string())
        }
    }
}

pub type NetResult<T> = Result<T, NetError>;

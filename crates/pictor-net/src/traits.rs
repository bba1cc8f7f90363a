#![forbid(unsafe_code)]

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::{
    error::NetResult,
    types::{FetchedResponse, Headers},
};

/// Fetch boundary. Implementations must map non-success statuses to
/// [`NetError::HttpError`](crate::NetError::HttpError) so callers can
/// treat "fetch rejection" and "non-success status" as one failure class.
#[async_trait]
pub trait Net: Send + Sync {
    async fn get(&self, url: Url, headers: Option<Headers>) -> NetResult<FetchedResponse>;
}

/// Convenience methods over [`Net`].
#[async_trait]
pub trait NetExt: Net {
    async fn get_bytes(&self, url: Url, headers: Option<Headers>) -> NetResult<Bytes> {
        Ok(self.get(url, headers).await?.body)
    }
}

#[async_trait]
impl<T: Net + ?Sized> NetExt for T {}

#![forbid(unsafe_code)]

//! In-memory [`Net`] implementation for tests and offline scenarios.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use url::Url;

use crate::{
    error::{NetError, NetResult},
    traits::Net,
    types::{FetchedResponse, Headers},
};

#[derive(Debug, Default)]
struct State {
    routes: HashMap<String, FetchedResponse>,
    offline: bool,
    fetch_log: Vec<String>,
}

/// Static route table with an offline switch and a fetch log.
///
/// Routes are keyed by full URL string. Unknown URLs answer 404; offline
/// mode answers every request with a transport error. The fetch log
/// records every attempt, including failed ones, so tests can assert
/// "exactly N fetches happened".
#[derive(Clone, Debug, Default)]
pub struct StaticNet {
    inner: Arc<Mutex<State>>,
}

impl StaticNet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<U: Into<String>, B: Into<Bytes>>(&self, url: U, body: B) {
        self.insert_with_type(url, body, "application/octet-stream");
    }

    pub fn insert_with_type<U: Into<String>, B: Into<Bytes>>(
        &self,
        url: U,
        body: B,
        content_type: &str,
    ) {
        let mut headers = Headers::new();
        headers.insert("content-type", content_type);
        let response = FetchedResponse {
            status: 200,
            headers,
            body: body.into(),
        };
        self.inner.lock().routes.insert(url.into(), response);
    }

    pub fn remove(&self, url: &str) {
        self.inner.lock().routes.remove(url);
    }

    /// Toggle network availability. While offline every request fails
    /// with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }

    pub fn fetch_count(&self) -> usize {
        self.inner.lock().fetch_log.len()
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.inner.lock().fetch_log.clone()
    }
}

#[async_trait]
impl Net for StaticNet {
    async fn get(&self, url: Url, _headers: Option<Headers>) -> NetResult<FetchedResponse> {
        let mut state = self.inner.lock();
        state.fetch_log.push(url.to_string());
        if state.offline {
            return Err(NetError::Transport("network unavailable".to_string()));
        }
        match state.routes.get(url.as_str()) {
            Some(response) => Ok(response.clone()),
            None => Err(NetError::http_error(404, url, None)),
        }
    }
}

#![forbid(unsafe_code)]

use std::{collections::HashMap, time::Duration};

use bytes::Bytes;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Headers {
    inner: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.inner.insert(key.into().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<HashMap<String, String>> for Headers {
    fn from(map: HashMap<String, String>) -> Self {
        let mut headers = Headers::new();
        for (k, v) in map {
            headers.insert(k, v);
        }
        headers
    }
}

#[derive(Clone, Debug)]
pub struct NetOptions {
    pub request_timeout: Duration,
    pub pool_max_idle_per_host: usize,
}

impl Default for NetOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(20),
            pool_max_idle_per_host: 4,
        }
    }
}

/// A successful (2xx) fetch result.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchedResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl FetchedResponse {
    pub fn ok(body: Bytes) -> Self {
        Self {
            status: 200,
            headers: Headers::new(),
            body,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "image/webp");
        assert_eq!(headers.get("content-type"), Some("image/webp"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("image/webp"));
    }
}

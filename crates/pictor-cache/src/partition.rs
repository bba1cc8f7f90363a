#![forbid(unsafe_code)]

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::Mutex;
use pictor_core::ResourceKey;
use pictor_net::FetchedResponse;
use url::Url;

/// Response body as stored in and served from a partition.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl CachedResponse {
    /// Synthesized failure response returned when neither network nor
    /// cache can satisfy a request.
    pub fn service_unavailable() -> Self {
        Self {
            status: 503,
            content_type: Some("text/plain".to_string()),
            body: Bytes::from_static(b"Service Unavailable"),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<FetchedResponse> for CachedResponse {
    fn from(resp: FetchedResponse) -> Self {
        Self {
            status: resp.status,
            content_type: resp.content_type().map(str::to_string),
            body: resp.body,
        }
    }
}

/// Cache key for a request URL: the hex digest of its [`ResourceKey`].
///
/// Falls back to the raw URL string for URLs that cannot be
/// canonicalized; they still cache, just without normalization.
pub fn cache_key(url: &Url) -> String {
    ResourceKey::from_url(url)
        .map(|key| key.to_hex())
        .unwrap_or_else(|_| url.to_string())
}

/// Storage boundary for named partitions.
///
/// Writes are append/overwrite keyed by URL, last writer wins; there are
/// no merge semantics. Partition deletion is atomic from the caller's
/// view: once `delete_partition` returns, no entry of that generation is
/// reachable.
pub trait PartitionStore: Send + Sync + 'static {
    fn get(&self, partition: &str, key: &str) -> Option<CachedResponse>;
    fn put(&self, partition: &str, key: &str, response: CachedResponse);
    /// Delete a whole partition. Returns whether it existed.
    fn delete_partition(&self, partition: &str) -> bool;
    fn list_partitions(&self) -> Vec<String>;
}

/// In-memory [`PartitionStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    partitions: Mutex<HashMap<String, HashMap<String, CachedResponse>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a partition (0 when absent).
    pub fn entry_count(&self, partition: &str) -> usize {
        self.partitions
            .lock()
            .get(partition)
            .map_or(0, HashMap::len)
    }
}

impl PartitionStore for MemoryStore {
    fn get(&self, partition: &str, key: &str) -> Option<CachedResponse> {
        self.partitions.lock().get(partition)?.get(key).cloned()
    }

    fn put(&self, partition: &str, key: &str, response: CachedResponse) {
        self.partitions
            .lock()
            .entry(partition.to_string())
            .or_default()
            .insert(key.to_string(), response);
    }

    fn delete_partition(&self, partition: &str) -> bool {
        self.partitions.lock().remove(partition).is_some()
    }

    fn list_partitions(&self) -> Vec<String> {
        self.partitions.lock().keys().cloned().collect()
    }
}

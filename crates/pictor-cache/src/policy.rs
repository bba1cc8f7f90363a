#![forbid(unsafe_code)]

use std::sync::Arc;

use pictor_events::{CacheEvent, EventBus};
use pictor_net::Net;
use tracing::debug;
use url::Url;

use crate::partition::{cache_key, CachedResponse, PartitionStore};

/// Caching discipline applied to a request class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CachePolicy {
    /// Serve from the partition when possible; fill it on miss.
    CacheFirst,
    /// Always try the network; keep a copy for offline fallback.
    NetworkFirst,
}

pub(crate) struct PolicyEngine<S: PartitionStore> {
    pub store: Arc<S>,
    pub net: Arc<dyn Net>,
    pub events: EventBus,
}

impl<S: PartitionStore> PolicyEngine<S> {
    pub async fn apply(
        &self,
        policy: CachePolicy,
        partition: &str,
        url: &Url,
    ) -> CachedResponse {
        match policy {
            CachePolicy::CacheFirst => self.cache_first(partition, url).await,
            CachePolicy::NetworkFirst => self.network_first(partition, url).await,
        }
    }

    async fn fetch_and_store(&self, partition: &str, url: &Url) -> Option<CachedResponse> {
        match self.net.get(url.clone(), None).await {
            Ok(resp) => {
                let cached = CachedResponse::from(resp);
                self.store.put(partition, &cache_key(url), cached.clone());
                self.events.publish(CacheEvent::Stored {
                    partition: partition.to_string(),
                    url: url.to_string(),
                });
                Some(cached)
            }
            Err(err) => {
                debug!(%url, %err, partition, "network fetch failed");
                None
            }
        }
    }

    async fn cache_first(&self, partition: &str, url: &Url) -> CachedResponse {
        let key = cache_key(url);
        if let Some(hit) = self.store.get(partition, &key) {
            self.events.publish(CacheEvent::Hit {
                partition: partition.to_string(),
                url: url.to_string(),
            });
            return hit;
        }
        self.events.publish(CacheEvent::Miss {
            partition: partition.to_string(),
            url: url.to_string(),
        });
        self.fetch_and_store(partition, url)
            .await
            .unwrap_or_else(CachedResponse::service_unavailable)
    }

    async fn network_first(&self, partition: &str, url: &Url) -> CachedResponse {
        if let Some(fresh) = self.fetch_and_store(partition, url).await {
            return fresh;
        }
        match self.store.get(partition, &cache_key(url)) {
            Some(stale) => {
                self.events.publish(CacheEvent::ServedStale {
                    partition: partition.to_string(),
                    url: url.to_string(),
                });
                stale
            }
            None => CachedResponse::service_unavailable(),
        }
    }
}

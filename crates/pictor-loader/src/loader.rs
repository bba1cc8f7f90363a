#![forbid(unsafe_code)]

use std::sync::Arc;

use pictor_events::{EventBus, LoaderEvent};
use pictor_net::{Net, NetError, NetExt, NetResult};
use tracing::{debug, trace};
use url::Url;

use crate::phase::{ImageHandle, LoadPhase};

/// Two-phase progressive loader.
///
/// Paints the low-fidelity variant as soon as it arrives, then swaps in
/// the high-fidelity variant. One attempt per element; a failed element
/// is tagged broken and left alone until the page re-registers it.
#[derive(Clone)]
pub struct ProgressiveLoader {
    net: Arc<dyn Net>,
    events: EventBus,
}

impl ProgressiveLoader {
    pub fn new(net: Arc<dyn Net>, events: EventBus) -> Self {
        Self { net, events }
    }

    async fn fetch(&self, url: &str) -> NetResult<()> {
        let parsed = Url::parse(url).map_err(|e| NetError::InvalidUrl(e.to_string()))?;
        self.net.get_bytes(parsed, None).await.map(|_| ())
    }

    fn errored(&self, handle: &ImageHandle, url: &str) {
        handle.advance(LoadPhase::Errored);
        if handle.element().is_attached() {
            handle.element().mark_broken();
        }
        self.events.publish(LoaderEvent::LoadFailed {
            url: url.to_string(),
        });
    }

    fn discarded(&self, url: &str) {
        trace!(url, "element detached before load resolved, discarding");
        self.events.publish(LoaderEvent::Discarded {
            url: url.to_string(),
        });
    }

    /// Run the full low-then-high sequence for one element.
    ///
    /// All failures are absorbed here; nothing propagates to page code.
    pub async fn load(&self, handle: &ImageHandle) {
        let set = handle.set().clone();

        if !handle.advance(LoadPhase::LowFidelityLoading) {
            trace!(phase = ?handle.phase(), "element not pending, skipping load");
            return;
        }

        match self.fetch(&set.low_fidelity_url).await {
            Ok(()) => {
                if !handle.element().is_attached() {
                    self.discarded(&set.low_fidelity_url);
                    return;
                }
                handle.element().set_source(&set.low_fidelity_url);
                handle.element().apply_fade_in();
                handle.advance(LoadPhase::LowFidelityShown);
                self.events.publish(LoaderEvent::LowFidelityShown {
                    url: set.low_fidelity_url.clone(),
                });
            }
            Err(err) => {
                debug!(url = %set.low_fidelity_url, %err, "low-fidelity fetch failed");
                self.errored(handle, &set.low_fidelity_url);
                return;
            }
        }

        handle.advance(LoadPhase::HighFidelityLoading);
        match self.fetch(&set.primary_url).await {
            Ok(()) => {
                if !handle.element().is_attached() {
                    self.discarded(&set.primary_url);
                    return;
                }
                handle.element().set_source(&set.primary_url);
                handle.advance(LoadPhase::Loaded);
                self.events.publish(LoaderEvent::Loaded {
                    url: set.primary_url.clone(),
                });
            }
            Err(err) => {
                debug!(url = %set.primary_url, %err, "high-fidelity fetch failed");
                self.errored(handle, &set.primary_url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pictor_net::StaticNet;
    use pictor_srcset::{Candidate, ResponsiveSet};

    use crate::element::{ImageElement, TestImage};

    use super::*;

    fn set(low: &str, high: &str) -> ResponsiveSet {
        ResponsiveSet {
            primary_url: high.to_string(),
            low_fidelity_url: low.to_string(),
            candidates: vec![Candidate {
                url: high.to_string(),
                descriptor_width: Some(300),
            }],
            optimized: true,
        }
    }

    fn handle_for(img: &TestImage, set: ResponsiveSet) -> ImageHandle {
        ImageHandle::new(Arc::new(img.clone()), set)
    }

    const LOW: &str = "https://res.imghost.com/a/upload/w_50,q_30/img.jpg";
    const HIGH: &str = "https://res.imghost.com/a/upload/w_300,h_450/img.jpg";

    #[tokio::test]
    async fn happy_path_paints_low_then_high() {
        let net = StaticNet::new();
        net.insert(LOW, &b"low"[..]);
        net.insert(HIGH, &b"high"[..]);
        let loader = ProgressiveLoader::new(Arc::new(net.clone()), EventBus::new(16));

        let img = TestImage::new();
        let handle = handle_for(&img, set(LOW, HIGH));
        loader.load(&handle).await;

        assert_eq!(handle.phase(), LoadPhase::Loaded);
        assert_eq!(img.current_source().as_deref(), Some(HIGH));
        assert!(img.faded_in());
        assert!(!img.broken());
        assert_eq!(net.fetched_urls(), vec![LOW.to_string(), HIGH.to_string()]);
    }

    #[tokio::test]
    async fn low_fetch_failure_is_terminal_single_attempt() {
        let net = StaticNet::new();
        net.insert(HIGH, &b"high"[..]);
        let loader = ProgressiveLoader::new(Arc::new(net.clone()), EventBus::new(16));

        let img = TestImage::new();
        let handle = handle_for(&img, set(LOW, HIGH));
        loader.load(&handle).await;

        assert_eq!(handle.phase(), LoadPhase::Errored);
        assert!(img.broken());
        assert_eq!(img.current_source(), None);
        // Only the low fetch was attempted; no retry, no high fetch.
        assert_eq!(net.fetch_count(), 1);

        // A second call on the same handle does nothing.
        loader.load(&handle).await;
        assert_eq!(net.fetch_count(), 1);
    }

    #[tokio::test]
    async fn high_fetch_failure_keeps_low_source_and_errors() {
        let net = StaticNet::new();
        net.insert(LOW, &b"low"[..]);
        let loader = ProgressiveLoader::new(Arc::new(net.clone()), EventBus::new(16));

        let img = TestImage::new();
        let handle = handle_for(&img, set(LOW, HIGH));
        loader.load(&handle).await;

        assert_eq!(handle.phase(), LoadPhase::Errored);
        assert_eq!(img.current_source().as_deref(), Some(LOW));
        assert!(img.broken());
    }

    #[tokio::test]
    async fn detached_element_discards_result() {
        let net = StaticNet::new();
        net.insert(LOW, &b"low"[..]);
        net.insert(HIGH, &b"high"[..]);
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let loader = ProgressiveLoader::new(Arc::new(net), bus);

        let img = TestImage::new();
        img.detach();
        let handle = handle_for(&img, set(LOW, HIGH));
        loader.load(&handle).await;

        assert_eq!(img.current_source(), None);
        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            pictor_events::Event::Loader(LoaderEvent::Discarded { .. })
        ));
    }

    #[tokio::test]
    async fn retry_via_fresh_handle_succeeds() {
        let net = StaticNet::new();
        let loader = ProgressiveLoader::new(Arc::new(net.clone()), EventBus::new(16));

        let img = TestImage::new();
        let first = handle_for(&img, set(LOW, HIGH));
        loader.load(&first).await;
        assert_eq!(first.phase(), LoadPhase::Errored);

        // The page re-registers the element once the network recovers.
        net.insert(LOW, &b"low"[..]);
        net.insert(HIGH, &b"high"[..]);
        let second = handle_for(&img, set(LOW, HIGH));
        loader.load(&second).await;
        assert_eq!(second.phase(), LoadPhase::Loaded);
        assert_eq!(img.current_source().as_deref(), Some(HIGH));
    }
}

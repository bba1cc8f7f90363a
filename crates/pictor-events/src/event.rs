#![forbid(unsafe_code)]

/// Unified event for the image delivery pipeline.
///
/// Hierarchical: each subsystem has its own variant with a sub-enum.
#[derive(Clone, Debug)]
pub enum Event {
    /// Progressive loader event.
    Loader(LoaderEvent),
    /// Delivery cache worker event.
    Cache(CacheEvent),
}

/// Per-element progressive loading milestones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoaderEvent {
    /// Low-fidelity placeholder painted.
    LowFidelityShown { url: String },
    /// High-fidelity variant swapped in; terminal success state.
    Loaded { url: String },
    /// A fetch failed; element tagged broken, no automatic retry.
    LoadFailed { url: String },
    /// Element detached before the result arrived; result discarded.
    Discarded { url: String },
}

/// Cache worker activity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheEvent {
    Hit { partition: String, url: String },
    Miss { partition: String, url: String },
    Stored { partition: String, url: String },
    /// Network-first request served from the cached fallback.
    ServedStale { partition: String, url: String },
    PartitionPurged { partition: String },
    Activated { version: String },
}

impl From<LoaderEvent> for Event {
    fn from(e: LoaderEvent) -> Self {
        Self::Loader(e)
    }
}

impl From<CacheEvent> for Event {
    fn from(e: CacheEvent) -> Self {
        Self::Cache(e)
    }
}

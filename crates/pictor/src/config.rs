#![forbid(unsafe_code)]

//! Configuration for [`Pipeline`](crate::Pipeline).

use std::sync::Arc;

use pictor_cache::WorkerManifest;
use pictor_loader::SchedulerConfig;
use pictor_net::{Net, NetOptions};
use pictor_profiles::Registry;
use pictor_srcset::BuildOptions;

/// Unified configuration for creating a [`Pipeline`](crate::Pipeline).
///
/// Wraps the profile registry, srcset options, scheduler settings, and
/// the optional cache worker manifest into a single builder.
///
/// # Example
///
/// ```ignore
/// use pictor::PipelineConfig;
///
/// // Everything at its defaults, no cache worker.
/// let config = PipelineConfig::new();
///
/// // With a cache worker for offline support.
/// let config = PipelineConfig::new()
///     .with_worker(WorkerManifest::new("1.0.0"));
/// ```
pub struct PipelineConfig {
    /// Role/breakpoint registry driving every URL derivation.
    pub registry: Registry,
    /// Viewport width and format list for srcset builds.
    pub build: BuildOptions,
    /// Lazy-load scheduler settings.
    pub scheduler: SchedulerConfig,
    /// Network configuration (timeouts, pooling) for the default client.
    pub net_options: NetOptions,
    /// Network implementation override. When unset the pipeline builds
    /// an HTTP client from `net_options`.
    pub net: Option<Arc<dyn Net>>,
    /// Cache worker manifest. When set, `Pipeline::new` spawns a
    /// [`DeliveryWorker`](pictor_cache::DeliveryWorker) for it.
    pub worker: Option<WorkerManifest>,
    /// Event bus channel capacity.
    pub events_capacity: usize,
}

impl PipelineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Registry::with_defaults(),
            build: BuildOptions::default(),
            scheduler: SchedulerConfig::default(),
            net_options: NetOptions::default(),
            net: None,
            worker: None,
            events_capacity: 64,
        }
    }

    /// Replace the default role/breakpoint registry.
    #[must_use]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Set srcset build options.
    #[must_use]
    pub fn with_build(mut self, build: BuildOptions) -> Self {
        self.build = build;
        self
    }

    /// Set lazy-load scheduler settings.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Set network options for the default HTTP client.
    #[must_use]
    pub fn with_net_options(mut self, net_options: NetOptions) -> Self {
        self.net_options = net_options;
        self
    }

    /// Use a custom network implementation instead of the default client.
    #[must_use]
    pub fn with_net(mut self, net: Arc<dyn Net>) -> Self {
        self.net = Some(net);
        self
    }

    /// Enable the delivery cache worker with the given manifest.
    #[must_use]
    pub fn with_worker(mut self, manifest: WorkerManifest) -> Self {
        self.worker = Some(manifest);
        self
    }

    /// Set event bus channel capacity.
    #[must_use]
    pub fn with_events_capacity(mut self, capacity: usize) -> Self {
        self.events_capacity = capacity;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

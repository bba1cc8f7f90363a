#![forbid(unsafe_code)]

use std::sync::Arc;

use pictor_cache::{CacheResult, DeliveryWorker, MemoryStore, WorkerHandle, WorkerMessage};
use pictor_core::{ImageRole, ImageSource};
use pictor_events::EventBus;
use pictor_loader::{
    ElementId, ImageElement, ImageHandle, IntersectionNotifier, MutationNotifier,
    ProgressiveLoader, Scheduler,
};
use pictor_net::{HttpClient, Net};
use pictor_profiles::Registry;
use pictor_srcset::{BuildOptions, ResponsiveSet};
use tracing::debug;

use crate::config::PipelineConfig;

/// The assembled delivery pipeline: registry, srcset builder, lazy-load
/// scheduler, and the optional cache worker, all sharing one network
/// client and one event bus.
pub struct Pipeline {
    registry: Registry,
    build: BuildOptions,
    scheduler: Arc<Scheduler>,
    worker: Option<WorkerHandle>,
    events: EventBus,
}

impl Pipeline {
    /// Assemble the pipeline and spawn its background tasks. Must be
    /// called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error when the worker manifest is invalid.
    pub fn new(config: PipelineConfig) -> CacheResult<Self> {
        let events = EventBus::new(config.events_capacity);
        let net: Arc<dyn Net> = match config.net {
            Some(net) => net,
            None => Arc::new(HttpClient::new(config.net_options)),
        };

        let loader = ProgressiveLoader::new(net.clone(), events.clone());
        let scheduler = Scheduler::spawn(loader, config.scheduler);

        let worker = match config.worker {
            Some(manifest) => Some(DeliveryWorker::spawn(
                manifest,
                Arc::new(MemoryStore::new()),
                net,
                events.clone(),
            )?),
            None => None,
        };

        Ok(Self {
            registry: config.registry,
            build: config.build,
            scheduler,
            worker,
            events,
        })
    }

    /// Derive the responsive set for a source in a role, without touching
    /// any element. This is what markup generation calls for `srcset`
    /// attributes.
    pub fn responsive_set(&self, source: &ImageSource, role: ImageRole) -> ResponsiveSet {
        pictor_srcset::build(&self.registry, &source.url, role, &self.build)
    }

    /// Register an element for progressive lazy loading.
    ///
    /// Returns the element's id (for intersection signals) and its
    /// handle. Nothing is fetched until the element approaches the
    /// viewport, or immediately when intersection signalling is
    /// unavailable.
    pub fn register(
        &self,
        element: Arc<dyn ImageElement>,
        source: &ImageSource,
        role: ImageRole,
    ) -> (ElementId, ImageHandle) {
        let set = self.responsive_set(source, role);
        let handle = ImageHandle::new(element, set);
        let id = self.scheduler.observe(handle.clone());
        (id, handle)
    }

    /// Sender the page wires its intersection source to.
    #[must_use]
    pub fn intersections(&self) -> IntersectionNotifier {
        self.scheduler.intersections()
    }

    /// Sender the page wires its structural-change source to. Elements
    /// arriving here are registered as if by [`Pipeline::register`].
    #[must_use]
    pub fn mutations(&self) -> MutationNotifier {
        self.scheduler.mutations()
    }

    /// Ask the cache worker to warm its image partition. A no-op without
    /// a worker.
    ///
    /// # Errors
    ///
    /// Returns an error when the worker has stopped.
    pub async fn warm_images(&self, urls: Vec<String>) -> CacheResult<()> {
        match &self.worker {
            Some(worker) => worker.post_message(WorkerMessage::CacheImages { urls }).await,
            None => {
                debug!("no cache worker configured, skipping image warm-up");
                Ok(())
            }
        }
    }

    /// Handle to the cache worker, when one was configured.
    pub fn worker(&self) -> Option<&WorkerHandle> {
        self.worker.as_ref()
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

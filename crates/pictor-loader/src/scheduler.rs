#![forbid(unsafe_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::{loader::ProgressiveLoader, phase::ImageHandle};

/// Identifier assigned to an element at observe time. Intersection
/// signals reference elements by this id.
pub type ElementId = u64;

/// Whether the runtime can deliver viewport-intersection signals.
///
/// Without them the scheduler degrades to loading everything eagerly on
/// `observe` — correctness over optimization when the capability is
/// missing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    Available,
    Missing,
}

#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    pub capability: Capability,
    /// Lead margin in pixels: the page's intersection source should fire
    /// this far before the element enters the viewport.
    pub lead_margin_px: u32,
    /// Minimal visible ratio before a signal fires.
    pub min_visible_ratio: f32,
    pub channel_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            capability: Capability::Available,
            lead_margin_px: 200,
            min_visible_ratio: 0.01,
            channel_capacity: 64,
        }
    }
}

/// Page-side sender for "element entered viewport" signals.
#[derive(Clone, Debug)]
pub struct IntersectionNotifier {
    tx: mpsc::Sender<ElementId>,
}

impl IntersectionNotifier {
    /// Announce that the element with `id` approaches the viewport.
    pub async fn element_entered(&self, id: ElementId) {
        let _ = self.tx.send(id).await;
    }
}

/// Page-side sender for structural DOM changes: newly inserted candidate
/// elements arrive here and are auto-registered.
#[derive(Clone)]
pub struct MutationNotifier {
    tx: mpsc::Sender<(ElementId, ImageHandle)>,
    next_id: Arc<AtomicU64>,
}

impl MutationNotifier {
    /// Announce a newly inserted element and return its assigned id.
    /// Intersection signals for the element must carry this id.
    pub async fn element_added(&self, handle: ImageHandle) -> ElementId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let _ = self.tx.send((id, handle)).await;
        id
    }
}

#[derive(Default)]
struct WatchSet {
    entries: HashMap<ElementId, ImageHandle>,
}

/// Viewport-intersection-driven lazy-load scheduler.
///
/// Observed elements sit in a watch set until their first intersection
/// signal, which un-observes them (one-shot) and hands them to the
/// loader. Signals may arrive in any order across elements; there is no
/// cross-element ordering guarantee.
pub struct Scheduler {
    watch: Arc<Mutex<WatchSet>>,
    next_id: Arc<AtomicU64>,
    config: SchedulerConfig,
    loader: ProgressiveLoader,
    intersection_tx: mpsc::Sender<ElementId>,
    mutation_tx: mpsc::Sender<(ElementId, ImageHandle)>,
}

impl Scheduler {
    /// Spawn the scheduler task. Must be called within a tokio runtime.
    #[must_use]
    pub fn spawn(loader: ProgressiveLoader, config: SchedulerConfig) -> Arc<Self> {
        let (intersection_tx, intersection_rx) = mpsc::channel(config.channel_capacity);
        let (mutation_tx, mutation_rx) = mpsc::channel(config.channel_capacity);

        let scheduler = Arc::new(Self {
            watch: Arc::new(Mutex::new(WatchSet::default())),
            next_id: Arc::new(AtomicU64::new(1)),
            config,
            loader,
            intersection_tx,
            mutation_tx,
        });

        tokio::spawn(Self::run(
            Arc::clone(&scheduler),
            intersection_rx,
            mutation_rx,
        ));
        scheduler
    }

    /// Add an element to the watch set and return its id.
    ///
    /// With intersection capability missing, the element is loaded
    /// immediately instead of being watched.
    pub fn observe(&self, handle: ImageHandle) -> ElementId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.admit(id, handle);
        id
    }

    fn admit(&self, id: ElementId, handle: ImageHandle) {
        match self.config.capability {
            Capability::Available => {
                trace!(id, "observing element");
                self.watch.lock().entries.insert(id, handle);
            }
            Capability::Missing => {
                debug!(id, "intersection capability missing, loading eagerly");
                let loader = self.loader.clone();
                tokio::spawn(async move {
                    loader.load(&handle).await;
                });
            }
        }
    }

    /// Sender the page wires its intersection source to.
    #[must_use]
    pub fn intersections(&self) -> IntersectionNotifier {
        IntersectionNotifier {
            tx: self.intersection_tx.clone(),
        }
    }

    /// Sender the page wires its structural-change source to.
    #[must_use]
    pub fn mutations(&self) -> MutationNotifier {
        MutationNotifier {
            tx: self.mutation_tx.clone(),
            next_id: Arc::clone(&self.next_id),
        }
    }

    /// Number of elements currently watched.
    pub fn watched(&self) -> usize {
        self.watch.lock().entries.len()
    }

    /// Scheduler configuration, including the lead margin and visibility
    /// threshold the page's intersection source should honor.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    async fn run(
        self: Arc<Self>,
        mut intersection_rx: mpsc::Receiver<ElementId>,
        mut mutation_rx: mpsc::Receiver<(ElementId, ImageHandle)>,
    ) {
        trace!("scheduler started");
        loop {
            tokio::select! {
                signal = intersection_rx.recv() => match signal {
                    Some(id) => self.on_intersection(id),
                    None => break,
                },
                added = mutation_rx.recv() => match added {
                    Some((id, handle)) => {
                        self.admit(id, handle);
                        trace!(id, "auto-registered element from mutation feed");
                    }
                    None => break,
                },
            }
        }
        trace!("scheduler stopped");
    }

    fn on_intersection(&self, id: ElementId) {
        // One-shot: the first signal removes the element from the set;
        // later signals for the same id are ignored.
        let handle = self.watch.lock().entries.remove(&id);
        match handle {
            Some(handle) => {
                trace!(id, "element entered viewport, dispatching load");
                let loader = self.loader.clone();
                tokio::spawn(async move {
                    loader.load(&handle).await;
                });
            }
            None => trace!(id, "intersection for unknown or already-loaded element"),
        }
    }
}

#![forbid(unsafe_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use pictor_srcset::ResponsiveSet;
use tracing::trace;

use crate::element::ImageElement;

/// Per-element load progression.
///
/// Phases only ever move forward; an element cannot regress from
/// `Loaded` back to `Pending`. `Errored` is terminal and reachable from
/// either loading phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    Pending,
    LowFidelityLoading,
    LowFidelityShown,
    HighFidelityLoading,
    Loaded,
    Errored,
}

impl LoadPhase {
    fn rank(self) -> u8 {
        match self {
            LoadPhase::Pending => 0,
            LoadPhase::LowFidelityLoading => 1,
            LoadPhase::LowFidelityShown => 2,
            LoadPhase::HighFidelityLoading => 3,
            LoadPhase::Loaded => 4,
            LoadPhase::Errored => 5,
        }
    }

    /// Whether moving to `next` is a legal forward step.
    pub fn can_advance_to(self, next: LoadPhase) -> bool {
        match (self, next) {
            // Terminal states accept nothing.
            (LoadPhase::Loaded | LoadPhase::Errored, _) => false,
            (LoadPhase::LowFidelityLoading | LoadPhase::HighFidelityLoading, LoadPhase::Errored) => {
                true
            }
            (_, LoadPhase::Errored) => false,
            (current, next) => next.rank() == current.rank() + 1,
        }
    }
}

struct HandleInner {
    element: Arc<dyn ImageElement>,
    set: ResponsiveSet,
    phase: Mutex<LoadPhase>,
}

/// An element registered with the pipeline: the DOM node, its derived
/// responsive set, and the current load phase.
///
/// Cloning shares the underlying state; a handle can be re-created from
/// the same element to retry after an error (re-registration is the only
/// retry path).
#[derive(Clone)]
pub struct ImageHandle {
    inner: Arc<HandleInner>,
}

impl ImageHandle {
    pub fn new(element: Arc<dyn ImageElement>, set: ResponsiveSet) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                element,
                set,
                phase: Mutex::new(LoadPhase::Pending),
            }),
        }
    }

    pub fn element(&self) -> &Arc<dyn ImageElement> {
        &self.inner.element
    }

    pub fn set(&self) -> &ResponsiveSet {
        &self.inner.set
    }

    pub fn phase(&self) -> LoadPhase {
        *self.inner.phase.lock()
    }

    /// Advance to `next` if that is a legal forward step. Returns whether
    /// the transition happened; an illegal step leaves the phase alone.
    pub fn advance(&self, next: LoadPhase) -> bool {
        let mut phase = self.inner.phase.lock();
        if phase.can_advance_to(next) {
            trace!(from = ?*phase, to = ?next, "load phase advance");
            *phase = next;
            true
        } else {
            trace!(from = ?*phase, to = ?next, "load phase advance rejected");
            false
        }
    }
}

impl std::fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("phase", &self.phase())
            .field("primary_url", &self.inner.set.primary_url)
            .finish()
    }
}

#![forbid(unsafe_code)]

//! # Pictor
//!
//! Facade crate providing a unified API for responsive image delivery:
//! transformation-URL derivation, breakpoint profiles, progressive lazy
//! loading, and an offline cache worker.
//!
//! ## Quick start
//!
//! ```ignore
//! use pictor::prelude::*;
//!
//! let pipeline = Pipeline::new(PipelineConfig::new())?;
//!
//! // Markup generation: srcset for a book cover.
//! let source = ImageSource::new("https://res.imghost.com/acct/upload/covers/book.jpg");
//! let set = pipeline.responsive_set(&source, ImageRole::Card);
//! let srcset = set.srcset_attribute();
//!
//! // Page runtime: lazy progressive loading.
//! let (id, _handle) = pipeline.register(element, &source, ImageRole::Card);
//! pipeline.intersections().element_entered(id).await;
//! ```

// ── Re-export sub-crates ────────────────────────────────────────────────

pub mod cache {
    pub use pictor_cache::*;
}

pub mod primitives {
    pub use pictor_core::*;
}

pub mod events {
    pub use pictor_events::*;
}

pub mod loader {
    pub use pictor_loader::*;
}

pub mod net {
    pub use pictor_net::*;
}

pub mod profiles {
    pub use pictor_profiles::*;
}

pub mod srcset {
    pub use pictor_srcset::*;
}

pub mod transform {
    pub use pictor_transform::*;
}

// ── Pipeline ────────────────────────────────────────────────────────────

mod config;
mod pipeline;

pub use config::PipelineConfig;
pub use pipeline::Pipeline;

// ── Prelude ─────────────────────────────────────────────────────────────

pub mod prelude {
    pub use pictor_cache::{WorkerManifest, WorkerMessage, WorkerState};
    pub use pictor_core::{ImageRole, ImageSource, OutputFormat, TransformSpec};
    pub use pictor_events::{CacheEvent, Event, EventBus, LoaderEvent};
    pub use pictor_loader::{Capability, ImageElement, ImageHandle, LoadPhase, SchedulerConfig};
    pub use pictor_profiles::Registry;
    pub use pictor_srcset::{BuildOptions, ResponsiveSet};

    pub use crate::{Pipeline, PipelineConfig};
}

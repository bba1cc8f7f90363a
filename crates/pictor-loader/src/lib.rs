#![forbid(unsafe_code)]

//! Progressive two-phase image loading gated by viewport intersection.
//!
//! The loader paints a cheap low-fidelity variant first, then swaps in
//! the high-fidelity variant, confining all side effects to the element
//! handed in. The scheduler defers fetches until an element approaches
//! the viewport, signalled over explicit channels so the whole thing is
//! testable without a DOM.

mod element;
mod loader;
mod phase;
mod scheduler;

pub use crate::{
    element::{ImageElement, TestImage},
    loader::ProgressiveLoader,
    phase::{ImageHandle, LoadPhase},
    scheduler::{
        Capability, ElementId, IntersectionNotifier, MutationNotifier, Scheduler, SchedulerConfig,
    },
};

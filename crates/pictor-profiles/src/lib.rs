#![forbid(unsafe_code)]

//! Static configuration mapping image roles and screen-width breakpoints
//! to transformation parameter sets.
//!
//! The registry is built once at init and never mutated at runtime.
//! `resolve(role, viewport_width)` is pure and total: every pair yields a
//! deterministic spec, and viewport width is always an explicit parameter
//! (nothing in here reads ambient environment state).

mod registry;
mod types;

pub use crate::{
    registry::Registry,
    types::{Breakpoint, RegistryError},
};

#![forbid(unsafe_code)]

//! Combines the profile registry and the transform engine into a
//! `srcset`-style candidate list plus a "best for current viewport" URL
//! and a low-fidelity placeholder URL.
//!
//! Responsive optimization is strictly best-effort: a source URL outside
//! the transform grammar yields a set whose every field is the original
//! URL, and rendering proceeds unchanged.

mod builder;

pub use crate::builder::{build, BuildOptions, Candidate, ResponsiveSet};

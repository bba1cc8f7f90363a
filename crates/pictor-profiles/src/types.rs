#![forbid(unsafe_code)]

use pictor_core::TransformSpec;
use thiserror::Error;

/// A named screen-width band with the spec fields it overrides.
///
/// Breakpoints are ordered ascending by `max_width_px`; the final entry
/// must be unbounded (`None`) so the width domain is fully covered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Breakpoint {
    pub name: &'static str,
    /// Upper bound of the band, inclusive. `None` means unbounded.
    pub max_width_px: Option<u32>,
    pub overrides: TransformSpec,
}

impl Breakpoint {
    pub fn matches(&self, viewport_width: u32) -> bool {
        match self.max_width_px {
            Some(max) => viewport_width <= max,
            None => true,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry requires at least one breakpoint")]
    NoBreakpoints,
    #[error("breakpoints must be sorted ascending by max width")]
    Unsorted,
    #[error("final breakpoint must be unbounded to cover the width domain")]
    Uncovered,
}

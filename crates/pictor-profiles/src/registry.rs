#![forbid(unsafe_code)]

use std::collections::HashMap;

use pictor_core::{CropMode, Gravity, ImageRole, Quality, TransformSpec};
use tracing::warn;

use crate::types::{Breakpoint, RegistryError};

/// Role and breakpoint registry.
#[derive(Clone, Debug)]
pub struct Registry {
    profiles: HashMap<ImageRole, TransformSpec>,
    breakpoints: Vec<Breakpoint>,
}

impl Registry {
    /// Build a registry from explicit profiles and breakpoints.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the breakpoint list is empty, not
    /// sorted ascending, or its final entry is bounded (leaving part of
    /// the width domain uncovered).
    pub fn new(
        profiles: HashMap<ImageRole, TransformSpec>,
        breakpoints: Vec<Breakpoint>,
    ) -> Result<Self, RegistryError> {
        if breakpoints.is_empty() {
            return Err(RegistryError::NoBreakpoints);
        }
        for pair in breakpoints.windows(2) {
            match (pair[0].max_width_px, pair[1].max_width_px) {
                (Some(a), Some(b)) if a >= b => return Err(RegistryError::Unsorted),
                // An unbounded entry anywhere but last makes later entries
                // unreachable.
                (None, _) => return Err(RegistryError::Unsorted),
                _ => {}
            }
        }
        if breakpoints
            .last()
            .is_some_and(|bp| bp.max_width_px.is_some())
        {
            return Err(RegistryError::Uncovered);
        }
        Ok(Self {
            profiles,
            breakpoints,
        })
    }

    /// Default profiles for the five roles and the
    /// mobile / tablet / desktop breakpoint ladder.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            ImageRole::Cover,
            TransformSpec {
                width: Some(800),
                height: Some(1200),
                quality: Some(Quality::Level(80)),
                crop: Some(CropMode::Fill),
                ..TransformSpec::default()
            },
        );
        profiles.insert(
            ImageRole::Card,
            TransformSpec {
                width: Some(300),
                height: Some(450),
                quality: Some(Quality::Level(80)),
                crop: Some(CropMode::Fill),
                ..TransformSpec::default()
            },
        );
        profiles.insert(
            ImageRole::Thumbnail,
            TransformSpec {
                width: Some(150),
                height: Some(150),
                quality: Some(Quality::Level(70)),
                crop: Some(CropMode::Thumb),
                gravity: Some(Gravity::Face),
                ..TransformSpec::default()
            },
        );
        profiles.insert(
            ImageRole::Portrait,
            TransformSpec {
                width: Some(400),
                height: Some(600),
                quality: Some(Quality::Level(80)),
                crop: Some(CropMode::Fill),
                gravity: Some(Gravity::Face),
                ..TransformSpec::default()
            },
        );
        profiles.insert(
            ImageRole::Progressive,
            TransformSpec {
                width: Some(50),
                quality: Some(Quality::Level(30)),
                ..TransformSpec::default()
            },
        );

        let breakpoints = vec![
            Breakpoint {
                name: "mobile",
                max_width_px: Some(480),
                overrides: TransformSpec {
                    width: Some(160),
                    quality: Some(Quality::Level(60)),
                    ..TransformSpec::default()
                },
            },
            Breakpoint {
                name: "tablet",
                max_width_px: Some(768),
                overrides: TransformSpec {
                    width: Some(240),
                    quality: Some(Quality::Level(70)),
                    ..TransformSpec::default()
                },
            },
            Breakpoint {
                name: "desktop",
                max_width_px: None,
                overrides: TransformSpec::default(),
            },
        ];

        Self::new(profiles, breakpoints).expect("default breakpoints are valid")
    }

    /// Resolve the spec for `role` at `viewport_width`: the role's base
    /// spec overlaid with the overrides of the first breakpoint whose
    /// upper bound covers the width. Unknown role yields an empty spec
    /// (callers must tolerate a no-op transform).
    pub fn resolve(&self, role: ImageRole, viewport_width: u32) -> TransformSpec {
        let Some(base) = self.profiles.get(&role) else {
            warn!(%role, "no profile registered for role, using empty spec");
            return TransformSpec::default();
        };
        let bp = self.breakpoint_for(viewport_width);
        base.overlay(&bp.overrides)
    }

    /// First breakpoint (ascending) covering `viewport_width`. Total:
    /// the final breakpoint is unbounded.
    pub fn breakpoint_for(&self, viewport_width: u32) -> &Breakpoint {
        self.breakpoints
            .iter()
            .find(|bp| bp.matches(viewport_width))
            .unwrap_or_else(|| {
                // Unreachable per construction invariant; the last entry
                // matches every width.
                self.breakpoints.last().expect("registry has breakpoints")
            })
    }

    /// Base spec for a role, without breakpoint overrides.
    pub fn base_spec(&self, role: ImageRole) -> Option<&TransformSpec> {
        self.profiles.get(&role)
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn card_at_mobile_width_takes_mobile_override() {
        let registry = Registry::with_defaults();
        let spec = registry.resolve(ImageRole::Card, 400);
        assert_eq!(spec.width, Some(160));
        assert_eq!(spec.quality, Some(Quality::Level(60)));
        // Fields the override leaves alone come from the base profile.
        assert_eq!(spec.height, Some(450));
        assert_eq!(spec.crop, Some(CropMode::Fill));
    }

    #[test]
    fn card_at_desktop_width_is_base_spec() {
        let registry = Registry::with_defaults();
        let spec = registry.resolve(ImageRole::Card, 1024);
        assert_eq!(spec.width, Some(300));
        assert_eq!(spec.height, Some(450));
        assert_eq!(spec.quality, Some(Quality::Level(80)));
    }

    #[rstest]
    #[case(320, "mobile")]
    #[case(480, "mobile")]
    #[case(481, "tablet")]
    #[case(768, "tablet")]
    #[case(769, "desktop")]
    #[case(2560, "desktop")]
    fn breakpoint_selection(#[case] width: u32, #[case] expected: &str) {
        let registry = Registry::with_defaults();
        assert_eq!(registry.breakpoint_for(width).name, expected);
    }

    #[test]
    fn selection_is_monotonic_in_viewport_width() {
        let registry = Registry::with_defaults();
        // As viewport width grows the chosen bound never decreases
        // (unbounded counts as the largest bound).
        let mut prev = 0u32;
        for width in 0..=2000 {
            let bound = registry
                .breakpoint_for(width)
                .max_width_px
                .unwrap_or(u32::MAX);
            assert!(bound >= prev, "bound decreased as width increased");
            prev = bound;
        }
    }

    #[test]
    fn unknown_role_yields_empty_spec() {
        let registry = Registry::new(
            HashMap::new(),
            vec![Breakpoint {
                name: "desktop",
                max_width_px: None,
                overrides: TransformSpec::default(),
            }],
        )
        .unwrap();
        assert!(registry.resolve(ImageRole::Card, 1024).is_empty());
    }

    #[test]
    fn construction_rejects_unsorted_breakpoints() {
        let bps = vec![
            Breakpoint {
                name: "tablet",
                max_width_px: Some(768),
                overrides: TransformSpec::default(),
            },
            Breakpoint {
                name: "mobile",
                max_width_px: Some(480),
                overrides: TransformSpec::default(),
            },
            Breakpoint {
                name: "desktop",
                max_width_px: None,
                overrides: TransformSpec::default(),
            },
        ];
        assert_eq!(
            Registry::new(HashMap::new(), bps).unwrap_err(),
            RegistryError::Unsorted
        );
    }

    #[test]
    fn construction_rejects_bounded_final_breakpoint() {
        let bps = vec![Breakpoint {
            name: "mobile",
            max_width_px: Some(480),
            overrides: TransformSpec::default(),
        }];
        assert_eq!(
            Registry::new(HashMap::new(), bps).unwrap_err(),
            RegistryError::Uncovered
        );
    }

    #[test]
    fn construction_rejects_empty_breakpoints() {
        assert_eq!(
            Registry::new(HashMap::new(), Vec::new()).unwrap_err(),
            RegistryError::NoBreakpoints
        );
    }

    #[test]
    fn progressive_base_is_tiny_and_cheap() {
        let registry = Registry::with_defaults();
        let spec = registry.base_spec(ImageRole::Progressive).unwrap();
        assert_eq!(spec.width, Some(50));
        assert_eq!(spec.quality, Some(Quality::Level(30)));
    }
}

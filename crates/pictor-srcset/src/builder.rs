#![forbid(unsafe_code)]

use pictor_core::{ImageRole, OutputFormat, Quality, TransformSpec};
use pictor_profiles::Registry;
use pictor_transform::{is_transformable, transform};
use tracing::debug;

/// Options for a single build. Viewport width is always explicit; the
/// builder never reads ambient environment state.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    pub viewport_width: u32,
    /// Output formats to emit candidates for. Empty means "no format
    /// token" (service default encoding).
    pub formats: Vec<OutputFormat>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            formats: Vec::new(),
        }
    }
}

/// One `srcset` entry. A missing descriptor width means a bare candidate
/// (density 1x), which is how pass-through sources are represented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub descriptor_width: Option<u32>,
}

/// Derived per-element URLs. Recomputed whenever role or source URL
/// changes; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponsiveSet {
    pub primary_url: String,
    pub low_fidelity_url: String,
    pub candidates: Vec<Candidate>,
    /// Whether the source matched the transform grammar.
    pub optimized: bool,
}

impl ResponsiveSet {
    fn pass_through(url: &str) -> Self {
        Self {
            primary_url: url.to_string(),
            low_fidelity_url: url.to_string(),
            candidates: vec![Candidate {
                url: url.to_string(),
                descriptor_width: None,
            }],
            optimized: false,
        }
    }

    /// Join candidates into a `srcset` attribute value.
    #[must_use]
    pub fn srcset_attribute(&self) -> String {
        self.candidates
            .iter()
            .map(|c| match c.descriptor_width {
                Some(w) => format!("{} {w}w", c.url),
                None => c.url.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// Used when a custom registry omits the progressive role; keeps the
// placeholder tiny and cheap regardless.
const PROGRESSIVE_FALLBACK: TransformSpec = TransformSpec {
    width: Some(50),
    height: None,
    quality: Some(Quality::Level(30)),
    crop: None,
    gravity: None,
    format: None,
};

/// Build the responsive set for `url` in `role`.
pub fn build(registry: &Registry, url: &str, role: ImageRole, options: &BuildOptions) -> ResponsiveSet {
    if !is_transformable(url) {
        debug!(url, %role, "source not transformable, responsive set passes through");
        return ResponsiveSet::pass_through(url);
    }

    let primary_spec = registry.resolve(role, options.viewport_width);
    let primary_url = transform(url, &primary_spec).into_url();

    // The placeholder profile is fixed and role-independent.
    let progressive = registry
        .base_spec(ImageRole::Progressive)
        .copied()
        .unwrap_or(PROGRESSIVE_FALLBACK);
    let low_fidelity_url = transform(url, &progressive).into_url();

    let mut candidates = Vec::new();
    for bp in registry.breakpoints() {
        // Resolve at the breakpoint's own bound; the unbounded entry is
        // the base/desktop spec.
        let resolved = match bp.max_width_px {
            Some(max) => registry.resolve(role, max),
            None => registry.resolve(role, u32::MAX),
        };
        let descriptor = resolved.width.or(bp.max_width_px);

        if options.formats.is_empty() {
            push_candidate(&mut candidates, url, &resolved, descriptor);
        } else {
            for format in &options.formats {
                let spec = TransformSpec {
                    format: Some(*format),
                    ..resolved
                };
                push_candidate(&mut candidates, url, &spec, descriptor);
            }
        }
    }

    ResponsiveSet {
        primary_url,
        low_fidelity_url,
        candidates,
        optimized: true,
    }
}

fn push_candidate(
    candidates: &mut Vec<Candidate>,
    url: &str,
    spec: &TransformSpec,
    descriptor_width: Option<u32>,
) {
    let candidate = Candidate {
        url: transform(url, spec).into_url(),
        descriptor_width,
    };
    // Identical overrides across adjacent breakpoints would produce
    // duplicate entries; srcset wants each URL once.
    if !candidates.iter().any(|c| c.url == candidate.url) {
        candidates.push(candidate);
    }
}

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// An image reference as exposed by content entities (book covers, author
/// portraits, media thumbnails). The pipeline only derives from it, never
/// mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    pub url: String,
    pub alt_text: Option<String>,
}

impl ImageSource {
    pub fn new<U: Into<String>>(url: U) -> Self {
        Self {
            url: url.into(),
            alt_text: None,
        }
    }

    #[must_use]
    pub fn with_alt<A: Into<String>>(mut self, alt: A) -> Self {
        self.alt_text = Some(alt.into());
        self
    }
}

/// Named image role selecting a registry profile. Fixed set, defined at
/// init, never extended at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageRole {
    Cover,
    Card,
    Thumbnail,
    Portrait,
    Progressive,
}

impl ImageRole {
    pub const ALL: [ImageRole; 5] = [
        ImageRole::Cover,
        ImageRole::Card,
        ImageRole::Thumbnail,
        ImageRole::Portrait,
        ImageRole::Progressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageRole::Cover => "cover",
            ImageRole::Card => "card",
            ImageRole::Thumbnail => "thumbnail",
            ImageRole::Portrait => "portrait",
            ImageRole::Progressive => "progressive",
        }
    }
}

impl std::fmt::Display for ImageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested output quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Let the image service pick.
    Auto,
    /// Fixed 1..=100 level.
    Level(u8),
}

/// Crop strategy applied by the image service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropMode {
    Auto,
    Fill,
    Fit,
    Scale,
    Thumb,
    Limit,
}

/// Focus point used when cropping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gravity {
    Auto,
    Face,
    Center,
    North,
    South,
}

/// Output encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Content negotiation by the service (`f_auto`).
    Auto,
    Webp,
    Avif,
    Jpg,
    Png,
}

/// Immutable set of transformation parameters. Constructed per
/// role+breakpoint lookup, consumed once, discarded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformSpec {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<Quality>,
    pub crop: Option<CropMode>,
    pub gravity: Option<Gravity>,
    pub format: Option<OutputFormat>,
}

impl TransformSpec {
    pub fn is_empty(&self) -> bool {
        *self == TransformSpec::default()
    }

    /// Field-wise overlay: any field present in `overrides` replaces the
    /// corresponding field of `self`.
    #[must_use]
    pub fn overlay(&self, overrides: &TransformSpec) -> TransformSpec {
        TransformSpec {
            width: overrides.width.or(self.width),
            height: overrides.height.or(self.height),
            quality: overrides.quality.or(self.quality),
            crop: overrides.crop.or(self.crop),
            gravity: overrides.gravity.or(self.gravity),
            format: overrides.format.or(self.format),
        }
    }
}

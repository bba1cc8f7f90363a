#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use url::Url;

/// Resource class of an intercepted request. Each class maps to one
/// cache partition and one caching discipline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestClass {
    /// Markup, styles, scripts, fonts, icons, navigations.
    Static,
    /// Application API endpoints.
    Data,
    /// Uploaded/derived images.
    Image,
}

impl RequestClass {
    pub fn partition_label(&self) -> &'static str {
        match self {
            RequestClass::Static => "static",
            RequestClass::Data => "data",
            RequestClass::Image => "image",
        }
    }
}

impl std::fmt::Display for RequestClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.partition_label())
    }
}

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "webp", "avif", "gif"];

fn extension(path: &str) -> Option<&str> {
    let last_segment = path.rsplit('/').next()?;
    let (_, ext) = last_segment.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// Classify an intercepted request, or `None` when the worker must not
/// touch it (anything but GET).
///
/// Data endpoints win over extension matches: `/api/export.png` is a
/// data request whose path happens to end in an image extension.
pub fn classify(method: &str, url: &Url) -> Option<RequestClass> {
    if !method.eq_ignore_ascii_case("GET") {
        return None;
    }

    let path = url.path().to_ascii_lowercase();
    if path == "/api" || path.starts_with("/api/") {
        return Some(RequestClass::Data);
    }

    if path.contains("/upload/") {
        return Some(RequestClass::Image);
    }
    if let Some(ext) = extension(&path) {
        if IMAGE_EXTENSIONS.contains(&ext) {
            return Some(RequestClass::Image);
        }
    }

    // Everything else, including extensionless navigations, is a static
    // asset.
    Some(RequestClass::Static)
}

#![forbid(unsafe_code)]

use sha2::{Digest, Sha256};

use crate::canonicalization::canonicalize_for_resource;
use crate::errors::CoreResult;

/// Stable identity for a cached resource, derived from its canonical URL.
///
/// Partition entries are keyed by this so that URLs differing only in
/// fragment or host casing share one entry, while distinct transform
/// segments get distinct entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceKey([u8; 32]);

impl ResourceKey {
    /// # Errors
    ///
    /// Returns [`CoreError`](crate::CoreError) if the URL cannot be
    /// canonicalized.
    pub fn from_url(url: &url::Url) -> CoreResult<ResourceKey> {
        let canonical = canonicalize_for_resource(url)?;
        let hash = Sha256::digest(canonical.as_bytes());
        Ok(ResourceKey(hash.into()))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

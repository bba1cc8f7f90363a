#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::classify::RequestClass;
use crate::error::{CacheError, CacheResult};

/// Explicit worker configuration: version tag and pre-cache manifest.
///
/// The lifecycle (install/activate/fetch) is a state transition over
/// this value; nothing in the worker reads ambient constants. Bumping
/// `version` is the only supported way to invalidate a cache generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerManifest {
    /// Version tag baked into every partition name (`static-v1.2.0`).
    pub version: String,
    /// Critical static resources fetched at install time.
    #[serde(default)]
    pub static_precache: Vec<String>,
    /// Critical data endpoints fetched at install time.
    #[serde(default)]
    pub data_precache: Vec<String>,
}

impl WorkerManifest {
    pub fn new<V: Into<String>>(version: V) -> Self {
        Self {
            version: version.into(),
            static_precache: Vec::new(),
            data_precache: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_static_precache(mut self, urls: Vec<String>) -> Self {
        self.static_precache = urls;
        self
    }

    #[must_use]
    pub fn with_data_precache(mut self, urls: Vec<String>) -> Self {
        self.data_precache = urls;
        self
    }

    /// # Errors
    ///
    /// Returns [`CacheError::InvalidManifest`] when the version tag is
    /// empty or contains a partition name separator.
    pub fn validate(&self) -> CacheResult<()> {
        if self.version.is_empty() {
            return Err(CacheError::InvalidManifest("empty version".to_string()));
        }
        if self.version.contains('/') {
            return Err(CacheError::InvalidManifest(format!(
                "version must not contain '/': {}",
                self.version
            )));
        }
        Ok(())
    }

    /// Partition name for a class under this manifest's version:
    /// the `<class>-v<version>` on-disk contract.
    pub fn partition_name(&self, class: RequestClass) -> String {
        format!("{}-v{}", class.partition_label(), self.version)
    }

    /// Every partition name this build expects to exist. Anything else
    /// found at activation time is a stale generation.
    pub fn expected_partitions(&self) -> Vec<String> {
        [RequestClass::Static, RequestClass::Data, RequestClass::Image]
            .iter()
            .map(|class| self.partition_name(*class))
            .collect()
    }
}

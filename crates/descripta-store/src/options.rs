//! `__options__`: how the store was built.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::layout;
use crate::error::{StoreError, StoreResult};

/// Build-time options recorded alongside the store.
///
/// Only `descriptors` is interpreted; every other key is preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Comma-separated descriptor-set identifiers, e.g. `"RDKit2D,Morgan3Counts"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptors: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl StoreOptions {
    pub fn with_descriptors(descriptors: impl Into<String>) -> Self {
        Self {
            descriptors: Some(descriptors.into()),
            extra: BTreeMap::new(),
        }
    }

    /// Descriptor-set identifiers, in recorded order.
    pub fn descriptor_sets(&self) -> Option<Vec<String>> {
        let sets: Vec<String> = self
            .descriptors
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        (!sets.is_empty()).then_some(sets)
    }

    /// Load `__options__` from a store root.
    ///
    /// Absent or unreadable options are not an error: the blob is optional,
    /// so failures are logged and reported as `None`.
    pub fn load(dir: &Path) -> Option<Self> {
        let path = dir.join(layout::OPTIONS);
        if !path.exists() {
            debug!("No options blob at '{}'", path.display());
            return None;
        }
        match Self::read(&path) {
            Ok(options) => Some(options),
            Err(e) => {
                warn!("Ignoring unreadable options blob '{}': {}", path.display(), e);
                None
            }
        }
    }

    fn read(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write `__options__` into a store root.
    pub fn save(&self, dir: &Path) -> StoreResult<()> {
        let path = dir.join(layout::OPTIONS);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)
            .map_err(|e| StoreError::WriteFailed(format!("{}: {}", path.display(), e)))
    }
}

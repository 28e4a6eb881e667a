//! Capability slots for the optional secondary indices.
//!
//! Every secondary index resolves to exactly one [`IndexSlot`] at open time.
//! Open never fails because of a secondary index; the slot remembers why the
//! index is missing and lookups branch on it once, at entry.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{AccessMode, KeyStoreConfig};
use crate::error::StoreError;
use crate::keystore::{self, KeyStore};

/// Availability of one secondary index, as reported by
/// [`DescriptorStore::capabilities`](crate::DescriptorStore::capabilities).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum IndexState {
    /// Open and queryable.
    Ready,
    /// No index at the expected sub-path.
    Missing,
    /// Index exists but no backend for it is compiled in.
    BackendUnavailable,
    /// Index exists but the backend failed to open it.
    Failed(String),
}

pub(crate) enum IndexSlot {
    Ready(Box<dyn KeyStore>),
    Missing,
    BackendUnavailable(String),
    Failed(String),
}

impl IndexSlot {
    /// Resolve the slot for the index at `root/sub_path`.
    pub(crate) fn open(
        root: &Path,
        sub_path: &str,
        label: &'static str,
        mode: AccessMode,
        config: &KeyStoreConfig,
    ) -> Self {
        let path = root.join(sub_path);
        if !path.exists() {
            debug!("No {} at '{}'", label, path.display());
            return IndexSlot::Missing;
        }
        match keystore::open_persistent(&path, mode, config) {
            Ok(handle) => {
                debug!("Opened {} at '{}'", label, path.display());
                IndexSlot::Ready(handle)
            }
            Err(e @ StoreError::FeatureUnavailable { .. }) => {
                warn!("{} exists at '{}' but cannot be used: {}", label, path.display(), e);
                IndexSlot::BackendUnavailable(e.to_string())
            }
            Err(e) => {
                warn!("{} at '{}' failed to open, continuing without it: {}", label, path.display(), e);
                IndexSlot::Failed(e.to_string())
            }
        }
    }

    pub(crate) fn from_handle(handle: Option<Box<dyn KeyStore>>) -> Self {
        handle.map_or(IndexSlot::Missing, IndexSlot::Ready)
    }

    pub(crate) fn handle(&self) -> Option<&dyn KeyStore> {
        match self {
            IndexSlot::Ready(handle) => Some(&**handle),
            _ => None,
        }
    }

    pub(crate) fn handle_mut(&mut self) -> Option<&mut Box<dyn KeyStore>> {
        match self {
            IndexSlot::Ready(handle) => Some(handle),
            _ => None,
        }
    }

    pub(crate) fn state(&self) -> IndexState {
        match self {
            IndexSlot::Ready(_) => IndexState::Ready,
            IndexSlot::Missing => IndexState::Missing,
            IndexSlot::BackendUnavailable(_) => IndexState::BackendUnavailable,
            IndexSlot::Failed(reason) => IndexState::Failed(reason.clone()),
        }
    }

    /// Why lookups cannot use this slot.
    pub(crate) fn reason(&self) -> String {
        match self {
            IndexSlot::Ready(_) => "index is open".to_string(),
            IndexSlot::Missing => "no index was built for this store".to_string(),
            IndexSlot::BackendUnavailable(reason) | IndexSlot::Failed(reason) => reason.clone(),
        }
    }
}

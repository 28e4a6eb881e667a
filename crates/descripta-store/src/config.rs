//! Store configuration and on-disk layout.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Fixed sub-paths under a store root.
///
/// | Sub-path | Role | Required |
/// |----------|------|----------|
/// | `__rawformat__` + `__rawstore__` | fixed-width descriptor table | yes |
/// | `__molindex__` | ordinal → source record | yes |
/// | `inchikey.rocksdb` | content key → ordinal set | no |
/// | `name.rocksdb` | name → ordinal | no |
/// | `__options__` | build options blob | no |
pub mod layout {
    /// JSON header describing the columnar table.
    pub const RAW_FORMAT: &str = "__rawformat__";
    /// Row-major fixed-width data file.
    pub const RAW_DATA: &str = "__rawstore__";
    /// Primary ordinal index directory.
    pub const MOL_INDEX: &str = "__molindex__";
    /// Content-key (InChIKey) index.
    pub const INCHIKEY_INDEX: &str = "inchikey.rocksdb";
    /// Name index.
    pub const NAME_INDEX: &str = "name.rocksdb";
    /// Build options blob.
    pub const OPTIONS: &str = "__options__";
}

/// Default marker identifying calculation-status columns.
pub const DEFAULT_FLAG_MARKER: &str = "_calculated";

/// How the store and its persistent indices are opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Read-only access (the expected mode).
    #[default]
    ReadOnly,
    /// Writable handles. Mutation semantics are owned by the build pipeline.
    ReadWrite,
}

impl AccessMode {
    /// True when opened read-only.
    pub fn is_read_only(self) -> bool {
        matches!(self, AccessMode::ReadOnly)
    }
}

/// Options handed to the persistent key-store backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyStoreConfig {
    /// Maximum number of open files (default: 256).
    pub max_open_files: i32,
    /// Block cache size in bytes (default: 32MB).
    pub block_cache_size: usize,
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            max_open_files: 256,
            block_cache_size: 32 * 1024 * 1024, // 32MB
        }
    }
}

/// Configuration for opening a [`DescriptorStore`](crate::DescriptorStore).
///
/// # Example
///
/// ```rust
/// use descripta_store::{AccessMode, StoreConfig};
///
/// let config = StoreConfig::from_json_str(r#"{ "mode": "read_write" }"#).unwrap();
/// assert_eq!(config.mode, AccessMode::ReadWrite);
/// assert_eq!(config.flag_marker, "_calculated");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Access mode for every handle (default: read-only).
    pub mode: AccessMode,
    /// Column names containing this marker are calculation-status flags.
    pub flag_marker: String,
    /// Persistent key-store tuning.
    pub key_store: KeyStoreConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mode: AccessMode::ReadOnly,
            flag_marker: DEFAULT_FLAG_MARKER.to_string(),
            key_store: KeyStoreConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Default configuration with the given access mode.
    pub fn with_mode(mode: AccessMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> StoreResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            StoreError::ReadFailed(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_json_str(&text)
    }

    fn validate(&self) -> StoreResult<()> {
        if self.flag_marker.is_empty() {
            return Err(StoreError::Serialization(
                "flag_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

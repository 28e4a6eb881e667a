//! Persistent key → value stores backing the secondary indices.
//!
//! The façade only needs point lookups, so the seam is a small trait with
//! two implementations:
//!
//! - [`RocksKeyStore`] - RocksDB-backed, behind the `rocksdb` feature
//! - [`MemoryKeyStore`] - `HashMap`-backed, for in-process indices and tests
//!
//! When the crate is built without a persistent backend,
//! [`open_persistent`] reports `FeatureUnavailable` instead of failing to link.

mod memory;
#[cfg(feature = "rocksdb")]
mod rocks;


use std::path::Path;

use crate::config::{AccessMode, KeyStoreConfig};
use crate::error::StoreResult;

pub use memory::MemoryKeyStore;
#[cfg(feature = "rocksdb")]
pub use rocks::RocksKeyStore;

/// Point-lookup interface over a key → bytes store.
///
/// # Thread Safety
/// Implementations must support concurrent `get` through `&self`.
pub trait KeyStore: Send + Sync {
    /// Value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    /// - `StoreError::ReadFailed` on backend failure
    /// - `StoreError::Closed` after `close()`
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Release the store. Calling twice is a no-op.
    fn close(&mut self) -> StoreResult<()>;

    /// True once `close()` has run.
    fn is_closed(&self) -> bool;
}

/// True when a persistent backend is compiled in.
pub const fn persistent_backend_available() -> bool {
    cfg!(feature = "rocksdb")
}

/// Open the persistent key store at `path` with the compiled-in backend.
///
/// # Errors
/// - `StoreError::FeatureUnavailable` - no persistent backend compiled in
/// - `StoreError::OpenFailed` - the backend could not open `path`
#[cfg(feature = "rocksdb")]
pub fn open_persistent(
    path: &Path,
    mode: AccessMode,
    config: &KeyStoreConfig,
) -> StoreResult<Box<dyn KeyStore>> {
    Ok(Box::new(RocksKeyStore::open(path, mode, config)?))
}

/// Open the persistent key store at `path` with the compiled-in backend.
///
/// # Errors
/// - `StoreError::FeatureUnavailable` - no persistent backend compiled in
/// - `StoreError::OpenFailed` - the backend could not open `path`
#[cfg(not(feature = "rocksdb"))]
pub fn open_persistent(
    path: &Path,
    _mode: AccessMode,
    _config: &KeyStoreConfig,
) -> StoreResult<Box<dyn KeyStore>> {
    Err(crate::error::StoreError::unavailable(
        "persistent key store",
        format!(
            "'{}' exists but no key-store backend is compiled in",
            path.display()
        ),
    ))
}

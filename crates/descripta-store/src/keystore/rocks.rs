//! RocksDB-backed key store.

use std::path::{Path, PathBuf};

use rocksdb::{BlockBasedOptions, Cache, Options, DB};
use tracing::{debug, error};

use crate::config::{AccessMode, KeyStoreConfig};
use crate::error::{StoreError, StoreResult};

use super::KeyStore;

/// RocksDB database used as a flat key → value index.
///
/// # Thread Safety
/// RocksDB's `DB` type is internally thread-safe for concurrent reads.
pub struct RocksKeyStore {
    /// `None` once closed.
    db: Option<DB>,
    /// Shared block cache (kept alive for DB lifetime).
    #[allow(dead_code)]
    cache: Cache,
    path: PathBuf,
    mode: AccessMode,
}

impl RocksKeyStore {
    /// Open an existing database.
    ///
    /// Read-only mode uses RocksDB's read-only open; read-write mode never
    /// creates a missing database.
    ///
    /// # Errors
    /// - `StoreError::OpenFailed` - missing, locked, or corrupt database
    pub fn open<P: AsRef<Path>>(
        path: P,
        mode: AccessMode,
        config: &KeyStoreConfig,
    ) -> StoreResult<Self> {
        Self::open_inner(path.as_ref(), mode, config, false)
    }

    /// Create (or reopen) a writable database. Used by the build pipeline.
    pub fn create<P: AsRef<Path>>(path: P, config: &KeyStoreConfig) -> StoreResult<Self> {
        Self::open_inner(path.as_ref(), AccessMode::ReadWrite, config, true)
    }

    fn open_inner(
        path: &Path,
        mode: AccessMode,
        config: &KeyStoreConfig,
        create: bool,
    ) -> StoreResult<Self> {
        let path_str = path.to_string_lossy().to_string();

        let cache = Cache::new_lru_cache(config.block_cache_size);
        let mut table_opts = BlockBasedOptions::default();
        table_opts.set_block_cache(&cache);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(create);
        db_opts.set_max_open_files(config.max_open_files);
        db_opts.set_block_based_table_factory(&table_opts);

        let db = match mode {
            AccessMode::ReadOnly => DB::open_for_read_only(&db_opts, &path_str, false),
            AccessMode::ReadWrite => DB::open(&db_opts, &path_str),
        }
        .map_err(|e| {
            error!("Failed to open RocksDB at '{}': {}", path_str, e);
            StoreError::OpenFailed {
                path: path_str.clone(),
                message: e.to_string(),
            }
        })?;

        debug!("Opened key store at '{}' ({:?})", path_str, mode);

        Ok(Self {
            db: Some(db),
            cache,
            path: path.to_path_buf(),
            mode,
        })
    }

    /// Database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mode the database was opened with.
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Write an entry. Fails on a read-only handle.
    pub fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        if self.mode.is_read_only() {
            return Err(StoreError::WriteFailed(format!(
                "key store '{}' is read-only",
                self.path.display()
            )));
        }
        self.db()?
            .put(key, value)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))
    }

    /// Flush memtables to disk.
    pub fn flush(&self) -> StoreResult<()> {
        self.db()?
            .flush()
            .map_err(|e| StoreError::WriteFailed(e.to_string()))
    }

    /// Underlying RocksDB instance, for operations not covered here.
    pub fn db(&self) -> StoreResult<&DB> {
        self.db.as_ref().ok_or(StoreError::Closed { handle: "key store" })
    }
}

impl KeyStore for RocksKeyStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.db()?
            .get(key)
            .map_err(|e| StoreError::ReadFailed(format!("{}: {}", self.path.display(), e)))
    }

    fn close(&mut self) -> StoreResult<()> {
        // dropping the DB closes it
        if self.db.take().is_some() {
            debug!("Closed key store at '{}'", self.path.display());
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.db.is_none()
    }
}

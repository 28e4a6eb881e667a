//! Indexed descriptor store façade.
//!
//! Composes the columnar descriptor table, the primary ordinal index, the two
//! optional secondary indices and the options blob into one read-optimized view.
//!
//! # Availability
//!
//! | Artifact | Missing at open | Effect |
//! |----------|-----------------|--------|
//! | descriptor table | `OpenFailed` | store unusable |
//! | `__molindex__` | `OpenFailed` | store unusable |
//! | `inchikey.rocksdb` | recorded in slot | `lookup_inchikey` → `FeatureUnavailable` |
//! | `name.rocksdb` | recorded in slot | `lookup_name` builds an in-memory map once |
//! | `__options__` | `None` | `descriptor_calculator` → `None` |
//!
//! # Thread Safety
//!
//! All read operations take `&self`. The only interior mutation is the
//! in-memory name map, which sits in a `OnceLock` so concurrent first lookups
//! run the scan exactly once. Share the store via `Arc<DescriptorStore>`.
//!
//! # Module Structure
//!
//! - `columns` - Data-column partition
//! - `slot` - Secondary index capability slots
//! - `lookup` - Name and content-key lookups
//! - `iter` - Sequential iterators
//! - `tests` - Façade tests against mock collaborators

mod columns;
mod iter;
mod lookup;
mod slot;


use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::calculator::{DescriptorCalculator, DescriptorEngine};
use crate::config::{layout, AccessMode, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::index::{MolIndex, OrdinalIndex};
use crate::keystore::KeyStore;
use crate::options::StoreOptions;
use crate::raw::{ColumnarStore, RawStore};
use crate::value::Value;

use columns::ColumnPartition;
use lookup::NameFallback;
use slot::IndexSlot;

pub use iter::{DescriptorRows, StoreIter};
pub use slot::IndexState;

/// Snapshot of which optional subsystems a store has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreCapabilities {
    pub name_index: IndexState,
    pub inchikey_index: IndexState,
    /// The in-memory name map has been built.
    pub name_fallback_built: bool,
    pub options_loaded: bool,
    pub closed: bool,
}

/// Read access to a descriptor store.
///
/// # Example
///
/// ```rust,ignore
/// use descripta_store::DescriptorStore;
///
/// let mut store = DescriptorStore::open("/data/chembl.store")?;
/// println!("{} molecules", store.len());
///
/// for item in &store {
///     let (record, descriptors) = item?;
///     println!("{} {:?}", record.moldata, descriptors);
/// }
///
/// let row = store.lookup_name("ZWIMER-03065")?;
/// // content keys may collide, so this returns every matching ordinal
/// let rows = store.lookup_inchikey("BCWYEXBNOWJQJV-UHFFFAOYSA-N")?;
/// store.close()?;
/// ```
pub struct DescriptorStore {
    /// Store root; `None` when composed from parts.
    path: Option<PathBuf>,
    config: StoreConfig,
    columnar: Box<dyn ColumnarStore>,
    index: Box<dyn OrdinalIndex>,
    inchikey: IndexSlot,
    name: IndexSlot,
    name_fallback: OnceLock<NameFallback>,
    options: Option<StoreOptions>,
    columns: ColumnPartition,
    closed: bool,
}

impl DescriptorStore {
    /// Open a store read-only with default configuration.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Open a store with the given access mode.
    pub fn open_with_mode<P: AsRef<Path>>(path: P, mode: AccessMode) -> StoreResult<Self> {
        Self::open_with_config(path, StoreConfig::with_mode(mode))
    }

    /// Open a store with custom configuration.
    ///
    /// # Arguments
    /// * `path` - Store root directory
    /// * `config` - Access mode, flag marker, key-store tuning
    ///
    /// # Returns
    /// * `Ok(DescriptorStore)` - Required artifacts opened; optional ones resolved
    /// * `Err(StoreError::OpenFailed)` - Descriptor table or mol index missing/corrupt
    ///
    /// Handles opened before a failure are released on the error path.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: StoreConfig) -> StoreResult<Self> {
        let root = path.as_ref().to_path_buf();
        info!("Opening descriptor store at '{}' ({:?})", root.display(), config.mode);

        if !root.is_dir() {
            error!("Descriptor store '{}' is not a directory", root.display());
            return Err(StoreError::open_failed(&root, "store directory does not exist"));
        }

        let columnar = RawStore::open(&root).map_err(|e| {
            error!("Failed to open descriptor table: {}", e);
            e
        })?;
        let index = MolIndex::open(root.join(layout::MOL_INDEX)).map_err(|e| {
            error!("Failed to open mol index: {}", e);
            e
        })?;

        let inchikey = IndexSlot::open(
            &root,
            layout::INCHIKEY_INDEX,
            lookup::INCHIKEY_INDEX,
            config.mode,
            &config.key_store,
        );
        let name = IndexSlot::open(
            &root,
            layout::NAME_INDEX,
            lookup::NAME_INDEX,
            config.mode,
            &config.key_store,
        );
        if matches!(name, IndexSlot::Missing) {
            warn!(
                "No name index at '{}'; name lookups will scan the mol index",
                root.join(layout::NAME_INDEX).display()
            );
        }

        let options = StoreOptions::load(&root);

        let mut store = Self::compose(
            Box::new(columnar),
            Box::new(index),
            inchikey,
            name,
            options,
            config,
        )?;
        store.path = Some(root);

        info!(
            "Opened descriptor store: {} rows, {} data columns, {} flag columns",
            store.len(),
            store.columns.data_names().len(),
            store.columns.flag_count()
        );
        Ok(store)
    }

    /// Compose a store from already-open collaborators.
    ///
    /// A `None` index handle behaves like a missing sub-path.
    ///
    /// # Errors
    /// - `StoreError::OpenFailed` if the table and the index disagree on row count
    pub fn from_parts(
        columnar: Box<dyn ColumnarStore>,
        index: Box<dyn OrdinalIndex>,
        inchikey: Option<Box<dyn KeyStore>>,
        name: Option<Box<dyn KeyStore>>,
        options: Option<StoreOptions>,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        Self::compose(
            columnar,
            index,
            IndexSlot::from_handle(inchikey),
            IndexSlot::from_handle(name),
            options,
            config,
        )
    }

    fn compose(
        columnar: Box<dyn ColumnarStore>,
        index: Box<dyn OrdinalIndex>,
        inchikey: IndexSlot,
        name: IndexSlot,
        options: Option<StoreOptions>,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        if columnar.len() != index.len() {
            error!(
                "Descriptor table has {} rows but mol index has {} records",
                columnar.len(),
                index.len()
            );
            return Err(StoreError::OpenFailed {
                path: layout::MOL_INDEX.to_string(),
                message: format!(
                    "mol index has {} records, descriptor table has {} rows",
                    index.len(),
                    columnar.len()
                ),
            });
        }

        let columns = ColumnPartition::new(columnar.column_names(), &config.flag_marker);
        debug!("Data columns: {:?}", columns.data_names());

        Ok(Self {
            path: None,
            config,
            columnar,
            index,
            inchikey,
            name,
            name_fallback: OnceLock::new(),
            options,
            columns,
            closed: false,
        })
    }

    /// Release every handle.
    ///
    /// Each handle is closed even if an earlier one fails; the first failure
    /// is returned. Calling `close` again is a no-op. Handles are also
    /// released when the store is dropped.
    pub fn close(&mut self) -> StoreResult<()> {
        if self.closed {
            return Ok(());
        }
        let mut first_error: Option<StoreError> = None;
        let mut record = |what: &str, result: StoreResult<()>| {
            if let Err(e) = result {
                error!("Failed to close {}: {}", what, e);
                first_error.get_or_insert(e);
            }
        };

        record("descriptor table", self.columnar.close());
        record("mol index", self.index.close());
        if let Some(handle) = self.inchikey.handle_mut() {
            record(lookup::INCHIKEY_INDEX, handle.close());
        }
        if let Some(handle) = self.name.handle_mut() {
            record(lookup::NAME_INDEX, handle.close());
        }
        self.closed = true;

        info!(
            "Closed descriptor store{}",
            self.path
                .as_ref()
                .map(|p| format!(" at '{}'", p.display()))
                .unwrap_or_default()
        );
        first_error.map_or(Ok(()), Err)
    }

    /// True once `close()` has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed {
            return Err(StoreError::Closed {
                handle: "descriptor store",
            });
        }
        Ok(())
    }

    /// Number of rows (ordinals are `0..len()`).
    pub fn len(&self) -> usize {
        self.columnar.len()
    }

    /// True when the store has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Descriptor values at `ordinal`.
    ///
    /// With `keep_flags == false` only data columns are returned, in the order
    /// of [`column_names(false)`](Self::column_names). With `keep_flags == true`
    /// the full row is returned, flags included.
    ///
    /// # Errors
    /// - `StoreError::OutOfRange` if `ordinal >= len()`
    pub fn get_descriptors(&self, ordinal: usize, keep_flags: bool) -> StoreResult<Vec<Value>> {
        self.ensure_open()?;
        let row = self.columnar.get_row(ordinal)?;
        if keep_flags {
            Ok(row)
        } else {
            self.columns.select(ordinal, row)
        }
    }

    /// Full row at `ordinal` keyed by column name, flags included.
    pub fn get_descriptors_as_map(&self, ordinal: usize) -> StoreResult<HashMap<String, Value>> {
        self.ensure_open()?;
        self.columnar.get_row_map(ordinal)
    }

    /// Column names matching [`get_descriptors`](Self::get_descriptors) for the same flag.
    pub fn column_names(&self, keep_flags: bool) -> &[String] {
        if keep_flags {
            self.columnar.column_names()
        } else {
            self.columns.data_names()
        }
    }

    /// `(source record, descriptors)` for every ordinal, in order.
    pub fn iter(&self) -> StoreIter<'_> {
        StoreIter::new(self)
    }

    /// Data-column descriptor vectors for every ordinal, in order.
    pub fn descriptor_rows(&self) -> DescriptorRows<'_> {
        DescriptorRows::new(self)
    }

    /// Rebuild the descriptor calculator this store was built with.
    ///
    /// Best effort: a missing options blob, a missing descriptor field, or an
    /// engine failure is logged and yields `None`.
    pub fn descriptor_calculator(
        &self,
        engine: &dyn DescriptorEngine,
    ) -> Option<Box<dyn DescriptorCalculator>> {
        let Some(options) = &self.options else {
            warn!("Unable to make descriptor calculator: store has no options blob");
            return None;
        };
        let Some(sets) = options.descriptor_sets() else {
            warn!("Unable to make descriptor calculator: options record no descriptor sets");
            return None;
        };
        match engine.build_calculator(&sets) {
            Ok(calculator) => Some(calculator),
            Err(e) => {
                warn!("Unable to make descriptor calculator for {:?}: {}", sets, e);
                None
            }
        }
    }

    /// Which optional subsystems are available.
    pub fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            name_index: self.name.state(),
            inchikey_index: self.inchikey.state(),
            name_fallback_built: self.name_fallback.get().is_some(),
            options_loaded: self.options.is_some(),
            closed: self.closed,
        }
    }

    /// Store root, unless composed from parts.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn mode(&self) -> AccessMode {
        self.config.mode
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Build options, if the store recorded them.
    pub fn options(&self) -> Option<&StoreOptions> {
        self.options.as_ref()
    }

    /// Raw descriptor table.
    pub fn descriptors(&self) -> &dyn ColumnarStore {
        &*self.columnar
    }

    /// Primary ordinal index.
    pub fn mol_index(&self) -> &dyn OrdinalIndex {
        &*self.index
    }

    /// Persistent content-key index, when open.
    pub fn inchikey_index(&self) -> Option<&dyn KeyStore> {
        self.inchikey.handle()
    }

    /// Persistent name index, when open.
    pub fn name_index(&self) -> Option<&dyn KeyStore> {
        self.name.handle()
    }
}

impl<'a> IntoIterator for &'a DescriptorStore {
    type Item = StoreResult<(crate::index::SourceRecord, Vec<Value>)>;
    type IntoIter = StoreIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Debug for DescriptorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorStore")
            .field("path", &self.path)
            .field("len", &self.len())
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

//! Primary ordinal index: ordinal → source record.
//!
//! # Module Structure
//!
//! - `mol_index` - `MolIndex`, the on-disk index over a delimited molecule file
//! - `tests` - Build/open/read test suite

mod mol_index;


use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

pub use mol_index::{MolIndex, MolIndexMeta, MolIndexOptions, MOL_INDEX_VERSION};

/// The original input for one ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Molecule representation (e.g. SMILES).
    pub moldata: String,
    /// Display name, when the source records one.
    pub name: Option<String>,
}

impl SourceRecord {
    pub fn new(moldata: impl Into<String>, name: Option<String>) -> Self {
        Self {
            moldata: moldata.into(),
            name,
        }
    }
}

/// Read interface over the ordinal → source-record mapping.
///
/// # Thread Safety
/// Implementations must support concurrent readers through `&self`.
pub trait OrdinalIndex: Send + Sync {
    /// Number of records.
    fn len(&self) -> usize;

    /// True when the index has no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record at `ordinal`.
    ///
    /// # Errors
    /// - `StoreError::OutOfRange` if `ordinal >= len()`
    /// - `StoreError::DataCorruption` if the record cannot be parsed
    fn get(&self, ordinal: usize) -> StoreResult<SourceRecord>;

    /// Whether records carry a name field.
    fn has_names(&self) -> bool;

    /// Every `(ordinal, name)` pair, by a full sequential scan.
    ///
    /// # Errors
    /// - `StoreError::FeatureUnavailable` if names were not recorded
    fn names(&self) -> StoreResult<Vec<(usize, String)>>;

    /// Release the index. Calling twice is a no-op.
    fn close(&mut self) -> StoreResult<()>;

    /// True once `close()` has run.
    fn is_closed(&self) -> bool;
}

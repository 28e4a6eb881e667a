//! Descripta Store
//!
//! Read-mostly access to a precomputed table of per-molecule descriptor
//! vectors, keyed by a dense integer ordinal, with optional secondary lookup
//! by exact name and by InChIKey (which may map to several ordinals).
//!
//! # Architecture
//!
//! - [`raw`] - Fixed-width columnar descriptor table (`ColumnarStore`, `RawStore`)
//! - [`index`] - Primary ordinal → source record index (`OrdinalIndex`, `MolIndex`)
//! - [`keystore`] - Persistent key → value stores for the secondary indices
//! - [`codec`] - Strict encodings of secondary-index values
//! - [`options`] - The `__options__` build blob
//! - [`calculator`] - Seam to the external descriptor engine
//! - [`store`] - The [`DescriptorStore`] façade tying them together
//!
//! # Feature Flags
//!
//! - `rocksdb` (default): RocksDB backend for the name and InChIKey indices.
//!   Without it, existing indices are reported as unavailable.
//!
//! # Example
//!
//! ```rust,ignore
//! use descripta_store::DescriptorStore;
//!
//! let store = DescriptorStore::open("/data/chembl.store")?;
//! let names = store.column_names(false);
//! let values = store.get_descriptors(0, false)?;
//! assert_eq!(names.len(), values.len());
//! ```

pub mod calculator;
pub mod codec;
pub mod config;
pub mod error;
pub mod index;
pub mod keystore;
pub mod options;
pub mod raw;
pub mod store;
pub mod value;

pub use calculator::{DescriptorCalculator, DescriptorEngine};
pub use config::{AccessMode, KeyStoreConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use index::{MolIndex, MolIndexOptions, OrdinalIndex, SourceRecord};
pub use keystore::{KeyStore, MemoryKeyStore};
#[cfg(feature = "rocksdb")]
pub use keystore::RocksKeyStore;
pub use options::StoreOptions;
pub use raw::{ColumnSpec, ColumnarStore, RawStore, RawStoreWriter};
pub use store::{DescriptorRows, DescriptorStore, IndexState, StoreCapabilities, StoreIter};
pub use value::{DType, Value};

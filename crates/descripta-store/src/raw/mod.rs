//! Fixed-width columnar descriptor table.
//!
//! One row of typed scalars per ordinal, stored row-major in `__rawstore__`
//! and described by the JSON header `__rawformat__`.
//!
//! # Module Structure
//!
//! - `format` - Header types (`RawFormat`, `ColumnSpec`)
//! - `writer` - `RawStoreWriter` used by the build pipeline
//! - `tests` - Reader/writer test suite

mod format;
mod writer;


use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::{debug, error};

use crate::config::layout;
use crate::error::{StoreError, StoreResult};
use crate::value::{DType, Value};

pub use format::{ColumnSpec, RawFormat, RAW_FORMAT_VERSION};
pub use writer::RawStoreWriter;

/// Read interface over a per-ordinal value table.
///
/// # Thread Safety
/// Implementations must support concurrent readers through `&self`.
pub trait ColumnarStore: Send + Sync {
    /// Number of rows.
    fn len(&self) -> usize;

    /// True when the table has no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Declared column names in row order.
    fn column_names(&self) -> &[String];

    /// Full row at `ordinal`.
    ///
    /// # Errors
    /// - `StoreError::OutOfRange` if `ordinal >= len()`
    /// - `StoreError::Closed` after `close()`
    fn get_row(&self, ordinal: usize) -> StoreResult<Vec<Value>>;

    /// Full row at `ordinal` keyed by column name.
    fn get_row_map(&self, ordinal: usize) -> StoreResult<HashMap<String, Value>> {
        let row = self.get_row(ordinal)?;
        Ok(self.column_names().iter().cloned().zip(row).collect())
    }

    /// Release the underlying storage. Calling twice is a no-op.
    fn close(&mut self) -> StoreResult<()>;

    /// True once `close()` has run.
    fn is_closed(&self) -> bool;
}

/// Memory-mapped reader for the on-disk columnar table.
///
/// # Example
/// ```rust,ignore
/// use descripta_store::raw::{ColumnarStore, RawStore};
///
/// let store = RawStore::open("/data/descriptors")?;
/// let row = store.get_row(0)?;
/// assert_eq!(row.len(), store.column_names().len());
/// ```
pub struct RawStore {
    dir: PathBuf,
    format: RawFormat,
    names: Vec<String>,
    /// Byte offset of each column within a row.
    offsets: Vec<usize>,
    row_width: usize,
    /// `None` for an empty table.
    data: Option<Mmap>,
    closed: bool,
}

impl RawStore {
    /// Open the columnar table stored in `dir`.
    ///
    /// # Arguments
    /// * `dir` - Store root containing `__rawformat__` and `__rawstore__`
    ///
    /// # Returns
    /// * `Ok(RawStore)` - Header parsed and data file mapped
    /// * `Err(StoreError::OpenFailed)` - Missing header/data, bad header, or size mismatch
    pub fn open<P: AsRef<Path>>(dir: P) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        let format = RawFormat::load(&dir)?;

        let mut offsets = Vec::with_capacity(format.columns.len());
        let mut row_width = 0usize;
        for column in &format.columns {
            offsets.push(row_width);
            row_width += column.dtype.width();
        }

        let data_path = dir.join(layout::RAW_DATA);
        let file = File::open(&data_path).map_err(|e| {
            error!("Failed to open raw data file '{}': {}", data_path.display(), e);
            StoreError::open_failed(&data_path, e.to_string())
        })?;
        let actual = file
            .metadata()
            .map_err(|e| StoreError::open_failed(&data_path, e.to_string()))?
            .len();
        let expected = format
            .rows
            .checked_mul(row_width)
            .ok_or_else(|| StoreError::open_failed(&data_path, "row count overflows file size"))?;
        if actual != expected as u64 {
            return Err(StoreError::open_failed(
                &data_path,
                format!(
                    "data file is {} bytes, header implies {} rows x {} bytes = {}",
                    actual, format.rows, row_width, expected
                ),
            ));
        }

        let data = if expected == 0 {
            None
        } else {
            // SAFETY: the store is read-mostly; writers never touch a published table.
            let mmap = unsafe { Mmap::map(&file) }
                .map_err(|e| StoreError::open_failed(&data_path, e.to_string()))?;
            Some(mmap)
        };

        debug!(
            "Opened raw store at '{}': {} rows, {} columns, {} bytes/row",
            dir.display(),
            format.rows,
            format.columns.len(),
            row_width
        );

        let names = format.columns.iter().map(|c| c.name.clone()).collect();
        Ok(Self {
            dir,
            format,
            names,
            offsets,
            row_width,
            data,
            closed: false,
        })
    }

    /// Store root this table was opened from.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Parsed header.
    pub fn format(&self) -> &RawFormat {
        &self.format
    }

    /// Column storage types in row order.
    pub fn dtypes(&self) -> Vec<DType> {
        self.format.columns.iter().map(|c| c.dtype).collect()
    }

    /// Bytes per row.
    pub fn row_width(&self) -> usize {
        self.row_width
    }

    /// Lazy traversal of every row in ordinal order.
    pub fn rows(&self) -> RawRows<'_> {
        RawRows {
            store: self,
            next: 0,
        }
    }

    fn row_bytes(&self, ordinal: usize) -> StoreResult<&[u8]> {
        if self.closed {
            return Err(StoreError::Closed { handle: "raw store" });
        }
        if ordinal >= self.format.rows {
            return Err(StoreError::OutOfRange {
                ordinal,
                len: self.format.rows,
            });
        }
        let start = ordinal * self.row_width;
        match &self.data {
            Some(mmap) => Ok(&mmap[start..start + self.row_width]),
            // zero-width rows
            None => Ok(&[]),
        }
    }
}

impl ColumnarStore for RawStore {
    fn len(&self) -> usize {
        self.format.rows
    }

    fn column_names(&self) -> &[String] {
        &self.names
    }

    fn get_row(&self, ordinal: usize) -> StoreResult<Vec<Value>> {
        let bytes = self.row_bytes(ordinal)?;
        self.format
            .columns
            .iter()
            .zip(&self.offsets)
            .map(|(column, &offset)| {
                column
                    .dtype
                    .decode(&bytes[offset..offset + column.dtype.width()])
                    .map_err(|e| match e {
                        StoreError::DataCorruption { details, .. } => StoreError::corruption(
                            format!("raw store row {} column '{}'", ordinal, column.name),
                            details,
                        ),
                        other => other,
                    })
            })
            .collect()
    }

    fn close(&mut self) -> StoreResult<()> {
        if !self.closed {
            self.data = None;
            self.closed = true;
            debug!("Closed raw store at '{}'", self.dir.display());
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Iterator over raw rows. Yields `Err` once and then stops.
pub struct RawRows<'a> {
    store: &'a RawStore,
    next: usize,
}

impl Iterator for RawRows<'_> {
    type Item = StoreResult<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.store.len() {
            return None;
        }
        let result = self.store.get_row(self.next);
        self.next = if result.is_ok() {
            self.next + 1
        } else {
            self.store.len()
        };
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.store.len().saturating_sub(self.next);
        (0, Some(remaining))
    }
}

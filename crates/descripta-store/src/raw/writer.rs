//! Build-side writer for the columnar table.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::layout;
use crate::error::{StoreError, StoreResult};
use crate::value::Value;

use super::format::{ColumnSpec, RawFormat, RAW_FORMAT_VERSION};

/// Appends typed rows to a new table.
///
/// The header is written by [`finish`](Self::finish), so an interrupted build
/// leaves a table that refuses to open.
pub struct RawStoreWriter {
    dir: PathBuf,
    columns: Vec<ColumnSpec>,
    out: BufWriter<File>,
    rows: usize,
    scratch: Vec<u8>,
}

impl RawStoreWriter {
    /// Create (or truncate) the table in `dir`. Any existing header is removed
    /// first, so the old table stops opening as soon as the rewrite begins.
    pub fn create<P: AsRef<Path>>(dir: P, columns: Vec<ColumnSpec>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        let probe = RawFormat {
            version: RAW_FORMAT_VERSION,
            rows: 0,
            columns: columns.clone(),
        };
        probe.validate().map_err(StoreError::Serialization)?;

        std::fs::create_dir_all(&dir)
            .map_err(|e| StoreError::WriteFailed(format!("{}: {}", dir.display(), e)))?;
        let header_path = dir.join(layout::RAW_FORMAT);
        match std::fs::remove_file(&header_path) {
            Ok(()) => debug!("Removed previous header '{}'", header_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StoreError::WriteFailed(format!(
                    "{}: {}",
                    header_path.display(),
                    e
                )))
            }
        }
        let data_path = dir.join(layout::RAW_DATA);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&data_path)
            .map_err(|e| StoreError::WriteFailed(format!("{}: {}", data_path.display(), e)))?;

        Ok(Self {
            dir,
            columns,
            out: BufWriter::new(file),
            rows: 0,
            scratch: Vec::new(),
        })
    }

    /// Append one row. Arity and cell types must match the schema.
    pub fn append_row(&mut self, row: &[Value]) -> StoreResult<()> {
        if row.len() != self.columns.len() {
            return Err(StoreError::Serialization(format!(
                "row {} has {} values, schema has {} columns",
                self.rows,
                row.len(),
                self.columns.len()
            )));
        }
        self.scratch.clear();
        for (column, value) in self.columns.iter().zip(row) {
            column.dtype.encode(*value, &mut self.scratch)?;
        }
        self.out
            .write_all(&self.scratch)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        self.rows += 1;
        Ok(())
    }

    /// Rows appended so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush the data file and publish the header.
    pub fn finish(mut self) -> StoreResult<RawFormat> {
        self.out
            .flush()
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        let format = RawFormat {
            version: RAW_FORMAT_VERSION,
            rows: self.rows,
            columns: self.columns,
        };
        format.save(&self.dir)?;
        info!(
            "Wrote raw store at '{}': {} rows, {} columns",
            self.dir.display(),
            format.rows,
            format.columns.len()
        );
        Ok(format)
    }
}

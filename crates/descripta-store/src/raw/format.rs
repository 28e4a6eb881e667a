//! `__rawformat__` header.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::layout;
use crate::error::{StoreError, StoreResult};
use crate::value::DType;

/// Current header version. Bump when the data layout changes.
pub const RAW_FORMAT_VERSION: u32 = 1;

/// One declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub dtype: DType,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, dtype: DType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

/// Table header: row count and column schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFormat {
    pub version: u32,
    pub rows: usize,
    pub columns: Vec<ColumnSpec>,
}

impl RawFormat {
    /// Read and validate the header in `dir`.
    ///
    /// Every failure is an `OpenFailed`: the table is a required artifact.
    pub(crate) fn load(dir: &Path) -> StoreResult<Self> {
        let path = dir.join(layout::RAW_FORMAT);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| StoreError::open_failed(&path, e.to_string()))?;
        let format: RawFormat = serde_json::from_str(&text)
            .map_err(|e| StoreError::open_failed(&path, format!("invalid header: {}", e)))?;
        format
            .validate()
            .map_err(|message| StoreError::open_failed(&path, message))?;
        Ok(format)
    }

    pub(crate) fn save(&self, dir: &Path) -> StoreResult<()> {
        let path = dir.join(layout::RAW_FORMAT);
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, text)
            .map_err(|e| StoreError::WriteFailed(format!("{}: {}", path.display(), e)))
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.version != RAW_FORMAT_VERSION {
            return Err(format!(
                "unsupported format version {} (expected {})",
                self.version, RAW_FORMAT_VERSION
            ));
        }
        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(format!("duplicate column name '{}'", column.name));
            }
        }
        Ok(())
    }
}

//! Data-column partition.
//!
//! Columns whose name contains the flag marker (default `"_calculated"`) are
//! calculation-status flags; every other column is a data column. The
//! partition is computed once at open and never changes.

use crate::error::{StoreError, StoreResult};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnPartition {
    data_names: Vec<String>,
    data_positions: Vec<usize>,
    row_width: usize,
}

impl ColumnPartition {
    pub(crate) fn new(names: &[String], flag_marker: &str) -> Self {
        let (data_positions, data_names) = names
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.contains(flag_marker))
            .map(|(position, name)| (position, name.clone()))
            .unzip();
        Self {
            data_names,
            data_positions,
            row_width: names.len(),
        }
    }

    pub(crate) fn data_names(&self) -> &[String] {
        &self.data_names
    }

    pub(crate) fn flag_count(&self) -> usize {
        self.row_width - self.data_positions.len()
    }

    /// Keep only the data columns of a full row, in declared order.
    pub(crate) fn select(&self, ordinal: usize, row: Vec<Value>) -> StoreResult<Vec<Value>> {
        if row.len() != self.row_width {
            return Err(StoreError::corruption(
                format!("descriptor row {}", ordinal),
                format!("row has {} values, schema has {} columns", row.len(), self.row_width),
            ));
        }
        Ok(self.data_positions.iter().map(|&i| row[i]).collect())
    }
}

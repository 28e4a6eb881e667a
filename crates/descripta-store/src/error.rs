//! Store error types.
//!
//! Defines the error taxonomy shared by the façade and its collaborators.
//!
//! # Error Categories
//!
//! - **Lifecycle**: `OpenFailed` (a required artifact is missing or corrupt), `Closed`
//! - **Capability**: `FeatureUnavailable` (an optional subsystem was never available)
//! - **Lookup**: `NotFound` (valid subsystem, absent key), `OutOfRange` (bad ordinal)
//! - **Data Integrity**: `DataCorruption`, `Serialization`
//! - **I/O**: `ReadFailed`, `WriteFailed`, `IterationFailed`
//!
//! `FeatureUnavailable` and `NotFound` are deliberately distinct: callers must be
//! able to tell "this store has no such index" apart from "the index has no such key".

use thiserror::Error;

/// Errors raised by store operations.
///
/// Implements `std::error::Error` and `Display` via `thiserror`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required artifact failed to open. The store is unusable.
    #[error("Failed to open store artifact at '{path}': {message}")]
    OpenFailed {
        /// Path of the artifact that could not be opened
        path: String,
        /// The underlying failure
        message: String,
    },

    /// An optional subsystem is not available for this store.
    #[error("{feature} not available: {reason}")]
    FeatureUnavailable {
        /// Which subsystem (e.g. "name index", "inchikey index")
        feature: &'static str,
        /// Why it is unavailable
        reason: String,
    },

    /// The subsystem is available but holds no entry for the key.
    #[error("Key {key:?} not found in {index}")]
    NotFound {
        /// Index that was searched
        index: &'static str,
        /// The lookup key
        key: String,
    },

    /// Ordinal outside `[0, len)`.
    #[error("Ordinal {ordinal} out of range for store of {len} rows")]
    OutOfRange {
        /// Requested ordinal
        ordinal: usize,
        /// Number of rows in the store
        len: usize,
    },

    /// A stored value could not be decoded into its expected form.
    #[error("Data corruption in {location}: {details}")]
    DataCorruption {
        /// Where the bad value lives (index name, file, key)
        location: String,
        /// What was wrong with it
        details: String,
    },

    /// Sequential iteration failed while fetching a given ordinal.
    #[error("Iteration failed at ordinal {ordinal}: {source}")]
    IterationFailed {
        /// The ordinal whose fetch failed
        ordinal: usize,
        /// The underlying fetch error
        #[source]
        source: Box<StoreError>,
    },

    /// The handle was explicitly closed.
    #[error("{handle} is closed")]
    Closed {
        /// Which handle
        handle: &'static str,
    },

    /// Read operation failed.
    #[error("Read failed: {0}")]
    ReadFailed(String),

    /// Write operation failed (build-side writers only).
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::ReadFailed(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

#[cfg(feature = "rocksdb")]
impl From<rocksdb::Error> for StoreError {
    fn from(e: rocksdb::Error) -> Self {
        StoreError::ReadFailed(e.to_string())
    }
}

impl StoreError {
    /// Creates an `OpenFailed` error for a path.
    pub fn open_failed(path: impl AsRef<std::path::Path>, message: impl Into<String>) -> Self {
        StoreError::OpenFailed {
            path: path.as_ref().to_string_lossy().to_string(),
            message: message.into(),
        }
    }

    /// Creates a `DataCorruption` error.
    pub fn corruption(location: impl Into<String>, details: impl Into<String>) -> Self {
        StoreError::DataCorruption {
            location: location.into(),
            details: details.into(),
        }
    }

    /// Creates a `FeatureUnavailable` error.
    pub fn unavailable(feature: &'static str, reason: impl Into<String>) -> Self {
        StoreError::FeatureUnavailable {
            feature,
            reason: reason.into(),
        }
    }

    /// True for `FeatureUnavailable`.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::FeatureUnavailable { .. })
    }

    /// True for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Convenient Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

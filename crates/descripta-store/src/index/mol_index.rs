//! On-disk ordinal index over a delimited molecule file.
//!
//! # Layout (`__molindex__/`)
//!
//! | File | Contents |
//! |------|----------|
//! | `meta.json` | source path, delimiter, header flag, field positions |
//! | `offsets` | `N` pairs of little-endian `u64` `(start, end)` byte ranges |
//!
//! A relative source path resolves against the index directory. A space
//! delimiter splits on runs of ASCII whitespace.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

use super::{OrdinalIndex, SourceRecord};

/// Current index version.
pub const MOL_INDEX_VERSION: u32 = 1;

const META_FILE: &str = "meta.json";
const OFFSETS_FILE: &str = "offsets";
const RANGE_BYTES: usize = 16;

/// How records are laid out in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MolIndexOptions {
    /// Field separator (default: whitespace).
    pub delimiter: char,
    /// Skip the first line (default: false).
    pub has_header: bool,
    /// Field holding the molecule (default: 0).
    pub smiles_column: usize,
    /// Field holding the display name (default: 1).
    pub name_column: Option<usize>,
}

impl Default for MolIndexOptions {
    fn default() -> Self {
        Self {
            delimiter: ' ',
            has_header: false,
            smiles_column: 0,
            name_column: Some(1),
        }
    }
}

/// Persisted index metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MolIndexMeta {
    pub version: u32,
    pub source: PathBuf,
    #[serde(flatten)]
    pub options: MolIndexOptions,
}

/// Random-access index from ordinal to source record.
///
/// # Thread Safety
/// Reads go through an immutable memory map; `&self` access is safe across threads.
pub struct MolIndex {
    dir: PathBuf,
    meta: MolIndexMeta,
    source_path: PathBuf,
    ranges: Vec<(u64, u64)>,
    /// `None` when the source is empty or the index is closed.
    source: Option<Mmap>,
    closed: bool,
}

impl MolIndex {
    /// Scan `source` and write an index into `index_dir`.
    ///
    /// Blank lines are skipped; the header line is skipped when
    /// `options.has_header` is set. The source is recorded as a canonical
    /// absolute path.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of indexed records
    /// * `Err(StoreError::WriteFailed)` - Index files could not be written
    pub fn build<P: AsRef<Path>, S: AsRef<Path>>(
        index_dir: P,
        source: S,
        options: MolIndexOptions,
    ) -> StoreResult<usize> {
        let index_dir = index_dir.as_ref();
        let source = source.as_ref();
        let write_err =
            |path: &Path, e: std::io::Error| StoreError::WriteFailed(format!("{}: {}", path.display(), e));

        let file = File::open(source)
            .map_err(|e| StoreError::ReadFailed(format!("{}: {}", source.display(), e)))?;
        let source_abs = std::fs::canonicalize(source)
            .map_err(|e| StoreError::ReadFailed(format!("{}: {}", source.display(), e)))?;
        let mut reader = BufReader::new(file);
        let mut ranges = Vec::new();
        let mut line = Vec::new();
        let mut pos = 0u64;
        let mut first = true;
        loop {
            line.clear();
            let n = reader.read_until(b'\n', &mut line)?;
            if n == 0 {
                break;
            }
            let start = pos;
            pos += n as u64;
            if std::mem::take(&mut first) && options.has_header {
                continue;
            }
            if line.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }
            ranges.push((start, pos));
        }

        std::fs::create_dir_all(index_dir).map_err(|e| write_err(index_dir, e))?;

        let offsets_path = index_dir.join(OFFSETS_FILE);
        let mut out = BufWriter::new(
            File::create(&offsets_path).map_err(|e| write_err(&offsets_path, e))?,
        );
        for (start, end) in &ranges {
            out.write_all(&start.to_le_bytes())
                .and_then(|_| out.write_all(&end.to_le_bytes()))
                .map_err(|e| write_err(&offsets_path, e))?;
        }
        out.flush().map_err(|e| write_err(&offsets_path, e))?;

        let meta = MolIndexMeta {
            version: MOL_INDEX_VERSION,
            source: source_abs,
            options,
        };
        let meta_path = index_dir.join(META_FILE);
        std::fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)
            .map_err(|e| write_err(&meta_path, e))?;

        info!(
            "Indexed {} records from '{}' into '{}'",
            ranges.len(),
            source.display(),
            index_dir.display()
        );
        Ok(ranges.len())
    }

    /// Open the index stored in `dir`.
    ///
    /// # Errors
    /// - `StoreError::OpenFailed` - metadata, offsets, or source missing or inconsistent
    pub fn open<P: AsRef<Path>>(dir: P) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();

        let meta_path = dir.join(META_FILE);
        let text = std::fs::read_to_string(&meta_path)
            .map_err(|e| StoreError::open_failed(&meta_path, e.to_string()))?;
        let meta: MolIndexMeta = serde_json::from_str(&text)
            .map_err(|e| StoreError::open_failed(&meta_path, format!("invalid metadata: {}", e)))?;
        if meta.version != MOL_INDEX_VERSION {
            return Err(StoreError::open_failed(
                &meta_path,
                format!("unsupported index version {}", meta.version),
            ));
        }

        let offsets_path = dir.join(OFFSETS_FILE);
        let bytes = std::fs::read(&offsets_path)
            .map_err(|e| StoreError::open_failed(&offsets_path, e.to_string()))?;
        if bytes.len() % RANGE_BYTES != 0 {
            return Err(StoreError::open_failed(
                &offsets_path,
                format!("{} bytes is not a whole number of ranges", bytes.len()),
            ));
        }
        let ranges: Vec<(u64, u64)> = bytes
            .chunks_exact(RANGE_BYTES)
            .map(|chunk| {
                let (start, end) = chunk.split_at(8);
                (
                    u64::from_le_bytes(start.try_into().unwrap_or_default()),
                    u64::from_le_bytes(end.try_into().unwrap_or_default()),
                )
            })
            .collect();

        let source_path = if meta.source.is_absolute() {
            meta.source.clone()
        } else {
            dir.join(&meta.source)
        };
        let file = File::open(&source_path)
            .map_err(|e| StoreError::open_failed(&source_path, e.to_string()))?;
        let source_len = file
            .metadata()
            .map_err(|e| StoreError::open_failed(&source_path, e.to_string()))?
            .len();
        if let Some(&(start, end)) = ranges.iter().find(|(s, e)| s > e || *e > source_len) {
            return Err(StoreError::open_failed(
                &source_path,
                format!(
                    "record range {}..{} exceeds source of {} bytes",
                    start, end, source_len
                ),
            ));
        }
        let source = if source_len == 0 {
            None
        } else {
            // SAFETY: the source file is an immutable build input.
            let mmap = unsafe { Mmap::map(&file) }
                .map_err(|e| StoreError::open_failed(&source_path, e.to_string()))?;
            Some(mmap)
        };

        debug!(
            "Opened mol index at '{}': {} records from '{}'",
            dir.display(),
            ranges.len(),
            source_path.display()
        );

        Ok(Self {
            dir,
            meta,
            source_path,
            ranges,
            source,
            closed: false,
        })
    }

    /// Index directory.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Resolved path of the indexed source file.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Persisted metadata.
    pub fn meta(&self) -> &MolIndexMeta {
        &self.meta
    }

    fn record_line(&self, ordinal: usize) -> StoreResult<&str> {
        if self.closed {
            return Err(StoreError::Closed { handle: "mol index" });
        }
        let &(start, end) = self.ranges.get(ordinal).ok_or(StoreError::OutOfRange {
            ordinal,
            len: self.ranges.len(),
        })?;
        let bytes = match &self.source {
            Some(mmap) => &mmap[start as usize..end as usize],
            None => &[][..],
        };
        let line = std::str::from_utf8(bytes).map_err(|e| {
            StoreError::corruption(format!("mol index record {}", ordinal), e.to_string())
        })?;
        Ok(line.trim_end_matches(['\r', '\n']))
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self.meta.options.delimiter {
            ' ' => line.split_ascii_whitespace().collect(),
            delim => line.split(delim).map(str::trim).collect(),
        }
    }
}

impl OrdinalIndex for MolIndex {
    fn len(&self) -> usize {
        self.ranges.len()
    }

    fn get(&self, ordinal: usize) -> StoreResult<SourceRecord> {
        let line = self.record_line(ordinal)?;
        let fields = self.split(line);
        let options = &self.meta.options;

        let moldata = fields
            .get(options.smiles_column)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| {
                StoreError::corruption(
                    format!("mol index record {}", ordinal),
                    format!("missing molecule field {}", options.smiles_column),
                )
            })?;
        let name = match options.name_column {
            Some(column) => Some(fields.get(column).map(|f| f.to_string()).ok_or_else(|| {
                StoreError::corruption(
                    format!("mol index record {}", ordinal),
                    format!("missing name field {}", column),
                )
            })?),
            None => None,
        };

        Ok(SourceRecord::new(*moldata, name))
    }

    fn has_names(&self) -> bool {
        self.meta.options.name_column.is_some()
    }

    fn names(&self) -> StoreResult<Vec<(usize, String)>> {
        if !self.has_names() {
            return Err(StoreError::unavailable(
                "name lookup",
                format!("'{}' records no name column", self.dir.display()),
            ));
        }
        (0..self.len())
            .map(|ordinal| {
                let record = self.get(ordinal)?;
                let name = record.name.ok_or_else(|| {
                    StoreError::unavailable("name lookup", format!("record {} has no name", ordinal))
                })?;
                Ok((ordinal, name))
            })
            .collect()
    }

    fn close(&mut self) -> StoreResult<()> {
        if !self.closed {
            self.source = None;
            self.closed = true;
            debug!("Closed mol index at '{}'", self.dir.display());
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

//! Secondary lookups: exact name and content key.
//!
//! # Name lookup
//!
//! With a persistent name index the value stored under the name is decoded as
//! an ordinal. Without one, every record name is loaded from the mol index
//! into an in-memory map the first time a name is looked up. The map lives in
//! a `OnceLock`, so concurrent first lookups block on a single scan and a
//! failed scan is remembered rather than retried.
//!
//! # Content-key lookup
//!
//! Content keys (InChIKeys) may collide, so the stored value is a set of
//! ordinals. No in-memory fallback exists; without a persistent index every
//! lookup fails with `FeatureUnavailable`.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, error, warn};

use crate::codec;
use crate::error::{StoreError, StoreResult};

use super::slot::IndexSlot;
use super::DescriptorStore;

pub(crate) const NAME_INDEX: &str = "name index";
pub(crate) const INCHIKEY_INDEX: &str = "inchikey index";

/// Outcome of the one-time name scan.
pub(crate) enum NameFallback {
    Ready(HashMap<String, usize>),
    Unavailable(String),
}

impl DescriptorStore {
    /// Ordinal of the record with the given display name.
    ///
    /// # Errors
    /// - `StoreError::NotFound` - no record has this name
    /// - `StoreError::FeatureUnavailable` - no name index and names not recorded in the source
    /// - `StoreError::DataCorruption` - stored ordinal is malformed or out of range
    pub fn lookup_name(&self, name: &str) -> StoreResult<usize> {
        self.ensure_open()?;
        let not_found = || StoreError::NotFound {
            index: NAME_INDEX,
            key: name.to_string(),
        };

        let ordinal = match &self.name {
            IndexSlot::Ready(handle) => {
                let raw = handle.get(name.as_bytes())?.ok_or_else(not_found)?;
                codec::decode_ordinal(&format!("{} key {:?}", NAME_INDEX, name), &raw)?
            }
            _ => match self.name_fallback() {
                NameFallback::Ready(names) => *names.get(name).ok_or_else(not_found)?,
                NameFallback::Unavailable(reason) => {
                    return Err(StoreError::unavailable(NAME_INDEX, reason.clone()))
                }
            },
        };

        codec::check_bounds(&format!("{} key {:?}", NAME_INDEX, name), ordinal, self.len())
    }

    /// Every ordinal whose record has the given content key.
    ///
    /// # Errors
    /// - `StoreError::FeatureUnavailable` - no content-key index is open
    /// - `StoreError::NotFound` - the key is absent
    /// - `StoreError::DataCorruption` - the stored set is malformed or holds out-of-range ordinals
    pub fn lookup_inchikey(&self, key: &str) -> StoreResult<BTreeSet<usize>> {
        self.ensure_open()?;
        let handle = match &self.inchikey {
            IndexSlot::Ready(handle) => handle,
            slot => return Err(StoreError::unavailable(INCHIKEY_INDEX, slot.reason())),
        };

        let raw = handle
            .get(key.as_bytes())?
            .ok_or_else(|| StoreError::NotFound {
                index: INCHIKEY_INDEX,
                key: key.to_string(),
            })?;

        let location = format!("{} key {:?}", INCHIKEY_INDEX, key);
        let ordinals = codec::decode_ordinal_set(&location, &raw)?;
        for &ordinal in &ordinals {
            codec::check_bounds(&location, ordinal, self.len())?;
        }
        Ok(ordinals)
    }

    fn name_fallback(&self) -> &NameFallback {
        self.name_fallback.get_or_init(|| self.build_name_fallback())
    }

    fn build_name_fallback(&self) -> NameFallback {
        warn!(
            "{} not available ({}); loading names from the mol index",
            NAME_INDEX,
            self.name.reason()
        );
        match self.index.names() {
            Ok(pairs) => {
                let total = pairs.len();
                let names: HashMap<String, usize> = pairs
                    .into_iter()
                    .map(|(ordinal, name)| (name, ordinal))
                    .collect();
                if names.len() != total {
                    // later ordinals overwrite earlier ones
                    warn!(
                        "{} duplicate names in mol index; last occurrence wins",
                        total - names.len()
                    );
                }
                warn!("...done loading {} names", names.len());
                debug!("In-memory name map holds {} entries", names.len());
                NameFallback::Ready(names)
            }
            Err(e) => {
                error!("Names not available from original input: {}", e);
                NameFallback::Unavailable(e.to_string())
            }
        }
    }
}

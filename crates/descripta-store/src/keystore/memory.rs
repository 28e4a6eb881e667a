//! In-memory key store.

use std::collections::HashMap;

use crate::error::{StoreError, StoreResult};

use super::KeyStore;

/// `HashMap`-backed [`KeyStore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryKeyStore {
    entries: HashMap<Vec<u8>, Vec<u8>>,
    closed: bool,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry. Last write wins.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryKeyStore
where
    K: Into<Vec<u8>>,
    V: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (key, value) in iter {
            store.insert(key, value);
        }
        store
    }
}

impl KeyStore for MemoryKeyStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        if self.closed {
            return Err(StoreError::Closed {
                handle: "memory key store",
            });
        }
        Ok(self.entries.get(key).cloned())
    }

    fn close(&mut self) -> StoreResult<()> {
        self.entries.clear();
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

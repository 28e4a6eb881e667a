//! Sequential iteration in ordinal order.
//!
//! Both iterators are lazy and forward-only; call `iter()` again to restart.
//! A failed fetch yields one `IterationFailed` naming the ordinal, after which
//! the iterator is exhausted. `None` always means the end was reached.

use tracing::error;

use crate::error::{StoreError, StoreResult};
use crate::index::SourceRecord;
use crate::value::Value;

use super::DescriptorStore;

/// Shared cursor: ordinal position plus the fused-on-error flag.
struct Cursor {
    next: usize,
    len: usize,
    failed: bool,
}

impl Cursor {
    fn new(len: usize) -> Self {
        Self {
            next: 0,
            len,
            failed: false,
        }
    }

    fn advance<T>(&mut self, fetch: impl FnOnce(usize) -> StoreResult<T>) -> Option<StoreResult<T>> {
        if self.failed || self.next >= self.len {
            return None;
        }
        let ordinal = self.next;
        match fetch(ordinal) {
            Ok(item) => {
                self.next += 1;
                Some(Ok(item))
            }
            Err(e) => {
                error!("Store iteration failed at ordinal {}: {}", ordinal, e);
                self.failed = true;
                Some(Err(StoreError::IterationFailed {
                    ordinal,
                    source: Box::new(e),
                }))
            }
        }
    }

    fn remaining(&self) -> usize {
        if self.failed {
            0
        } else {
            self.len.saturating_sub(self.next)
        }
    }
}

/// Yields `(source record, data-column descriptors)` for ordinals `0..len`.
pub struct StoreIter<'a> {
    store: &'a DescriptorStore,
    cursor: Cursor,
}

impl<'a> StoreIter<'a> {
    pub(crate) fn new(store: &'a DescriptorStore) -> Self {
        Self {
            store,
            cursor: Cursor::new(store.len()),
        }
    }

    /// Ordinal the next item will come from.
    pub fn position(&self) -> usize {
        self.cursor.next
    }
}

impl Iterator for StoreIter<'_> {
    type Item = StoreResult<(SourceRecord, Vec<Value>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        self.cursor.advance(|ordinal| {
            store.ensure_open()?;
            let record = store.index.get(ordinal)?;
            let descriptors = store.get_descriptors(ordinal, false)?;
            Ok((record, descriptors))
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.cursor.remaining()))
    }
}

/// Yields data-column descriptors only, for ordinals `0..len`.
pub struct DescriptorRows<'a> {
    store: &'a DescriptorStore,
    cursor: Cursor,
}

impl<'a> DescriptorRows<'a> {
    pub(crate) fn new(store: &'a DescriptorStore) -> Self {
        Self {
            store,
            cursor: Cursor::new(store.len()),
        }
    }
}

impl Iterator for DescriptorRows<'_> {
    type Item = StoreResult<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        self.cursor
            .advance(|ordinal| store.get_descriptors(ordinal, false))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.cursor.remaining()))
    }
}

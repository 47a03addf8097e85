//! Traversal of chains: per-bin iteration, a mutable per-bin cursor, and
//! whole-table iteration in bin order.

use crate::chains::{Chains, Entry};
use slotmap::{DefaultKey, SlotMap};

/// Records of one bin, head first.
pub struct Chain<'a, T> {
    slots: &'a SlotMap<DefaultKey, Entry<T>>,
    next: Option<DefaultKey>,
}

impl<'a, T> Chain<'a, T> {
    pub(crate) fn new(slots: &'a SlotMap<DefaultKey, Entry<T>>, head: DefaultKey) -> Self {
        Self {
            slots,
            next: Some(head),
        }
    }

    /// Like the iterator, but yields each record with its cached hash.
    pub fn with_hashes(self) -> impl Iterator<Item = (u64, &'a T)> {
        let slots = self.slots;
        let mut next = self.next;
        core::iter::from_fn(move || {
            let e = &slots[next?];
            next = e.next;
            Some((e.hash, &e.record))
        })
    }
}

impl<'a, T> Iterator for Chain<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        let e = &self.slots[self.next?];
        self.next = e.next;
        Some(&e.record)
    }
}

impl<T> Clone for Chain<'_, T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            next: self.next,
        }
    }
}

/// Read/write cursor over one bin's chain.
///
/// Mutating the fields a record was hashed over does not move it: the entry
/// keeps the hash computed when it was added, and lookups use that.
pub struct ChainCursorMut<'a, T> {
    slots: &'a mut SlotMap<DefaultKey, Entry<T>>,
    current: Option<DefaultKey>,
}

impl<'a, T> ChainCursorMut<'a, T> {
    pub(crate) fn new(slots: &'a mut SlotMap<DefaultKey, Entry<T>>, head: DefaultKey) -> Self {
        Self {
            slots,
            current: Some(head),
        }
    }

    /// Record under the cursor; `None` once the cursor has run off the tail.
    pub fn record(&self) -> Option<&T> {
        self.current.map(|k| &self.slots[k].record)
    }

    pub fn record_mut(&mut self) -> Option<&mut T> {
        let k = self.current?;
        Some(&mut self.slots[k].record)
    }

    /// Cached hash-identity of the record under the cursor.
    pub fn hash(&self) -> Option<u64> {
        self.current.map(|k| self.slots[k].hash)
    }

    /// Step to the successor. Returns false when there is none.
    pub fn move_next(&mut self) -> bool {
        self.current = self.current.and_then(|k| self.slots[k].next);
        self.current.is_some()
    }
}

/// Every record in the table, bin by bin, chain order within a bin.
pub struct Iter<'a, T> {
    chains: &'a Chains<T>,
    bin: usize,
    next: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(chains: &'a Chains<T>) -> Self {
        Self {
            chains,
            bin: 0,
            next: None,
            remaining: chains.len(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if let Some(k) = self.next {
                let e = &self.chains.slots[k];
                self.next = e.next;
                self.remaining -= 1;
                return Some(&e.record);
            }
            let head = *self.chains.bins.get(self.bin)?;
            self.bin += 1;
            self.next = head;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

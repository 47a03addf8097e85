//! Chains: the structural layer under `ChainTable`.
//!
//! Records live in a generational arena (`SlotMap`). A bin holds the key of
//! its chain head or nothing; each entry holds the key of its successor or
//! nothing. Splicing an entry out of a chain is a key rewrite on its
//! predecessor (or on the bin), so records themselves never move, not even
//! during a rehash.
//!
//! Every entry caches the hash computed when it was added. Placement and
//! duplicate checks only ever read the cached value; the hashing strategy
//! runs once per incoming record or probe, never per stored entry.

use log::trace;
use slotmap::{DefaultKey, SlotMap};

/// A bin: the key of its chain head, or `None` when empty.
pub(crate) type Bin = Option<DefaultKey>;

#[derive(Debug)]
pub(crate) struct Entry<T> {
    pub(crate) record: T,
    pub(crate) hash: u64,
    pub(crate) next: Option<DefaultKey>,
}

/// Outcome of a successful push.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Pushed {
    pub(crate) bin: usize,
    pub(crate) chain_len: usize,
}

pub(crate) struct Chains<T> {
    pub(crate) bins: Vec<Bin>,
    pub(crate) slots: SlotMap<DefaultKey, Entry<T>>,
}

impl<T> Chains<T> {
    pub(crate) fn new(bins: usize) -> Self {
        debug_assert!(bins > 0);
        Self {
            bins: vec![None; bins],
            slots: SlotMap::with_key(),
        }
    }

    #[inline]
    pub(crate) fn bin_of(&self, hash: u64) -> usize {
        (hash % self.bins.len() as u64) as usize
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub(crate) fn load_factor(&self) -> f64 {
        self.slots.len() as f64 / self.bins.len() as f64
    }

    /// Key of the entry whose cached hash equals `hash`.
    pub(crate) fn find(&self, hash: u64) -> Option<DefaultKey> {
        let mut cur = self.bins[self.bin_of(hash)];
        while let Some(k) = cur {
            let e = &self.slots[k];
            if e.hash == hash {
                return Some(k);
            }
            cur = e.next;
        }
        None
    }

    /// Append `record` at the tail of its bin's chain. A record whose hash is
    /// already present is handed back untouched.
    pub(crate) fn push(&mut self, record: T, hash: u64) -> Result<Pushed, T> {
        let bin = self.bin_of(hash);
        let mut tail = None;
        let mut chain_len = 0;
        let mut cur = self.bins[bin];
        while let Some(k) = cur {
            let e = &self.slots[k];
            if e.hash == hash {
                return Err(record);
            }
            chain_len += 1;
            tail = Some(k);
            cur = e.next;
        }

        let k = self.slots.insert(Entry {
            record,
            hash,
            next: None,
        });
        match tail {
            Some(t) => self.slots[t].next = Some(k),
            None => self.bins[bin] = Some(k),
        }
        Ok(Pushed {
            bin,
            chain_len: chain_len + 1,
        })
    }

    /// Splice out the entry with `hash` and return its record.
    pub(crate) fn unlink(&mut self, hash: u64) -> Option<T> {
        let bin = self.bin_of(hash);
        let mut prev: Option<DefaultKey> = None;
        let mut cur = self.bins[bin];
        while let Some(k) = cur {
            let e = &self.slots[k];
            if e.hash == hash {
                let next = e.next;
                match prev {
                    Some(p) => self.slots[p].next = next,
                    None => self.bins[bin] = next,
                }
                return self.slots.remove(k).map(|e| e.record);
            }
            prev = cur;
            cur = e.next;
        }
        None
    }

    /// Redistribute every entry over `new_bins` bins in one pass. Entries keep
    /// their relative order within a chain; no record is dropped or moved.
    pub(crate) fn rehash(&mut self, new_bins: usize) {
        debug_assert!(new_bins > 0);
        let mut bins: Vec<Bin> = vec![None; new_bins];
        let mut tails: Vec<Bin> = vec![None; new_bins];

        for head in core::mem::take(&mut self.bins) {
            let mut cur = head;
            while let Some(k) = cur {
                let e = &mut self.slots[k];
                cur = e.next.take();
                let nb = (e.hash % new_bins as u64) as usize;
                match tails[nb] {
                    Some(t) => self.slots[t].next = Some(k),
                    None => bins[nb] = Some(k),
                }
                tails[nb] = Some(k);
            }
        }
        self.bins = bins;
    }

    /// Rehash into `max(2, ceil(bins * factor))` bins. Returns the new count.
    pub(crate) fn grow(&mut self, factor: f64) -> usize {
        let old = self.bins.len();
        let new = grown_bin_count(old, factor);
        trace!(
            "rehashing {} entries from {} to {} bins",
            self.slots.len(),
            old,
            new
        );
        self.rehash(new);
        new
    }

    /// Drop every record and start over with `bins` empty bins.
    ///
    /// The arena is detached before any record is dropped, so a panicking
    /// `Drop` leaves an empty, consistent table behind.
    pub(crate) fn reset(&mut self, bins: usize) {
        debug_assert!(bins > 0);
        let old = core::mem::take(&mut self.slots);
        self.bins.clear();
        self.bins.resize(bins, None);
        drop(old);
    }

    /// Chain length of `bin`, by traversal.
    pub(crate) fn chain_len(&self, bin: usize) -> usize {
        let mut n = 0;
        let mut cur = self.bins[bin];
        while let Some(k) = cur {
            n += 1;
            cur = self.slots[k].next;
        }
        n
    }

    /// Entry count by walking every chain.
    pub(crate) fn recount(&self) -> usize {
        (0..self.bins.len()).map(|b| self.chain_len(b)).sum()
    }
}

// Relative slack taken off `bins * factor` before rounding up. Decimal
// factors are inexact in binary (50.0 * 1.1 == 55.000000000000007), and
// without it such products would round up one bin too far.
const CEIL_SLACK: f64 = 1e-12;

pub(crate) fn grown_bin_count(old: usize, factor: f64) -> usize {
    let scaled = (old as f64 * factor * (1.0 - CEIL_SLACK)).ceil();
    let new = if scaled >= usize::MAX as f64 {
        usize::MAX
    } else {
        scaled as usize
    };
    new.max(old.saturating_add(1)).max(2)
}

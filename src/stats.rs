//! Occupancy statistics, gathered in a single pass over the bins.

use crate::chains::{Bin, Chains};
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStats {
    /// Live records (cached count).
    pub entries: usize,
    pub bins: usize,
    /// Bins holding at least one record.
    pub occupied_bins: usize,
    pub longest_chain: usize,
    pub load_factor: f64,
    /// Bytes used by the bin array itself.
    pub mem_size: usize,
}

impl TableStats {
    pub(crate) fn collect<T>(chains: &Chains<T>) -> Self {
        let mut occupied_bins = 0;
        let mut longest_chain = 0;
        for bin in 0..chains.bin_count() {
            let len = chains.chain_len(bin);
            if len > 0 {
                occupied_bins += 1;
                longest_chain = longest_chain.max(len);
            }
        }
        Self {
            entries: chains.len(),
            bins: chains.bin_count(),
            occupied_bins,
            longest_chain,
            load_factor: chains.load_factor(),
            mem_size: bin_array_bytes(chains.bin_count()),
        }
    }

    /// Mean chain length over occupied bins; 0 for an empty table.
    pub fn mean_chain(&self) -> f64 {
        if self.occupied_bins == 0 {
            0.0
        } else {
            self.entries as f64 / self.occupied_bins as f64
        }
    }
}

impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entries={} bins={} occupied={} longest_chain={} load={:.3} mem={}B",
            self.entries,
            self.bins,
            self.occupied_bins,
            self.longest_chain,
            self.load_factor,
            self.mem_size
        )
    }
}

pub(crate) fn bin_array_bytes(bins: usize) -> usize {
    bins * core::mem::size_of::<Bin>()
}

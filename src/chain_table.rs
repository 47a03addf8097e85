//! ChainTable: owning, open-chaining table keyed by hash-identity.

use crate::chains::{Chains, Pushed};
use crate::config::{check_growth_factor, ConfigError, TableConfig};
use crate::cursor::{Chain, ChainCursorMut, Iter};
use crate::record_hash::{Djb2Build, RecordHasher};
use crate::reentrancy::OpTracker;
use crate::stats::{bin_array_bytes, TableStats};
use core::fmt;
use log::{debug, trace};
use thiserror::Error;

/// A rejected `add`. The record is handed back to the caller unchanged.
#[derive(Error)]
pub enum InsertError<T> {
    #[error("a record with hash {hash:#x} is already present")]
    DuplicateHash { hash: u64, record: T },
}

impl<T> InsertError<T> {
    /// Take back the record that was not inserted.
    pub fn into_record(self) -> T {
        match self {
            InsertError::DuplicateHash { record, .. } => record,
        }
    }

    pub fn hash(&self) -> u64 {
        match self {
            InsertError::DuplicateHash { hash, .. } => *hash,
        }
    }
}

// Records need not be Debug.
impl<T> fmt::Debug for InsertError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::DuplicateHash { hash, .. } => f
                .debug_struct("DuplicateHash")
                .field("hash", hash)
                .finish_non_exhaustive(),
        }
    }
}

/// Open-chaining hash table that owns its records.
///
/// Two records are the same entry iff the table's [`RecordHasher`] gives
/// them the same hash. Records move in through [`add`](Self::add) and out
/// through [`remove`](Self::remove); anything still inside is dropped with
/// the table or by [`clear`](Self::clear).
pub struct ChainTable<T, H = Djb2Build> {
    hasher: H,
    chains: Chains<T>,
    config: TableConfig,
    ops: OpTracker,
}

impl<T> ChainTable<T>
where
    Djb2Build: RecordHasher<T>,
{
    pub fn new() -> Self {
        Self::with_hasher(Djb2Build)
    }

    pub fn with_config(config: TableConfig) -> Result<Self, ConfigError> {
        Self::with_config_and_hasher(config, Djb2Build)
    }
}

impl<T> Default for ChainTable<T>
where
    Djb2Build: RecordHasher<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, H> ChainTable<T, H>
where
    H: RecordHasher<T>,
{
    pub fn with_hasher(hasher: H) -> Self {
        let config = TableConfig::default();
        Self {
            hasher,
            chains: Chains::new(config.initial_bins),
            config,
            ops: OpTracker::new(),
        }
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: H) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            hasher,
            chains: Chains::new(config.initial_bins),
            config,
            ops: OpTracker::new(),
        })
    }

    /// Hash-identity of `record` under this table's strategy.
    pub fn hash_of(&self, record: &T) -> u64 {
        let _op = self.ops.begin("hash_of");
        self.hasher.hash_record(record)
    }

    /// Live record count, O(1).
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.len() == 0
    }

    /// Live record count by walking every chain. Always equals `len()`.
    pub fn recount(&self) -> usize {
        let _op = self.ops.begin("recount");
        self.chains.recount()
    }

    pub fn bins(&self) -> usize {
        self.chains.bin_count()
    }

    /// `len() / bins()`.
    pub fn load_factor(&self) -> f64 {
        self.chains.load_factor()
    }

    /// Bytes taken by the bin array (`bins() * per-bin footprint`).
    pub fn mem_size(&self) -> usize {
        bin_array_bytes(self.chains.bin_count())
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// True if a record with the same hash-identity as `probe` is present.
    ///
    /// `probe` only needs the fields the hasher reads to be filled in.
    pub fn has(&self, probe: &T) -> bool {
        let _op = self.ops.begin("has");
        let hash = self.hasher.hash_record(probe);
        self.chains.find(hash).is_some()
    }

    /// The stored record sharing `probe`'s hash-identity.
    pub fn get(&self, probe: &T) -> Option<&T> {
        let _op = self.ops.begin("get");
        let hash = self.hasher.hash_record(probe);
        let k = self.chains.find(hash)?;
        Some(&self.chains.slots[k].record)
    }

    /// Insert `record`, taking ownership of it.
    ///
    /// Fails with [`InsertError::DuplicateHash`] if an entry with the same
    /// hash-identity is present; the table is then unchanged and the record
    /// comes back inside the error. A successful add may grow the table,
    /// possibly several times, until `len() / bins()` is at or below the
    /// configured maximum load factor.
    pub fn add(&mut self, record: T) -> Result<(), InsertError<T>> {
        let _op = self.ops.begin("add");
        let hash = self.hasher.hash_record(&record);
        let Pushed { bin, chain_len } = match self.chains.push(record, hash) {
            Ok(p) => p,
            Err(record) => {
                trace!("rejected duplicate hash {hash:#x} in bin {}", self.chains.bin_of(hash));
                return Err(InsertError::DuplicateHash { hash, record });
            }
        };
        trace!("added hash {hash:#x} to bin {bin} (chain length {chain_len})");

        Self::grow_chains_after_add(&mut self.chains, &self.config, chain_len);
        Ok(())
    }

    /// Growth policy run after every accepted add. Returns the number of
    /// rehash steps taken.
    fn grow_after_add(&mut self, chain_len: usize) -> usize {
        Self::grow_chains_after_add(&mut self.chains, &self.config, chain_len)
    }

    /// Body of [`grow_after_add`](Self::grow_after_add), borrowing only the
    /// fields it needs so `add` can run it while its op section is open.
    fn grow_chains_after_add(chains: &mut Chains<T>, cfg: &TableConfig, chain_len: usize) -> usize {
        let load_before = chains.load_factor();
        if load_before <= cfg.max_load_factor && chain_len <= cfg.max_chain_len {
            return 0;
        }
        let bins_before = chains.bin_count();
        chains.grow(cfg.growth_factor);
        let mut steps = 1;
        while chains.load_factor() > cfg.max_load_factor {
            chains.grow(cfg.growth_factor);
            steps += 1;
        }
        debug!(
            "grew {} -> {} bins in {} step(s); before growth: load {:.3} (max {}), chain length {} (max {})",
            bins_before,
            chains.bin_count(),
            steps,
            load_before,
            cfg.max_load_factor,
            chain_len,
            cfg.max_chain_len
        );
        steps
    }

    /// Remove the entry sharing `probe`'s hash-identity and hand its record
    /// back. Dropping the returned record destroys it.
    pub fn remove(&mut self, probe: &T) -> Option<T> {
        let _op = self.ops.begin("remove");
        let hash = self.hasher.hash_record(probe);
        self.chains.unlink(hash)
    }

    /// Drop every record and return to `config().initial_bins` empty bins.
    /// Capacity does not survive a clear.
    pub fn clear(&mut self) {
        let _op = self.ops.begin("clear");
        debug!(
            "clearing {} entries, bins {} -> {}",
            self.chains.len(),
            self.chains.bin_count(),
            self.config.initial_bins
        );
        self.chains.reset(self.config.initial_bins);
    }

    /// Rehash into `max(2, ceil(bins() * factor))` bins in one pass.
    ///
    /// Factors below [`MIN_GROWTH_FACTOR`](crate::config::MIN_GROWTH_FACTOR)
    /// are refused, since they cannot bring the load factor down.
    pub fn grow(&mut self, factor: f64) -> Result<(), ConfigError> {
        let _op = self.ops.begin("grow");
        check_growth_factor(factor)?;
        let old = self.chains.bin_count();
        let new = self.chains.grow(factor);
        debug!("grew {old} -> {new} bins by factor {factor}");
        Ok(())
    }

    /// Chain of bin `index`, head first. `None` for an empty bin or an index
    /// past `bins()`.
    pub fn bin(&self, index: usize) -> Option<Chain<'_, T>> {
        let head = (*self.chains.bins.get(index)?)?;
        Some(Chain::new(&self.chains.slots, head))
    }

    /// Mutable cursor at the head of bin `index`. `None` as for [`bin`](Self::bin).
    pub fn bin_mut(&mut self, index: usize) -> Option<ChainCursorMut<'_, T>> {
        let head = (*self.chains.bins.get(index)?)?;
        Some(ChainCursorMut::new(&mut self.chains.slots, head))
    }

    /// Every record, bin by bin.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.chains)
    }

    pub fn stats(&self) -> TableStats {
        let _op = self.ops.begin("stats");
        TableStats::collect(&self.chains)
    }
}

impl<'a, T, H> IntoIterator for &'a ChainTable<T, H>
where
    H: RecordHasher<T>,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, H> fmt::Debug for ChainTable<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainTable")
            .field("entries", &self.chains.len())
            .field("bins", &self.chains.bin_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

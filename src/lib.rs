//! chain-table: a single-threaded, open-chaining hash table that owns its
//! records and keys them by a pluggable hash over chosen byte ranges.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small table whose identity rule is explicit. Two records are
//!   the same entry iff the table's hashing strategy gives them the same
//!   `u64`; there is no separate key type and no `Eq` check.
//! - Layers:
//!   - `record_hash`: the [`RecordHasher`] strategy trait, the DJB2 rolling
//!     hash, and [`ByteRanges`] for hashing selected fields of a record.
//!   - `chains`: bins over a generational arena. A bin is the key of its
//!     chain head; entries link to their successor by key.
//!   - [`ChainTable`]: public API. Owns the hasher, the chains and the
//!     growth policy ([`TableConfig`]).
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` via the operation tracker's marker.
//! - Unique hash-identity: `add` on a present hash fails and returns the
//!   record to the caller; the table is unchanged.
//! - Ownership: `add` moves a record in, `remove` moves it back out, `clear`
//!   and `Drop` destroy whatever is still inside. Each record is dropped
//!   exactly once.
//! - Growth: after a successful add, if `len / bins` exceeds the maximum
//!   load factor or the landing chain is longer than `max_chain_len`, the
//!   table rehashes into `max(2, ceil(bins * growth_factor))` bins, repeating
//!   until the load factor is back under the limit.
//!
//! Hashing and rehashing invariants
//! - Each entry stores the hash computed when it was added. Lookups,
//!   duplicate checks and rehashing compare and place by the stored hash,
//!   so the strategy never runs on stored records.
//! - A rehash relinks keys only. Records stay in their arena slots.
//! - Records leave the chains before they are dropped (`remove` unlinks,
//!   `clear` detaches the whole arena first), so a panicking `Drop` never
//!   leaves bins pointing at freed slots.
//!
//! Reentrancy
//! - Public operations open a debug-only section before touching the
//!   chains. The strategy is the only user code run inside one; a strategy
//!   that calls back into the same table panics in debug builds, so a
//!   rehash is never observed half done.
//!
//! Notes and non-goals
//! - No concurrent access, no persistence, no cryptographic guarantees from
//!   DJB2.
//! - Mutating hashed fields through [`ChainTable::bin_mut`] does not change a
//!   record's identity; the stored hash wins.
//! - Allocation failure aborts, as for any `Vec`/`SlotMap` growth.

mod chain_table;
mod chains;
#[cfg(test)]
mod chain_table_proptest;
pub mod config;
mod cursor;
pub mod record_hash;
mod reentrancy;
mod stats;

// Public surface
pub use chain_table::{ChainTable, InsertError};
pub use config::{ConfigError, TableConfig};
pub use cursor::{Chain, ChainCursorMut, Iter};
pub use record_hash::{ByteRanges, Djb2, Djb2Build, FnHash, RecordHasher};
pub use stats::TableStats;

//! Hashing strategies: how a record's identifying bytes become a `u64`.
//!
//! The table never looks inside a record. Placement (`hash % bins`) and
//! duplicate detection both go through a [`RecordHasher`] chosen when the
//! table is built. Two records with the same hash are the same entry, so a
//! strategy that hashes only an id field makes the id the uniqueness key.

use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};

/// Seed of the DJB2 rolling hash.
pub const DJB2_SEED: u64 = 5381;

/// Strategy object producing the hash-identity of a record.
///
/// Must be deterministic: the same hashed bytes always give the same value.
pub trait RecordHasher<T: ?Sized> {
    fn hash_record(&self, record: &T) -> u64;
}

/// DJB2 rolling hash (`hash = hash * 33 + byte`), byte by byte.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Djb2 {
    hash: u64,
}

impl Djb2 {
    pub const fn new() -> Self {
        Self { hash: DJB2_SEED }
    }

    #[inline]
    pub fn update(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.hash = (self.hash << 5)
                .wrapping_add(self.hash)
                .wrapping_add(u64::from(b));
        }
    }

    pub fn digest(bytes: &[u8]) -> u64 {
        let mut h = Self::new();
        h.update(bytes);
        h.hash
    }
}

impl Default for Djb2 {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Djb2 {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.update(bytes);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }
}

/// Default strategy: runs the record's `Hash` impl through [`Djb2`].
///
/// A record type picks its identifying fields by writing a `Hash` impl that
/// only visits those fields. Integer fields are written as their native-endian
/// bytes, so hashing a lone `i32` id hashes exactly its four raw bytes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Djb2Build;

impl BuildHasher for Djb2Build {
    type Hasher = Djb2;

    fn build_hasher(&self) -> Djb2 {
        Djb2::new()
    }
}

impl<T: ?Sized + Hash> RecordHasher<T> for Djb2Build {
    #[inline]
    fn hash_record(&self, record: &T) -> u64 {
        self.hash_one(record)
    }
}

type Selector<T> = Box<dyn Fn(&T, &mut Djb2)>;

/// Hashes caller-selected byte ranges of a record, in registration order.
///
/// ```
/// use chain_table::ByteRanges;
///
/// struct Student { id: i32, first: [u8; 16], gpa: f32 }
///
/// let by_id_and_name = ByteRanges::new()
///     .field(|s: &Student| s.id.to_ne_bytes())
///     .c_str(|s: &Student| &s.first[..]);
/// # let _ = by_id_and_name;
/// ```
pub struct ByteRanges<T> {
    selectors: Vec<Selector<T>>,
}

impl<T> ByteRanges<T> {
    pub fn new() -> Self {
        Self {
            selectors: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl<T: 'static> ByteRanges<T> {
    /// Include a borrowed byte slice of the record.
    pub fn bytes<F>(mut self, select: F) -> Self
    where
        F: Fn(&T) -> &[u8] + 'static,
    {
        self.selectors
            .push(Box::new(move |rec, h| h.update(select(rec))));
        self
    }

    /// Include a fixed-width field, e.g. `|r| r.id.to_ne_bytes()`.
    pub fn field<F, const N: usize>(mut self, select: F) -> Self
    where
        F: Fn(&T) -> [u8; N] + 'static,
    {
        self.selectors
            .push(Box::new(move |rec, h| h.update(&select(rec))));
        self
    }

    /// Include a NUL-terminated buffer up to (not including) its first NUL.
    /// A buffer without a NUL contributes all of its bytes.
    pub fn c_str<F>(mut self, select: F) -> Self
    where
        F: Fn(&T) -> &[u8] + 'static,
    {
        self.selectors.push(Box::new(move |rec, h| {
            let buf = select(rec);
            let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
            h.update(&buf[..end]);
        }));
        self
    }
}

impl<T> Default for ByteRanges<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ByteRanges<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteRanges")
            .field("ranges", &self.selectors.len())
            .finish()
    }
}

impl<T> RecordHasher<T> for ByteRanges<T> {
    fn hash_record(&self, record: &T) -> u64 {
        let mut h = Djb2::new();
        for select in &self.selectors {
            select(record, &mut h);
        }
        h.finish()
    }
}

/// Adapts a plain function or closure into a [`RecordHasher`].
#[derive(Copy, Clone)]
pub struct FnHash<F>(pub F);

impl<F> fmt::Debug for FnHash<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnHash(..)")
    }
}

impl<T: ?Sized, F> RecordHasher<T> for FnHash<F>
where
    F: Fn(&T) -> u64,
{
    #[inline]
    fn hash_record(&self, record: &T) -> u64 {
        (self.0)(record)
    }
}

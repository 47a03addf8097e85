#![cfg(test)]

// Property tests for ChainTable kept inside the crate so they can check the
// chain structure directly, not only through the public API.

use crate::chain_table::{ChainTable, InsertError};
use crate::config::TableConfig;
use crate::record_hash::{ByteRanges, FnHash};
use hashbrown::HashMap;
use proptest::prelude::*;

#[derive(Clone, Debug, PartialEq)]
struct Rec {
    id: u32,
    payload: i32,
}

// Pool-indexed operations so failing cases shrink toward small ids.
#[derive(Clone, Debug)]
enum Op {
    Add(usize, i32),
    Has(usize),
    Remove(usize),
    Grow(u8),
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<u32>, Vec<Op>)> {
    proptest::collection::vec(any::<u32>(), 1..=24).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Add(i, v)),
            3 => idx.clone().prop_map(Op::Has),
            3 => idx.clone().prop_map(Op::Remove),
            1 => (11u8..=40).prop_map(Op::Grow),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_against_model<H>(
    mut sut: ChainTable<Rec, H>,
    pool: &[u32],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    H: crate::record_hash::RecordHasher<Rec>,
{
    let max_load = sut.config().max_load_factor;
    let initial_bins = sut.config().initial_bins;
    // Model keyed by hash-identity, as the table is.
    let mut model: HashMap<u64, Rec> = HashMap::new();
    let mut accepted = 0usize;
    let mut removed = 0usize;

    for op in ops {
        match op {
            Op::Add(i, v) => {
                let rec = Rec { id: pool[i], payload: v };
                let h = sut.hash_of(&rec);
                let already = model.contains_key(&h);
                let bins_before = sut.bins();
                match sut.add(rec.clone()) {
                    Ok(()) => {
                        prop_assert!(!already, "add must fail on a present hash");
                        model.insert(h, rec.clone());
                        accepted += 1;
                        prop_assert!(sut.has(&rec));
                        prop_assert!(sut.load_factor() <= max_load);
                        prop_assert!(sut.bins() >= bins_before);
                    }
                    Err(InsertError::DuplicateHash { hash, record }) => {
                        prop_assert!(already, "duplicate only when hash is present");
                        prop_assert_eq!(hash, h);
                        prop_assert_eq!(record, rec);
                        prop_assert_eq!(sut.bins(), bins_before);
                    }
                }
            }
            Op::Has(i) => {
                let probe = Rec { id: pool[i], payload: 0 };
                let h = sut.hash_of(&probe);
                prop_assert_eq!(sut.has(&probe), model.contains_key(&h));
                prop_assert_eq!(sut.get(&probe), model.get(&h));
            }
            Op::Remove(i) => {
                let probe = Rec { id: pool[i], payload: 0 };
                let h = sut.hash_of(&probe);
                let got = sut.remove(&probe);
                prop_assert_eq!(got.as_ref(), model.get(&h));
                if model.remove(&h).is_some() {
                    removed += 1;
                }
                prop_assert!(!sut.has(&probe));
            }
            Op::Grow(tenths) => {
                let before = sut.bins();
                sut.grow(f64::from(tenths) / 10.0).expect("factor >= 1.1");
                prop_assert!(sut.bins() > before);
                for r in model.values() {
                    prop_assert!(sut.has(r), "growth lost {:?}", r);
                }
            }
            Op::Clear => {
                sut.clear();
                for r in model.values() {
                    prop_assert!(!sut.has(r));
                }
                removed += model.len();
                model.clear();
                prop_assert_eq!(sut.bins(), initial_bins);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.recount(), sut.len());
        prop_assert_eq!(sut.len(), accepted - removed);
        prop_assert_eq!(sut.iter().count(), sut.len());
        let per_bin: usize = (0..sut.bins())
            .map(|b| sut.bin(b).map_or(0, |c| c.count()))
            .sum();
        prop_assert_eq!(per_bin, sut.len());
        // Every stored record sits in bin `hash % bins`.
        for b in 0..sut.bins() {
            if let Some(chain) = sut.bin(b) {
                for (h, _) in chain.with_hashes() {
                    prop_assert_eq!((h % sut.bins() as u64) as usize, b);
                }
            }
        }
    }
    Ok(())
}

// Property: state-machine equivalence against a map keyed by hash-identity.
// Invariants exercised across random operation sequences:
// - add succeeds iff the hash is absent; a rejected record comes back intact.
// - has/get/remove agree with the model; remove hands back the stored record.
// - len == recount == accepted adds - removals, after every op.
// - every record lives in bin `hash % bins`; growth and clear keep that.
// - the load factor is at or under the limit at the end of every add.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_djb2_id((pool, ops) in arb_scenario()) {
        let sut = ChainTable::with_config_and_hasher(
            TableConfig::new().initial_bins(4),
            ByteRanges::new().field(|r: &Rec| r.id.to_ne_bytes()),
        ).unwrap();
        run_against_model(sut, &pool, ops)?;
    }
}

// Same invariants with the id as the hash itself, so bin collisions are
// common and chains are long enough to exercise head/middle/tail splicing.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_id_collisions((pool, ops) in arb_scenario()) {
        let pool: Vec<u32> = pool.into_iter().map(|x| (x % 8) * 16).collect();
        let sut = ChainTable::with_config_and_hasher(
            TableConfig::new().initial_bins(2).max_load_factor(4.0).max_chain_len(8),
            FnHash(|r: &Rec| u64::from(r.id)),
        ).unwrap();
        run_against_model(sut, &pool, ops)?;
    }
}

// Property: duplicates by identity never grow the table past the number of
// distinct identities, whatever the payloads.
proptest! {
    #[test]
    fn prop_size_bounded_by_distinct_ids(ids in proptest::collection::vec(0u32..64, 0..200)) {
        let mut t = ChainTable::with_hasher(FnHash(|r: &Rec| u64::from(r.id)));
        let mut ok = 0usize;
        for (n, id) in ids.iter().enumerate() {
            if t.add(Rec { id: *id, payload: n as i32 }).is_ok() {
                ok += 1;
            }
        }
        let distinct: std::collections::BTreeSet<_> = ids.iter().collect();
        prop_assert_eq!(t.len(), ok);
        prop_assert_eq!(t.len(), distinct.len());
    }
}

//! Property-based tests for report merging and minimization.
//!
//! Uses proptest to verify invariants hold for arbitrary reports.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use std::collections::BTreeSet;
use teapot_report::{
    minimal_antichain, Branch, BranchSequence, CollectedResults, Fault, ReportSnapshot, TypeTag,
    RANGE_GAP,
};

const TAGS: [&str; 4] = [
    "KASPER_MDS 0x1",
    "KASPER_CACHE 0x10",
    "KASPER_PORT 0x20",
    "KASPER_CACHE 0x2",
];

fn sequence() -> impl Strategy<Value = BranchSequence> {
    prop::collection::vec(0u64..8, 1..5)
}

fn fault(address: u64) -> impl Strategy<Value = Fault> {
    (
        prop::collection::btree_set(0u64..512, 0..6),
        prop::collection::btree_set(0u64..64, 0..3),
        prop::collection::btree_set(sequence(), 0..4),
        0usize..5,
        0u64..20,
        any::<bool>(),
        any::<bool>(),
        prop::collection::btree_set(0usize..TAGS.len(), 0..3),
    )
        .prop_map(
            move |(accessed, offsets, sequences, order, count, controlled, controlled_offset, tags)| {
                let mut f = Fault::new(address);
                f.accessed_addresses = accessed;
                f.offsets = offsets;
                f.branch_sequences = sequences;
                f.order = order;
                f.fault_count = count;
                f.controlled = controlled;
                f.controlled_offset = controlled_offset;
                f.types = tags.into_iter().map(|i| TypeTag::from(TAGS[i])).collect();
                f
            },
        )
}

fn branch(address: u64) -> impl Strategy<Value = Branch> {
    (
        prop::collection::btree_set(0u64..8, 0..4),
        0u64..20,
        0u64..100,
    )
        .prop_map(move |(faults, count, nonspec)| {
            let mut b = Branch::new(address);
            b.faults = faults;
            b.fault_count = count;
            b.nonspeculative_execution_count = nonspec;
            b
        })
}

fn report() -> impl Strategy<Value = CollectedResults> {
    (
        prop::collection::btree_set(0u64..8, 0..5),
        prop::collection::btree_set(0u64..8, 0..5),
    )
        .prop_flat_map(|(fault_keys, branch_keys)| {
            let faults: Vec<_> = fault_keys.into_iter().map(fault).collect();
            let branches: Vec<_> = branch_keys.into_iter().map(branch).collect();
            (faults, branches)
        })
        .prop_map(|(faults, branches)| {
            let mut results = CollectedResults::new();
            for f in faults {
                results.faults.insert(f.address, f);
            }
            for b in branches {
                results.branches.insert(b.address, b);
            }
            results
        })
}

fn merged(parts: &[&CollectedResults]) -> CollectedResults {
    let mut total = CollectedResults::new();
    for part in parts {
        total.merge_results(part).unwrap();
    }
    total
}

fn as_set(sequence: &[u64]) -> BTreeSet<u64> {
    sequence.iter().copied().collect()
}

// === Merge Property Tests ===

proptest! {
    /// Merge order does not change faults or branches.
    #[test]
    fn prop_merge_commutes(a in report(), b in report()) {
        let ab = merged(&[&a, &b]);
        let ba = merged(&[&b, &a]);
        prop_assert_eq!(ab.faults, ba.faults);
        prop_assert_eq!(ab.branches, ba.branches);
    }

    /// Grouping does not change faults or branches.
    #[test]
    fn prop_merge_associates(a in report(), b in report(), c in report()) {
        let left = merged(&[&merged(&[&a, &b]), &c]);
        let right = merged(&[&a, &merged(&[&b, &c])]);
        let flat = merged(&[&a, &b, &c]);
        prop_assert_eq!(&left.faults, &right.faults);
        prop_assert_eq!(&left.faults, &flat.faults);
        prop_assert_eq!(&left.branches, &right.branches);
    }

    /// Merging through the persisted form equals merging in memory.
    #[test]
    fn prop_snapshot_merge_matches_memory(a in report(), b in report()) {
        let mut via_snapshot = a.clone();
        via_snapshot.merge(ReportSnapshot::from(&b)).unwrap();
        let in_memory = merged(&[&a, &b]);
        prop_assert_eq!(via_snapshot.faults, in_memory.faults);
        prop_assert_eq!(via_snapshot.branches, in_memory.branches);
    }

    /// Persisted reports load back unchanged.
    #[test]
    fn prop_snapshot_round_trip(mut a in report()) {
        a.collect_statistics();
        let json = serde_json::to_string(&ReportSnapshot::from(&a)).unwrap();
        let snapshot: ReportSnapshot = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(CollectedResults::try_from(snapshot).unwrap(), a);
    }

    /// Once controlled, always controlled.
    #[test]
    fn prop_controlled_is_monotone(a in report(), updates in prop::collection::vec(report(), 1..4)) {
        let mut total = a;
        for update in &updates {
            let before: Vec<(u64, bool, bool)> = total
                .faults
                .values()
                .map(|f| (f.address, f.controlled, f.controlled_offset))
                .collect();
            total.update(update).unwrap();
            total.merge_results(update).unwrap();
            for (address, controlled, controlled_offset) in before {
                let after = &total.faults[&address];
                prop_assert!(!controlled || after.controlled);
                prop_assert!(!controlled_offset || after.controlled_offset);
            }
        }
    }
}

// === Minimization Property Tests ===

proptest! {
    /// No retained sequence is a proper subset of another.
    #[test]
    fn prop_minimized_sequences_form_antichain(
        sequences in prop::collection::btree_set(sequence(), 0..8)
    ) {
        let kept = minimal_antichain(&sequences);
        for a in &kept {
            for b in &kept {
                if a != b {
                    prop_assert!(!as_set(a).is_subset(&as_set(b)), "{:?} within {:?}", a, b);
                }
            }
        }
    }

    /// Every input is either kept (as a set) or covers a kept sequence.
    #[test]
    fn prop_discarded_sequences_cover_a_kept_one(
        sequences in prop::collection::btree_set(sequence(), 0..8)
    ) {
        let kept: Vec<BTreeSet<u64>> = minimal_antichain(&sequences).iter().map(|s| as_set(s)).collect();
        for original in &sequences {
            let original = as_set(original);
            prop_assert!(kept.iter().any(|k| k.is_subset(&original)));
        }
    }

    /// Run endpoints survive, interior points do not, isolated points stay.
    #[test]
    fn prop_range_compression_keeps_endpoints(
        addresses in prop::collection::btree_set(0u64..2048, 0..24)
    ) {
        let mut results = CollectedResults::new();
        results.fault_mut(1).accessed_addresses = addresses.clone();
        results.minimize_accessed_addresses();
        let kept = &results.faults[&1].accessed_addresses;

        let sorted: Vec<u64> = addresses.into_iter().collect();
        for (i, &address) in sorted.iter().enumerate() {
            let near_prev = i > 0 && address - sorted[i - 1] <= RANGE_GAP;
            let near_next = i + 1 < sorted.len() && sorted[i + 1] - address <= RANGE_GAP;
            if near_prev && near_next {
                prop_assert!(!kept.contains(&address), "interior {} kept", address);
            } else {
                prop_assert!(kept.contains(&address), "boundary {} dropped", address);
            }
        }
    }

    /// Order is the shortest sequence length after set_order.
    #[test]
    fn prop_set_order_matches_shortest(sequences in prop::collection::btree_set(sequence(), 1..6)) {
        let mut results = CollectedResults::new();
        results.fault_mut(1).branch_sequences = sequences.clone();
        results.set_order();
        let shortest = sequences.iter().map(Vec::len).min().unwrap();
        prop_assert_eq!(results.faults[&1].order, shortest);
    }
}

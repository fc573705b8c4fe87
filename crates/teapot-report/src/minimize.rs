//! Report minimization.
//!
//! Two independent passes shrink a finished report: branch sequences are
//! reduced to an inclusion-minimal antichain, and dense runs of accessed
//! addresses are collapsed to their endpoints.

use crate::address::Address;
use crate::fault::{min_nonzero, BranchSequence};
use crate::results::CollectedResults;
use std::cmp::Reverse;
use std::collections::BTreeSet;

/// Accessed addresses closer than this belong to the same region
pub const RANGE_GAP: u64 = 64;

impl CollectedResults {
    /// Set every fault's `order` to its shortest branch-sequence length.
    ///
    /// Must run before [`minimize_sequences`](Self::minimize_sequences):
    /// canonicalization discards the duplicate entries that lengths count.
    pub fn set_order(&mut self) {
        for fault in self.faults.values_mut() {
            if let Some(shortest) = fault.shortest_sequence() {
                fault.order = min_nonzero(fault.order, shortest);
            }
        }
    }

    /// Drop every branch sequence that is a superset of another.
    ///
    /// Branch fault lists are cleared afterwards since they may point at
    /// faults only through sequences that no longer exist.
    pub fn minimize_sequences(&mut self) {
        for fault in self.faults.values_mut() {
            fault.branch_sequences = minimal_antichain(&fault.branch_sequences);
        }
        for branch in self.branches.values_mut() {
            branch.faults.clear();
        }
    }

    /// Keep only the boundaries of each dense run of accessed addresses
    pub fn minimize_accessed_addresses(&mut self) {
        for fault in self.faults.values_mut() {
            for interior in interior_points(&fault.accessed_addresses) {
                fault.accessed_addresses.remove(&interior);
            }
        }
    }
}

/// Reduce `sequences` to their inclusion-minimal members, compared as sets.
///
/// Each returned sequence is sorted and duplicate-free.
#[must_use]
pub fn minimal_antichain(sequences: &BTreeSet<BranchSequence>) -> BTreeSet<BranchSequence> {
    let canonical: BTreeSet<BranchSequence> = sequences.iter().map(|s| canonicalize(s)).collect();

    // largest first, so the smallest candidate is always at the end
    let mut remaining: Vec<BranchSequence> = canonical.into_iter().collect();
    remaining.sort_by_key(|s| Reverse(s.len()));

    let mut kept = BTreeSet::new();
    while let Some(top) = remaining.pop() {
        remaining.retain(|other| other.len() == top.len() || !is_subset(&top, other));
        kept.insert(top);
    }
    kept
}

fn canonicalize(sequence: &[Address]) -> BranchSequence {
    let mut set = sequence.to_vec();
    set.sort_unstable();
    set.dedup();
    set
}

/// Subset test over two sorted, duplicate-free slices
fn is_subset(small: &[Address], large: &[Address]) -> bool {
    let mut candidates = large.iter();
    small
        .iter()
        .all(|needle| candidates.by_ref().any(|b| b == needle))
}

/// Addresses strictly inside a run whose consecutive gaps are all <= [`RANGE_GAP`]
fn interior_points(addresses: &BTreeSet<Address>) -> Vec<Address> {
    let sorted: Vec<Address> = addresses.iter().copied().collect();
    let mut interior = Vec::new();
    let mut in_range = false;
    for pair in sorted.windows(2) {
        if pair[1] - pair[0] > RANGE_GAP {
            in_range = false;
        } else if !in_range {
            in_range = true;
        } else {
            interior.push(pair[0]);
        }
    }
    interior
}

//! Aggregate evidence for one fault-causing instruction.

use crate::address::Address;
use crate::result::{ReportError, ReportResult};
use crate::tag::TypeTag;
use std::collections::BTreeSet;

/// Ordered branch addresses implicated in triggering a fault
pub type BranchSequence = Vec<Address>;

/// Everything observed at one fault site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Address of the faulting instruction
    pub address: Address,
    /// Addresses touched during misspeculation
    pub accessed_addresses: BTreeSet<Address>,
    /// Byte offsets, the alternative evidence form
    pub offsets: BTreeSet<u64>,
    /// Branch sequences that lead to the fault
    pub branch_sequences: BTreeSet<BranchSequence>,
    /// Shortest trigger sequence length (0 = unset)
    pub order: usize,
    /// Number of experiments (or summed counts) that observed the fault
    pub fault_count: u64,
    /// Accessed addresses varied between observations
    pub controlled: bool,
    /// Offsets varied between observations
    pub controlled_offset: bool,
    /// Gadget type tags
    pub types: BTreeSet<TypeTag>,
}

impl Fault {
    /// Create an empty record for `address`
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            accessed_addresses: BTreeSet::new(),
            offsets: BTreeSet::new(),
            branch_sequences: BTreeSet::new(),
            order: 0,
            fault_count: 0,
            controlled: false,
            controlled_offset: false,
            types: BTreeSet::new(),
        }
    }

    /// Fold one experiment's observation of this fault into the running total.
    ///
    /// A fault is controlled once two observations report different,
    /// non-empty accessed-address sets (likewise offsets). The count grows
    /// by exactly one per call.
    pub fn update(&mut self, observed: &Self) -> ReportResult<()> {
        self.check_address(observed.address)?;

        if !observed.accessed_addresses.is_empty()
            && !self.accessed_addresses.is_empty()
            && observed.accessed_addresses != self.accessed_addresses
        {
            self.controlled = true;
        }
        if !observed.offsets.is_empty()
            && !self.offsets.is_empty()
            && observed.offsets != self.offsets
        {
            self.controlled_offset = true;
        }

        self.union_evidence(observed);
        self.fault_count = self.fault_count.saturating_add(1);
        Ok(())
    }

    /// Reconcile with a record aggregated by another run.
    ///
    /// Commutative and associative: counts add (saturating at `u64::MAX`),
    /// flags OR, sets union and `order` keeps the smallest non-zero value.
    pub fn merge(&mut self, other: &Self) -> ReportResult<()> {
        self.check_address(other.address)?;

        self.fault_count = self.fault_count.saturating_add(other.fault_count);
        self.order = min_nonzero(self.order, other.order);
        self.controlled |= other.controlled;
        self.controlled_offset |= other.controlled_offset;
        self.union_evidence(other);
        Ok(())
    }

    /// Length of the shortest recorded branch sequence, if any
    #[must_use]
    pub fn shortest_sequence(&self) -> Option<usize> {
        self.branch_sequences.iter().map(Vec::len).min()
    }

    fn union_evidence(&mut self, other: &Self) {
        self.accessed_addresses
            .extend(other.accessed_addresses.iter().copied());
        self.offsets.extend(other.offsets.iter().copied());
        self.branch_sequences
            .extend(other.branch_sequences.iter().cloned());
        self.types.extend(other.types.iter().cloned());
    }

    fn check_address(&self, actual: Address) -> ReportResult<()> {
        if self.address == actual {
            Ok(())
        } else {
            Err(ReportError::AddressMismatch {
                expected: self.address,
                actual,
            })
        }
    }
}

/// Smaller of two orders, where 0 means unknown
pub(crate) fn min_nonzero(a: usize, b: usize) -> usize {
    match (a, b) {
        (0, other) | (other, 0) => other,
        (a, b) => a.min(b),
    }
}

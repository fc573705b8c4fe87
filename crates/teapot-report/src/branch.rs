//! Aggregate evidence for one mispredicted branch.

use crate::address::Address;
use crate::result::{ReportError, ReportResult};
use std::collections::BTreeSet;

/// A branch whose misprediction was implicated in one or more faults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Address of the branch instruction
    pub address: Address,
    /// Faults reached through this branch
    pub faults: BTreeSet<Address>,
    /// Number of experiments (or summed counts) implicating the branch
    pub fault_count: u64,
    /// Only carried through cross-report merges
    pub nonspeculative_execution_count: u64,
}

impl Branch {
    /// Create an empty record for `address`
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            faults: BTreeSet::new(),
            fault_count: 0,
            nonspeculative_execution_count: 0,
        }
    }

    /// Fold one experiment's observation of this branch
    pub fn update(&mut self, observed: &Self) -> ReportResult<()> {
        self.check_address(observed.address)?;
        self.fault_count = self.fault_count.saturating_add(1);
        self.faults.extend(observed.faults.iter().copied());
        Ok(())
    }

    /// Reconcile with a record aggregated by another run; counts saturate
    pub fn merge(&mut self, other: &Self) -> ReportResult<()> {
        self.check_address(other.address)?;
        self.fault_count = self.fault_count.saturating_add(other.fault_count);
        self.nonspeculative_execution_count = self
            .nonspeculative_execution_count
            .saturating_add(other.nonspeculative_execution_count);
        self.faults.extend(other.faults.iter().copied());
        Ok(())
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

//! A report: every fault and branch seen so far, plus crash evidence.

use crate::address::Address;
use crate::branch::Branch;
use crate::fault::Fault;
use crate::result::ReportResult;
use crate::snapshot::ReportSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Derived counts, recomputed by [`CollectedResults::collect_statistics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of distinct branches
    #[serde(rename = "branches")]
    pub branch_count: usize,
    /// Number of distinct faults
    #[serde(rename = "faults")]
    pub fault_count: usize,
}

/// Collected results of one or more fuzzing experiments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedResults {
    /// Branch records keyed by branch address
    pub branches: BTreeMap<Address, Branch>,
    /// Fault records keyed by fault address
    pub faults: BTreeMap<Address, Fault>,
    /// Raw crash lines from the event stream
    pub errors: Vec<String>,
    /// Counts as of the last [`collect_statistics`](Self::collect_statistics)
    pub statistics: Statistics,
}

impl CollectedResults {
    /// Create an empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the report holds no faults or branches
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty() && self.faults.is_empty()
    }

    /// Fold one experiment into the cumulative report
    pub fn update(&mut self, experiment: &Self) -> ReportResult<()> {
        for (&address, observed) in &experiment.branches {
            self.branches
                .entry(address)
                .or_insert_with(|| Branch::new(address))
                .update(observed)?;
        }
        for (&address, observed) in &experiment.faults {
            self.faults
                .entry(address)
                .or_insert_with(|| Fault::new(address))
                .update(observed)?;
        }
        Ok(())
    }

    /// Fold a loaded snapshot from another run into this report.
    ///
    /// Key sets may overlap or be disjoint. Crash entries are appended as-is.
    pub fn merge(&mut self, snapshot: ReportSnapshot) -> ReportResult<()> {
        let other = Self::try_from(snapshot)?;
        self.merge_results(&other)
    }

    /// Cross-report merge of an already decoded report
    pub fn merge_results(&mut self, other: &Self) -> ReportResult<()> {
        for (&address, branch) in &other.branches {
            self.branches
                .entry(address)
                .or_insert_with(|| Branch::new(address))
                .merge(branch)?;
        }
        for (&address, fault) in &other.faults {
            self.faults
                .entry(address)
                .or_insert_with(|| Fault::new(address))
                .merge(fault)?;
        }
        self.errors.extend(other.errors.iter().cloned());
        Ok(())
    }

    /// Recompute [`Statistics`] from the current maps
    pub fn collect_statistics(&mut self) {
        self.statistics = Statistics {
            branch_count: self.branches.len(),
            fault_count: self.faults.len(),
        };
    }

    /// Record a crash line
    pub fn record_crash(&mut self, line: impl Into<String>) {
        self.errors.push(line.into());
    }

    /// Drop all faults and branches, keeping crash entries
    pub fn clear_observations(&mut self) {
        self.branches.clear();
        self.faults.clear();
    }

    /// Branch record for `address`, created on first use
    pub fn branch_mut(&mut self, address: Address) -> &mut Branch {
        self.branches
            .entry(address)
            .or_insert_with(|| Branch::new(address))
    }

    /// Fault record for `address`, created on first use
    pub fn fault_mut(&mut self, address: Address) -> &mut Fault {
        self.faults
            .entry(address)
            .or_insert_with(|| Fault::new(address))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn experiment(fault: Address, branch: Address, accessed: Address) -> CollectedResults {
        let mut exp = CollectedResults::new();
        exp.branch_mut(branch).faults.insert(fault);
        let f = exp.fault_mut(fault);
        f.accessed_addresses.insert(accessed);
        f.branch_sequences.insert(vec![branch]);
        exp
    }

    mod update_tests {
        use super::*;

        #[test]
        fn test_update_creates_records() {
            let mut total = CollectedResults::new();
            total.update(&experiment(0x400, 0x10, 0x2000)).unwrap();
            assert_eq!(total.faults.len(), 1);
            assert_eq!(total.branches.len(), 1);
            assert_eq!(total.faults[&0x400].fault_count, 1);
            assert_eq!(total.branches[&0x10].fault_count, 1);
        }

        #[test]
        fn test_update_accumulates_across_experiments() {
            let mut total = CollectedResults::new();
            total.update(&experiment(0x400, 0x10, 0x2000)).unwrap();
            total.update(&experiment(0x400, 0x10, 0x3000)).unwrap();
            total.update(&experiment(0x500, 0x10, 0x3000)).unwrap();
            let fault = &total.faults[&0x400];
            assert_eq!(fault.fault_count, 2);
            assert!(fault.controlled);
            assert_eq!(total.branches[&0x10].fault_count, 3);
            assert_eq!(total.branches[&0x10].faults.len(), 2);
        }

        #[test]
        fn test_update_leaves_statistics_alone() {
            let mut total = CollectedResults::new();
            total.update(&experiment(0x400, 0x10, 0x2000)).unwrap();
            assert_eq!(total.statistics, Statistics::default());
            total.collect_statistics();
            assert_eq!(total.statistics.fault_count, 1);
            assert_eq!(total.statistics.branch_count, 1);
        }
    }

    mod merge_tests {
        use super::*;

        #[test]
        fn test_merge_disjoint_reports() {
            let mut a = CollectedResults::new();
            a.update(&experiment(0x400, 0x10, 0x2000)).unwrap();
            let mut b = CollectedResults::new();
            b.update(&experiment(0x500, 0x20, 0x2000)).unwrap();
            b.record_crash("Error: segfault");

            a.merge_results(&b).unwrap();
            a.collect_statistics();
            assert_eq!(a.statistics.fault_count, 2);
            assert_eq!(a.statistics.branch_count, 2);
            assert_eq!(a.errors, vec!["Error: segfault".to_string()]);
        }

        #[test]
        fn test_merge_overlapping_reports_sums_counts() {
            let mut a = CollectedResults::new();
            a.update(&experiment(0x400, 0x10, 0x2000)).unwrap();
            a.update(&experiment(0x400, 0x10, 0x2000)).unwrap();
            let mut b = CollectedResults::new();
            b.update(&experiment(0x400, 0x10, 0x2000)).unwrap();

            a.merge_results(&b).unwrap();
            assert_eq!(a.faults[&0x400].fault_count, 3);
            assert_eq!(a.branches[&0x10].fault_count, 3);
        }

        #[test]
        fn test_merge_snapshot() {
            let mut source = CollectedResults::new();
            source.update(&experiment(0x400, 0x10, 0x2000)).unwrap();
            let snapshot = ReportSnapshot::from(&source);

            let mut merged = CollectedResults::new();
            merged.merge(snapshot).unwrap();
            assert_eq!(merged.faults, source.faults);
            assert_eq!(merged.branches, source.branches);
        }
    }

    #[test]
    fn test_clear_observations_keeps_errors() {
        let mut exp = experiment(0x400, 0x10, 0x2000);
        exp.record_crash("Error");
        exp.clear_observations();
        assert!(exp.is_empty());
        assert_eq!(exp.errors.len(), 1);
    }
}

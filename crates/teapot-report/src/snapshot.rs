//! Persisted report format.
//!
//! ```json
//! {
//!   "errors": ["..."],
//!   "statistics": { "branches": 1, "faults": 1 },
//!   "branches": { "0x0": { "address": "0x0", "faults": ["0x4005d0"], ... } },
//!   "faults": { "0x4005d0": { "address": "0x4005d0", "accessed_addresses": [8192], ... } }
//! }
//! ```
//!
//! Instruction addresses are hex strings; accessed addresses and offsets
//! stay plain integers. Loading is strict: a missing field, an unparsable
//! address, a key that disagrees with its record's `address`, or two keys
//! naming the same address is an error.

use crate::address::{format_hex, parse_hex, parse_key, Address};
use crate::branch::Branch;
use crate::fault::{BranchSequence, Fault};
use crate::result::{ReportError, ReportResult};
use crate::results::{CollectedResults, Statistics};
use crate::tag::TypeTag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// On-disk form of a [`CollectedResults`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    /// Raw crash lines
    pub errors: Vec<String>,
    /// Branch and fault counts
    pub statistics: Statistics,
    /// Branch records keyed by address
    pub branches: BTreeMap<String, BranchRecord>,
    /// Fault records keyed by address
    pub faults: BTreeMap<String, FaultRecord>,
}

/// On-disk form of a [`Branch`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
    /// Hex branch address
    pub address: String,
    /// Hex fault addresses; absent in some hand-trimmed reports
    #[serde(default)]
    pub faults: Vec<String>,
    /// See [`Branch::fault_count`]
    pub fault_count: u64,
    /// See [`Branch::nonspeculative_execution_count`]
    pub nonspeculative_execution_count: u64,
}

/// On-disk form of a [`Fault`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultRecord {
    /// Hex fault address
    pub address: String,
    /// Sorted integers
    pub accessed_addresses: Vec<Address>,
    /// Sorted integers
    pub offsets: Vec<u64>,
    /// Each sequence as hex branch addresses
    pub branch_sequences: Vec<Vec<String>>,
    /// See [`Fault::order`]
    pub order: usize,
    /// See [`Fault::fault_count`]
    pub fault_count: u64,
    /// See [`Fault::controlled`]
    pub controlled: bool,
    /// See [`Fault::controlled_offset`]
    pub controlled_offset: bool,
    /// Gadget type tags as plain strings
    pub types: Vec<TypeTag>,
}

impl From<&Branch> for BranchRecord {
    fn from(branch: &Branch) -> Self {
        Self {
            address: format_hex(branch.address),
            faults: branch.faults.iter().copied().map(format_hex).collect(),
            fault_count: branch.fault_count,
            nonspeculative_execution_count: branch.nonspeculative_execution_count,
        }
    }
}

impl From<&Fault> for FaultRecord {
    fn from(fault: &Fault) -> Self {
        Self {
            address: format_hex(fault.address),
            accessed_addresses: fault.accessed_addresses.iter().copied().collect(),
            offsets: fault.offsets.iter().copied().collect(),
            branch_sequences: fault
                .branch_sequences
                .iter()
                .map(|seq| seq.iter().copied().map(format_hex).collect())
                .collect(),
            order: fault.order,
            fault_count: fault.fault_count,
            controlled: fault.controlled,
            controlled_offset: fault.controlled_offset,
            types: fault.types.iter().cloned().collect(),
        }
    }
}

impl From<&CollectedResults> for ReportSnapshot {
    fn from(results: &CollectedResults) -> Self {
        Self {
            errors: results.errors.clone(),
            statistics: results.statistics,
            branches: results
                .branches
                .values()
                .map(|b| (format_hex(b.address), BranchRecord::from(b)))
                .collect(),
            faults: results
                .faults
                .values()
                .map(|f| (format_hex(f.address), FaultRecord::from(f)))
                .collect(),
        }
    }
}

/// Resolve a record's address from its key, rejecting contradictions
fn record_address(key: &str, address: &str) -> ReportResult<Address> {
    let keyed = parse_key(key)?;
    let claimed = parse_hex(address)?;
    if keyed != claimed {
        return Err(ReportError::ContradictoryAddress {
            key: key.to_string(),
            address: address.to_string(),
        });
    }
    Ok(keyed)
}

/// Hex and decimal keys can spell the same address; only one may appear
fn claim_key<'a>(
    seen: &mut BTreeMap<Address, &'a str>,
    address: Address,
    key: &'a str,
) -> ReportResult<()> {
    if let Some(first) = seen.insert(address, key) {
        return Err(ReportError::DuplicateAddress {
            address,
            first: first.to_string(),
            second: key.to_string(),
        });
    }
    Ok(())
}

impl BranchRecord {
    fn decode(&self, key: &str) -> ReportResult<Branch> {
        let mut branch = Branch::new(record_address(key, &self.address)?);
        for fault in &self.faults {
            branch.faults.insert(parse_hex(fault)?);
        }
        branch.fault_count = self.fault_count;
        branch.nonspeculative_execution_count = self.nonspeculative_execution_count;
        Ok(branch)
    }
}

impl FaultRecord {
    fn decode(&self, key: &str) -> ReportResult<Fault> {
        let mut fault = Fault::new(record_address(key, &self.address)?);
        fault
            .accessed_addresses
            .extend(self.accessed_addresses.iter().copied());
        fault.offsets.extend(self.offsets.iter().copied());
        for sequence in &self.branch_sequences {
            let decoded = sequence
                .iter()
                .map(|b| parse_hex(b))
                .collect::<ReportResult<BranchSequence>>()?;
            fault.branch_sequences.insert(decoded);
        }
        fault.order = self.order;
        fault.fault_count = self.fault_count;
        fault.controlled = self.controlled;
        fault.controlled_offset = self.controlled_offset;
        fault.types.extend(self.types.iter().cloned());
        Ok(fault)
    }
}

impl TryFrom<ReportSnapshot> for CollectedResults {
    type Error = ReportError;

    fn try_from(snapshot: ReportSnapshot) -> ReportResult<Self> {
        let mut results = Self::new();
        let mut branch_keys: BTreeMap<Address, &str> = BTreeMap::new();
        for (key, record) in &snapshot.branches {
            let branch = record.decode(key)?;
            claim_key(&mut branch_keys, branch.address, key)?;
            results.branches.insert(branch.address, branch);
        }
        let mut fault_keys: BTreeMap<Address, &str> = BTreeMap::new();
        for (key, record) in &snapshot.faults {
            let fault = record.decode(key)?;
            claim_key(&mut fault_keys, fault.address, key)?;
            results.faults.insert(fault.address, fault);
        }
        results.errors = snapshot.errors;
        results.statistics = snapshot.statistics;
        Ok(results)
    }
}

/// Read a persisted report without decoding addresses
pub fn read_snapshot(path: &Path) -> ReportResult<ReportSnapshot> {
    let file = File::open(path)?;
    let snapshot = serde_json::from_reader(BufReader::new(file))?;
    debug!(path = %path.display(), "read report snapshot");
    Ok(snapshot)
}

/// Read and decode a persisted report
pub fn load_report(path: &Path) -> ReportResult<CollectedResults> {
    CollectedResults::try_from(read_snapshot(path)?)
}

/// Write `results` as pretty-printed JSON, creating parent directories
pub fn save_report(results: &CollectedResults, path: &Path) -> ReportResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &ReportSnapshot::from(results))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    debug!(path = %path.display(), faults = results.faults.len(), "wrote report snapshot");
    Ok(())
}

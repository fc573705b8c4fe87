//! Event-stream line grammar.
//!
//! The instrumented target prints one line per observation:
//!
//! ```text
//! [NaHCO3], Gadget Type, Fault Address, Accessed Address, Tag, ...   <- experiment boundary
//! [NaHCO3], KASPER_CACHE, 4005d0, 7ffd1c40, 0x10, 0, ...             <- event
//! ```
//!
//! Anything without the marker is foreign output and is ignored.

use crate::address::{parse_hex, Address};
use crate::config::MainBranch;
use crate::fault::BranchSequence;
use crate::result::{ReportError, ReportResult};

/// Prefix of every line produced by the instrumentation
pub const EVENT_PREFIX: &str = "[NaHCO3],";

/// Prefix of the header line that opens each experiment
pub const EXPERIMENT_MARKER: &str = "[NaHCO3], Gadget Type";

/// Substring that marks a crashed run
pub const CRASH_MARKER: &str = "Error";

/// Branch recorded while live sequence tracking is off
pub const PLACEHOLDER_BRANCH: Address = 0;

const MIN_FIELDS: usize = 5;
const FIRST_BRANCH_FIELD: usize = 6;

/// What a stream line means to the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Crash report; ends collection
    Crash,
    /// Start of a new experiment
    ExperimentBoundary,
    /// An observation to parse
    Event,
    /// Output from something other than the instrumentation
    Foreign,
}

/// Classify a line; the crash check wins over every other rule
#[must_use]
pub fn classify(line: &str) -> LineKind {
    if line.contains(CRASH_MARKER) {
        LineKind::Crash
    } else if line.starts_with(EXPERIMENT_MARKER) {
        LineKind::ExperimentBoundary
    } else if line.starts_with(EVENT_PREFIX) {
        LineKind::Event
    } else {
        LineKind::Foreign
    }
}

/// How an event describes the leaked location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    /// Absolute accessed address
    Accessed(Address),
    /// Offset relative to the faulting access
    Offset(u64),
}

/// One parsed observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Gadget class reported by the instrumentation, e.g. `KASPER_MDS`
    pub fault_type: String,
    /// Faulting instruction
    pub fault_address: Address,
    /// Where the misspeculated access went
    pub evidence: Evidence,
    /// Secret/attacker classification tag
    pub tag: String,
    /// Branches in the order the producer printed them, most recent first
    pub branch_sequence: BranchSequence,
}

impl Event {
    /// Parse an event line.
    ///
    /// Branch fields are only read when `track_sequences` is set; otherwise
    /// the sequence is `[PLACEHOLDER_BRANCH]`.
    pub fn parse(line: &str, track_sequences: bool) -> ReportResult<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let values: Vec<&str> = line.split(',').collect();
        if values.len() < MIN_FIELDS {
            return Err(ReportError::malformed(format!(
                "expected at least {MIN_FIELDS} fields, found {}",
                values.len()
            )));
        }

        let fault_address = parse_hex(values[2])
            .map_err(|_| ReportError::malformed(format!("bad fault address {:?}", values[2])))?;
        let accessed_address = parse_hex(values[3]).map_err(|_| {
            ReportError::malformed(format!("bad accessed address {:?}", values[3]))
        })?;

        let mut branch_sequence = if track_sequences && values.len() > FIRST_BRANCH_FIELD + 1 {
            values[FIRST_BRANCH_FIELD..values.len() - 1]
                .iter()
                .map(|b| {
                    parse_hex(b)
                        .map_err(|_| ReportError::malformed(format!("bad branch address {b:?}")))
                })
                .collect::<ReportResult<BranchSequence>>()?
        } else {
            Vec::new()
        };
        if branch_sequence.is_empty() {
            branch_sequence.push(PLACEHOLDER_BRANCH);
        }

        Ok(Self {
            fault_type: values[1].trim().to_string(),
            fault_address,
            evidence: Evidence::Accessed(accessed_address),
            tag: values[4].trim().to_string(),
            branch_sequence,
        })
    }

    /// Type tag text recorded on the fault
    #[must_use]
    pub fn type_tag(&self) -> String {
        format!("{} {}", self.fault_type, self.tag)
    }

    /// The branch used to bucket this event.
    ///
    /// The sequence is most-recent-first, so the first mispredicted branch
    /// is the last element.
    #[must_use]
    pub fn main_branch(&self, policy: MainBranch) -> Address {
        let chosen = match policy {
            MainBranch::First => self.branch_sequence.last(),
            MainBranch::Last => self.branch_sequence.first(),
        };
        chosen.copied().unwrap_or(PLACEHOLDER_BRANCH)
    }

    /// Sequence as stored on the fault: sorted
    #[must_use]
    pub fn sorted_sequence(&self) -> BranchSequence {
        let mut sequence = self.branch_sequence.clone();
        sequence.sort_unstable();
        sequence
    }
}

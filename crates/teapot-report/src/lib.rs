//! Teapot report: aggregation of speculative-execution fuzzing results
//!
//! An instrumented target reports every misspeculated access as an event
//! line. This crate folds those events into per-fault and per-branch
//! evidence, merges reports produced by independent runs, and shrinks a
//! finished report for inspection.
//!
//! # Architecture
//!
//! ```text
//! event stream ──► Collector ──► CollectedResults ──► <prefix>_<ts>.json
//!                  (per line,     (update per
//!                   per experiment) experiment)
//!
//! N reports ──► CollectedResults::merge ──► one report
//! one report ──► set_order + minimize_* ──► one report
//! ```

#![warn(missing_docs)]

mod address;
mod branch;
mod collector;
mod config;
mod event;
mod fault;
mod minimize;
mod result;
mod results;
mod snapshot;
mod tag;

pub use address::{format_hex, parse_hex, parse_key, Address};
pub use branch::Branch;
pub use collector::{CollectSummary, Collector, Flow};
pub use config::{CollectorConfig, MainBranch};
pub use event::{
    classify, Event, Evidence, LineKind, CRASH_MARKER, EVENT_PREFIX, EXPERIMENT_MARKER,
    PLACEHOLDER_BRANCH,
};
pub use fault::{BranchSequence, Fault};
pub use minimize::{minimal_antichain, RANGE_GAP};
pub use result::{ReportError, ReportResult};
pub use results::{CollectedResults, Statistics};
pub use snapshot::{
    load_report, read_snapshot, save_report, BranchRecord, FaultRecord, ReportSnapshot,
};
pub use tag::TypeTag;

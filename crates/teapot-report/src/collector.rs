//! Streaming collection of fuzzing events.
//!
//! The collector reads the instrumented target's output one line at a
//! time, buffers the current experiment, and folds it into the cumulative
//! report at every experiment boundary. A crash line stops collection
//! entirely; whatever was gathered, including the partial experiment, is
//! still written to the final snapshot.

use crate::config::CollectorConfig;
use crate::event::{classify, Event, Evidence, LineKind};
use crate::result::{ReportError, ReportResult};
use crate::results::CollectedResults;
use crate::snapshot::save_report;
use crate::tag::TagInterner;
use chrono::{DateTime, Duration, Utc};
use std::io::{BufRead, ErrorKind};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Whether the collector wants more input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading
    Continue,
    /// Stop reading; a crash was recorded
    Stop,
}

/// What a collection run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectSummary {
    /// Lines consumed from the stream
    pub lines_read: u64,
    /// Experiments folded into the report, including the final flush
    pub experiments: u64,
    /// Event lines that failed to parse
    pub malformed_lines: u64,
    /// Collection ended on a crash line rather than end of input
    pub stopped_on_error: bool,
    /// Snapshots written, in order
    pub snapshots: Vec<PathBuf>,
}

/// Drives ingestion of one event stream into one report
#[derive(Debug)]
pub struct Collector {
    config: CollectorConfig,
    results: CollectedResults,
    current: CollectedResults,
    tags: TagInterner,
    last_snapshot: DateTime<Utc>,
    summary: CollectSummary,
}

impl Collector {
    /// Create a collector whose snapshot timer starts now
    #[must_use]
    pub fn new(config: CollectorConfig) -> Self {
        Self::starting_at(config, Utc::now())
    }

    /// Create a collector whose snapshot timer starts at `start`
    #[must_use]
    pub fn starting_at(config: CollectorConfig, start: DateTime<Utc>) -> Self {
        Self {
            config,
            results: CollectedResults::new(),
            current: CollectedResults::new(),
            tags: TagInterner::new(),
            last_snapshot: start,
            summary: CollectSummary::default(),
        }
    }

    /// Cumulative report so far, excluding the buffered experiment
    #[must_use]
    pub fn results(&self) -> &CollectedResults {
        &self.results
    }

    /// Experiment currently being buffered
    #[must_use]
    pub fn current_experiment(&self) -> &CollectedResults {
        &self.current
    }

    /// Progress so far
    #[must_use]
    pub fn summary(&self) -> &CollectSummary {
        &self.summary
    }

    /// Read `reader` to the end (or the first crash line), then flush the
    /// last experiment and write the final snapshot.
    ///
    /// Input that is not valid UTF-8 aborts immediately without a snapshot.
    pub fn collect<R: BufRead>(&mut self, mut reader: R) -> ReportResult<CollectSummary> {
        info!(
            prefix = %self.config.output_prefix.display(),
            main_branch = ?self.config.main_branch,
            log_interval = ?self.config.effective_log_interval(),
            "collecting events"
        );

        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    return Err(ReportError::Decode {
                        line: self.summary.lines_read,
                    });
                }
                Err(e) => return Err(e.into()),
            }
            if self.process_line_at(&line, Utc::now())? == Flow::Stop {
                break;
            }
        }

        self.finish_at(Utc::now())
    }

    /// Handle one stream line, using the current time for snapshot polling
    pub fn process_line(&mut self, line: &str) -> ReportResult<Flow> {
        self.process_line_at(line, Utc::now())
    }

    /// Handle one stream line as if it arrived at `now`
    pub fn process_line_at(&mut self, line: &str, now: DateTime<Utc>) -> ReportResult<Flow> {
        self.summary.lines_read += 1;
        match classify(line) {
            LineKind::Crash => {
                let entry = line.trim_end_matches(['\r', '\n']);
                warn!(line = entry, "crash marker in stream, stopping collection");
                self.results.record_crash(entry);
                self.summary.stopped_on_error = true;
                Ok(Flow::Stop)
            }
            LineKind::ExperimentBoundary => {
                self.process_experiment_at(now)?;
                Ok(Flow::Continue)
            }
            LineKind::Foreign => Ok(Flow::Continue),
            LineKind::Event => {
                match Event::parse(line, self.config.track_sequences) {
                    Ok(event) => self.record_event(&event),
                    Err(e) if e.is_recoverable() => {
                        warn!(line = line.trim_end(), error = %e, "skipping event line");
                        self.summary.malformed_lines += 1;
                    }
                    Err(e) => return Err(e),
                }
                Ok(Flow::Continue)
            }
        }
    }

    /// Add one parsed event to the buffered experiment
    pub fn record_event(&mut self, event: &Event) {
        let branch_address = event.main_branch(self.config.main_branch);
        self.current
            .branch_mut(branch_address)
            .faults
            .insert(event.fault_address);

        let tag = self.tags.intern(&event.type_tag());
        let sequence = event.sorted_sequence();
        let fault = self.current.fault_mut(event.fault_address);
        match event.evidence {
            Evidence::Accessed(address) => {
                fault.accessed_addresses.insert(address);
            }
            Evidence::Offset(offset) => {
                fault.offsets.insert(offset);
            }
        }
        fault.branch_sequences.insert(sequence);
        fault.types.insert(tag);
    }

    /// Fold the buffered experiment into the report, then write an
    /// intermediate snapshot if the configured interval has elapsed.
    ///
    /// Returns the snapshot path when one was written.
    pub fn process_experiment_at(
        &mut self,
        now: DateTime<Utc>,
    ) -> ReportResult<Option<PathBuf>> {
        self.results.update(&self.current)?;
        debug!(
            faults = self.current.faults.len(),
            branches = self.current.branches.len(),
            "folded experiment"
        );
        self.current.clear_observations();
        self.summary.experiments += 1;

        if let Some(interval) = self.config.effective_log_interval() {
            let elapsed = now.signed_duration_since(self.last_snapshot);
            if elapsed > Duration::seconds(interval as i64) {
                self.last_snapshot = now;
                return self.write_snapshot(now).map(Some);
            }
        }
        Ok(None)
    }

    /// Flush the last experiment and write the terminal snapshot, unless
    /// the flush itself just wrote one
    pub fn finish_at(&mut self, now: DateTime<Utc>) -> ReportResult<CollectSummary> {
        if self.process_experiment_at(now)?.is_none() {
            self.write_snapshot(now)?;
        }
        info!(
            lines = self.summary.lines_read,
            experiments = self.summary.experiments,
            malformed = self.summary.malformed_lines,
            faults = self.results.faults.len(),
            branches = self.results.branches.len(),
            tags = self.tags.len(),
            crashed = self.summary.stopped_on_error,
            "collection finished"
        );
        Ok(self.summary.clone())
    }

    /// Recompute statistics and persist the cumulative report
    pub fn write_snapshot(&mut self, timestamp: DateTime<Utc>) -> ReportResult<PathBuf> {
        self.results.collect_statistics();
        let path = self.config.snapshot_path(timestamp.timestamp());
        save_report(&self.results, &path)?;
        info!(
            path = %path.display(),
            faults = self.results.statistics.fault_count,
            branches = self.results.statistics.branch_count,
            "wrote snapshot"
        );
        self.summary.snapshots.push(path.clone());
        Ok(path)
    }
}

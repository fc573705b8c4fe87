//! Collect command handler

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use crate::CollectArgs;
use std::io::BufRead;
use teapot_report::{CollectSummary, Collector, CollectorConfig};

/// Translate command arguments into a collector configuration
#[must_use]
pub fn collector_config(args: &CollectArgs) -> CollectorConfig {
    CollectorConfig::new(&args.output)
        .with_main_branch(args.main_branch.into())
        .with_log_interval(args.log_timer)
        .with_track_sequences(args.branch_sequences)
}

/// Execute the collect command over standard input
pub fn execute_collect(config: &CliConfig, args: &CollectArgs) -> CliResult<()> {
    let stdin = std::io::stdin();
    let summary = collect_from(config, args, stdin.lock())?;
    print_collect_summary(config, &summary);
    Ok(())
}

/// Run a collection over any buffered reader
pub fn collect_from<R: BufRead>(
    config: &CliConfig,
    args: &CollectArgs,
    reader: R,
) -> CliResult<CollectSummary> {
    let reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    reporter.info(&format!(
        "Collecting events into {}_<timestamp>.json",
        args.output.display()
    ));

    let mut collector = Collector::new(collector_config(args));
    Ok(collector.collect(reader)?)
}

/// Print the outcome of a collection run
pub fn print_collect_summary(config: &CliConfig, summary: &CollectSummary) {
    let reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());

    if summary.stopped_on_error {
        reporter.warning("Target reported an error; collection stopped early");
    }
    if summary.malformed_lines > 0 {
        reporter.warning(&format!(
            "Skipped {} malformed event line(s)",
            summary.malformed_lines
        ));
    }
    if config.verbosity.is_verbose() {
        for path in &summary.snapshots {
            reporter.info(&format!("Snapshot {}", path.display()));
        }
    }
    if let Some(last) = summary.snapshots.last() {
        reporter.success(&format!(
            "Collected {} experiment(s) from {} line(s) into {}",
            summary.experiments,
            summary.lines_read,
            last.display()
        ));
    }
}

//! Merge command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use crate::MergeArgs;
use std::path::{Path, PathBuf};
use teapot_report::{read_snapshot, save_report, CollectedResults};
use tracing::debug;

/// Execute the merge command
pub fn execute_merge(config: &CliConfig, args: &MergeArgs) -> CliResult<()> {
    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    let merged = merge_reports(&args.inputs, &mut reporter)?;
    save_report(&merged, &args.output)?;

    reporter.success(&format!(
        "Merged {} report(s) into {} ({} faults, {} branches)",
        args.inputs.len(),
        args.output.display(),
        merged.statistics.fault_count,
        merged.statistics.branch_count
    ));
    Ok(())
}

/// Fold every input report, in order, into one fresh report.
///
/// The first unreadable or contradictory input aborts the merge.
pub fn merge_reports(
    inputs: &[PathBuf],
    reporter: &mut ProgressReporter,
) -> CliResult<CollectedResults> {
    if inputs.is_empty() {
        return Err(CliError::invalid_argument("merge needs at least one input report"));
    }

    reporter.start_progress(inputs.len() as u64, "Merging");
    let mut merged = CollectedResults::new();
    for path in inputs {
        reporter.info(&format!("Merging {}", path.display()));
        reporter.set_message(&display_name(path));
        let result = read_snapshot(path).and_then(|snapshot| merged.merge(snapshot));
        if let Err(e) = result {
            reporter.finish();
            reporter.failure(&format!("{}: {e}", path.display()));
            return Err(e.into());
        }
        debug!(path = %path.display(), faults = merged.faults.len(), "merged report");
        reporter.increment(1);
    }
    reporter.finish();

    merged.collect_statistics();
    Ok(merged)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

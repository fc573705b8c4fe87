//! Minimize command handler

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use crate::MinimizeArgs;
use teapot_report::{load_report, save_report, CollectedResults};
use tracing::debug;

/// Execute the minimize command
pub fn execute_minimize(config: &CliConfig, args: &MinimizeArgs) -> CliResult<()> {
    let reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    reporter.info(&format!("Minimizing {}", args.input.display()));

    let mut report = load_report(&args.input)?;
    let before = sequence_count(&report);
    minimize_report(&mut report);
    save_report(&report, &args.output)?;

    reporter.success(&format!(
        "Kept {} of {} branch sequence(s) across {} fault(s); wrote {}",
        sequence_count(&report),
        before,
        report.faults.len(),
        args.output.display()
    ));
    Ok(())
}

/// Apply the minimization passes in their required order
pub fn minimize_report(report: &mut CollectedResults) {
    // order must be taken before sequences are pruned
    report.set_order();
    report.minimize_sequences();
    report.minimize_accessed_addresses();
    report.collect_statistics();
    debug!(faults = report.faults.len(), "minimized report");
}

fn sequence_count(report: &CollectedResults) -> usize {
    report.faults.values().map(|f| f.branch_sequences.len()).sum()
}

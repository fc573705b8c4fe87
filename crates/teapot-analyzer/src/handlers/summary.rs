//! Summary command handler

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::SummaryArgs;
use console::style;
use serde::Serialize;
use std::collections::BTreeMap;
use teapot_report::{load_report, CollectedResults, Statistics};

/// Condensed view of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Stored counts, recomputed from the records
    pub statistics: Statistics,
    /// Crash lines recorded by the collector
    pub errors: usize,
    /// Faults whose accessed addresses varied
    pub controlled: usize,
    /// Faults whose offsets varied
    pub controlled_offset: usize,
    /// Sum of every fault's count
    pub observations: u64,
    /// Number of faults per order; 0 means not yet minimized
    pub orders: BTreeMap<usize, usize>,
    /// Number of faults per gadget type tag
    pub types: BTreeMap<String, usize>,
}

impl ReportSummary {
    /// Summarize `report`
    #[must_use]
    pub fn from_report(report: &CollectedResults) -> Self {
        let mut orders = BTreeMap::new();
        let mut types = BTreeMap::new();
        for fault in report.faults.values() {
            *orders.entry(fault.order).or_insert(0) += 1;
            for tag in &fault.types {
                *types.entry(tag.as_str().to_string()).or_insert(0) += 1;
            }
        }

        Self {
            statistics: Statistics {
                branch_count: report.branches.len(),
                fault_count: report.faults.len(),
            },
            errors: report.errors.len(),
            controlled: report.faults.values().filter(|f| f.controlled).count(),
            controlled_offset: report
                .faults
                .values()
                .filter(|f| f.controlled_offset)
                .count(),
            observations: report.faults.values().map(|f| f.fault_count).sum(),
            orders,
            types,
        }
    }
}

/// Execute the summary command
pub fn execute_summary(config: &CliConfig, args: &SummaryArgs) -> CliResult<()> {
    let report = load_report(&args.input)?;
    let summary = ReportSummary::from_report(&report);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_summary(&summary, config.color.should_color()));
    }
    Ok(())
}

/// Render a summary as text
#[must_use]
pub fn render_summary(summary: &ReportSummary, use_color: bool) -> String {
    let heading = |text: &str| {
        if use_color {
            style(text).bold().to_string()
        } else {
            text.to_string()
        }
    };

    let mut out = String::new();
    out.push_str(&heading("Report summary"));
    out.push('\n');
    out.push_str(&format!("  Branches:          {}\n", summary.statistics.branch_count));
    out.push_str(&format!("  Faults:            {}\n", summary.statistics.fault_count));
    out.push_str(&format!("  Observations:      {}\n", summary.observations));
    out.push_str(&format!("  Controlled:        {}\n", summary.controlled));
    out.push_str(&format!("  Controlled offset: {}\n", summary.controlled_offset));
    out.push_str(&format!("  Errors:            {}\n", summary.errors));

    if !summary.orders.is_empty() {
        out.push_str(&heading("Faults by order"));
        out.push('\n');
        for (order, count) in &summary.orders {
            let label = if *order == 0 {
                "unset".to_string()
            } else {
                order.to_string()
            };
            out.push_str(&format!("  {label:>5}: {count}\n"));
        }
    }

    if !summary.types.is_empty() {
        out.push_str(&heading("Faults by type"));
        out.push('\n');
        for (tag, count) in &summary.types {
            out.push_str(&format!("  {tag}: {count}\n"));
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use teapot_report::{save_report, TypeTag};
    use tempfile::TempDir;

    fn sample() -> CollectedResults {
        let mut report = CollectedResults::new();
        report.branch_mut(0x10).faults.insert(0x400);
        {
            let fault = report.fault_mut(0x400);
            fault.fault_count = 3;
            fault.order = 1;
            fault.controlled = true;
            fault.types.insert(TypeTag::from("KASPER_CACHE 0x10"));
        }
        {
            let fault = report.fault_mut(0x500);
            fault.fault_count = 1;
            fault.types.insert(TypeTag::from("KASPER_CACHE 0x10"));
            fault.types.insert(TypeTag::from("KASPER_PORT 0x20"));
        }
        report.record_crash("Error: boom");
        report
    }

    #[test]
    fn test_from_report() {
        let summary = ReportSummary::from_report(&sample());
        assert_eq!(summary.statistics.fault_count, 2);
        assert_eq!(summary.statistics.branch_count, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.controlled, 1);
        assert_eq!(summary.controlled_offset, 0);
        assert_eq!(summary.observations, 4);
        assert_eq!(summary.orders[&0], 1);
        assert_eq!(summary.orders[&1], 1);
        assert_eq!(summary.types["KASPER_CACHE 0x10"], 2);
    }

    #[test]
    fn test_empty_report() {
        let summary = ReportSummary::from_report(&CollectedResults::new());
        assert_eq!(summary.observations, 0);
        assert!(summary.orders.is_empty());
        let text = render_summary(&summary, false);
        assert!(!text.contains("Faults by order"));
    }

    #[test]
    fn test_render_summary_text() {
        let text = render_summary(&ReportSummary::from_report(&sample()), false);
        assert!(text.contains("Report summary"));
        assert!(text.contains("Faults:            2"));
        assert!(text.contains("unset: 1"));
        assert!(text.contains("KASPER_PORT 0x20: 1"));
    }

    #[test]
    fn test_summary_json_keys() {
        let json = serde_json::to_value(ReportSummary::from_report(&sample())).unwrap();
        assert_eq!(json["statistics"]["faults"], 2);
        assert_eq!(json["controlled"], 1);
        assert_eq!(json["orders"]["1"], 1);
    }

    #[test]
    fn test_execute_summary_reads_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.json");
        save_report(&sample(), &path).unwrap();
        let args = SummaryArgs {
            input: path,
            json: true,
        };
        execute_summary(&CliConfig::new(), &args).unwrap();
    }
}

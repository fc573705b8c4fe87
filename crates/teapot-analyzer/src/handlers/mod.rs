//! Command handlers, one module per subcommand

pub mod collect;
pub mod merge;
pub mod minimize;
pub mod summary;

pub use collect::{collect_from, collector_config, execute_collect, print_collect_summary};
pub use merge::{execute_merge, merge_reports};
pub use minimize::{execute_minimize, minimize_report};
pub use summary::{execute_summary, render_summary, ReportSummary};

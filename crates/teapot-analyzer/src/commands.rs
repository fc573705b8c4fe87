//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Teapot analyzer: collect, merge and minimize speculative-execution fuzzing reports
#[derive(Parser, Debug)]
#[command(name = "teapot-analyzer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "compact", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect fuzzing events from standard input into a report
    Collect(CollectArgs),

    /// Merge several reports into one
    Merge(MergeArgs),

    /// Minimize branch sequences and accessed addresses of a report
    Minimize(MinimizeArgs),

    /// Print the statistics of a report
    Summary(SummaryArgs),
}

/// Arguments for the collect command
#[derive(Parser, Debug)]
pub struct CollectArgs {
    /// Output prefix; snapshots go to <OUTPUT>_<unix-timestamp>.json
    #[arg(short, long)]
    pub output: PathBuf,

    /// Branch of a trigger sequence that events are bucketed under
    #[arg(short, long, value_enum, default_value = "first")]
    pub main_branch: MainBranchArg,

    /// Seconds between intermediate snapshots
    #[arg(short, long, value_name = "SECONDS")]
    pub log_timer: Option<u64>,

    /// Parse branch sequences from event lines instead of a placeholder
    #[arg(long)]
    pub branch_sequences: bool,
}

/// Arguments for the merge command
#[derive(Parser, Debug)]
pub struct MergeArgs {
    /// Reports to merge
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Merged report path
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the minimize command
#[derive(Parser, Debug)]
pub struct MinimizeArgs {
    /// Report to minimize
    pub input: PathBuf,

    /// Minimized report path
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the summary command
#[derive(Parser, Debug)]
pub struct SummaryArgs {
    /// Report to summarize
    pub input: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Main-branch policy argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum MainBranchArg {
    /// Earliest mispredicted branch
    #[default]
    First,
    /// Most recent mispredicted branch
    Last,
}

impl From<MainBranchArg> for teapot_report::MainBranch {
    fn from(arg: MainBranchArg) -> Self {
        match arg {
            MainBranchArg::First => Self::First,
            MainBranchArg::Last => Self::Last,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormatArg {
    /// Multi-line human-readable
    Pretty,
    /// One line per event
    #[default]
    Compact,
    /// Newline-delimited JSON
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}

//! Teapot analyzer CLI library
//!
//! Command-line front end for [`teapot_report`]: stream collection from a
//! fuzzing target's stdout, plus the offline merge, minimize and summary
//! tools over persisted reports.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod logging;
mod output;

pub use commands::{
    Cli, CollectArgs, ColorArg, Commands, LogFormatArg, MainBranchArg, MergeArgs, MinimizeArgs,
    SummaryArgs,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::{build_filter, init_logging};
pub use output::ProgressReporter;

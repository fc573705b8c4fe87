//! Teapot analyzer: aggregate speculative-execution fuzzing output
//!
//! ## Usage
//!
//! ```bash
//! target | teapot-analyzer collect -o results/libyaml -l 600
//! teapot-analyzer merge results/a_*.json results/b_*.json -o merged.json
//! teapot-analyzer minimize merged.json -o minimized.json
//! teapot-analyzer summary minimized.json --json
//! ```

use clap::Parser;
use std::process::ExitCode;
use teapot_analyzer::{
    handlers, init_logging, Cli, CliConfig, CliResult, ColorChoice, Commands, LogFormat, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(hint) = e.hint() {
                eprintln!("Hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_logging(&config)?;

    match cli.command {
        Commands::Collect(args) => handlers::execute_collect(&config, &args),
        Commands::Merge(args) => handlers::execute_merge(&config, &args),
        Commands::Minimize(args) => handlers::execute_minimize(&config, &args),
        Commands::Summary(args) => handlers::execute_summary(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.clone().into();
    let log_format: LogFormat = cli.log_format.clone().into();

    CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(color)
        .with_log_format(log_format)
}

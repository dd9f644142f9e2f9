//! Liveness CLI - Blink-based liveness verification over recorded landmark streams.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{run::RunArgs, Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load();

    let exit_code = match cli.command {
        Some(Commands::Run(args)) => run(RunArgs::with_config(args, &config)),
        Some(Commands::Assets(ref args)) => match commands::assets::run(args, &config) {
            Ok(()) => ExitCode::Passed,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::Error
            }
        },
        None => {
            // Default behavior: run with flattened args
            if cli.run.recording.is_none() {
                eprintln!("error: No recording specified. Use --help for usage information.");
                return ExitCode::Error.into();
            }
            run(RunArgs::with_config(cli.run, &config))
        }
    };

    exit_code.into()
}

fn run(args: RunArgs) -> ExitCode {
    match commands::run::run(&args) {
        Ok(result) => result.exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    }
}

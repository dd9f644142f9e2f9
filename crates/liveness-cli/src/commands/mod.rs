//! CLI command definitions and handlers.

pub mod assets;
pub mod run;

use clap::{Parser, Subcommand};

/// Liveness - Blink-based liveness verification over recorded landmark streams
#[derive(Parser)]
#[command(name = "liveness")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared run arguments (recording, thresholds, flags).
    #[command(flatten)]
    pub run: run::RunArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Replay a recorded landmark stream through a liveness session
    Run(run::RunArgs),
    /// Inspect face mesh asset locations
    Assets(assets::AssetsArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The session passed.
    Passed = 0,
    /// The session failed or ended without passing.
    NotPassed = 1,
    /// Operational error (bad arguments, unreadable recording, ...).
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}

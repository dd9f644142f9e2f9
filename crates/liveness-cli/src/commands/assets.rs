//! Assets command - inspect where face mesh assets resolve.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use liveness_adapters::assets::{all_assets_installed, list_assets};
use liveness_adapters::{assets_dir, locator_for};

use crate::config::AppConfig;

/// Arguments for the assets command
#[derive(Args)]
pub struct AssetsArgs {
    #[command(subcommand)]
    pub command: AssetsCommand,
}

/// Assets subcommands
#[derive(Subcommand)]
pub enum AssetsCommand {
    /// List every face mesh asset and where it resolves
    List {
        /// Base URL assets resolve against
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// Local assets directory (overrides --base-url)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Print local assets directory path
    Path,
}

/// Run the assets command.
pub fn run(args: &AssetsArgs, config: &AppConfig) -> Result<()> {
    match &args.command {
        AssetsCommand::List { base_url, dir } => {
            let base_url = base_url.as_deref().or(config.assets.base_url.as_deref());
            let dir = dir.as_ref().or(config.assets.dir.as_ref());
            list(base_url, dir);
            Ok(())
        }
        AssetsCommand::Path => {
            print_path(config);
            Ok(())
        }
    }
}

fn list(base_url: Option<&str>, dir: Option<&PathBuf>) {
    let locator = locator_for(base_url, dir.map(PathBuf::as_path));
    let entries = list_assets(locator.as_ref());

    match dir {
        Some(dir) => println!("Assets directory: {}", dir.display()),
        None => println!("Assets base URL: {}", locator.locate("").trim_end_matches('/')),
    }
    println!();

    for entry in &entries {
        let status = match entry.present {
            Some(true) => "✓",
            Some(false) => "✗",
            None => "-",
        };
        println!("  {status} {} ({})", entry.file, entry.location);
    }

    if let Some(dir) = dir {
        println!();
        let installed = entries.iter().filter(|e| e.present == Some(true)).count();
        println!("{installed}/{} assets installed", entries.len());
        if !all_assets_installed(dir) {
            tracing::info!("Some assets are missing from {}", dir.display());
        }
    }
}

fn print_path(config: &AppConfig) {
    let path = config.assets.dir.clone().unwrap_or_else(assets_dir);
    println!("{}", path.display());
}

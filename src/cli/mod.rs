//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod palettes;
mod usage;

use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{load_config, Overrides};

pub use palettes::PaletteAction;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// stitch - thread usage bookkeeping for cross-stitch patterns
#[derive(Parser)]
#[command(name = "stitch")]
#[command(about = "Inspect thread palettes and compute per-color thread usage for stitch lists")]
#[command(version)]
pub struct Cli {
    /// Path to stitch.toml (default: discovered from the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List and inspect built-in thread palettes
    Palettes {
        #[command(subcommand)]
        action: PaletteAction,
    },
    /// Place every stitch of a placement list and report thread usage per color
    Usage {
        /// Placement list, one JSON5 object per line ("-" for stdin)
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Palette used to resolve bare color ids (overrides stitch.toml)
        #[arg(short, long)]
        palette: Option<String>,

        /// Strict mode: fail on malformed lines and unknown colors
        #[arg(long)]
        strict: bool,
    },
}

/// Parse arguments, set up logging and run the selected command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    match cli.command {
        Commands::Palettes { action } => palettes::run_palettes(action, &config),
        Commands::Usage { input, json, palette, strict } => {
            Overrides { palette }.apply(&mut config);
            usage::run_usage(&input, json, strict, &config)
        }
    }
}

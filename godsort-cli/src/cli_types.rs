//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "godsort")]
#[command(
    about = "Classify Xbox 360 disc images and convert them to Games on Demand",
    long_about = None
)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log file path (ANSI codes stripped)
    #[arg(long, global = true, default_value = "godsort.log")]
    pub logfile: PathBuf,

    /// Do not write a log file
    #[arg(long, global = true)]
    pub no_log: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Tool location override shared by commands that need the tools.
#[derive(Args, Clone)]
pub(crate) struct ToolArgs {
    /// Directory holding the tools and the gamelist (overrides settings)
    #[arg(long)]
    pub tools_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Classify, convert and merge every image in SOURCE into OUTPUT
    Run {
        /// Folder containing the disc images
        source: PathBuf,

        /// Folder receiving converted titles
        output: PathBuf,

        /// Classify and print the plan without extracting or converting
        #[arg(short = 'n', long)]
        dry_run: bool,

        #[command(flatten)]
        tools: ToolArgs,
    },

    /// Check that the tools and the gamelist are present
    Check {
        #[command(flatten)]
        tools: ToolArgs,
    },

    /// Inspect the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the effective settings
    Show,

    /// Print the settings file path
    Path,
}

//! godsort CLI
//!
//! Command-line interface for classifying Xbox 360 disc images and
//! converting them into a Games on Demand library.

mod cli_types;
mod commands;
mod error;
mod logger;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction};
use error::CliError;

fn main() {
    let cli = Cli::parse();
    let logfile = (!cli.no_log).then_some(cli.logfile.as_path());

    if let Err(e) = logger::CliLogger::init(cli.quiet, cli.verbose, logfile) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    if let Err(e) = dispatch(cli.command, cli.quiet) {
        log::error!("{e}");
        log::logger().flush();
        std::process::exit(1);
    }
    log::logger().flush();
}

fn dispatch(command: Commands, quiet: bool) -> Result<(), CliError> {
    match command {
        Commands::Run {
            source,
            output,
            dry_run,
            tools,
        } => commands::run::run_batch(&source, &output, dry_run, tools.tools_dir, quiet),
        Commands::Check { tools } => commands::check::run_check(tools.tools_dir),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(),
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
        },
    }
}

use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use godsort_lib::Settings;

use crate::error::CliError;

/// List every prerequisite with its status; fail if any is missing.
pub(crate) fn run_check(tools_dir: Option<PathBuf>) -> Result<(), CliError> {
    let settings = Settings::load()?;
    let paths = settings.tools.paths(tools_dir.as_deref());

    for (name, path) in paths.prerequisites() {
        if path.is_file() {
            log::info!(
                "  {} {:<13} {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                name,
                path.display().if_supports_color(Stdout, |t| t.cyan()),
            );
        } else {
            log::info!(
                "  {} {:<13} {} {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                name,
                path.display().if_supports_color(Stdout, |t| t.cyan()),
                "(missing)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
    }

    paths.preflight()?;
    log::info!("");
    log::info!("All tools found.");
    Ok(())
}

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use godsort_lib::Settings;
use godsort_lib::settings::settings_path;

use crate::error::CliError;

/// Show the effective settings and where they come from.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = settings_path();
    let settings = Settings::load_from(&path)?;

    log::info!(
        "{}",
        "godsort Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");
    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!("");

    for line in settings.to_toml_string()?.lines() {
        log::info!("  {line}");
    }
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    log::info!("{}", settings_path().display());
}

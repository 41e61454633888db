//! Console and log file output.
//!
//! Everything the CLI prints goes through `log`. The console shows CLI
//! messages at info level and engine messages at warn level (everything at
//! debug with `--verbose`); the log file records every engine event.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::error::CliError;

const CLI_TARGET: &str = env!("CARGO_CRATE_NAME");

pub(crate) struct CliLogger {
    quiet: bool,
    verbose: bool,
    file: Option<Mutex<File>>,
}

impl CliLogger {
    /// Install the logger. `logfile` is opened in append mode.
    pub(crate) fn init(quiet: bool, verbose: bool, logfile: Option<&Path>) -> Result<(), CliError> {
        let file = match logfile {
            Some(path) => Some(Mutex::new(
                OpenOptions::new().create(true).append(true).open(path)?,
            )),
            None => None,
        };
        let logger = CliLogger {
            quiet,
            verbose,
            file,
        };
        let max = if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        log::set_boxed_logger(Box::new(logger)).map_err(|e| CliError::logger(e.to_string()))?;
        log::set_max_level(max);
        Ok(())
    }

    fn console_level(&self, target: &str) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet || !is_cli(target) {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        }
    }

    fn write_console(&self, record: &Record) {
        let message = record.args().to_string();
        let line = match record.level() {
            Level::Error => format!(
                "{} {message}",
                "error:".if_supports_color(Stderr, |t| t.red())
            ),
            Level::Warn if !is_cli(record.target()) => format!(
                "{} {message}",
                "warning:".if_supports_color(Stderr, |t| t.yellow())
            ),
            _ => message,
        };
        let line = if self.verbose {
            format!("{} {line}", chrono::Local::now().format("%H:%M:%S%.3f"))
        } else {
            line
        };
        if record.level() <= Level::Warn {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn write_file(&self, record: &Record) {
        let Some(file) = &self.file else {
            return;
        };
        let message = strip_ansi_escapes::strip_str(record.args().to_string());
        if message.trim().is_empty() {
            return;
        }
        if let Ok(mut file) = file.lock() {
            let _ = writeln!(
                file,
                "{} [{}] {message}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level()
            );
        }
    }
}

/// Whether a record comes from this binary rather than the engine crates.
fn is_cli(target: &str) -> bool {
    target
        .strip_prefix(CLI_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if record.level() <= self.console_level(record.target()) {
            self.write_console(record);
        }
        self.write_file(record);
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

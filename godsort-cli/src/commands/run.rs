use std::cell::RefCell;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use godsort_lib::scanner::{image_records, scan_images};
use godsort_lib::{
    BaseGameIndex, BatchError, BatchProgress, BatchRunner, BatchSummary, DiscCategory,
    ExternalTools, ImageRecord, Library, Settings, TitleId,
};

use crate::error::CliError;

pub(crate) fn run_batch(
    source: &Path,
    output: &Path,
    dry_run: bool,
    tools_dir: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let settings = Settings::load()?;
    let paths = settings.tools.paths(tools_dir.as_deref());
    paths.preflight()?;
    check_output_dir(output)?;

    let images =
        scan_images(source, &settings.batch.extension).map_err(|e| BatchError::Source {
            path: source.to_path_buf(),
            source: e,
        })?;
    let index = BaseGameIndex::load(&paths.gamelist).map_err(BatchError::from)?;

    log::info!(
        "Processing {} images from {}",
        images.len(),
        source.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!(
        "Output: {}",
        output.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    if dry_run {
        log::info!(
            "{}",
            "Dry run: nothing will be extracted, converted or merged"
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!("");

    let tools = ExternalTools::new(paths);
    let records = image_records(images);
    let runner = BatchRunner::new(&tools, &index, Library::new(output), &settings.classifier);
    let display = BatchDisplay::new(quiet);

    if dry_run {
        let planned = runner.plan(records, &|event| display.handle(event));
        print_plan(&planned);
        return Ok(());
    }

    let summary = runner.run(records, &|event| display.handle(event))?;
    print_summary(&summary, output);
    Ok(())
}

fn check_output_dir(output: &Path) -> Result<(), BatchError> {
    let error = |source| BatchError::Output {
        path: output.to_path_buf(),
        source,
    };
    let meta = std::fs::metadata(output).map_err(error)?;
    if !meta.is_dir() {
        return Err(error(std::io::Error::other("not a directory")));
    }
    Ok(())
}

/// Per-item progress lines plus a conversion bar.
struct BatchDisplay {
    quiet: bool,
    bar: RefCell<Option<ProgressBar>>,
}

impl BatchDisplay {
    fn new(quiet: bool) -> Self {
        Self {
            quiet,
            bar: RefCell::new(None),
        }
    }

    fn handle(&self, event: BatchProgress) {
        match event {
            BatchProgress::Classified {
                index,
                total,
                file_name,
                category,
                title_id,
            } => {
                log::info!(
                    "{} {}",
                    counter(index, total).if_supports_color(Stdout, |t| t.dimmed()),
                    describe(&file_name, category, title_id.as_ref()),
                );
            }
            BatchProgress::Extracting { file_name } => {
                self.spinner(format!("Extracting {file_name}"));
            }
            BatchProgress::Rebuilding { file_name } => {
                self.spinner(format!("Rebuilding {file_name}"));
            }
            BatchProgress::Converting { file_name, percent } => {
                self.converting(&file_name, percent);
            }
            BatchProgress::Resolving {
                index,
                total,
                file_name,
            } => {
                log::info!(
                    "{} {file_name}: looking for the base game",
                    counter(index, total).if_supports_color(Stdout, |t| t.dimmed()),
                );
                self.spinner(format!("Merging {file_name}"));
            }
            BatchProgress::ItemDone { .. } | BatchProgress::Done => self.clear(),
            BatchProgress::Started { .. } | BatchProgress::Rebuilt { .. } => {}
        }
    }

    fn spinner(&self, msg: String) {
        if self.quiet {
            return;
        }
        self.clear();
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} {msg}")
                .expect("static pattern")
                .tick_chars("/-\\|"),
        );
        pb.set_message(msg);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        *self.bar.borrow_mut() = Some(pb);
    }

    fn converting(&self, file_name: &str, percent: u8) {
        if self.quiet {
            return;
        }
        let mut bar = self.bar.borrow_mut();
        let is_bar = bar.as_ref().is_some_and(|pb| pb.length() == Some(100));
        if !is_bar {
            if let Some(pb) = bar.take() {
                pb.finish_and_clear();
            }
            let pb = ProgressBar::new(100);
            pb.set_style(
                ProgressStyle::with_template("  [{bar:30.cyan/blue}] {pos:>3}% {msg}")
                    .expect("static pattern")
                    .progress_chars("=> "),
            );
            pb.set_message(format!("Converting {file_name}"));
            *bar = Some(pb);
        }
        if let Some(pb) = bar.as_ref() {
            pb.set_position(u64::from(percent));
        }
    }

    fn clear(&self) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

/// `(i/n)` with `i` zero-padded to the width of `n`.
fn counter(index: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("({index:0width$}/{total})")
}

fn describe(file_name: &str, category: DiscCategory, title_id: Option<&TitleId>) -> String {
    match (category, title_id) {
        (DiscCategory::Invalid, _) | (_, None) => format!(
            "{file_name} is {}",
            "not a valid disc image".if_supports_color(Stdout, |t| t.red())
        ),
        (category, Some(id)) => format!(
            "{file_name} ({id}) is a {} disc",
            category.label().if_supports_color(Stdout, |t| t.bold())
        ),
    }
}

fn print_plan(records: &[ImageRecord]) {
    log::info!("");
    log::info!("{}", "Plan".if_supports_color(Stdout, |t| t.bold()));
    for record in records {
        let ratio = record
            .content_ratio
            .map(|r| format!("{:.2}%", r * 100.0))
            .unwrap_or_else(|| "-".to_string());
        let action = match record.category {
            DiscCategory::Play => "convert",
            DiscCategory::Install => "extract content",
            DiscCategory::Dlc => "merge into base game",
            DiscCategory::Invalid => "skip",
        };
        log::info!(
            "  {:<8} {:<9} {:>8}  {}  ({action})",
            record.category.label(),
            record.id_label(),
            ratio,
            record.file_name(),
        );
    }
}

fn print_summary(summary: &BatchSummary, output: &Path) {
    log::info!("");
    log::info!("{}", "Summary".if_supports_color(Stdout, |t| t.bold()));
    log::info!(
        "  {} converted ({} rebuilt), {} installed, {} DLC merged",
        summary.converted.len(),
        summary.rebuilt,
        summary.installed.len(),
        summary.merged.len(),
    );

    for (file, titles) in &summary.merged {
        let titles: Vec<&str> = titles.iter().map(TitleId::as_str).collect();
        log::info!(
            "  {} {file} -> {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            titles.join(", "),
        );
    }

    if !summary.invalid.is_empty() {
        log::warn!("{} invalid images skipped:", summary.invalid.len());
        for file in &summary.invalid {
            log::warn!("  {file}");
        }
    }

    if !summary.failed.is_empty() {
        log::warn!("{} images failed:", summary.failed.len());
        for (file, reason) in &summary.failed {
            log::warn!(
                "  {} {file}: {reason}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }

    if summary.has_orphans() {
        log::warn!(
            "{} DLC images need manual attention (no base game found):",
            summary.orphaned.len()
        );
        for file in &summary.orphaned {
            log::warn!("  {file}");
        }
        log::warn!(
            "Orphaned content was copied to {}",
            output
                .join(godsort_lib::ORPHAN_DIR)
                .display()
                .if_supports_color(Stdout, |t| t.cyan()),
        );
    }
}

use std::ffi::{OsStr, OsString};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use godsort_core::{ContentMetrics, ConvertProgress, TitleId, temp_extract_name};

use crate::error::ToolError;
use crate::tools::parse::{parse_listing, parse_media_id, parse_title_id, parse_writing_part};
use crate::tools::{DiscTools, Extraction, ToolPaths};

/// [`DiscTools`] backed by the real executables.
///
/// Every call blocks until the tool exits. Tools are never run concurrently.
#[derive(Debug, Clone)]
pub struct ExternalTools {
    paths: ToolPaths,
}

impl ExternalTools {
    pub fn new(paths: ToolPaths) -> Self {
        Self { paths }
    }

    /// Run a tool to completion and return its stdout as text.
    ///
    /// A non-zero exit is logged but not treated as an error: the tools
    /// report partial success through their output, which callers parse.
    fn run(&self, tool: &Path, args: &[&OsStr]) -> Result<String, ToolError> {
        let name = tool_name(tool);
        log::debug!("Running {name} {args:?}");
        let output = Command::new(tool)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ToolError::spawn(&name, e))?;
        if !output.status.success() {
            log::debug!(
                "{name} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// `extract-xiso -c <dir> <dir>.rebuilt.iso`: rebuild without unused
    /// space and without the system-update folder.
    fn compact(&self, extracted_root: &Path) -> Option<PathBuf> {
        let rebuilt = with_suffix(extracted_root, ".rebuilt.iso");
        if let Err(e) = self.run(
            &self.paths.extract_xiso,
            &[OsStr::new("-c"), extracted_root.as_os_str(), rebuilt.as_os_str()],
        ) {
            log::warn!("{e}");
        }
        rebuilt.is_file().then_some(rebuilt)
    }

    /// `extract-xiso -r -d <source dir> <image>`: rewrite the image in place.
    ///
    /// The tool leaves the rewritten image at the original path and the
    /// original at `<image>.old`. The two are swapped back so the source
    /// image is untouched and the rewrite sits at `<image>.rebuilt.iso`.
    fn rewrite(&self, image: &Path) -> Option<PathBuf> {
        let source_dir = image.parent().unwrap_or_else(|| Path::new("."));
        if let Err(e) = self.run(
            &self.paths.extract_xiso,
            &[OsStr::new("-r"), OsStr::new("-d"), source_dir.as_os_str(), image.as_os_str()],
        ) {
            log::warn!("{e}");
            return None;
        }

        let original = with_suffix(image, ".old");
        if !image.is_file() || !original.is_file() {
            return None;
        }
        let rebuilt = with_suffix(image, ".rebuilt.iso");
        if let Err(e) = std::fs::rename(image, &rebuilt) {
            log::warn!("Could not move rewritten image aside: {e}");
            return None;
        }
        if let Err(e) = std::fs::rename(&original, image) {
            log::warn!(
                "Could not restore {} from {}: {e}",
                image.display(),
                original.display()
            );
        }
        Some(rebuilt)
    }
}

impl DiscTools for ExternalTools {
    fn list_contents(&self, image: &Path) -> Result<ContentMetrics, ToolError> {
        let output = self.run(&self.paths.extract_xiso, &[OsStr::new("-l"), image.as_os_str()])?;
        Ok(parse_listing(&output)?)
    }

    fn probe_title_id(&self, image: &Path, output_dir: &Path) -> Option<TitleId> {
        match self.run(
            &self.paths.iso2god,
            &[OsStr::new("--dry-run"), image.as_os_str(), output_dir.as_os_str()],
        ) {
            Ok(output) => parse_title_id(&output),
            Err(e) => {
                log::warn!("{e}");
                None
            }
        }
    }

    fn extract_content(
        &self,
        image: &Path,
        dest_dir: &Path,
        tag: &str,
    ) -> Result<Extraction, ToolError> {
        let root = dest_dir.join(temp_extract_name(tag));
        if let Err(e) = self.run(
            &self.paths.extract_xiso,
            &[OsStr::new("-s"), OsStr::new("-d"), root.as_os_str(), image.as_os_str()],
        ) {
            // Dropping the wrapper removes any partial output
            drop(Extraction::locate(root));
            return Err(e);
        }
        Ok(Extraction::locate(root))
    }

    fn rebuild_image(&self, image: &Path, extraction: Extraction) -> Option<PathBuf> {
        let compacted = self.compact(extraction.root());
        if let Err(e) = extraction.remove() {
            log::warn!("Could not remove extracted tree: {e}");
        }
        compacted.or_else(|| {
            log::debug!(
                "Compaction of {} failed, falling back to in-place rewrite",
                image.display()
            );
            self.rewrite(image)
        })
    }

    fn convert(
        &self,
        image: &Path,
        output_dir: &Path,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<(), ToolError> {
        let name = tool_name(&self.paths.iso2god);
        let mut child = Command::new(&self.paths.iso2god)
            .arg("--trim")
            .arg(image)
            .arg(output_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ToolError::spawn(&name, e))?;

        let mut progress = ConvertProgress::new();
        on_progress(progress.percent());
        if let Some(stdout) = child.stdout.take() {
            for chunk in BufReader::new(stdout).split(b'\n') {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(e.into());
                    }
                };
                let text = String::from_utf8_lossy(&chunk);
                for line in text.split('\r') {
                    if let Some((part, total)) = parse_writing_part(line) {
                        on_progress(progress.observe(part, total));
                    }
                }
            }
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(ToolError::failed(name, status));
        }
        on_progress(progress.complete());
        Ok(())
    }

    fn read_media_id(&self, executable: &Path) -> Option<String> {
        match self.run(&self.paths.xextool, &[OsStr::new("-l"), executable.as_os_str()]) {
            Ok(output) => parse_media_id(&output),
            Err(e) => {
                log::warn!("{e}");
                None
            }
        }
    }
}

fn tool_name(tool: &Path) -> String {
    tool.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| tool.display().to_string())
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}

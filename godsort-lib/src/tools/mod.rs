//! Gateway to the external disc tools.
//!
//! Three command-line tools do the real work: `extract-xiso` (listing,
//! split extraction, rebuilding), `iso2god` (title probe, conversion) and
//! `xextool` (media id of an executable). [`DiscTools`] is the seam the
//! classifier, resolver and batch runner talk to; they never see raw tool
//! output. [`ExternalTools`] is the subprocess-backed implementation.

use std::path::{Path, PathBuf};

use godsort_core::{BUNDLED_EXECUTABLE, CONTENT_DIR, ContentMetrics, TitleId, ZERO_PROFILE_DIR};

use crate::error::{BatchError, ToolError};

mod external;
pub mod parse;

pub use external::ExternalTools;

/// Operations the engine needs from the external tools.
pub trait DiscTools {
    /// List the image and summarize its content folder.
    ///
    /// Fails when the listing has no usable total-size summary.
    fn list_contents(&self, image: &Path) -> Result<ContentMetrics, ToolError>;

    /// Probe the title id without writing anything. `None` is an expected
    /// outcome for malformed images.
    fn probe_title_id(&self, image: &Path, output_dir: &Path) -> Option<TitleId>;

    /// Split-extract the image into `<dest_dir>/_temp_extract_<tag>`.
    fn extract_content(&self, image: &Path, dest_dir: &Path, tag: &str)
    -> Result<Extraction, ToolError>;

    /// Rebuild a compact image from an extracted tree, consuming the tree.
    ///
    /// Returns the path of the rebuilt image, or `None` if both the
    /// compaction and the in-place rewrite failed.
    fn rebuild_image(&self, image: &Path, extraction: Extraction) -> Option<PathBuf>;

    /// Convert an image into `output_dir`, reporting percent complete.
    fn convert(
        &self,
        image: &Path,
        output_dir: &Path,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<(), ToolError>;

    /// Read the media id from an executable's metadata.
    fn read_media_id(&self, executable: &Path) -> Option<String>;
}

/// A temporary extraction tree.
///
/// The tree is removed when the value is dropped, so every exit path of the
/// caller cleans up. Call [`Extraction::remove`] to observe removal errors.
#[derive(Debug)]
pub struct Extraction {
    root: PathBuf,
    content_root: Option<PathBuf>,
    removed: bool,
}

impl Extraction {
    /// Wrap an extracted tree and locate its content root: a top-level
    /// folder named `content` (any case) holding the all-zero profile folder.
    pub fn locate(root: PathBuf) -> Self {
        let content_root = find_entry_ci(&root, CONTENT_DIR)
            .map(|content| content.join(ZERO_PROFILE_DIR))
            .filter(|zero| zero.is_dir());
        Self {
            root,
            content_root,
            removed: false,
        }
    }

    /// Overall extraction root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `content/0000000000000000` folder, if the disc has one.
    pub fn content_root(&self) -> Option<&Path> {
        self.content_root.as_deref()
    }

    /// The bundled executable at the extraction root, if present.
    pub fn executable(&self) -> Option<PathBuf> {
        find_entry_ci(&self.root, BUNDLED_EXECUTABLE).filter(|p| p.is_file())
    }

    /// Remove the tree now.
    pub fn remove(mut self) -> std::io::Result<()> {
        self.removed = true;
        remove_tree(&self.root)
    }
}

impl Drop for Extraction {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = remove_tree(&self.root) {
            log::warn!(
                "Could not remove extraction folder {}: {e}",
                self.root.display()
            );
        }
    }
}

fn remove_tree(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Find a direct child of `dir` whose name matches `name` case-insensitively.
fn find_entry_ci(dir: &Path, name: &str) -> Option<PathBuf> {
    std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .find(|e| e.file_name().to_string_lossy().eq_ignore_ascii_case(name))
        .map(|e| e.path())
}

/// Resolved locations of the tools and the gamelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub extract_xiso: PathBuf,
    pub iso2god: PathBuf,
    pub xextool: PathBuf,
    pub gamelist: PathBuf,
}

impl ToolPaths {
    /// Every prerequisite with a display name.
    pub fn prerequisites(&self) -> [(&'static str, &Path); 4] {
        [
            ("extract-xiso", self.extract_xiso.as_path()),
            ("iso2god", self.iso2god.as_path()),
            ("xextool", self.xextool.as_path()),
            ("gamelist", self.gamelist.as_path()),
        ]
    }

    /// Prerequisites that do not exist on disk.
    pub fn missing(&self) -> Vec<(&'static str, PathBuf)> {
        self.prerequisites()
            .into_iter()
            .filter(|(_, path)| !path.is_file())
            .map(|(name, path)| (name, path.to_path_buf()))
            .collect()
    }

    /// Fail if any prerequisite is missing. Runs once before a batch.
    pub fn preflight(&self) -> Result<(), BatchError> {
        let missing = self.missing();
        if missing.is_empty() {
            return Ok(());
        }
        Err(BatchError::MissingPrerequisites(
            missing
                .into_iter()
                .map(|(_, path)| path.display().to_string())
                .collect(),
        ))
    }
}

#[cfg(test)]
#[path = "../tests/tools_tests.rs"]
mod tests;

//! The on-disk output library.
//!
//! Layout:
//! - `<root>/<title id>/...` for materialized titles
//! - `<root>/<title id>/00000002/...` for DLC merged into a title
//! - `<root>/DLC/<image file>/00000002/...` for DLC with no base title

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use godsort_core::{ORPHAN_DIR, SECONDARY_CONTENT_DIR, TitleId};

/// Handle on the output root.
#[derive(Debug, Clone)]
pub struct Library {
    root: PathBuf,
}

impl Library {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn title_dir(&self, title_id: &TitleId) -> PathBuf {
        self.root.join(title_id.as_str())
    }

    /// Where DLC for `title_id` is merged.
    pub fn secondary_content_dir(&self, title_id: &TitleId) -> PathBuf {
        self.title_dir(title_id).join(SECONDARY_CONTENT_DIR)
    }

    /// Quarantine folder for DLC from `image_file_name` with no base title.
    pub fn orphan_dir(&self, image_file_name: &str) -> PathBuf {
        self.root
            .join(ORPHAN_DIR)
            .join(image_file_name)
            .join(SECONDARY_CONTENT_DIR)
    }

    /// Title folders already present under the root.
    pub fn existing_titles(&self) -> io::Result<HashSet<TitleId>> {
        let mut titles = HashSet::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Ok(id) = entry.file_name().to_string_lossy().parse::<TitleId>() {
                titles.insert(id);
            }
        }
        Ok(titles)
    }

    /// Copy a disc's content folder into the root and return the title
    /// folders it contributed.
    pub fn install_content(&self, content_root: &Path) -> io::Result<Vec<TitleId>> {
        merge_tree(content_root, &self.root)?;
        let mut titles = Vec::new();
        for entry in fs::read_dir(content_root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Ok(id) = entry.file_name().to_string_lossy().parse::<TitleId>() {
                titles.push(id);
            }
        }
        Ok(titles)
    }
}

/// Overlay `src` onto `dst`: directories are created as needed, same-named
/// files are overwritten, and nothing already in `dst` is removed.
///
/// Returns the number of files copied.
pub fn merge_tree(src: &Path, dst: &Path) -> io::Result<usize> {
    fs::create_dir_all(dst)?;
    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
#[path = "tests/library_tests.rs"]
mod tests;

//! Source directory enumeration.

use std::path::{Path, PathBuf};

use godsort_core::ImageRecord;

/// Suffix of images produced by a rebuild; leftovers from an interrupted run.
const REBUILT_SUFFIX: &str = ".rebuilt.iso";

/// Image files directly inside `source` with the given extension
/// (case-insensitive), sorted by path.
pub fn scan_images(source: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if !matches {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
        if name.ends_with(REBUILT_SUFFIX) {
            log::debug!("Skipping leftover rebuilt image {}", path.display());
            continue;
        }
        images.push(path);
    }
    images.sort();
    Ok(images)
}

/// Fresh records for every image, ready for classification.
pub fn image_records(images: Vec<PathBuf>) -> Vec<ImageRecord> {
    images.into_iter().map(ImageRecord::new).collect()
}

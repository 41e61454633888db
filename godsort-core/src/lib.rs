use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod disc;
pub mod error;
pub mod progress;
pub mod title;

pub use disc::{ClassifierThresholds, ContentMetrics, DiscCategory};
pub use error::CoreError;
pub use progress::ConvertProgress;
pub use title::TitleId;

/// Name of the top-level folder holding installable content on a disc.
pub const CONTENT_DIR: &str = "content";

/// The all-zero profile folder nested under `content/`.
pub const ZERO_PROFILE_DIR: &str = "0000000000000000";

/// Sub-folder of a title directory that receives DLC (marketplace) content.
pub const SECONDARY_CONTENT_DIR: &str = "00000002";

/// Folder under the DLC placeholder title that holds the installable payload.
pub const DLC_PAYLOAD_DIR: &str = "FFFFFFFF";

/// Executable bundled at the root of a DLC disc, carrying the media id.
pub const BUNDLED_EXECUTABLE: &str = "default.xex";

/// Folder under the output root that collects DLC with no base game.
pub const ORPHAN_DIR: &str = "DLC";

/// One input disc image for the duration of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Full path to the image file.
    pub path: PathBuf,

    /// Title id probed from the image (absent for malformed images).
    pub title_id: Option<TitleId>,

    /// Category assigned by the classifier.
    pub category: DiscCategory,

    /// Share of the image occupied by the content folder, if known.
    pub content_ratio: Option<f64>,
}

impl ImageRecord {
    /// Create an unclassified record for an image.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            title_id: None,
            category: DiscCategory::Invalid,
            content_ratio: None,
        }
    }

    /// The image's file name, used in logs and as the orphan folder name.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("?")
    }

    /// Record the classifier's decision.
    pub fn assign(&mut self, category: DiscCategory, title_id: Option<TitleId>, ratio: Option<f64>) {
        self.category = category;
        self.title_id = title_id;
        self.content_ratio = ratio;
    }

    /// Title id for log lines: the id, or an empty string when none was found.
    pub fn id_label(&self) -> &str {
        self.title_id.as_ref().map(TitleId::as_str).unwrap_or("")
    }
}

/// Name of the temporary extraction folder for a given tag.
pub fn temp_extract_name(tag: &str) -> String {
    format!("_temp_extract_{tag}")
}

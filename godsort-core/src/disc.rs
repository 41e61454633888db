//! Disc categories and the content-share heuristic that separates them.
//!
//! A disc whose `content/` folder dominates the image is an installer
//! package rather than a playable game. Demo packages also have a large
//! content share, so their content type is excluded explicitly. The
//! thresholds are empirical and live in [`ClassifierThresholds`] so they can
//! be tuned from settings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::title::TitleId;

/// Processing path chosen for a disc image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscCategory {
    /// Playable disc: converted to the distribution format.
    Play,
    /// Standalone install disc: content folder extracted into the library.
    Install,
    /// DLC disc: merged into its base title after all other discs.
    Dlc,
    /// No listing summary or no title id: skipped.
    Invalid,
}

impl DiscCategory {
    /// Short label used in progress lines ("is a play disc").
    pub fn label(&self) -> &'static str {
        match self {
            DiscCategory::Play => "play",
            DiscCategory::Install => "install",
            DiscCategory::Dlc => "DLC",
            DiscCategory::Invalid => "invalid",
        }
    }

    /// Uppercase tag used in the log stream.
    pub fn log_tag(&self) -> &'static str {
        match self {
            DiscCategory::Play => "PLAY DISC",
            DiscCategory::Install => "INSTALL DISC",
            DiscCategory::Dlc => "DLC DISC",
            DiscCategory::Invalid => "INVALID DISC",
        }
    }
}

impl fmt::Display for DiscCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Content statistics for one image, parsed from the lister's output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentMetrics {
    /// Id of the title folder under `content/0000000000000000/`, if any.
    pub content_id: Option<String>,
    /// Content-type folder under the title folder (e.g. `00080000`).
    pub content_type: Option<String>,
    /// Sum of all file sizes under the content folder.
    pub content_size: u64,
    /// Total image size from the listing summary.
    pub image_size: u64,
}

impl ContentMetrics {
    /// Content size over image size, clamped to 1.0.
    ///
    /// `None` when the image size is zero: such an image cannot be classified.
    pub fn ratio(&self) -> Option<f64> {
        if self.image_size == 0 {
            return None;
        }
        Some((self.content_size as f64 / self.image_size as f64).min(1.0))
    }
}

/// Tunable constants of the classification rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Minimum content share for an install-type disc.
    pub install_ratio: f64,
    /// Content type reserved for demo packages; never install-type.
    pub demo_content_type: String,
    /// Shared placeholder title id carried by DLC discs.
    pub dlc_title_id: String,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            install_ratio: 0.5,
            demo_content_type: "00080000".to_string(),
            dlc_title_id: "FFED2000".to_string(),
        }
    }
}

impl ClassifierThresholds {
    /// Reject ratios outside `0.0..=1.0`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0.0..=1.0).contains(&self.install_ratio) {
            return Err(CoreError::invalid_threshold(format!(
                "install_ratio must be between 0 and 1, got {}",
                self.install_ratio
            )));
        }
        Ok(())
    }

    /// Whether the metrics describe an install-type disc.
    pub fn is_install_type(&self, metrics: &ContentMetrics) -> bool {
        let is_demo = metrics
            .content_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(&self.demo_content_type));
        match metrics.ratio() {
            Some(ratio) => !is_demo && ratio >= self.install_ratio,
            None => false,
        }
    }

    /// Apply the classification rule.
    ///
    /// An image with no title id, or whose ratio is undefined, is `Invalid`.
    /// Install-type discs are `Dlc` when they carry the placeholder title id
    /// and `Install` otherwise; everything else is `Play`.
    pub fn categorize(&self, metrics: &ContentMetrics, title_id: Option<&TitleId>) -> DiscCategory {
        let Some(title_id) = title_id else {
            return DiscCategory::Invalid;
        };
        if metrics.ratio().is_none() {
            return DiscCategory::Invalid;
        }
        if !self.is_install_type(metrics) {
            return DiscCategory::Play;
        }
        if *title_id == *self.dlc_title_id {
            DiscCategory::Dlc
        } else {
            DiscCategory::Install
        }
    }
}

#[cfg(test)]
#[path = "tests/disc_tests.rs"]
mod tests;

//! Disc classification: play, install, DLC or invalid.

use std::path::Path;

use godsort_core::{ClassifierThresholds, ContentMetrics, DiscCategory, TitleId};

use crate::tools::DiscTools;

/// Result of classifying one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: DiscCategory,
    pub title_id: Option<TitleId>,
    /// Listing metrics; absent when the listing could not be parsed.
    pub metrics: Option<ContentMetrics>,
}

impl Classification {
    fn invalid(metrics: Option<ContentMetrics>) -> Self {
        Self {
            category: DiscCategory::Invalid,
            title_id: None,
            metrics,
        }
    }

    pub fn ratio(&self) -> Option<f64> {
        self.metrics.as_ref().and_then(ContentMetrics::ratio)
    }
}

/// Decides each image's category from the listing and the title probe.
pub struct DiscClassifier<'a, T: DiscTools + ?Sized> {
    tools: &'a T,
    thresholds: &'a ClassifierThresholds,
}

impl<'a, T: DiscTools + ?Sized> DiscClassifier<'a, T> {
    pub fn new(tools: &'a T, thresholds: &'a ClassifierThresholds) -> Self {
        Self { tools, thresholds }
    }

    /// Classify `image`. `output_dir` is only handed to the dry-run probe.
    pub fn classify(&self, image: &Path, output_dir: &Path) -> Classification {
        let file_name = image.file_name().and_then(|n| n.to_str()).unwrap_or("?");

        let metrics = match self.tools.list_contents(image) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("{file_name}: ID_ - Listing unusable: {e}");
                return Classification::invalid(None);
            }
        };

        let Some(title_id) = self.tools.probe_title_id(image, output_dir) else {
            log::warn!("{file_name}: ID_ - No title id found");
            return Classification::invalid(Some(metrics));
        };

        if let Some(ratio) = metrics.ratio() {
            log::info!(
                "{file_name}: ID_{title_id} - Content takes {:.2}% of disc size",
                ratio * 100.0
            );
        }

        let category = self.thresholds.categorize(&metrics, Some(&title_id));
        log::info!("{file_name}: ID_{title_id} - {}", category.log_tag());

        Classification {
            category,
            title_id: (category != DiscCategory::Invalid).then_some(title_id),
            metrics: Some(metrics),
        }
    }
}

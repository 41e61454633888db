//! Two-pass batch processing.
//!
//! Pass 1 classifies every image in enumeration order and immediately
//! converts play discs and extracts install discs; DLC discs are only
//! queued. Pass 2 resolves the queue in its original order. Pass 2 can only
//! start from a [`FirstPass`], which carries the set of titles materialized
//! so far, so every base title in the batch exists before any DLC merge is
//! attempted regardless of where it sits in the input.

use std::collections::HashSet;
use std::path::Path;

use godsort_core::{ClassifierThresholds, DiscCategory, ImageRecord, TitleId};
use godsort_gamelist::BaseGameIndex;

use crate::classifier::DiscClassifier;
use crate::error::BatchError;
use crate::library::Library;
use crate::resolver::{DlcOutcome, DlcResolver};
use crate::tools::{DiscTools, Extraction};

/// Progress events for frontends.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchProgress {
    /// The batch is starting with `total` images.
    Started { total: usize },
    /// An image was classified (1-based `index`).
    Classified {
        index: usize,
        total: usize,
        file_name: String,
        category: DiscCategory,
        title_id: Option<TitleId>,
    },
    /// Extracting an image's content folder.
    Extracting { file_name: String },
    /// Rebuilding a compact image before conversion.
    Rebuilding { file_name: String },
    /// Rebuild finished; `success` is false when the original image is used.
    Rebuilt { file_name: String, success: bool },
    /// Conversion percent complete.
    Converting { file_name: String, percent: u8 },
    /// A deferred DLC image is being resolved (1-based `index` from pass 1).
    Resolving {
        index: usize,
        total: usize,
        file_name: String,
    },
    /// Processing of one image finished.
    ItemDone { file_name: String },
    /// The whole batch finished.
    Done,
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Play discs converted: (image file, title id)
    pub converted: Vec<(String, TitleId)>,
    /// Install discs extracted: (image file, title id)
    pub installed: Vec<(String, TitleId)>,
    /// Images skipped as invalid
    pub invalid: Vec<String>,
    /// DLC merged: (image file, base title ids)
    pub merged: Vec<(String, Vec<TitleId>)>,
    /// DLC images needing manual attention, each listed once
    pub orphaned: Vec<String>,
    /// Play/install images that failed: (image file, reason)
    pub failed: Vec<(String, String)>,
    /// Play discs converted from a rebuilt image
    pub rebuilt: usize,
}

impl BatchSummary {
    /// Number of images that reached a final state.
    pub fn total(&self) -> usize {
        self.converted.len()
            + self.installed.len()
            + self.invalid.len()
            + self.merged.len()
            + self.orphaned.len()
            + self.failed.len()
    }

    pub fn has_orphans(&self) -> bool {
        !self.orphaned.is_empty()
    }
}

/// State handed from pass 1 to pass 2.
#[derive(Debug)]
pub struct FirstPass {
    /// Titles present in the output root after pass 1.
    pub materialized: HashSet<TitleId>,
    /// DLC images in enumeration order, with their 1-based position.
    pub deferred: Vec<(usize, ImageRecord)>,
    total: usize,
}

/// Runs the two-pass batch over a set of image records.
pub struct BatchRunner<'a, T: DiscTools + ?Sized> {
    tools: &'a T,
    index: &'a BaseGameIndex,
    library: Library,
    thresholds: &'a ClassifierThresholds,
}

impl<'a, T: DiscTools + ?Sized> BatchRunner<'a, T> {
    pub fn new(
        tools: &'a T,
        index: &'a BaseGameIndex,
        library: Library,
        thresholds: &'a ClassifierThresholds,
    ) -> Self {
        Self {
            tools,
            index,
            library,
            thresholds,
        }
    }

    /// Classify every image without touching the output (dry run).
    pub fn plan(
        &self,
        mut records: Vec<ImageRecord>,
        on_progress: &dyn Fn(BatchProgress),
    ) -> Vec<ImageRecord> {
        let total = records.len();
        on_progress(BatchProgress::Started { total });
        for (i, record) in records.iter_mut().enumerate() {
            self.classify(record);
            on_progress(classified(i + 1, total, record));
        }
        on_progress(BatchProgress::Done);
        records
    }

    /// Run both passes.
    ///
    /// Titles already in the output root count as materialized. Fails only
    /// if the output root cannot be read; per-image problems are recorded in
    /// the summary.
    pub fn run(
        &self,
        records: Vec<ImageRecord>,
        on_progress: &dyn Fn(BatchProgress),
    ) -> Result<BatchSummary, BatchError> {
        let existing = self
            .library
            .existing_titles()
            .map_err(|source| BatchError::Output {
                path: self.library.root().to_path_buf(),
                source,
            })?;
        if !existing.is_empty() {
            log::debug!("{} titles already in the output folder", existing.len());
        }

        on_progress(BatchProgress::Started {
            total: records.len(),
        });
        let mut summary = BatchSummary::default();
        let first = self.dispatch(records, existing, &mut summary, on_progress);
        self.resolve_deferred(first, &mut summary, on_progress);
        on_progress(BatchProgress::Done);
        Ok(summary)
    }

    /// Pass 1: classify, process play and install discs, queue DLC discs.
    pub fn dispatch(
        &self,
        records: Vec<ImageRecord>,
        mut materialized: HashSet<TitleId>,
        summary: &mut BatchSummary,
        on_progress: &dyn Fn(BatchProgress),
    ) -> FirstPass {
        let total = records.len();
        let mut deferred = Vec::new();

        for (i, mut record) in records.into_iter().enumerate() {
            self.classify(&mut record);
            on_progress(classified(i + 1, total, &record));
            let file_name = record.file_name().to_string();

            let Some(title_id) = record.title_id.clone() else {
                summary.invalid.push(file_name);
                continue;
            };

            match record.category {
                DiscCategory::Dlc => {
                    deferred.push((i + 1, record));
                    continue;
                }
                DiscCategory::Install => {
                    self.process_install(&record, &title_id, &mut materialized, summary, on_progress)
                }
                DiscCategory::Play => {
                    self.process_play(&record, &title_id, &mut materialized, summary, on_progress)
                }
                DiscCategory::Invalid => summary.invalid.push(file_name.clone()),
            }
            on_progress(BatchProgress::ItemDone { file_name });
        }

        FirstPass {
            materialized,
            deferred,
            total,
        }
    }

    /// Pass 2: resolve queued DLC images against the titles from pass 1.
    pub fn resolve_deferred(
        &self,
        first: FirstPass,
        summary: &mut BatchSummary,
        on_progress: &dyn Fn(BatchProgress),
    ) {
        let resolver = DlcResolver::new(
            self.tools,
            self.index,
            &self.library,
            &self.thresholds.dlc_title_id,
        );

        for (index, record) in first.deferred {
            let file_name = record.file_name().to_string();
            on_progress(BatchProgress::Resolving {
                index,
                total: first.total,
                file_name: file_name.clone(),
            });

            match resolver.resolve(&record.path, &first.materialized) {
                Ok(DlcOutcome::Merged(titles)) => summary.merged.push((file_name.clone(), titles)),
                Ok(DlcOutcome::Orphaned { .. }) => summary.orphaned.push(file_name.clone()),
                Err(e) => {
                    log::error!(
                        "{file_name}: ID_{} - DLC DISC - Copy failed: {e}",
                        self.thresholds.dlc_title_id
                    );
                    summary.orphaned.push(file_name.clone());
                }
            }
            on_progress(BatchProgress::ItemDone { file_name });
        }
    }

    fn classify(&self, record: &mut ImageRecord) {
        let classification = DiscClassifier::new(self.tools, self.thresholds)
            .classify(&record.path, self.library.root());
        let ratio = classification.ratio();
        record.assign(classification.category, classification.title_id, ratio);
    }

    /// Extract an install disc's content folder into the library.
    fn process_install(
        &self,
        record: &ImageRecord,
        title_id: &TitleId,
        materialized: &mut HashSet<TitleId>,
        summary: &mut BatchSummary,
        on_progress: &dyn Fn(BatchProgress),
    ) {
        let file_name = record.file_name().to_string();
        on_progress(BatchProgress::Extracting {
            file_name: file_name.clone(),
        });

        let extraction = match self.extract(record, title_id) {
            Some(ex) => ex,
            None => {
                summary.failed.push((file_name, "extraction failed".to_string()));
                return;
            }
        };
        let Some(content) = extraction.content_root() else {
            log::warn!("{file_name}: ID_{title_id} - No installable content");
            summary.failed.push((file_name, "no installable content".to_string()));
            return;
        };

        match self.library.install_content(content) {
            Ok(titles) => {
                materialized.extend(titles);
                if self.library.title_dir(title_id).is_dir() {
                    materialized.insert(title_id.clone());
                }
                summary.installed.push((file_name.clone(), title_id.clone()));
            }
            Err(e) => {
                log::error!("{file_name}: ID_{title_id} - Install failed: {e}");
                summary.failed.push((file_name.clone(), e.to_string()));
            }
        }

        if let Err(e) = extraction.remove() {
            log::warn!("{file_name}: ID_{title_id} - Could not remove extraction: {e}");
        }
    }

    /// Extract side content, rebuild, then convert a play disc.
    fn process_play(
        &self,
        record: &ImageRecord,
        title_id: &TitleId,
        materialized: &mut HashSet<TitleId>,
        summary: &mut BatchSummary,
        on_progress: &dyn Fn(BatchProgress),
    ) {
        let file_name = record.file_name().to_string();
        on_progress(BatchProgress::Extracting {
            file_name: file_name.clone(),
        });

        let extraction = self.extract(record, title_id);
        if let Some(content) = extraction.as_ref().and_then(Extraction::content_root) {
            match self.library.install_content(content) {
                Ok(titles) => {
                    log::info!("{file_name}: ID_{title_id} - Extracted installable content");
                    materialized.extend(titles);
                }
                Err(e) => {
                    log::warn!("{file_name}: ID_{title_id} - Side content copy failed: {e}")
                }
            }
        }

        on_progress(BatchProgress::Rebuilding {
            file_name: file_name.clone(),
        });
        let rebuilt = extraction.and_then(|ex| self.tools.rebuild_image(&record.path, ex));
        if rebuilt.is_some() {
            log::info!("{file_name}: ID_{title_id} - Rebuild SUCCEEDED");
            summary.rebuilt += 1;
        } else {
            log::warn!("{file_name}: ID_{title_id} - Rebuild FAILED, using the original image");
        }
        on_progress(BatchProgress::Rebuilt {
            file_name: file_name.clone(),
            success: rebuilt.is_some(),
        });

        let source: &Path = rebuilt.as_deref().unwrap_or(&record.path);
        let result = self
            .tools
            .convert(source, self.library.root(), &mut |percent| {
                on_progress(BatchProgress::Converting {
                    file_name: file_name.clone(),
                    percent,
                })
            });

        if let Some(path) = &rebuilt {
            if let Err(e) = std::fs::remove_file(path) {
                log::warn!("{file_name}: ID_{title_id} - Could not delete rebuilt image: {e}");
            }
        }

        match result {
            Ok(()) => {
                materialized.insert(title_id.clone());
                summary.converted.push((file_name, title_id.clone()));
            }
            Err(e) => {
                log::error!("{file_name}: ID_{title_id} - Conversion failed: {e}");
                summary.failed.push((file_name, e.to_string()));
            }
        }
    }

    fn extract(&self, record: &ImageRecord, title_id: &TitleId) -> Option<Extraction> {
        match self
            .tools
            .extract_content(&record.path, self.library.root(), title_id.as_str())
        {
            Ok(ex) => Some(ex),
            Err(e) => {
                log::warn!(
                    "{}: ID_{title_id} - Extraction failed: {e}",
                    record.file_name()
                );
                None
            }
        }
    }
}

fn classified(index: usize, total: usize, record: &ImageRecord) -> BatchProgress {
    BatchProgress::Classified {
        index,
        total,
        file_name: record.file_name().to_string(),
        category: record.category,
        title_id: record.title_id.clone(),
    }
}

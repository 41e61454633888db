//! DLC resolution: merge a DLC disc into its base titles or quarantine it.
//!
//! The base title is found through the media id of the executable bundled
//! on the DLC disc. Merging only targets titles in the materialized set the
//! batch hands in, never a filesystem probe of its own.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use godsort_core::{DLC_PAYLOAD_DIR, TitleId};
use godsort_gamelist::BaseGameIndex;

use crate::library::{Library, merge_tree};
use crate::tools::DiscTools;

/// What happened to one DLC image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DlcOutcome {
    /// Payload merged into each listed base title.
    Merged(Vec<TitleId>),
    /// No base title available. `quarantine` is where the payload was put,
    /// or `None` when the disc had no payload to keep.
    Orphaned { quarantine: Option<PathBuf> },
}

/// Resolves DLC discs against the gamelist and the materialized titles.
pub struct DlcResolver<'a, T: DiscTools + ?Sized> {
    tools: &'a T,
    index: &'a BaseGameIndex,
    library: &'a Library,
    dlc_title_id: &'a str,
}

impl<'a, T: DiscTools + ?Sized> DlcResolver<'a, T> {
    pub fn new(
        tools: &'a T,
        index: &'a BaseGameIndex,
        library: &'a Library,
        dlc_title_id: &'a str,
    ) -> Self {
        Self {
            tools,
            index,
            library,
            dlc_title_id,
        }
    }

    /// Resolve one DLC image.
    ///
    /// Tool failures count as "nothing found" and end in `Orphaned`. Only
    /// filesystem errors while copying the payload are returned. The
    /// temporary extraction is removed on every path.
    pub fn resolve(
        &self,
        image: &Path,
        materialized: &HashSet<TitleId>,
    ) -> io::Result<DlcOutcome> {
        let file_name = image.file_name().and_then(|n| n.to_str()).unwrap_or("?");
        let tag = self.dlc_title_id;

        let extraction = match self.tools.extract_content(image, self.library.root(), tag) {
            Ok(ex) => ex,
            Err(e) => {
                log::warn!("{file_name}: ID_{tag} - DLC DISC - Extraction failed: {e}");
                return Ok(DlcOutcome::Orphaned { quarantine: None });
            }
        };

        let payload = extraction
            .content_root()
            .map(|content| content.join(tag).join(DLC_PAYLOAD_DIR))
            .filter(|p| p.is_dir());

        let media_id = match extraction.executable() {
            Some(xex) => self.tools.read_media_id(&xex),
            None => {
                log::warn!("{file_name}: ID_{tag} - DLC DISC - No bundled executable");
                None
            }
        };
        let candidates = self.candidates(file_name, media_id.as_deref());

        let Some(payload) = payload else {
            log::warn!("{file_name}: ID_{tag} - DLC DISC - No DLC payload on disc");
            extraction.remove()?;
            return Ok(DlcOutcome::Orphaned { quarantine: None });
        };

        let mut merged = Vec::new();
        for title_id in candidates {
            if !materialized.contains(title_id) {
                continue;
            }
            log::info!("{file_name}: ID_{tag} - DLC DISC - Base game ID {title_id}");
            merge_tree(&payload, &self.library.secondary_content_dir(title_id))?;
            merged.push(title_id.clone());
        }

        let outcome = if merged.is_empty() {
            log::info!("{file_name}: ID_{tag} - DLC DISC - No base game found");
            let quarantine = self.library.orphan_dir(file_name);
            merge_tree(&payload, &quarantine)?;
            DlcOutcome::Orphaned {
                quarantine: Some(quarantine),
            }
        } else {
            DlcOutcome::Merged(merged)
        };

        extraction.remove()?;
        Ok(outcome)
    }

    /// Base-title candidates for a media id; empty when it is unknown.
    fn candidates(&self, file_name: &str, media_id: Option<&str>) -> &'a [TitleId] {
        let Some(media_id) = media_id else {
            log::warn!("{file_name}: ID_{} - DLC DISC - No media id", self.dlc_title_id);
            return &[];
        };
        let found = self.index.lookup(media_id);
        log::debug!(
            "{file_name}: media id {media_id} matches {} gamelist title(s)",
            found.len()
        );
        found
    }
}

//! Media-id index over the gamelist.
//!
//! Several releases (regions, editions) can share one media id, so a lookup
//! returns every matching title id. The index is built once and is read-only
//! afterwards.

use std::collections::HashMap;
use std::path::Path;

use godsort_core::TitleId;

use crate::error::GamelistError;
use crate::gamelist::{GamelistRow, parse_gamelist_file};

/// An index of base title ids keyed by uppercase media id.
#[derive(Debug, Default)]
pub struct BaseGameIndex {
    by_media_id: HashMap<String, Vec<TitleId>>,
    rows: usize,
}

impl BaseGameIndex {
    /// Build an index from parsed rows. Repeated (media id, title id) pairs
    /// are stored once.
    pub fn from_rows(rows: Vec<GamelistRow>) -> Self {
        let mut by_media_id: HashMap<String, Vec<TitleId>> = HashMap::new();
        let count = rows.len();

        for row in rows {
            let titles = by_media_id.entry(row.media_id).or_default();
            if !titles.contains(&row.title_id) {
                titles.push(row.title_id);
            }
        }

        Self {
            by_media_id,
            rows: count,
        }
    }

    /// Load and index a gamelist CSV file.
    pub fn load(path: &Path) -> Result<Self, GamelistError> {
        let rows = parse_gamelist_file(path)?;
        let index = Self::from_rows(rows);
        log::debug!(
            "Loaded gamelist {}: {} rows, {} media ids",
            path.display(),
            index.rows,
            index.media_id_count()
        );
        Ok(index)
    }

    /// All base title ids sharing `media_id` (case-insensitive). Empty when
    /// the media id is unknown.
    pub fn lookup(&self, media_id: &str) -> &[TitleId] {
        let key = media_id.trim().to_ascii_uppercase();
        self.by_media_id
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of rows the index was built from.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Number of distinct media ids.
    pub fn media_id_count(&self) -> usize {
        self.by_media_id.len()
    }
}

//! Gamelist CSV parser.
//!
//! The table is a plain CSV with one row per release. Only two columns
//! matter here: the title id and the media id. Rows are read without header
//! handling; a header row simply never matches a real media id.

use std::io::Read;
use std::path::Path;

use godsort_core::TitleId;

use crate::error::GamelistError;

/// CSV column holding the title id.
pub const TITLE_ID_COLUMN: usize = 1;

/// CSV column holding the media id.
pub const MEDIA_ID_COLUMN: usize = 6;

/// One usable row of the gamelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamelistRow {
    pub title_id: TitleId,
    /// Uppercase media id
    pub media_id: String,
}

/// Parse a gamelist CSV file from disk.
pub fn parse_gamelist_file(path: &Path) -> Result<Vec<GamelistRow>, GamelistError> {
    let mut file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    // The published list is not always valid UTF-8
    let contents = String::from_utf8_lossy(&bytes);
    parse_gamelist_csv(&contents)
}

/// Parse gamelist CSV content from a string.
pub fn parse_gamelist_csv(content: &str) -> Result<Vec<GamelistRow>, GamelistError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping malformed gamelist CSV row: {e}");
                continue;
            }
        };

        let (Some(title), Some(media)) = (record.get(TITLE_ID_COLUMN), record.get(MEDIA_ID_COLUMN))
        else {
            continue;
        };

        let media_id = media.trim().to_ascii_uppercase();
        if media_id.is_empty() {
            continue;
        }
        let Ok(title_id) = title.parse::<TitleId>() else {
            continue;
        };

        rows.push(GamelistRow { title_id, media_id });
    }

    Ok(rows)
}

//! Parsers for the text the external tools print.
//!
//! These are pure functions over captured output so they can be tested
//! without the tools installed.

use std::sync::LazyLock;

use regex::Regex;

use godsort_core::{ContentMetrics, TitleId};

use crate::error::ListingError;

/// A file under the content folder: `\content\<16 zeros>\<id>\... (<N> bytes)`.
static CONTENT_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\\content\\0{16}\\([A-Z0-9]{8})\\.* \((\d+) bytes\)").expect("static pattern")
});

/// The content-type folder: `\content\<16 zeros>\<id>\<type>\ (0 bytes)`.
static CONTENT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\\content\\0{16}\\[A-Z0-9]{8}\\([A-Z0-9]{8})\\ \(0 bytes\)")
        .expect("static pattern")
});

/// Trailing summary: `... total <N> bytes`.
static TOTAL_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)total (\d+) bytes$").expect("static pattern"));

static TITLE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*Title ID:\s*([A-Z0-9]{8})\b").expect("static pattern")
});

static WRITING_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*writing part +(\d+) of (\d+)").expect("static pattern")
});

const MEDIA_ID_MARKER: &str = "media id:";

/// Parse an `extract-xiso -l` listing into content metrics.
///
/// The content size is the sum of every entry under the content folder; the
/// content id and type are the last ones seen. The image size comes from the
/// final non-empty line.
pub fn parse_listing(output: &str) -> Result<ContentMetrics, ListingError> {
    let mut metrics = ContentMetrics::default();

    for line in output.lines() {
        let line = line.trim_end();
        if let Some(caps) = CONTENT_ENTRY.captures(line) {
            metrics.content_id = Some(caps[1].to_ascii_uppercase());
            if let Ok(size) = caps[2].parse::<u64>() {
                metrics.content_size = metrics.content_size.saturating_add(size);
            }
        }
        if let Some(caps) = CONTENT_TYPE.captures(line) {
            metrics.content_type = Some(caps[1].to_ascii_uppercase());
        }
    }

    let summary = output
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .ok_or(ListingError::MissingSummary)?;
    let image_size = TOTAL_SIZE
        .captures(summary)
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .ok_or(ListingError::MissingSummary)?;
    if image_size == 0 {
        return Err(ListingError::ZeroImageSize);
    }
    metrics.image_size = image_size;

    Ok(metrics)
}

/// First `Title ID: XXXXXXXX` line of an `iso2god --dry-run` probe.
pub fn parse_title_id(output: &str) -> Option<TitleId> {
    output
        .lines()
        .find_map(|line| TITLE_ID.captures(line))
        .and_then(|caps| caps[1].parse().ok())
}

/// Media id from the first `Media Id:` line of an `xextool -l` dump.
pub fn parse_media_id(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let pos = line.to_ascii_lowercase().find(MEDIA_ID_MARKER)?;
        let value = line[pos + MEDIA_ID_MARKER.len()..]
            .split_whitespace()
            .next()?
            .to_ascii_uppercase();
        Some(value)
    })
}

/// `(part, total)` from a `writing part <i> of <n>` converter line.
pub fn parse_writing_part(line: &str) -> Option<(u32, u32)> {
    let caps = WRITING_PART.captures(line)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

#[cfg(test)]
#[path = "../tests/parse_tests.rs"]
mod tests;

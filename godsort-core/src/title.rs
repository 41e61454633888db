//! Title identifiers.
//!
//! Every disc carries an 8-character alphanumeric title id (usually hex).
//! Ids are normalized to uppercase on construction so that comparisons are
//! case-insensitive by construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Length of a title id in characters.
pub const TITLE_ID_LEN: usize = 8;

/// An uppercase-normalized 8-character title identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TitleId(String);

impl TitleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a string looks like a title id (used to recognize title
    /// folders in the output tree).
    pub fn is_valid(s: &str) -> bool {
        s.len() == TITLE_ID_LEN && s.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

impl FromStr for TitleId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if Self::is_valid(trimmed) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(CoreError::invalid_title_id(s))
        }
    }
}

impl TryFrom<String> for TitleId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TitleId> for String {
    fn from(id: TitleId) -> Self {
        id.0
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for TitleId {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for TitleId {
    fn eq(&self, other: &&str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

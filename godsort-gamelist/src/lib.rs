//! Xbox 360 gamelist table: media id → base title ids.
//!
//! DLC discs do not carry their base game's title id; the bundled
//! executable only exposes a media id. This crate loads the static gamelist
//! CSV once and answers which title ids share a media id.

pub mod error;
pub mod gamelist;
pub mod index;

pub use error::GamelistError;
pub use gamelist::{GamelistRow, parse_gamelist_csv, parse_gamelist_file};
pub use index::BaseGameIndex;

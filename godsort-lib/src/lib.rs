//! Classification and merge-resolution engine.
//!
//! Images are classified as play, install or DLC discs through the external
//! tool gateway, dispatched in a first pass, and DLC discs are merged into
//! their base titles in a second pass once every base title has been
//! materialized.

pub mod batch;
pub mod classifier;
pub mod error;
pub mod library;
pub mod resolver;
pub mod scanner;
pub mod settings;
pub mod tools;

pub use batch::{BatchProgress, BatchRunner, BatchSummary, FirstPass};
pub use classifier::{Classification, DiscClassifier};
pub use error::{BatchError, ListingError, SettingsError, ToolError};
pub use library::Library;
pub use resolver::{DlcOutcome, DlcResolver};
pub use settings::Settings;
pub use tools::{DiscTools, Extraction, ExternalTools, ToolPaths};

// Re-export the domain types so frontends only depend on this crate.
pub use godsort_core::{
    ClassifierThresholds, ContentMetrics, ConvertProgress, DiscCategory, ImageRecord, ORPHAN_DIR,
    TitleId,
};
pub use godsort_gamelist::BaseGameIndex;

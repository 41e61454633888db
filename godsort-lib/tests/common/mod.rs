//! Scripted stand-in for the external disc tools.
//!
//! Each disc is keyed by image file name. Extraction writes a real tree
//! under the destination so the library, resolver and cleanup code work
//! against the filesystem exactly as they would with the real tools.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use godsort_core::{CONTENT_DIR, ZERO_PROFILE_DIR, temp_extract_name};
use godsort_gamelist::{BaseGameIndex, GamelistRow};
use godsort_lib::tools::parse::parse_media_id;
use godsort_lib::{
    ContentMetrics, DiscTools, Extraction, ImageRecord, ListingError, ToolError, scanner,
};

pub const DLC_ID: &str = "FFED2000";

#[derive(Debug, Clone)]
pub struct FakeDisc {
    pub listing: Result<ContentMetrics, ListingError>,
    pub title: Option<String>,
    /// Files under `content/0000000000000000`, relative paths.
    pub content: Vec<(String, Vec<u8>)>,
    /// Written into a bundled `default.xex` when set.
    pub media_id: Option<String>,
    pub extract_ok: bool,
    pub rebuild_ok: bool,
    pub convert_ok: bool,
}

impl FakeDisc {
    fn with_ratio(title: Option<&str>, content_type: &str, content_size: u64) -> Self {
        Self {
            listing: Ok(ContentMetrics {
                content_id: title.map(str::to_string),
                content_type: Some(content_type.to_string()),
                content_size,
                image_size: 100,
            }),
            title: title.map(str::to_string),
            content: Vec::new(),
            media_id: None,
            extract_ok: true,
            rebuild_ok: true,
            convert_ok: true,
        }
    }

    pub fn play(title: &str) -> Self {
        Self::with_ratio(Some(title), "00080001", 5)
    }

    pub fn install(title: &str) -> Self {
        Self::with_ratio(Some(title), "00080001", 90)
            .file(&format!("{title}/00007000/install.bin"), b"install")
    }

    pub fn dlc(media_id: &str) -> Self {
        let mut disc = Self::with_ratio(Some(DLC_ID), "00080001", 70)
            .file(&format!("{DLC_ID}/FFFFFFFF/map_pack.bin"), b"dlc");
        disc.media_id = Some(media_id.to_string());
        disc
    }

    pub fn unlisted() -> Self {
        let mut disc = Self::play("ABCD1234");
        disc.listing = Err(ListingError::MissingSummary);
        disc
    }

    pub fn file(mut self, rel: &str, bytes: &[u8]) -> Self {
        self.content.push((rel.to_string(), bytes.to_vec()));
        self
    }

    pub fn no_title(mut self) -> Self {
        self.title = None;
        self
    }

    pub fn failing_rebuild(mut self) -> Self {
        self.rebuild_ok = false;
        self
    }

    pub fn failing_convert(mut self) -> Self {
        self.convert_ok = false;
        self
    }

    pub fn failing_extract(mut self) -> Self {
        self.extract_ok = false;
        self
    }
}

/// Scripted [`DiscTools`] with a call log.
#[derive(Default)]
pub struct FakeTools {
    discs: HashMap<String, FakeDisc>,
    calls: RefCell<Vec<String>>,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disc(mut self, file_name: &str, disc: FakeDisc) -> Self {
        self.discs.insert(file_name.to_string(), disc);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_for(&self, verb: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(verb))
            .collect()
    }

    fn lookup(&self, image: &Path) -> (String, &FakeDisc) {
        let name = image.file_name().unwrap().to_str().unwrap();
        let name = name.strip_suffix(".rebuilt.iso").unwrap_or(name).to_string();
        let disc = self
            .discs
            .get(&name)
            .unwrap_or_else(|| panic!("unscripted image {name}"));
        (name, disc)
    }

    fn log(&self, entry: String) {
        self.calls.borrow_mut().push(entry);
    }
}

impl DiscTools for FakeTools {
    fn list_contents(&self, image: &Path) -> Result<ContentMetrics, ToolError> {
        let (name, disc) = self.lookup(image);
        self.log(format!("list {name}"));
        disc.listing.clone().map_err(ToolError::from)
    }

    fn probe_title_id(&self, image: &Path, _output_dir: &Path) -> Option<godsort_lib::TitleId> {
        let (name, disc) = self.lookup(image);
        self.log(format!("probe {name}"));
        disc.title.as_deref().and_then(|t| t.parse().ok())
    }

    fn extract_content(
        &self,
        image: &Path,
        dest_dir: &Path,
        tag: &str,
    ) -> Result<Extraction, ToolError> {
        let (name, disc) = self.lookup(image);
        self.log(format!("extract {name} {tag}"));
        if !disc.extract_ok {
            return Err(ToolError::failed("extract-xiso", "exit status: 1"));
        }
        let root = dest_dir.join(temp_extract_name(tag));
        fs::create_dir_all(&root)?;
        let content = root.join(CONTENT_DIR).join(ZERO_PROFILE_DIR);
        for (rel, bytes) in &disc.content {
            let path = content.join(rel);
            fs::create_dir_all(path.parent().unwrap())?;
            fs::write(path, bytes)?;
        }
        if let Some(media_id) = &disc.media_id {
            fs::write(
                root.join("default.xex"),
                format!("Basefile\n  Media Id: {media_id}\n"),
            )?;
        }
        Ok(Extraction::locate(root))
    }

    fn rebuild_image(&self, image: &Path, extraction: Extraction) -> Option<PathBuf> {
        let (name, disc) = self.lookup(image);
        self.log(format!("rebuild {name}"));
        drop(extraction);
        if !disc.rebuild_ok {
            return None;
        }
        let rebuilt = PathBuf::from(format!("{}.rebuilt.iso", image.display()));
        fs::write(&rebuilt, b"rebuilt").ok()?;
        Some(rebuilt)
    }

    fn convert(
        &self,
        image: &Path,
        output_dir: &Path,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<(), ToolError> {
        let (name, disc) = self.lookup(image);
        let source = image.file_name().unwrap().to_string_lossy().into_owned();
        self.log(format!("convert {name} from {source}"));
        on_progress(50);
        if !disc.convert_ok {
            return Err(ToolError::failed("iso2god", "exit status: 1"));
        }
        let title = disc.title.as_deref().unwrap_or("UNKNOWN0");
        let dir = output_dir.join(title).join("00007000");
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(&name), b"god")?;
        on_progress(100);
        Ok(())
    }

    fn read_media_id(&self, executable: &Path) -> Option<String> {
        self.log(format!("media {}", executable.display()));
        parse_media_id(&fs::read_to_string(executable).ok()?)
    }
}

/// Source and output folders for one batch.
pub struct Workspace {
    pub dir: tempfile::TempDir,
    pub source: PathBuf,
    pub output: PathBuf,
}

impl Workspace {
    pub fn new(images: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("isos");
        let output = dir.path().join("god");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&output).unwrap();
        for name in images {
            fs::write(source.join(name), b"image").unwrap();
        }
        Self {
            dir,
            source,
            output,
        }
    }

    pub fn image(&self, name: &str) -> PathBuf {
        self.source.join(name)
    }

    pub fn records(&self) -> Vec<ImageRecord> {
        let images = scanner::scan_images(&self.source, "iso").unwrap();
        scanner::image_records(images)
    }

    /// Leftover `_temp_extract_*` folders in the output root.
    pub fn temp_dirs(&self) -> Vec<String> {
        fs::read_dir(&self.output)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with("_temp_extract_"))
            .collect()
    }
}

/// Gamelist index from `(title id, media id)` pairs.
pub fn index(pairs: &[(&str, &str)]) -> BaseGameIndex {
    BaseGameIndex::from_rows(
        pairs
            .iter()
            .map(|(title, media)| GamelistRow {
                title_id: title.parse().unwrap(),
                media_id: media.to_string(),
            })
            .collect(),
    )
}

/// Progress of a single disc conversion, derived from the converter's
/// `writing part <i> of <n>` lines.
///
/// The percentage never decreases; a tracker folds every observed part into
/// the highest value seen so far. Not every integer between 0 and 100 is
/// guaranteed to be reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertProgress {
    percent: u8,
}

impl ConvertProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a `part` of `total` observation and return the updated percent.
    pub fn observe(&mut self, part: u32, total: u32) -> u8 {
        if total > 0 {
            let pct = (u64::from(part.min(total)) * 100 / u64::from(total)) as u8;
            self.percent = self.percent.max(pct);
        }
        self.percent
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Mark the conversion finished.
    pub fn complete(&mut self) -> u8 {
        self.percent = 100;
        self.percent
    }
}

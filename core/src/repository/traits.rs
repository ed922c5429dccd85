use crate::error::{Error, Result};
use crate::model::record::Record;

/// Which storage the records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Primary,
    /// Read from the legacy file and written out as the new primary file.
    MigratedFromLegacy,
    Empty,
}

/// An entry that could not be decoded and was left out of the load.
#[derive(Debug)]
pub struct SkippedEntry {
    /// Line number for the primary file, 1-based array index for the legacy file.
    pub position: usize,
    pub error: Error,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub source: LoadSource,
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedEntry>,
}

impl LoadOutcome {
    pub fn empty() -> Self {
        Self {
            source: LoadSource::Empty,
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

pub trait RecordRepository {
    fn load(&self) -> Result<LoadOutcome>;
    /// Replace the stored collection with `records`.
    fn save(&self, records: &[Record]) -> Result<()>;
}

pub mod file;
mod row;
pub mod traits;

// Re-export
pub use file::{FileRecordRepository, StorageProbe};
pub use traits::{LoadOutcome, LoadSource, RecordRepository, SkippedEntry};

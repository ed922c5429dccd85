use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::record::Record;
use crate::repository::row::{decode_legacy, CsvRow, CSV_HEADER};
use crate::repository::traits::{LoadOutcome, LoadSource, RecordRepository, SkippedEntry};
use crate::service::store::{upsert, Upsert};

/// What is on disk, decided once per load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageProbe {
    Primary,
    Legacy,
    Nothing,
}

/// Delimited-text storage with a one-time import from the legacy JSON file.
///
/// Saves rewrite the primary file in place. A crash in the middle of a save
/// can leave it truncated.
#[derive(Debug, Clone)]
pub struct FileRecordRepository {
    primary_path: PathBuf,
    legacy_path: PathBuf,
}

impl FileRecordRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let config = Config::load(base_dir)?;
        Ok(Self::from_config(&config))
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_paths(config.primary_path.clone(), config.legacy_path.clone())
    }

    pub fn with_paths(primary_path: PathBuf, legacy_path: PathBuf) -> Self {
        Self {
            primary_path,
            legacy_path,
        }
    }

    pub fn primary_path(&self) -> &Path {
        &self.primary_path
    }

    pub fn probe(&self) -> StorageProbe {
        let probe = if self.primary_path.exists() {
            StorageProbe::Primary
        } else if self.legacy_path.exists() {
            StorageProbe::Legacy
        } else {
            StorageProbe::Nothing
        };
        debug!(?probe, primary = %self.primary_path.display(), "probed storage");
        probe
    }

    fn read_primary(&self) -> Result<(Vec<Record>, Vec<SkippedEntry>)> {
        let file = File::open(&self.primary_path).map_err(|e| Error::io(&self.primary_path, e))?;
        let mut reader = ReaderBuilder::new()
            .trim(Trim::Headers)
            .from_reader(BufReader::new(file));
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for (index, result) in reader.records().enumerate() {
            // header is line 1
            let fallback_line = index + 2;
            let decoded = match result {
                Ok(row) => {
                    let line = row
                        .position()
                        .map(|p| p.line() as usize)
                        .unwrap_or(fallback_line);
                    let record = row
                        .deserialize::<CsvRow>(Some(&headers))
                        .map_err(Error::from)
                        .and_then(CsvRow::decode);
                    (line, record)
                }
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => (fallback_line, Err(e.into())),
            };
            collect(&mut records, &mut skipped, decoded);
        }

        Ok((records, skipped))
    }

    fn read_legacy(&self) -> Result<(Vec<Record>, Vec<SkippedEntry>)> {
        let file = File::open(&self.legacy_path).map_err(|e| Error::io(&self.legacy_path, e))?;
        let entries: Vec<Value> = serde_json::from_reader(BufReader::new(file))?;

        let mut records = Vec::new();
        let mut skipped = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            collect(&mut records, &mut skipped, (index + 1, decode_legacy(entry)));
        }
        Ok((records, skipped))
    }

    fn write_records(&self, records: &[Record]) -> Result<()> {
        let file = File::create(&self.primary_path).map_err(|e| Error::io(&self.primary_path, e))?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));

        writer.write_record(CSV_HEADER)?;
        for record in records {
            writer.write_record(CsvRow::encode(record))?;
        }

        writer.flush().map_err(|e| Error::io(&self.primary_path, e))?;
        Ok(())
    }
}

fn collect(
    records: &mut Vec<Record>,
    skipped: &mut Vec<SkippedEntry>,
    (position, decoded): (usize, Result<Record>),
) {
    match decoded {
        Ok(record) => {
            let date = record.date;
            if upsert(records, record) == Upsert::Replaced {
                warn!(position, %date, "duplicate date, keeping the later entry");
            }
        }
        Err(error) => {
            debug!(position, %error, "skipping entry");
            skipped.push(SkippedEntry { position, error });
        }
    }
}

fn warn_skipped(skipped: &[SkippedEntry]) {
    if !skipped.is_empty() {
        warn!(count = skipped.len(), "some entries could not be decoded and were skipped");
    }
}

impl RecordRepository for FileRecordRepository {
    fn load(&self) -> Result<LoadOutcome> {
        match self.probe() {
            StorageProbe::Primary => {
                let (records, skipped) = self.read_primary()?;
                warn_skipped(&skipped);
                info!(count = records.len(), skipped = skipped.len(), "loaded records");
                Ok(LoadOutcome {
                    source: LoadSource::Primary,
                    records,
                    skipped,
                })
            }
            StorageProbe::Legacy => {
                let (records, skipped) = self.read_legacy()?;
                warn_skipped(&skipped);
                self.write_records(&records)?;
                info!(
                    count = records.len(),
                    skipped = skipped.len(),
                    from = %self.legacy_path.display(),
                    to = %self.primary_path.display(),
                    "migrated legacy records"
                );
                Ok(LoadOutcome {
                    source: LoadSource::MigratedFromLegacy,
                    records,
                    skipped,
                })
            }
            StorageProbe::Nothing => Ok(LoadOutcome::empty()),
        }
    }

    fn save(&self, records: &[Record]) -> Result<()> {
        self.write_records(records)?;
        debug!(count = records.len(), "saved records");
        Ok(())
    }
}

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::range::DateRange;
use crate::model::record::{Record, RecordDraft};
use crate::repository::traits::{LoadSource, RecordRepository, SkippedEntry};
use crate::service::chart::ChartData;
use crate::service::store::{self, Upsert};

/// How the session's records were obtained.
#[derive(Debug)]
pub struct LoadReport {
    pub source: LoadSource,
    pub skipped: Vec<SkippedEntry>,
}

/// The running session: owns the record collection and writes it back
/// through the repository after every mutation.
///
/// When a save fails the change stays in memory and the journal is marked
/// dirty until [`Journal::persist`] succeeds.
pub struct Journal<R: RecordRepository> {
    repo: R,
    records: Vec<Record>,
    dirty: bool,
}

impl<R: RecordRepository> Journal<R> {
    pub fn open(repo: R) -> Result<(Self, LoadReport)> {
        let outcome = repo.load()?;
        let report = LoadReport {
            source: outcome.source,
            skipped: outcome.skipped,
        };
        let journal = Self {
            repo,
            records: outcome.records,
            dirty: false,
        };
        Ok((journal, report))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, id: &Uuid) -> Option<&Record> {
        self.records.iter().find(|r| r.id == *id)
    }

    pub fn find_by_date(&self, date: NaiveDate) -> Option<&Record> {
        store::find_by_date(&self.records, date)
    }

    /// Records in `range`, most recent first.
    pub fn list(&self, range: &DateRange) -> Vec<Record> {
        let mut records = store::filter_in(&self.records, range);
        store::sort_by_date_descending(&mut records);
        records
    }

    pub fn list_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Record>> {
        Ok(self.list(&DateRange::new(start, end)?))
    }

    /// Chart series for `range`, oldest first.
    pub fn chart(&self, range: &DateRange) -> ChartData {
        ChartData::build(&self.records, range)
    }

    /// Insert a record, or replace the one already holding its date.
    pub fn submit(&mut self, draft: RecordDraft) -> Result<Upsert> {
        let record = draft.into_record()?;
        let date = record.date;
        let outcome = store::upsert(&mut self.records, record);
        info!(%date, ?outcome, "submitted record");
        self.persist()?;
        Ok(outcome)
    }

    /// Overwrite the record `id` with `draft`. Moving it onto a date held by
    /// another record is rejected before anything changes.
    pub fn edit(&mut self, id: &Uuid, draft: RecordDraft) -> Result<()> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id == *id)
            .ok_or(Error::NotFound(*id))?;

        if self
            .records
            .iter()
            .any(|r| r.id != *id && r.date == draft.date)
        {
            return Err(Error::DateConflict(draft.date));
        }

        let mut updated = draft.into_record()?;
        updated.id = *id;
        info!(from = %self.records[pos].date, to = %updated.date, "edited record");
        self.records[pos] = updated;
        self.persist()
    }

    pub fn delete(&mut self, id: &Uuid) -> Result<Record> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id == *id)
            .ok_or(Error::NotFound(*id))?;
        let removed = self.records.remove(pos);
        info!(date = %removed.date, "deleted record");
        self.persist()?;
        Ok(removed)
    }

    /// Write the whole collection. Also the manual retry after a failed save.
    pub fn persist(&mut self) -> Result<()> {
        self.dirty = true;
        if let Err(e) = self.repo.save(&self.records) {
            warn!(error = %e, "save failed, changes kept in memory");
            return Err(e);
        }
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::traits::LoadOutcome;
    use crate::repository::FileRecordRepository;
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Default)]
    struct MockRecordRepo {
        stored: RefCell<Vec<Record>>,
        saves: Cell<usize>,
        fail_saves: Cell<bool>,
    }

    impl RecordRepository for &MockRecordRepo {
        fn load(&self) -> Result<LoadOutcome> {
            Ok(LoadOutcome {
                source: LoadSource::Primary,
                records: self.stored.borrow().clone(),
                skipped: Vec::new(),
            })
        }

        fn save(&self, records: &[Record]) -> Result<()> {
            if self.fail_saves.get() {
                return Err(Error::Io {
                    path: PathBuf::from("weight_data.csv"),
                    source: std::io::Error::other("disk full"),
                });
            }
            *self.stored.borrow_mut() = records.to_vec();
            self.saves.set(self.saves.get() + 1);
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft(d: NaiveDate, weight: f64, calories: u32) -> RecordDraft {
        RecordDraft {
            date: d,
            weight,
            calories,
            picture_path: None,
        }
    }

    fn seeded(records: Vec<Record>) -> MockRecordRepo {
        MockRecordRepo {
            stored: RefCell::new(records),
            ..Default::default()
        }
    }

    #[test]
    fn test_submit_upserts_by_date() {
        let repo = seeded(vec![Record::new(date(2024, 1, 1), 70.0, 2000, None)]);
        let (mut journal, _) = Journal::open(&repo).unwrap();

        let outcome = journal.submit(draft(date(2024, 1, 1), 69.0, 1800)).unwrap();
        assert_eq!(outcome, Upsert::Replaced);
        assert_eq!(journal.records().len(), 1);
        assert_eq!(journal.records()[0].weight, 69.0);

        let outcome = journal.submit(draft(date(2024, 1, 2), 68.5, 1700)).unwrap();
        assert_eq!(outcome, Upsert::Inserted);
        assert_eq!(journal.records().len(), 2);

        assert_eq!(repo.saves.get(), 2);
        assert_eq!(repo.stored.borrow().len(), 2);
    }

    #[test]
    fn test_submit_rejects_invalid_weight_without_change() {
        let repo = seeded(vec![]);
        let (mut journal, _) = Journal::open(&repo).unwrap();

        assert!(journal.submit(draft(date(2024, 1, 1), -1.0, 1800)).is_err());
        assert!(journal.records().is_empty());
        assert_eq!(repo.saves.get(), 0);
    }

    #[test]
    fn test_edit_conflict_leaves_collection_untouched() {
        let a = Record::new(date(2024, 1, 1), 70.0, 2000, None);
        let b = Record::new(date(2024, 1, 2), 71.0, 2100, None);
        let a_id = a.id;
        let repo = seeded(vec![a, b]);
        let (mut journal, _) = Journal::open(&repo).unwrap();

        let err = journal.edit(&a_id, draft(date(2024, 1, 2), 70.0, 2000)).unwrap_err();
        assert!(matches!(err, Error::DateConflict(d) if d == date(2024, 1, 2)));

        let dates: Vec<_> = journal.records().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 2)]);
        assert_eq!(journal.get(&a_id).unwrap().weight, 70.0);
        assert_eq!(repo.saves.get(), 0);
    }

    #[test]
    fn test_edit_same_date_and_value_equal_records() {
        // two records with identical values apart from the date
        let a = Record::new(date(2024, 1, 1), 70.0, 2000, None);
        let b = Record::new(date(2024, 1, 3), 70.0, 2000, None);
        let a_id = a.id;
        let repo = seeded(vec![a, b]);
        let (mut journal, _) = Journal::open(&repo).unwrap();

        // keeping its own date is not a conflict
        journal.edit(&a_id, draft(date(2024, 1, 1), 69.0, 1900)).unwrap();
        journal.edit(&a_id, draft(date(2024, 1, 2), 69.0, 1900)).unwrap();

        let edited = journal.get(&a_id).unwrap();
        assert_eq!(edited.date, date(2024, 1, 2));
        assert_eq!(edited.weight, 69.0);
        assert_eq!(journal.find_by_date(date(2024, 1, 3)).unwrap().weight, 70.0);
    }

    #[test]
    fn test_edit_and_delete_unknown_id() {
        let repo = seeded(vec![]);
        let (mut journal, _) = Journal::open(&repo).unwrap();
        let id = Uuid::new_v4();
        assert!(matches!(
            journal.edit(&id, draft(date(2024, 1, 1), 70.0, 1)),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(journal.delete(&id), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_list_filters_and_sorts_newest_first() {
        let repo = seeded(vec![
            Record::new(date(2024, 1, 2), 70.0, 2000, None),
            Record::new(date(2024, 1, 9), 69.0, 2000, None),
            Record::new(date(2024, 1, 5), 69.5, 2000, None),
        ]);
        let (journal, _) = Journal::open(&repo).unwrap();

        let listed = journal.list_between(date(2024, 1, 1), date(2024, 1, 5)).unwrap();
        let dates: Vec<_> = listed.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 5), date(2024, 1, 2)]);

        assert!(matches!(
            journal.list_between(date(2024, 1, 5), date(2024, 1, 1)),
            Err(Error::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_failed_save_keeps_change_until_retry() {
        let repo = seeded(vec![]);
        let (mut journal, _) = Journal::open(&repo).unwrap();

        repo.fail_saves.set(true);
        assert!(matches!(
            journal.submit(draft(date(2024, 1, 1), 70.0, 2000)),
            Err(Error::Io { .. })
        ));
        assert_eq!(journal.records().len(), 1);
        assert!(journal.is_dirty());
        assert!(repo.stored.borrow().is_empty());

        repo.fail_saves.set(false);
        journal.persist().unwrap();
        assert!(!journal.is_dirty());
        assert_eq!(repo.stored.borrow().len(), 1);
    }

    #[test]
    fn test_delete_removes_from_memory_and_file() {
        let tmp = TempDir::new().unwrap();
        let repo = FileRecordRepository::with_paths(
            tmp.path().join("weight_data.csv"),
            tmp.path().join("weight_data.json"),
        );
        let (mut journal, report) = Journal::open(repo.clone()).unwrap();
        assert_eq!(report.source, LoadSource::Empty);

        journal.submit(draft(date(2024, 1, 1), 70.0, 2000)).unwrap();
        journal.submit(draft(date(2024, 1, 2), 69.0, 1900)).unwrap();
        let id = journal.find_by_date(date(2024, 1, 1)).unwrap().id;

        let removed = journal.delete(&id).unwrap();
        assert_eq!(removed.date, date(2024, 1, 1));
        assert!(journal.get(&id).is_none());

        let reloaded = repo.load().unwrap();
        let dates: Vec<_> = reloaded.records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 2)]);
    }
}

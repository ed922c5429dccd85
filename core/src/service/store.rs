use chrono::NaiveDate;

use crate::error::Result;
use crate::model::range::DateRange;
use crate::model::record::Record;

/// Outcome of an insert-or-replace keyed by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Records dated within `[start, end]`, in collection order.
pub fn filter_by_range(records: &[Record], start: NaiveDate, end: NaiveDate) -> Result<Vec<Record>> {
    let range = DateRange::new(start, end)?;
    Ok(filter_in(records, &range))
}

pub fn filter_in(records: &[Record], range: &DateRange) -> Vec<Record> {
    records
        .iter()
        .filter(|r| range.contains(r.date))
        .cloned()
        .collect()
}

/// Most recent first. Stable.
pub fn sort_by_date_descending(records: &mut [Record]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Oldest first. Stable.
pub fn sort_by_date_ascending(records: &mut [Record]) {
    records.sort_by_key(|r| r.date);
}

/// Replace the record holding `record.date`, or append.
pub fn upsert(records: &mut Vec<Record>, record: Record) -> Upsert {
    if let Some(pos) = records.iter().position(|r| r.date == record.date) {
        records[pos] = record;
        Upsert::Replaced
    } else {
        records.push(record);
        Upsert::Inserted
    }
}

pub fn find_by_date(records: &[Record], date: NaiveDate) -> Option<&Record> {
    records.iter().find(|r| r.date == date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Record> {
        vec![
            Record::new(date(2024, 1, 3), 70.0, 2000, None),
            Record::new(date(2024, 1, 1), 71.0, 2100, None),
            Record::new(date(2024, 1, 5), 69.5, 1900, None),
            Record::new(date(2024, 1, 2), 70.5, 2200, None),
        ]
    }

    #[test]
    fn test_filter_is_inclusive() {
        let records = sample();
        let filtered = filter_by_range(&records, date(2024, 1, 2), date(2024, 1, 3)).unwrap();
        let dates: Vec<_> = filtered.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 3), date(2024, 1, 2)]);
    }

    #[test]
    fn test_filter_matches_exact_subset_for_every_range() {
        let records = sample();
        let days: Vec<_> = (0..8).map(|d| date(2023, 12, 31) + chrono::Duration::days(d)).collect();
        for &s in &days {
            for &e in &days {
                let result = filter_by_range(&records, s, e);
                if s > e {
                    assert!(matches!(result, Err(Error::InvalidRange { .. })));
                    continue;
                }
                let got = result.unwrap();
                let expected: Vec<_> = records.iter().filter(|r| s <= r.date && r.date <= e).collect();
                assert_eq!(got.len(), expected.len());
                assert!(got.iter().all(|r| s <= r.date && r.date <= e));
            }
        }
    }

    #[test]
    fn test_sort_orders() {
        let mut records = sample();
        sort_by_date_descending(&mut records);
        let dates: Vec<_> = records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-05", "2024-01-03", "2024-01-02", "2024-01-01"]);

        sort_by_date_ascending(&mut records);
        assert_eq!(records.first().unwrap().date, date(2024, 1, 1));
        assert_eq!(records.last().unwrap().date, date(2024, 1, 5));
    }

    #[test]
    fn test_upsert_replaces_or_appends() {
        let mut records = sample();
        let replaced = upsert(&mut records, Record::new(date(2024, 1, 3), 68.0, 1500, None));
        assert_eq!(replaced, Upsert::Replaced);
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].weight, 68.0);

        let inserted = upsert(&mut records, Record::new(date(2024, 1, 9), 68.0, 1500, None));
        assert_eq!(inserted, Upsert::Inserted);
        assert_eq!(records.len(), 5);
        assert_eq!(find_by_date(&records, date(2024, 1, 9)).unwrap().calories, 1500);
    }
}

use chrono::{Days, NaiveDate, TimeDelta};

use crate::error::{Error, Result};

/// Inclusive calendar range used by the list and the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// `[today - days, today]`
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        Self {
            start: today
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN),
            end: today,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Slide the whole range by `days` (negative moves back in time). A shift
    /// past the supported calendar leaves the range where it is.
    pub fn shifted(&self, days: i64) -> Self {
        let shift = |date: NaiveDate| {
            TimeDelta::try_days(days).and_then(|delta| date.checked_add_signed(delta))
        };
        match (shift(self.start), shift(self.end)) {
            (Some(start), Some(end)) => Self { start, end },
            _ => *self,
        }
    }
}

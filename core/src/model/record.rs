use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Field, Result};

/// One dated weight / calorie observation.
///
/// `id` exists only for the lifetime of a session. It lets an edit tell the
/// record being edited apart from another record that happens to hold the
/// same values; it is never written to storage.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Record {
    #[serde(skip)]
    pub id: Uuid,
    pub date: NaiveDate,
    pub weight: f64,
    pub calories: u32,
    pub picture_path: Option<PathBuf>,
}

impl Record {
    pub fn new(date: NaiveDate, weight: f64, calories: u32, picture_path: Option<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            weight,
            calories,
            picture_path,
        }
    }

    /// Build a record after validating the weight.
    pub fn checked(
        date: NaiveDate,
        weight: f64,
        calories: u32,
        picture_path: Option<PathBuf>,
    ) -> Result<Self> {
        validate_weight(weight)?;
        Ok(Self::new(date, weight, calories, picture_path))
    }

    pub fn has_picture(&self) -> bool {
        self.picture_path.is_some()
    }
}

/// Values for a record that does not exist yet, or the new values for one
/// being edited. Produced by the form layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub date: NaiveDate,
    pub weight: f64,
    pub calories: u32,
    pub picture_path: Option<PathBuf>,
}

impl RecordDraft {
    pub fn from_record(record: &Record) -> Self {
        Self {
            date: record.date,
            weight: record.weight,
            calories: record.calories,
            picture_path: record.picture_path.clone(),
        }
    }

    pub fn into_record(self) -> Result<Record> {
        Record::checked(self.date, self.weight, self.calories, self.picture_path)
    }
}

pub(crate) fn validate_weight(weight: f64) -> Result<()> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(Field::Weight, weight.to_string()))
    }
}

pub fn parse_weight(raw: &str) -> Result<f64> {
    let weight: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::invalid(Field::Weight, raw))?;
    validate_weight(weight).map_err(|_| Error::invalid(Field::Weight, raw))?;
    Ok(weight)
}

pub fn parse_calories(raw: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .map_err(|_| Error::invalid(Field::Calories, raw))
}

/// Storage form of a weight: always at least one decimal digit.
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.1}", weight)
    } else {
        weight.to_string()
    }
}

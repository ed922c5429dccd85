//! Field-by-field decoding of stored entries.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Field, Result};
use crate::model::record::{format_weight, parse_calories, parse_weight, validate_weight, Record};
use crate::time::{format_date, parse_record_date};

pub(crate) const CSV_HEADER: [&str; 4] = ["date", "weight", "calories", "picture_path"];

/// One row of the primary file, as text.
#[derive(Debug, Deserialize)]
pub(crate) struct CsvRow {
    date: String,
    weight: String,
    calories: String,
    #[serde(default)]
    picture_path: String,
}

impl CsvRow {
    pub(crate) fn decode(self) -> Result<Record> {
        let date = decode_date(&self.date)?;
        let weight = parse_weight(&self.weight)?;
        let calories = parse_calories(&self.calories)?;
        Ok(Record::new(date, weight, calories, picture(&self.picture_path)))
    }

    pub(crate) fn encode(record: &Record) -> [String; 4] {
        [
            format_date(record.date),
            format_weight(record.weight),
            record.calories.to_string(),
            record
                .picture_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
        ]
    }
}

/// Decode one object of the legacy array. Numbers may also arrive as strings.
pub(crate) fn decode_legacy(entry: &Value) -> Result<Record> {
    let object = entry
        .as_object()
        .ok_or_else(|| Error::UnexpectedInput(entry.to_string()))?;

    let date = match object.get("date") {
        Some(Value::String(raw)) => decode_date(raw)?,
        Some(other) => return Err(Error::invalid(Field::Date, other.to_string())),
        None => return Err(Error::MissingField(Field::Date)),
    };

    let weight = match object.get("weight") {
        Some(Value::Number(n)) => {
            let weight = n
                .as_f64()
                .ok_or_else(|| Error::invalid(Field::Weight, n.to_string()))?;
            validate_weight(weight)?;
            weight
        }
        Some(Value::String(raw)) => parse_weight(raw)?,
        Some(other) => return Err(Error::invalid(Field::Weight, other.to_string())),
        None => return Err(Error::MissingField(Field::Weight)),
    };

    let calories = match object.get("calories") {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|c| u32::try_from(c).ok())
            .ok_or_else(|| Error::invalid(Field::Calories, n.to_string()))?,
        Some(Value::String(raw)) => parse_calories(raw)?,
        Some(other) => return Err(Error::invalid(Field::Calories, other.to_string())),
        None => return Err(Error::MissingField(Field::Calories)),
    };

    let picture_path = match object.get("picture_path") {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => picture(raw),
        Some(other) => return Err(Error::invalid(Field::PicturePath, other.to_string())),
    };

    Ok(Record::new(date, weight, calories, picture_path))
}

fn decode_date(raw: &str) -> Result<chrono::NaiveDate> {
    parse_record_date(raw).ok_or_else(|| Error::invalid(Field::Date, raw))
}

fn picture(raw: &str) -> Option<PathBuf> {
    if raw.is_empty() {
        None
    } else {
        Some(PathBuf::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn row(date: &str, weight: &str, calories: &str, picture_path: &str) -> CsvRow {
        CsvRow {
            date: date.to_string(),
            weight: weight.to_string(),
            calories: calories.to_string(),
            picture_path: picture_path.to_string(),
        }
    }

    #[test]
    fn test_csv_row_decodes_and_normalizes_date() {
        let record = row("01/02/2024", "70.5", "1800", "").decode().unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(record.weight, 70.5);
        assert_eq!(record.calories, 1800);
        assert_eq!(record.picture_path, None);

        let record = row("2024-01-03", "70", "0", "pics/a.png").decode().unwrap();
        assert_eq!(record.picture_path, Some(PathBuf::from("pics/a.png")));
    }

    #[test]
    fn test_csv_row_reports_failing_field() {
        assert_eq!(row("2024-31-01", "70", "1", "").decode().unwrap_err().field(), Some(Field::Date));
        assert_eq!(row("2024-01-01", "x", "1", "").decode().unwrap_err().field(), Some(Field::Weight));
        assert_eq!(row("2024-01-01", "70", "1.5", "").decode().unwrap_err().field(), Some(Field::Calories));
    }

    #[test]
    fn test_encode_writes_empty_picture() {
        let record = Record::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 70.0, 2000, None);
        assert_eq!(CsvRow::encode(&record), ["2024-01-01", "70.0", "2000", ""]);
    }

    #[test]
    fn test_legacy_entry_variants() {
        let record = decode_legacy(&json!({"date": "2024-01-05", "weight": 71.2, "calories": 2100})).unwrap();
        assert_eq!(record.weight, 71.2);
        assert_eq!(record.picture_path, None);

        let record = decode_legacy(&json!({
            "date": "2024-01-05", "weight": "71", "calories": "2100", "picture_path": null
        }))
        .unwrap();
        assert_eq!(record.calories, 2100);

        let record = decode_legacy(&json!({
            "date": "2024-01-05", "weight": 71, "calories": 2100, "picture_path": "me.jpg"
        }))
        .unwrap();
        assert_eq!(record.picture_path, Some(PathBuf::from("me.jpg")));
    }

    #[test]
    fn test_legacy_entry_failures() {
        let err = decode_legacy(&json!({"date": "soon", "weight": 70, "calories": 1})).unwrap_err();
        assert_eq!(err.field(), Some(Field::Date));

        let err = decode_legacy(&json!({"date": "2024-01-01", "calories": 1})).unwrap_err();
        assert!(matches!(err, Error::MissingField(Field::Weight)));

        let err = decode_legacy(&json!({"date": "2024-01-01", "weight": 70, "calories": -1})).unwrap_err();
        assert_eq!(err.field(), Some(Field::Calories));

        assert!(decode_legacy(&json!([1, 2, 3])).is_err());
    }
}

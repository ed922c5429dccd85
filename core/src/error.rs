//! Error types for weightlog.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// A record field that can fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Weight,
    Calories,
    PicturePath,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Date => "date",
            Field::Weight => "weight",
            Field::Calories => "calories",
            Field::PicturePath => "picture_path",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited data: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed legacy data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("could not read image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A field carried a value that does not decode. Weight and calories
    /// share the same user-facing hint.
    #[error("invalid {field} '{value}': {hint}")]
    InvalidField {
        field: Field,
        value: String,
        hint: &'static str,
    },

    #[error("missing required field: {0}")]
    MissingField(Field),

    #[error("unknown key: '{0}'")]
    UnknownKey(String),

    #[error("ambiguous key: '{key}' matches {candidates:?}")]
    AmbiguousKey {
        key: String,
        candidates: Vec<String>,
    },

    #[error("unexpected input: '{0}'")]
    UnexpectedInput(String),

    #[error("an entry for {0} already exists")]
    DateConflict(NaiveDate),

    #[error("start date {start} cannot be after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("no record with id {0}")]
    NotFound(Uuid),

    #[error("no record dated {0}")]
    NoRecordOnDate(NaiveDate),

    #[error("could not determine home directory")]
    HomeDirUnavailable,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(field: Field, value: impl Into<String>) -> Self {
        let hint = match field {
            Field::Date => "expected YYYY-MM-DD, MM/DD/YYYY or DD/MM/YYYY",
            Field::Weight | Field::Calories => {
                "please enter valid numbers for weight and calories"
            }
            Field::PicturePath => "expected a file path",
        };
        Error::InvalidField {
            field,
            value: value.into(),
            hint,
        }
    }

    /// The field a decode failure refers to, if any.
    pub fn field(&self) -> Option<Field> {
        match self {
            Error::InvalidField { field, .. } => Some(*field),
            Error::MissingField(field) => Some(*field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field_message_names_field() {
        let err = Error::invalid(Field::Weight, "abc");
        assert_eq!(err.field(), Some(Field::Weight));
        let msg = err.to_string();
        assert!(msg.contains("weight"));
        assert!(msg.contains("'abc'"));
        assert!(msg.contains("valid numbers"));
    }

    #[test]
    fn test_range_message() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = Error::InvalidRange { start, end };
        assert_eq!(
            err.to_string(),
            "start date 2024-02-01 cannot be after end date 2024-01-01"
        );
        assert_eq!(err.field(), None);
    }
}

//! Raw text input for submitting and editing records.
//!
//! A form is a list of tokens such as `72.5 2100 date:yesterday photo:~/a.jpg`.
//! Bare tokens fill weight then calories; `key:value` tokens may use any
//! unambiguous key prefix (`w:72.5`, `c:2100`, `d:-1d`, `p:none`).

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::{Error, Field, Result};
use crate::input::{expand_key, parse_args};
use crate::model::record::{parse_calories, parse_weight, Record, RecordDraft};
use crate::time::parse_human_date;

pub const FORM_KEYS: [&str; 4] = ["date", "weight", "calories", "photo"];

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PhotoChange {
    #[default]
    Keep,
    Set(PathBuf),
    Remove,
}

impl PhotoChange {
    fn from_value(value: &str) -> Self {
        let value = value.trim();
        match value {
            "" | "-" | "none" => PhotoChange::Remove,
            _ => PhotoChange::Set(expand_home(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordForm {
    pub date: Option<String>,
    pub weight: Option<String>,
    pub calories: Option<String>,
    pub photo: PhotoChange,
}

impl RecordForm {
    pub fn parse(args: &[String]) -> Result<Self> {
        let parsed = parse_args(args);
        let mut form = RecordForm::default();

        for (key, value) in parsed.metadata {
            match expand_key(&key, &FORM_KEYS)?.as_str() {
                "date" => form.date = Some(value),
                "weight" => form.weight = Some(value),
                "calories" => form.calories = Some(value),
                "photo" => form.photo = PhotoChange::from_value(&value),
                _ => {}
            }
        }

        for token in parsed.positional {
            if form.weight.is_none() {
                form.weight = Some(token);
            } else if form.calories.is_none() {
                form.calories = Some(token);
            } else {
                return Err(Error::UnexpectedInput(token));
            }
        }

        Ok(form)
    }

    pub fn from_line(line: &str) -> Result<Self> {
        let args: Vec<String> = line.split_whitespace().map(String::from).collect();
        Self::parse(&args)
    }

    pub fn is_empty(&self) -> bool {
        *self == RecordForm::default()
    }

    /// Values for a new submission. Weight and calories are required, the
    /// date defaults to `today`.
    pub fn to_draft(&self, today: NaiveDate) -> Result<RecordDraft> {
        let date = self.parse_date(today)?.unwrap_or(today);
        let weight = parse_weight(
            self.weight
                .as_deref()
                .ok_or(Error::MissingField(Field::Weight))?,
        )?;
        let calories = parse_calories(
            self.calories
                .as_deref()
                .ok_or(Error::MissingField(Field::Calories))?,
        )?;
        let picture_path = match &self.photo {
            PhotoChange::Set(path) => Some(path.clone()),
            PhotoChange::Keep | PhotoChange::Remove => None,
        };

        Ok(RecordDraft {
            date,
            weight,
            calories,
            picture_path,
        })
    }

    /// New values for `base`: fields left out of the form keep their value.
    pub fn apply(&self, base: &Record, today: NaiveDate) -> Result<RecordDraft> {
        let mut draft = RecordDraft::from_record(base);
        if let Some(date) = self.parse_date(today)? {
            draft.date = date;
        }
        if let Some(weight) = &self.weight {
            draft.weight = parse_weight(weight)?;
        }
        if let Some(calories) = &self.calories {
            draft.calories = parse_calories(calories)?;
        }
        match &self.photo {
            PhotoChange::Keep => {}
            PhotoChange::Set(path) => draft.picture_path = Some(path.clone()),
            PhotoChange::Remove => draft.picture_path = None,
        }
        Ok(draft)
    }

    fn parse_date(&self, today: NaiveDate) -> Result<Option<NaiveDate>> {
        self.date
            .as_deref()
            .map(|raw| parse_human_date(raw, today))
            .transpose()
    }
}

fn expand_home(value: &str) -> PathBuf {
    if let Some(rest) = value.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(value)
}

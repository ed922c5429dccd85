use chrono::{Datelike, NaiveDate, TimeDelta, Weekday};

use crate::error::{Error, Field, Result};

/// Canonical storage form of a date.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Accepted storage formats, in priority order. An ambiguous string such as
/// `01/02/2024` resolves to the month-first reading.
pub const RECORD_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Parse a stored date string against [`RECORD_DATE_FORMATS`]; first match wins.
pub fn parse_record_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    RECORD_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

/// Parse a date typed by a person, relative to `today`.
///
/// Accepts `today`, `yesterday`, relative offsets (`-3d`, `+1w`), weekday
/// names (`mon` is the latest Monday on or before today, `2:mon` the one
/// before that) and any of the storage formats.
pub fn parse_human_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::MissingField(Field::Date));
    }

    // 1. Reserved keywords
    match input.to_lowercase().as_str() {
        "today" | "tod" => return Ok(today),
        "yesterday" | "yest" | "yes" => {
            return today
                .pred_opt()
                .ok_or_else(|| Error::invalid(Field::Date, input))
        }
        _ => {}
    }

    // 2. Relative format (-Nd, +Nw)
    if let Some(offset) = parse_relative(input)? {
        return today
            .checked_add_signed(offset)
            .ok_or_else(|| Error::invalid(Field::Date, input));
    }

    // 3. Weekday format (mon, 2:mon)
    if let Some((count, day_str)) = parse_weekday_token(input) {
        if let Some(target) = parse_weekday_str(day_str) {
            let mut days_back = i64::from(today.weekday().num_days_from_monday())
                - i64::from(target.num_days_from_monday());
            if days_back < 0 {
                days_back += 7;
            }
            return (count - 1)
                .checked_mul(7)
                .and_then(|weeks| weeks.checked_add(days_back))
                .and_then(TimeDelta::try_days)
                .and_then(|back| today.checked_sub_signed(back))
                .ok_or_else(|| Error::invalid(Field::Date, input));
        }
    }

    // 4. Fallback to storage formats
    parse_record_date(input).ok_or_else(|| Error::invalid(Field::Date, input))
}

fn parse_relative(input: &str) -> Result<Option<TimeDelta>> {
    let body = if let Some(body) = input.strip_prefix('+') {
        body
    } else if let Some(body) = input.strip_prefix('-') {
        body
    } else {
        return Ok(None);
    };
    let negative = input.starts_with('-');

    let invalid = || Error::invalid(Field::Date, input);
    let (num_str, unit) = match body.char_indices().last() {
        Some((idx, unit)) if idx > 0 => (&body[..idx], unit),
        _ => return Err(invalid()),
    };
    if !num_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let count: i64 = num_str.parse().map_err(|_| invalid())?;
    let count = if negative { count.checked_neg() } else { Some(count) }.ok_or_else(invalid)?;

    let offset = match unit.to_ascii_lowercase() {
        'd' => TimeDelta::try_days(count),
        'w' => TimeDelta::try_weeks(count),
        _ => None,
    };
    offset.map(Some).ok_or_else(invalid)
}

fn parse_weekday_token(input: &str) -> Option<(i64, &str)> {
    if let Some((count, day)) = input.split_once(':') {
        let count = count.parse::<i64>().ok()?;
        if count < 1 {
            return None;
        }
        Some((count, day))
    } else {
        // Just "mon" means 1:mon
        Some((1, input))
    }
}

fn parse_weekday_str(s: &str) -> Option<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

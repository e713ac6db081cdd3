// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// Minimal proleptic Gregorian day counting, enough to locate a date within
// the millennium solar position tables.

use std::fmt;

use canonical_error::{CanonicalError, invalid_argument_error};
use chrono::Local;
use serde::Serialize;

use crate::solar_table::SolarTableFormat;

/// Number of days in each month of a non-leap year.
pub const MONTH_DAYS: [i64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Month tokens as they appear in date strings and solar table rows.
pub const MONTH_ABBREVIATIONS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun",
                                             "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// Numbering convention of the year in a date string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Era {
    // Years count forward; `a` tables.
    A,
    // Years count backward from 10000; `b` tables.
    B,
}

impl Era {
    pub fn code(&self) -> char {
        match self {
            Era::A => 'a',
            Era::B => 'b',
        }
    }

    pub fn parse(s: &str) -> Result<Era, CanonicalError> {
        match s {
            "a" => Ok(Era::A),
            "b" => Ok(Era::B),
            _ => Err(invalid_argument_error(
                format!("era must be 'a' or 'b'; got {:?}", s).as_str())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CalendarDate {
    pub year: i64,
    pub month: u32,  // 1..=12
    pub day: u32,  // 1..=31
}

impl CalendarDate {
    pub fn new(year: i64, month: u32, day: u32) -> Self {
        CalendarDate{year, month, day}
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let month = (self.month as usize).checked_sub(1)
            .and_then(|i| MONTH_ABBREVIATIONS.get(i)).unwrap_or(&"???");
        write!(f, "{:04}-{}-{:02}", self.year, month, self.day)
    }
}

/// Counts the leap years before `date`. The year of `date` itself is only
/// counted once February is over.
pub fn count_leap_years(date: &CalendarDate) -> i64 {
    let mut years = date.year;
    if date.month <= 2 {
        years -= 1;
    }
    years.div_euclid(4) - years.div_euclid(100) + years.div_euclid(400)
}

/// Days elapsed since a fixed (arbitrary) epoch. Only differences between
/// day counts are meaningful.
pub fn day_count(date: &CalendarDate) -> i64 {
    let months_before = (date.month as usize).saturating_sub(1).min(12);
    date.year * 365 + date.day as i64
        + MONTH_DAYS[..months_before].iter().sum::<i64>()
        + count_leap_years(date)
}

/// Number of days from `d1` to `d2`; negative if `d2` precedes `d1`.
pub fn difference(d1: &CalendarDate, d2: &CalendarDate) -> i64 {
    day_count(d2) - day_count(d1)
}

// Parses a fixed-width field made only of ASCII digits.
fn parse_digits(field: Option<&str>) -> Option<u32> {
    let field = field?;
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Parses a `YYYY-Mon-DD` date string. For era B the returned year is
/// 10000 minus the year written in the string.
pub fn parse_date(era: Era, date_str: &str) -> Result<CalendarDate, CanonicalError> {
    let invalid = |what: &str| {
        invalid_argument_error(
            format!("Invalid {} in date {:?}; expected YYYY-Mon-DD", what, date_str).as_str())
    };
    let bytes = date_str.as_bytes();
    if bytes.len() != 11 || bytes[4] != b'-' || bytes[8] != b'-' {
        return Err(invalid("layout"));
    }
    let year = parse_digits(date_str.get(0..4)).ok_or_else(|| invalid("year"))?;
    let month_token = date_str.get(5..8).ok_or_else(|| invalid("month"))?;
    let month = MONTH_ABBREVIATIONS.iter().position(|m| *m == month_token)
        .ok_or_else(|| invalid("month"))? as u32 + 1;
    let day = parse_digits(date_str.get(9..11)).ok_or_else(|| invalid("day"))?;
    if !(1..=31).contains(&day) {
        return Err(invalid("day"));
    }
    let year = year as i64;
    let year = match era {
        Era::A => year,
        Era::B => 10000 - year,
    };
    Ok(CalendarDate{year, month, day})
}

/// Today's local date as a `YYYY-Mon-DD` string.
pub fn today_date_string() -> String {
    Local::now().format("%Y-%b-%d").to_string()
}

/// Identifies one of the twenty millennium solar tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SolarTableSelection {
    pub era: Era,
    pub millennium: u8,  // 0..=9
}

impl SolarTableSelection {
    /// E.g. "a2k".
    pub fn table_name(&self) -> String {
        format!("{}{}k", self.era.code(), self.millennium)
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.table_name())
    }

    // The b9k table does not start on January 1, and its rows are laid out
    // one column to the right.
    fn is_short_interval(&self) -> bool {
        self.era == Era::B && self.millennium == 9
    }

    pub fn default_format(&self) -> SolarTableFormat {
        if self.is_short_interval() {
            SolarTableFormat::Shifted
        } else {
            SolarTableFormat::Standard
        }
    }

    /// First date tabulated in the table holding `date`.
    pub fn interval_start(&self, date: &CalendarDate) -> CalendarDate {
        let start_year = date.year.div_euclid(1000) * 1000;
        if self.is_short_interval() {
            CalendarDate::new(start_year, 3, 20)
        } else {
            CalendarDate::new(start_year, 1, 1)
        }
    }

    /// Expected (zero based) daily row of `date` within this table.
    pub fn row_offset(&self, date: &CalendarDate) -> i64 {
        difference(&self.interval_start(date), date)
    }
}

fn millennium_for(era: Era, date: &CalendarDate) -> u8 {
    let digit = match era {
        Era::A => date.year.div_euclid(1000),
        Era::B => (10000 - date.year).div_euclid(1000),
    };
    digit.clamp(0, 9) as u8
}

/// Selects the solar table covering `date_str`.
pub fn resolve_table(era: Era, date_str: &str)
                     -> Result<SolarTableSelection, CanonicalError> {
    let date = parse_date(era, date_str)?;
    Ok(SolarTableSelection{era, millennium: millennium_for(era, &date)})
}

/// A fully resolved date request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DateResolution {
    pub date_str: String,
    pub date: CalendarDate,
    pub selection: SolarTableSelection,
    // None when a `mill` override selected a table that does not hold `date`.
    pub row_offset: Option<i64>,
}

/// Resolves the `era`/`dateStr`/`mill` request parameters. A `mill`
/// override, if given, replaces the millennium derived from the date and
/// must be a single digit.
pub fn resolve_date(era: Era, date_str: &str, mill: Option<&str>)
                    -> Result<DateResolution, CanonicalError> {
    let date = parse_date(era, date_str)?;
    let derived = millennium_for(era, &date);
    let millennium = match mill {
        None => derived,
        Some(m) => {
            let mut chars = m.chars();
            match (chars.next().and_then(|c| c.to_digit(10)), chars.next()) {
                (Some(d), None) => d as u8,
                _ => return Err(invalid_argument_error(
                    format!("mill must be a single digit; got {:?}", m).as_str())),
            }
        }
    };
    let selection = SolarTableSelection{era, millennium};
    Ok(DateResolution{
        date_str: date_str.to_string(),
        date,
        selection,
        row_offset: (millennium == derived).then(|| selection.row_offset(&date)),
    })
}

// mod tests.

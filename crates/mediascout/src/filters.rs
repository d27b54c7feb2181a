//! Inclusion filters: extension allow/deny lists and the date range.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScanError;
use crate::media::normalize_extension;

/// List of file extensions, compared case-insensitively with or without the dot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionList(Vec<String>);

impl ExtensionList {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn contains(&self, ext: &str) -> bool {
        let ext = normalize_extension(ext);
        self.0.iter().any(|e| normalize_extension(e) == ext)
    }

    /// Allow-list semantics: an empty list includes everything.
    pub fn includes(&self, ext: &str) -> bool {
        self.is_empty() || self.contains(ext)
    }

    /// Deny-list semantics: an empty list excludes nothing.
    pub fn excludes(&self, ext: &str) -> bool {
        !self.is_empty() && self.contains(ext)
    }
}

/// Inclusive range of calendar days.
///
/// Parsed from `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, or two of those separated by
/// a comma. A single value covers the whole year/month/day it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateRange {
    first: NaiveDate,
    last: NaiveDate,
}

impl DateRange {
    pub fn new(first: NaiveDate, last: NaiveDate) -> Result<Self, ScanError> {
        if first > last {
            return Err(ScanError::DateRange(format!("{} is after {}", first, last)));
        }
        Ok(Self { first, last })
    }

    pub fn first(&self) -> NaiveDate {
        self.first
    }

    pub fn last(&self) -> NaiveDate {
        self.last
    }

    /// True when the date falls inside the range. A missing date never does.
    pub fn contains(&self, date_taken: Option<&DateTime<FixedOffset>>) -> bool {
        match date_taken {
            Some(taken) => {
                let day = taken.date_naive();
                self.first <= day && day <= self.last
            }
            None => false,
        }
    }
}

fn parse_number<T: FromStr>(part: &str, raw: &str) -> Result<T, ScanError> {
    part.trim()
        .parse()
        .map_err(|_| ScanError::DateRange(format!("'{}': bad number '{}'", raw, part)))
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// First and last day covered by one bound.
fn parse_bound(raw: &str) -> Result<(NaiveDate, NaiveDate), ScanError> {
    let invalid = || ScanError::DateRange(format!("'{}' is not a valid date", raw));
    let parts: Vec<&str> = raw.trim().split('-').collect();
    match parts.as_slice() {
        [year] => {
            let year: i32 = parse_number(year, raw)?;
            let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
            let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
            Ok((first, last))
        }
        [year, month] => {
            let year: i32 = parse_number(year, raw)?;
            let month: u32 = parse_number(month, raw)?;
            let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
            let last = last_day_of_month(year, month).ok_or_else(invalid)?;
            Ok((first, last))
        }
        [year, month, day] => {
            let day = NaiveDate::from_ymd_opt(
                parse_number(year, raw)?,
                parse_number(month, raw)?,
                parse_number(day, raw)?,
            )
            .ok_or_else(invalid)?;
            Ok((day, day))
        }
        _ => Err(invalid()),
    }
}

impl FromStr for DateRange {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(',') {
            Some((start, end)) => {
                let (first, _) = parse_bound(start)?;
                let (_, last) = parse_bound(end)?;
                Self::new(first, last)
            }
            None => {
                let (first, last) = parse_bound(s)?;
                Self::new(first, last)
            }
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            return write!(f, "{}", self.first);
        }
        let whole_month = self.first.day() == 1
            && last_day_of_month(self.first.year(), self.first.month()) == Some(self.last);
        if whole_month {
            write!(f, "{:04}-{:02}", self.first.year(), self.first.month())
        } else {
            write!(f, "{},{}", self.first, self.last)
        }
    }
}

impl TryFrom<String> for DateRange {
    type Error = ScanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateRange> for String {
    fn from(range: DateRange) -> Self {
        range.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_extension_lists() {
        let include = ExtensionList::new(["CR3", ".jpg"]);
        assert!(include.includes(".cr3"));
        assert!(include.includes(".JPG"));
        assert!(!include.includes(".png"));
        assert!(ExtensionList::default().includes(".png"));

        let exclude = ExtensionList::new([".cr3"]);
        assert!(exclude.excludes(".CR3"));
        assert!(!exclude.excludes(".jpg"));
        assert!(!ExtensionList::default().excludes(".cr3"));
    }

    #[test]
    fn test_month_range_is_inclusive() {
        let range: DateRange = "2023-08".parse().unwrap();
        assert_eq!(range.first(), NaiveDate::from_ymd_opt(2023, 8, 1).unwrap());
        assert_eq!(range.last(), NaiveDate::from_ymd_opt(2023, 8, 31).unwrap());
        assert!(range.contains(Some(&at(2023, 8, 1, 0))));
        assert!(range.contains(Some(&at(2023, 8, 31, 23))));
        assert!(!range.contains(Some(&at(2023, 9, 1, 0))));
        assert!(!range.contains(Some(&at(2023, 7, 31, 23))));
        assert!(!range.contains(None));
    }

    #[test]
    fn test_range_forms() {
        let year: DateRange = "2020".parse().unwrap();
        assert_eq!(year.last(), NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());

        let day: DateRange = "2024-02-29".parse().unwrap();
        assert_eq!(day.first(), day.last());

        let pair: DateRange = "2022-12,2023-02".parse().unwrap();
        assert_eq!(pair.first(), NaiveDate::from_ymd_opt(2022, 12, 1).unwrap());
        assert_eq!(pair.last(), NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
    }

    #[test]
    fn test_invalid_ranges() {
        assert!("2023-13".parse::<DateRange>().is_err());
        assert!("2023-02-30".parse::<DateRange>().is_err());
        assert!("soon".parse::<DateRange>().is_err());
        assert!("2024,2023".parse::<DateRange>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for raw in ["2023-08", "2024-02-29", "2022-12-01,2023-02-28"] {
            let range: DateRange = raw.parse().unwrap();
            assert_eq!(range.to_string(), raw);
        }
    }
}

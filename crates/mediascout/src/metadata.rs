//! Asset metadata: the reader contract and the built-in filename date reader.
//!
//! Reading embedded metadata (EXIF, QuickTime atoms) is delegated to an
//! external [`MetadataReader`]. The crate ships [`FilenameDateReader`], which
//! understands the date stamps cameras and phones put into file names.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{Result, ScanError};
use crate::tree::{base_name, VirtualTree};

/// How the "date taken" of an asset is derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMethod {
    /// Date handling disabled: assets have no date
    None,
    /// Parse the date stamp out of the file name
    #[default]
    Name,
    /// Ask the metadata reader for the embedded capture date
    Embedded,
}

impl DateMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Name => "name",
            Self::Embedded => "embedded",
        }
    }
}

/// Time zone used to interpret wall-clock times without an offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeZoneHint {
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl TimeZoneHint {
    /// Attach this zone to a wall-clock time.
    pub fn resolve(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
            Self::Utc => Some(Utc.from_utc_datetime(&naive).fixed_offset()),
            Self::Fixed(offset) => offset.from_local_datetime(&naive).single(),
        }
    }
}

impl FromStr for TimeZoneHint {
    type Err = ScanError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "" | "local" => return Ok(Self::Local),
            "utc" | "z" => return Ok(Self::Utc),
            _ => {}
        }
        // +HH:MM / -HH:MM / +HHMM
        let invalid = || ScanError::Config(format!("invalid time zone '{}'", s));
        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => return Err(invalid()),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::Fixed)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for TimeZoneHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Utc => f.write_str("utc"),
            Self::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

impl TryFrom<String> for TimeZoneHint {
    type Error = ScanError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeZoneHint> for String {
    fn from(hint: TimeZoneHint) -> Self {
        hint.to_string()
    }
}

/// Time zone hints handed to the reader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Zone of date stamps found in file names
    pub filename_timezone: TimeZoneHint,
    /// Zone of embedded dates that carry no offset
    pub embedded_timezone: TimeZoneHint,
}

/// Metadata extracted for an asset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetMetadata {
    pub date_taken: Option<DateTime<FixedOffset>>,
}

/// Derives asset metadata for a file of a tree.
pub trait MetadataReader: Send + Sync {
    fn read_metadata(
        &self,
        tree: &dyn VirtualTree,
        path: &str,
        method: DateMethod,
        options: &ReadOptions,
    ) -> Result<AssetMetadata>;
}

/// Reader that only looks at file names.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameDateReader;

impl MetadataReader for FilenameDateReader {
    fn read_metadata(
        &self,
        tree: &dyn VirtualTree,
        path: &str,
        method: DateMethod,
        options: &ReadOptions,
    ) -> Result<AssetMetadata> {
        match method {
            DateMethod::None => Ok(AssetMetadata::default()),
            DateMethod::Name => Ok(AssetMetadata {
                date_taken: date_from_name(base_name(path), options.filename_timezone),
            }),
            DateMethod::Embedded => {
                tracing::debug!(
                    tree = %tree.name(),
                    path = %path,
                    "Embedded dates need an external metadata reader"
                );
                Ok(AssetMetadata::default())
            }
        }
    }
}

// YYYYMMDD or YYYY-MM-DD, optionally followed by HHMMSS / HH.MM.SS / HH:MM:SS
static NAME_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|\D)((?:19|20)\d{2})[-_.]?(0[1-9]|1[0-2])[-_.]?(0[1-9]|[12]\d|3[01])(?:[-_. T]?([01]\d|2[0-3])[-_.:]?([0-5]\d)[-_.:]?([0-5]\d))?",
    )
    .unwrap()
});

/// Extract a capture date from a file name such as `IMG_20230801_101530.jpg`,
/// `PXL_20210102_221126856.MP.jpg` or `2023-08-01 10.15.30.heic`.
pub fn date_from_name(name: &str, zone: TimeZoneHint) -> Option<DateTime<FixedOffset>> {
    NAME_DATE.captures_iter(name).find_map(|caps| {
        let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
        let date = NaiveDate::from_ymd_opt(year, number(2)?, number(3)?)?;
        let time = match (number(4), number(5), number(6)) {
            (Some(h), Some(m), Some(s)) => NaiveTime::from_hms_opt(h, m, s)?,
            _ => NaiveTime::from_hms_opt(0, 0, 0)?,
        };
        zone.resolve(date.and_time(time))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn utc_date(name: &str) -> Option<NaiveDateTime> {
        date_from_name(name, TimeZoneHint::Utc).map(|d| d.naive_local())
    }

    #[test]
    fn test_dates_from_names() {
        let d = utc_date("20231227_152817.jpg").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2023, 12, 27));
        assert_eq!((d.hour(), d.minute(), d.second()), (15, 28, 17));

        let d = utc_date("PXL_20210102_221126856.MP.jpg").unwrap();
        assert_eq!((d.day(), d.hour(), d.minute()), (2, 22, 11));

        let d = utc_date("20230801-001.jpg").unwrap();
        assert_eq!((d.month(), d.day(), d.hour()), (8, 1, 0));

        let d = utc_date("2023-08-01 10.15.30.heic").unwrap();
        assert_eq!((d.hour(), d.minute(), d.second()), (10, 15, 30));
    }

    #[test]
    fn test_names_without_dates() {
        assert!(utc_date("root_01.jpg").is_none());
        assert!(utc_date("photo_03.jpg").is_none());
        assert!(utc_date("IMG_1234.JPG").is_none());
        assert!(utc_date("20231345_000000.jpg").is_none());
    }

    #[test]
    fn test_fixed_offset_is_applied() {
        let zone: TimeZoneHint = "+02:00".parse().unwrap();
        let d = date_from_name("20230801_120000.jpg", zone).unwrap();
        assert_eq!(d.offset().local_minus_utc(), 7200);
        assert_eq!(d.hour(), 12);
    }

    #[test]
    fn test_time_zone_hints_parse() {
        assert_eq!("local".parse::<TimeZoneHint>().unwrap(), TimeZoneHint::Local);
        assert_eq!("UTC".parse::<TimeZoneHint>().unwrap(), TimeZoneHint::Utc);
        assert_eq!(
            "-0530".parse::<TimeZoneHint>().unwrap(),
            TimeZoneHint::Fixed(FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap())
        );
        assert!("Europe/Paris".parse::<TimeZoneHint>().is_err());
        assert!("+2".parse::<TimeZoneHint>().is_err());
    }
}

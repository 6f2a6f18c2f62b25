//! # Tag Grammar
//!
//! A tag name is a manifest filename with its suffix stripped. Two shapes are
//! recognised:
//!
//! - **Daily**: `d_YYYY_MM_DD`, naming that exact calendar day.
//! - **Weekly**: `W_YYYY_WW` (or `w_`), naming the first day of week `WW`.
//!
//! Anything else is a [`TagParseError`]. Parse failures are recoverable: the
//! classifier drops the key and keeps going.
//!
//! ## Week Numbering
//!
//! Weekly tags are resolved under a [`WeekNumbering`] mode:
//!
//! - [`WeekNumbering::Iso`]: the Monday of ISO-8601 week `WW`. Week 1 is the
//!   week holding the year's first Thursday, so its Monday may fall in the
//!   previous December. Week 53 only exists in long ISO years.
//! - [`WeekNumbering::Calendar`]: January 1 plus `7 * (WW - 1)` days, as long as
//!   the result is still inside `YYYY`. Every year has weeks 1 through 53.
//!
//! Out-of-range weeks are rejected, never clamped.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static DAILY_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^d_([0-9]{4})_([0-9]{2})_([0-9]{2})$").expect("daily tag grammar compiles")
});

static WEEKLY_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[Ww]_([0-9]{4})_([0-9]{2})$").expect("weekly tag grammar compiles")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekNumbering {
    #[default]
    Iso,
    Calendar,
}

impl fmt::Display for WeekNumbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekNumbering::Iso => write!(f, "iso"),
            WeekNumbering::Calendar => write!(f, "calendar"),
        }
    }
}

impl FromStr for WeekNumbering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "iso" => Ok(WeekNumbering::Iso),
            "calendar" => Ok(WeekNumbering::Calendar),
            other => Err(format!(
                "unknown week numbering '{}' (expected 'iso' or 'calendar')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    Daily,
    Weekly,
}

/// The date a tag name encodes, along with which shape it was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagDate {
    pub cadence: Cadence,
    pub date: NaiveDate,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagParseError {
    #[error("'{0}' is neither a daily (d_YYYY_MM_DD) nor a weekly (W_YYYY_WW) tag")]
    Malformed(String),

    #[error("'{0}' does not name a real calendar date")]
    InvalidDate(String),

    #[error("week {week} does not exist in {year}")]
    WeekOutOfRange { year: i32, week: u32 },
}

/// Parse a suffix-stripped tag name into the date it stands for.
pub fn parse_tag(name: &str, numbering: WeekNumbering) -> Result<TagDate, TagParseError> {
    if DAILY_TAG.is_match(name) {
        return parse_daily(name).map(|date| TagDate {
            cadence: Cadence::Daily,
            date,
        });
    }
    if WEEKLY_TAG.is_match(name) {
        return parse_weekly(name, numbering).map(|date| TagDate {
            cadence: Cadence::Weekly,
            date,
        });
    }
    Err(TagParseError::Malformed(name.to_string()))
}

pub fn parse_daily(name: &str) -> Result<NaiveDate, TagParseError> {
    let caps = DAILY_TAG
        .captures(name)
        .ok_or_else(|| TagParseError::Malformed(name.to_string()))?;
    let year: i32 = numeric_field(name, &caps[1])?;
    let month: u32 = numeric_field(name, &caps[2])?;
    let day: u32 = numeric_field(name, &caps[3])?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| TagParseError::InvalidDate(name.to_string()))
}

pub fn parse_weekly(name: &str, numbering: WeekNumbering) -> Result<NaiveDate, TagParseError> {
    let caps = WEEKLY_TAG
        .captures(name)
        .ok_or_else(|| TagParseError::Malformed(name.to_string()))?;
    let year: i32 = numeric_field(name, &caps[1])?;
    let week: u32 = numeric_field(name, &caps[2])?;

    week_start(year, week, numbering).ok_or(TagParseError::WeekOutOfRange { year, week })
}

/// First day of `week` in `year`, or `None` when the week does not exist.
pub fn week_start(year: i32, week: u32, numbering: WeekNumbering) -> Option<NaiveDate> {
    match numbering {
        WeekNumbering::Iso => NaiveDate::from_isoywd_opt(year, week, Weekday::Mon),
        WeekNumbering::Calendar => {
            let offset = week.checked_sub(1)?;
            let start = NaiveDate::from_ymd_opt(year, 1, 1)?
                .checked_add_days(Days::new(7 * u64::from(offset)))?;
            (start.year() == year).then_some(start)
        }
    }
}

fn numeric_field<T: FromStr>(name: &str, digits: &str) -> Result<T, TagParseError> {
    digits
        .parse()
        .map_err(|_| TagParseError::Malformed(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_tags_parse_to_their_date() {
        let cases = [
            ("d_2024_01_01", ymd(2024, 1, 1)),
            ("d_2025_05_21", ymd(2025, 5, 21)),
            ("d_2024_02_29", ymd(2024, 2, 29)),
            ("d_1999_12_31", ymd(1999, 12, 31)),
        ];
        for (tag, expected) in cases {
            assert_eq!(parse_daily(tag), Ok(expected), "{}", tag);
        }
    }

    #[test]
    fn daily_tags_reject_impossible_dates() {
        for tag in [
            "d_2025_05_32",
            "d_2025_14_30",
            "d_2025_00_10",
            "d_2025_04_00",
            "d_2024_02_30",
            "d_2023_02_29",
            "d_2025_04_31",
        ] {
            assert_eq!(
                parse_daily(tag),
                Err(TagParseError::InvalidDate(tag.to_string())),
                "{}",
                tag
            );
        }
    }

    #[test]
    fn daily_tags_reject_bad_digit_grouping() {
        for tag in [
            "d_2025_05",
            "d_2025_05_3232",
            "d_225_05_09",
            "d_2025_5_09",
            "d_2025-05-09",
            "D_2025_05_09",
            "d_2025_05_09x",
            "xd_2025_05_09",
            "d_2025_0a_09",
            "d_２０２５_05_09",
            "",
        ] {
            assert!(
                matches!(parse_daily(tag), Err(TagParseError::Malformed(_))),
                "{}",
                tag
            );
        }
    }

    #[test]
    fn iso_weekly_tags_land_on_monday() {
        let cases = [
            ("W_2024_01", ymd(2024, 1, 1)),
            ("W_2024_12", ymd(2024, 3, 18)),
            ("W_2024_52", ymd(2024, 12, 23)),
            ("w_2025_05", ymd(2025, 1, 27)),
            ("w_2025_21", ymd(2025, 5, 19)),
            ("W_2025_52", ymd(2025, 12, 22)),
            ("W_2020_53", ymd(2020, 12, 28)),
            ("W_2026_53", ymd(2026, 12, 28)),
        ];
        for (tag, expected) in cases {
            let got = parse_weekly(tag, WeekNumbering::Iso).unwrap();
            assert_eq!(got, expected, "{}", tag);
            assert_eq!(got.weekday(), Weekday::Mon, "{}", tag);
        }
    }

    #[test]
    fn iso_week_one_can_start_in_december() {
        assert_eq!(
            parse_weekly("W_2025_01", WeekNumbering::Iso),
            Ok(ymd(2024, 12, 30))
        );
        assert_eq!(
            parse_weekly("W_2021_01", WeekNumbering::Iso),
            Ok(ymd(2021, 1, 4))
        );
    }

    #[test]
    fn iso_rejects_weeks_the_year_does_not_have() {
        for (tag, year, week) in [
            ("W_2023_53", 2023, 53),
            ("W_2025_53", 2025, 53),
            ("W_2025_54", 2025, 54),
            ("W_2026_54", 2026, 54),
            ("W_2024_00", 2024, 0),
        ] {
            assert_eq!(
                parse_weekly(tag, WeekNumbering::Iso),
                Err(TagParseError::WeekOutOfRange { year, week }),
                "{}",
                tag
            );
        }
    }

    #[test]
    fn calendar_weeks_count_from_january_first() {
        let cases = [
            ("W_2024_01", ymd(2024, 1, 1)),
            ("W_2024_12", ymd(2024, 3, 18)),
            ("W_2024_52", ymd(2024, 12, 23)),
            ("w_2025_05", ymd(2025, 1, 29)),
            ("w_2025_21", ymd(2025, 5, 21)),
            ("W_2025_52", ymd(2025, 12, 24)),
            ("W_2023_53", ymd(2023, 12, 31)),
            ("W_2024_53", ymd(2024, 12, 30)),
        ];
        for (tag, expected) in cases {
            assert_eq!(
                parse_weekly(tag, WeekNumbering::Calendar),
                Ok(expected),
                "{}",
                tag
            );
        }
    }

    #[test]
    fn calendar_rejects_week_zero_and_fifty_four() {
        assert_eq!(
            parse_weekly("W_2025_54", WeekNumbering::Calendar),
            Err(TagParseError::WeekOutOfRange {
                year: 2025,
                week: 54
            })
        );
        assert_eq!(
            parse_weekly("W_2025_00", WeekNumbering::Calendar),
            Err(TagParseError::WeekOutOfRange {
                year: 2025,
                week: 0
            })
        );
    }

    #[test]
    fn weekly_tags_reject_bad_shapes() {
        for tag in ["W_2025_df", "W_205_01", "W_2025_1", "W_2025_001", "X_2025_01", "W2025_01"] {
            assert!(
                matches!(
                    parse_weekly(tag, WeekNumbering::Iso),
                    Err(TagParseError::Malformed(_))
                ),
                "{}",
                tag
            );
        }
    }

    #[test]
    fn parse_tag_dispatches_on_shape() {
        assert_eq!(
            parse_tag("d_2024_01_20", WeekNumbering::Iso),
            Ok(TagDate {
                cadence: Cadence::Daily,
                date: ymd(2024, 1, 20)
            })
        );
        assert_eq!(
            parse_tag("W_2024_52", WeekNumbering::Iso),
            Ok(TagDate {
                cadence: Cadence::Weekly,
                date: ymd(2024, 12, 23)
            })
        );
        assert!(matches!(
            parse_tag("notes", WeekNumbering::Iso),
            Err(TagParseError::Malformed(_))
        ));
    }

    #[test]
    fn week_numbering_from_str() {
        assert_eq!("iso".parse::<WeekNumbering>(), Ok(WeekNumbering::Iso));
        assert_eq!(
            "Calendar".parse::<WeekNumbering>(),
            Ok(WeekNumbering::Calendar)
        );
        assert!("gregorian".parse::<WeekNumbering>().is_err());
    }
}

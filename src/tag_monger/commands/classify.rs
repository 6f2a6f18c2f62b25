//! Tag classification.
//!
//! Every key handed to the classifier ends up in exactly one place:
//!
//! - `retired` when its parent directory is the archive directory. These are
//!   never date-parsed, whatever their filename looks like.
//! - `unparsable` when its suffix-stripped filename fails the tag grammar.
//! - `fresh` when its tag date is on or after the cutoff.
//! - `expired` otherwise, with the archive target key filled in.
//!
//! The cutoff is `today - (retention_days - 1)`, compared at day granularity,
//! so a tag dated `retention_days - 1` days ago is the oldest that stays
//! fresh.

use crate::commands::{CmdMessage, CmdResult};
use crate::model::{TagPath, TagRecord};
use crate::tag::{parse_tag, TagParseError, WeekNumbering};
use chrono::{Days, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// The naming and retention rules a classification runs under.
#[derive(Debug, Clone, Copy)]
pub struct TagRules<'a> {
    pub retention_days: u32,
    pub archive_dir: &'a str,
    pub manifest_suffix: &'a str,
    pub week_numbering: WeekNumbering,
}

/// A key dropped because its filename is not a valid tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unparsable {
    pub key: String,
    pub error: TagParseError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub today: NaiveDate,
    pub cutoff: NaiveDate,
    pub fresh: Vec<TagRecord>,
    pub expired: Vec<TagRecord>,
    pub retired: Vec<TagRecord>,
    pub unparsable: Vec<Unparsable>,
}

impl Classification {
    fn empty(today: NaiveDate, cutoff: NaiveDate) -> Self {
        Self {
            today,
            cutoff,
            fresh: Vec::new(),
            expired: Vec::new(),
            retired: Vec::new(),
            unparsable: Vec::new(),
        }
    }

    /// Number of keys accounted for across all four outcomes.
    pub fn total(&self) -> usize {
        self.fresh.len() + self.expired.len() + self.retired.len() + self.unparsable.len()
    }
}

/// Midnight-aligned "today" in `tz`, as a calendar date.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Oldest date still considered fresh.
pub fn cutoff_date(today: NaiveDate, retention_days: u32) -> NaiveDate {
    let keep = u64::from(retention_days.saturating_sub(1));
    today
        .checked_sub_days(Days::new(keep))
        .unwrap_or(NaiveDate::MIN)
}

pub fn run(keys: &[String], today: NaiveDate, rules: &TagRules<'_>) -> CmdResult {
    let cutoff = cutoff_date(today, rules.retention_days);
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!("today: {}", today)));
    result.add_message(CmdMessage::info(format!("expire tags prior to {}", cutoff)));

    let mut classification = Classification::empty(today, cutoff);

    for key in keys {
        let path = TagPath::split(key);

        if path.parent_segment == rules.archive_dir {
            classification.retired.push(TagRecord::retired(path));
            continue;
        }

        let tag_name = path
            .filename
            .strip_suffix(rules.manifest_suffix)
            .unwrap_or(&path.filename)
            .to_string();

        match parse_tag(&tag_name, rules.week_numbering) {
            Ok(tag) if tag.date >= cutoff => {
                classification
                    .fresh
                    .push(TagRecord::fresh(path, tag_name, tag));
            }
            Ok(tag) => {
                classification.expired.push(TagRecord::expired(
                    path,
                    tag_name,
                    tag,
                    rules.archive_dir,
                ));
            }
            Err(error) => {
                warn!(key = key.as_str(), %error, "skipping unparsable tag");
                result.add_message(CmdMessage::warning(format!(
                    "Error parsing tag name: {} ({})",
                    tag_name, error
                )));
                classification.unparsable.push(Unparsable {
                    key: key.clone(),
                    error,
                });
            }
        }
    }

    result.add_message(CmdMessage::info(format!(
        "found {} \"fresh enough\" tag files",
        classification.fresh.len()
    )));
    result.add_message(CmdMessage::info(format!(
        "found {} expired tag files",
        classification.expired.len()
    )));
    result.add_message(CmdMessage::info(format!(
        "found {} retired tag files",
        classification.retired.len()
    )));
    if !classification.unparsable.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "skipped {} unparsable tag files",
            classification.unparsable.len()
        )));
    }

    result.with_classification(classification)
}

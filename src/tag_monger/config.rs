use crate::commands::classify::TagRules;
use crate::commands::filter::TagPattern;
use crate::error::{MongerError, Result};
use crate::store::Provider;
use crate::tag::WeekNumbering;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "config.json";
pub const DEFAULT_ARCHIVE_DIR: &str = "old_tags";
pub const DEFAULT_TIME_ZONE: &str = "America/Los_Angeles";
pub const DEFAULT_MANIFEST_SUFFIX: &str = ".list";
pub const DEFAULT_PATTERN: &str =
    r"(?:^|/)(?:d_[0-9]{4}_[0-9]{2}_[0-9]{2}|[Ww]_[0-9]{4}_[0-9]{2})\.list$";

const DEFAULT_PAGE_SIZE: usize = 100;
const DEFAULT_MAX_OBJECTS: usize = 1000;
const DEFAULT_DAYS: u32 = 30;

/// Settings for one sweep, as read from a config file and overridden by the
/// command line. Values are unchecked until [`MongerConfig::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MongerConfig {
    pub provider: Option<Provider>,

    pub bucket: Option<String>,

    /// Keys requested per listing page
    pub page_size: usize,

    /// Stop listing after this many keys (0 lists everything)
    pub max_objects: usize,

    /// Retention window in days
    pub days: u32,

    /// Report what would move without touching the bucket
    pub noop: bool,

    pub verbose: bool,

    /// IANA zone in which "today" is computed
    pub time_zone: String,

    /// Directory segment expired tags are moved under
    pub archive_dir: String,

    /// Regular expression a key must match to be considered a tag file
    pub pattern: String,

    /// Suffix stripped from a filename to get the tag name
    pub manifest_suffix: String,

    pub week_numbering: WeekNumbering,
}

impl Default for MongerConfig {
    fn default() -> Self {
        Self {
            provider: None,
            bucket: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_objects: DEFAULT_MAX_OBJECTS,
            days: DEFAULT_DAYS,
            noop: false,
            verbose: false,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            archive_dir: DEFAULT_ARCHIVE_DIR.to_string(),
            pattern: DEFAULT_PATTERN.to_string(),
            manifest_suffix: DEFAULT_MANIFEST_SUFFIX.to_string(),
            week_numbering: WeekNumbering::Iso,
        }
    }
}

/// A validated config, ready to drive the pipeline.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub bucket: String,
    pub page_size: usize,
    pub max_objects: usize,
    pub retention_days: u32,
    pub dry_run: bool,
    pub time_zone: Tz,
    pub archive_dir: String,
    pub pattern: TagPattern,
    pub manifest_suffix: String,
    pub week_numbering: WeekNumbering,
}

impl SweepPlan {
    pub fn rules(&self) -> TagRules<'_> {
        TagRules {
            retention_days: self.retention_days,
            archive_dir: &self.archive_dir,
            manifest_suffix: &self.manifest_suffix,
            week_numbering: self.week_numbering,
        }
    }
}

impl MongerConfig {
    /// Load config from a JSON file, or return defaults if it does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(MongerError::Io)?;
        let config: MongerConfig =
            serde_json::from_str(&content).map_err(MongerError::Serialization)?;
        Ok(config)
    }

    /// Validate every setting the pipeline depends on. Runs before any
    /// backend call, so a bad value never costs a listing.
    pub fn resolve(&self) -> Result<SweepPlan> {
        let bucket = self
            .bucket
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| MongerError::config("a bucket is required"))?;

        if self.page_size == 0 {
            return Err(MongerError::config("page size must be at least 1"));
        }
        if self.days == 0 {
            return Err(MongerError::config("retention must be at least 1 day"));
        }

        let time_zone: Tz = self.time_zone.parse().map_err(|_| {
            MongerError::config(format!("unknown time zone '{}'", self.time_zone))
        })?;

        if self.archive_dir.is_empty() || self.archive_dir.contains('/') {
            return Err(MongerError::config(format!(
                "archive directory must be a single path segment, got '{}'",
                self.archive_dir
            )));
        }
        if self.manifest_suffix.is_empty() {
            return Err(MongerError::config("manifest suffix cannot be empty"));
        }

        let pattern = TagPattern::new(&self.pattern)?;

        Ok(SweepPlan {
            bucket: bucket.to_string(),
            page_size: self.page_size,
            max_objects: self.max_objects,
            retention_days: self.days,
            dry_run: self.noop,
            time_zone,
            archive_dir: self.archive_dir.clone(),
            pattern,
            manifest_suffix: self.manifest_suffix.clone(),
            week_numbering: self.week_numbering,
        })
    }
}

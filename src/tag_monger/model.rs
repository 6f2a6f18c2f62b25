use crate::tag::TagDate;
use chrono::NaiveDate;
use std::fmt;

/// Lifecycle state assigned to a tag object by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagState {
    /// Inside the retention window.
    Fresh,
    /// Older than the cutoff, due to be moved under the archive directory.
    Expired,
    /// Already lives under the archive directory.
    Retired,
}

impl fmt::Display for TagState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagState::Fresh => write!(f, "fresh"),
            TagState::Expired => write!(f, "expired"),
            TagState::Retired => write!(f, "retired"),
        }
    }
}

/// An object key split into the parts the classifier looks at.
///
/// `directory` carries no trailing slash and is empty for keys at the bucket
/// root. `parent_segment` is the last component of `directory`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagPath {
    pub key: String,
    pub directory: String,
    pub filename: String,
    pub parent_segment: String,
}

impl TagPath {
    pub fn split(key: &str) -> Self {
        let (directory, filename) = match key.rfind('/') {
            Some(pos) => (&key[..pos], &key[pos + 1..]),
            None => ("", key),
        };
        let parent_segment = directory.rsplit('/').next().unwrap_or_default();

        Self {
            key: key.to_string(),
            directory: directory.to_string(),
            filename: filename.to_string(),
            parent_segment: parent_segment.to_string(),
        }
    }

    /// The key this object gets once moved under `archive_dir`, which is
    /// inserted between the original directory and the filename.
    pub fn archive_key(&self, archive_dir: &str) -> String {
        if self.directory.is_empty() {
            format!("{}/{}", archive_dir, self.filename)
        } else {
            format!("{}/{}/{}", self.directory, archive_dir, self.filename)
        }
    }
}

/// One classified tag object.
///
/// Built through the state-specific constructors so that a record's state
/// and its optional fields always agree: only `Expired` records have a
/// target key, and `Retired` records are never date-parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    path: TagPath,
    tag_name: Option<String>,
    tag: Option<TagDate>,
    state: TagState,
    target_key: Option<String>,
}

impl TagRecord {
    pub fn retired(path: TagPath) -> Self {
        Self {
            path,
            tag_name: None,
            tag: None,
            state: TagState::Retired,
            target_key: None,
        }
    }

    pub fn fresh(path: TagPath, tag_name: String, tag: TagDate) -> Self {
        Self {
            path,
            tag_name: Some(tag_name),
            tag: Some(tag),
            state: TagState::Fresh,
            target_key: None,
        }
    }

    pub fn expired(path: TagPath, tag_name: String, tag: TagDate, archive_dir: &str) -> Self {
        let target_key = path.archive_key(archive_dir);
        Self {
            path,
            tag_name: Some(tag_name),
            tag: Some(tag),
            state: TagState::Expired,
            target_key: Some(target_key),
        }
    }

    pub fn key(&self) -> &str {
        &self.path.key
    }

    pub fn path(&self) -> &TagPath {
        &self.path
    }

    pub fn directory(&self) -> &str {
        &self.path.directory
    }

    pub fn filename(&self) -> &str {
        &self.path.filename
    }

    pub fn parent_segment(&self) -> &str {
        &self.path.parent_segment
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.tag_name.as_deref()
    }

    pub fn tag(&self) -> Option<TagDate> {
        self.tag
    }

    pub fn tag_date(&self) -> Option<NaiveDate> {
        self.tag.map(|t| t.date)
    }

    pub fn state(&self) -> TagState {
        self.state
    }

    pub fn target_key(&self) -> Option<&str> {
        self.target_key.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Cadence;

    fn daily(y: i32, m: u32, d: u32) -> TagDate {
        TagDate {
            cadence: Cadence::Daily,
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        }
    }

    #[test]
    fn split_nested_key() {
        let path = TagPath::split("eups/tags/d_2024_01_01.list");
        assert_eq!(path.directory, "eups/tags");
        assert_eq!(path.filename, "d_2024_01_01.list");
        assert_eq!(path.parent_segment, "tags");
    }

    #[test]
    fn split_root_key() {
        let path = TagPath::split("d_2024_01_01.list");
        assert_eq!(path.directory, "");
        assert_eq!(path.filename, "d_2024_01_01.list");
        assert_eq!(path.parent_segment, "");
    }

    #[test]
    fn split_archived_key() {
        let path = TagPath::split("foo/old_tags/d_2023_12_01.list");
        assert_eq!(path.directory, "foo/old_tags");
        assert_eq!(path.parent_segment, "old_tags");
    }

    #[test]
    fn archive_key_inserts_segment_before_filename() {
        assert_eq!(
            TagPath::split("foo/d_2024_01_01.list").archive_key("old_tags"),
            "foo/old_tags/d_2024_01_01.list"
        );
        assert_eq!(
            TagPath::split("a/b/W_2024_05.list").archive_key("old_tags"),
            "a/b/old_tags/W_2024_05.list"
        );
        assert_eq!(
            TagPath::split("d_2024_01_01.list").archive_key("old_tags"),
            "old_tags/d_2024_01_01.list"
        );
    }

    #[test]
    fn expired_record_carries_target_key() {
        let record = TagRecord::expired(
            TagPath::split("foo/d_2024_01_01.list"),
            "d_2024_01_01".into(),
            daily(2024, 1, 1),
            "old_tags",
        );
        assert_eq!(record.state(), TagState::Expired);
        assert_eq!(record.target_key(), Some("foo/old_tags/d_2024_01_01.list"));
        assert_ne!(record.target_key(), Some(record.key()));
    }

    #[test]
    fn fresh_and_retired_records_have_no_target() {
        let fresh = TagRecord::fresh(
            TagPath::split("foo/d_2024_01_20.list"),
            "d_2024_01_20".into(),
            daily(2024, 1, 20),
        );
        assert_eq!(fresh.target_key(), None);
        assert_eq!(fresh.tag_date(), NaiveDate::from_ymd_opt(2024, 1, 20));

        let retired = TagRecord::retired(TagPath::split("foo/old_tags/d_2023_12_01.list"));
        assert_eq!(retired.state(), TagState::Retired);
        assert_eq!(retired.target_key(), None);
        assert_eq!(retired.tag_date(), None);
    }
}

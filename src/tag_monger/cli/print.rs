use chrono::NaiveDate;
use colored::Colorize;
use tag_monger::api::{CmdMessage, MessageLevel};
use tag_monger::commands::{Classification, Relocation};
use tag_monger::model::{TagRecord, TagState};
use timeago::Formatter;
use unicode_width::UnicodeWidthStr;

const STATE_WIDTH: usize = 11;
const AGE_WIDTH: usize = 14;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
        }
    }
}

/// One aligned line per classified key: retired first, then fresh, then
/// expired with its target, then whatever failed to parse.
pub(super) fn print_classification(classification: &Classification) {
    let records = move || {
        classification
            .retired
            .iter()
            .chain(&classification.fresh)
            .chain(&classification.expired)
    };
    let key_width = records()
        .map(|r| r.key().width())
        .chain(classification.unparsable.iter().map(|u| u.key.width()))
        .max()
        .unwrap_or(0);

    println!();
    for record in records() {
        let line = format_record(record, classification.today, key_width);
        match record.state() {
            TagState::Retired => println!("{}", line.dimmed()),
            TagState::Fresh => println!("{}", line.green()),
            TagState::Expired => println!("{}", line.yellow()),
        }
    }
    for unparsable in &classification.unparsable {
        let line = format!(
            "{}{}  {}  {}",
            pad_to_width("unparsable", STATE_WIDTH),
            " ".repeat(AGE_WIDTH),
            unparsable.key,
            unparsable.error
        );
        println!("{}", line.red());
    }
    println!();
}

pub(super) fn print_relocations(relocations: &[Relocation]) {
    let moved = relocations.iter().filter(|r| r.moved).count();
    if moved > 0 {
        println!("{}", format!("moved {} tag files", moved).green().bold());
    }
}

fn format_record(record: &TagRecord, today: NaiveDate, key_width: usize) -> String {
    let age = record
        .tag_date()
        .map(|date| format_age(today, date))
        .unwrap_or_default();
    let mut line = format!(
        "{}{:>width$}  {}",
        pad_to_width(&record.state().to_string(), STATE_WIDTH),
        age,
        pad_to_width(record.key(), key_width),
        width = AGE_WIDTH
    );
    if let Some(target) = record.target_key() {
        line.push_str(&format!("  -> {}", target));
    }
    line.trim_end().to_string()
}

fn format_age(today: NaiveDate, date: NaiveDate) -> String {
    match (today - date).to_std() {
        Ok(elapsed) if elapsed.is_zero() => "today".to_string(),
        Ok(elapsed) => Formatter::new().convert(elapsed),
        Err(_) => "upcoming".to_string(),
    }
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tag_monger::model::TagPath;
    use tag_monger::tag::{Cadence, TagDate};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(date: NaiveDate) -> TagDate {
        TagDate {
            cadence: Cadence::Daily,
            date,
        }
    }

    #[test]
    fn expired_line_shows_age_and_target() {
        let record = TagRecord::expired(
            TagPath::split("foo/d_2024_01_01.list"),
            "d_2024_01_01".into(),
            daily(ymd(2024, 1, 1)),
            "old_tags",
        );
        let line = format_record(&record, ymd(2024, 1, 11), 24);
        assert!(line.starts_with("expired"));
        assert!(line.contains("1 week ago"));
        assert!(line.ends_with("foo/d_2024_01_01.list     -> foo/old_tags/d_2024_01_01.list"));
    }

    #[test]
    fn retired_line_has_no_age() {
        let record = TagRecord::retired(TagPath::split("foo/old_tags/d_2023_12_01.list"));
        let line = format_record(&record, ymd(2024, 2, 1), 0);
        assert_eq!(
            line,
            format!("retired    {}  foo/old_tags/d_2023_12_01.list", " ".repeat(AGE_WIDTH))
        );
    }

    #[test]
    fn age_labels() {
        assert_eq!(format_age(ymd(2024, 2, 1), ymd(2024, 2, 1)), "today");
        assert_eq!(format_age(ymd(2024, 2, 1), ymd(2024, 2, 3)), "upcoming");
        assert_eq!(format_age(ymd(2024, 2, 1), ymd(2024, 1, 31)), "1 day ago");
    }

    #[test]
    fn pads_by_display_width() {
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(pad_to_width("abcdef", 4), "abcdef");
    }
}

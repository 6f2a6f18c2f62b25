use crate::commands::{CmdMessage, CmdResult};
use crate::error::{MongerError, Result};
use regex::Regex;
use tracing::trace;

/// A compiled key pattern. Compiling is the only way to get one, so an
/// invalid expression is reported before any key is scanned.
#[derive(Debug, Clone)]
pub struct TagPattern {
    regex: Regex,
}

impl TagPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            MongerError::config(format!("invalid key pattern '{}': {}", pattern, e))
        })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

/// Keep the keys that look like tag files, in their original order.
pub fn run(keys: &[String], pattern: &TagPattern) -> CmdResult {
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!(
        "looking for objects like: {}",
        pattern.as_str()
    )));

    let matched: Vec<String> = keys
        .iter()
        .filter(|key| pattern.matches(key))
        .inspect(|key| trace!(key = key.as_str(), "matched tag pattern"))
        .cloned()
        .collect();

    result.add_message(CmdMessage::info(format!("found {} objects", matched.len())));
    result.with_keys(matched)
}

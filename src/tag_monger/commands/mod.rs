use crate::model::TagRecord;
use chrono::NaiveDate;

pub mod classify;
pub mod fetch;
pub mod filter;
pub mod relocate;
pub mod sweep;

pub use classify::{Classification, Unparsable};
pub use relocate::Relocation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Keys produced by the fetch and filter stages
    pub keys: Vec<String>,
    pub classification: Option<Classification>,
    pub relocations: Vec<Relocation>,
    pub dry_run: bool,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }

    pub fn with_relocations(mut self, relocations: Vec<Relocation>) -> Self {
        self.relocations = relocations;
        self
    }

    /// Move another stage's messages onto the end of this result.
    pub fn absorb_messages(&mut self, other: &mut CmdResult) {
        self.messages.append(&mut other.messages);
    }

    pub fn fresh(&self) -> &[TagRecord] {
        self.classification
            .as_ref()
            .map(|c| c.fresh.as_slice())
            .unwrap_or_default()
    }

    pub fn expired(&self) -> &[TagRecord] {
        self.classification
            .as_ref()
            .map(|c| c.expired.as_slice())
            .unwrap_or_default()
    }

    pub fn retired(&self) -> &[TagRecord] {
        self.classification
            .as_ref()
            .map(|c| c.retired.as_slice())
            .unwrap_or_default()
    }

    pub fn today(&self) -> Option<NaiveDate> {
        self.classification.as_ref().map(|c| c.today)
    }
}

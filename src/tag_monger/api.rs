//! # API Facade
//!
//! A thin layer over the command modules and the single entry point for every
//! tag-monger operation, whatever the UI.
//!
//! The facade:
//! - **Dispatches** to the matching command function
//! - **Resolves inputs** (config into a [`SweepPlan`], time zone into "today")
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It never prints and never decides what a tag is. Business rules live in
//! `commands/*.rs`.
//!
//! ## Generic Over ObjectStore
//!
//! `MongerApi<S: ObjectStore>` is generic over the storage backend:
//! - Production: `MongerApi<CloudStore>`
//! - Testing: `MongerApi<InMemoryStore>`
//!
//! so the whole pipeline can be driven without a network.

use crate::commands::{self, classify::TagRules, filter::TagPattern, CmdResult};
use crate::config::{MongerConfig, SweepPlan};
use crate::error::Result;
use crate::model::TagRecord;
use crate::store::ObjectStore;
use chrono::NaiveDate;

pub use crate::commands::{CmdMessage, MessageLevel};

pub struct MongerApi<S: ObjectStore> {
    store: S,
}

impl<S: ObjectStore> MongerApi<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fetch(&self, bucket: &str, page_size: usize, max_objects: usize) -> Result<CmdResult> {
        commands::fetch::run(&self.store, bucket, page_size, max_objects)
    }

    pub fn filter(&self, keys: &[String], pattern: &TagPattern) -> CmdResult {
        commands::filter::run(keys, pattern)
    }

    pub fn classify(&self, keys: &[String], today: NaiveDate, rules: &TagRules<'_>) -> CmdResult {
        commands::classify::run(keys, today, rules)
    }

    pub fn relocate(&self, bucket: &str, expired: &[TagRecord], dry_run: bool) -> Result<CmdResult> {
        commands::relocate::run(&self.store, bucket, expired, dry_run)
    }

    /// Validate `config` and run the full pipeline with "today" taken from
    /// the configured time zone.
    pub fn sweep(&self, config: &MongerConfig) -> Result<CmdResult> {
        let plan = config.resolve()?;
        let today = commands::classify::today_in(plan.time_zone);
        self.sweep_plan(&plan, today)
    }

    /// Run the full pipeline for an already validated plan and a fixed date.
    pub fn sweep_plan(&self, plan: &SweepPlan, today: NaiveDate) -> Result<CmdResult> {
        commands::sweep::run(&self.store, plan, today)
    }
}

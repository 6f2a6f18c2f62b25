//! The full pipeline: fetch, filter, classify, relocate.
//!
//! Stages run strictly one after another. Each stage's messages are appended
//! to the sweep result in order, followed by a one-line run summary.

use crate::commands::{classify, fetch, filter, relocate, CmdMessage, CmdResult};
use crate::config::SweepPlan;
use crate::error::Result;
use crate::store::ObjectStore;
use chrono::NaiveDate;
use tracing::info;

pub fn run<S: ObjectStore>(store: &S, plan: &SweepPlan, today: NaiveDate) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    result.dry_run = plan.dry_run;

    let mut fetched = fetch::run(store, &plan.bucket, plan.page_size, plan.max_objects)?;
    result.absorb_messages(&mut fetched);

    let mut filtered = filter::run(&fetched.keys, &plan.pattern);
    result.absorb_messages(&mut filtered);

    let mut classified = classify::run(&filtered.keys, today, &plan.rules());
    result.absorb_messages(&mut classified);

    let mut relocated = relocate::run(store, &plan.bucket, classified.expired(), plan.dry_run)?;
    result.absorb_messages(&mut relocated);

    let unparsable = classified
        .classification
        .as_ref()
        .map_or(0, |c| c.unparsable.len());
    let moved = relocated.relocations.iter().filter(|r| r.moved).count();
    info!(
        bucket = plan.bucket.as_str(),
        fresh = classified.fresh().len(),
        expired = classified.expired().len(),
        retired = classified.retired().len(),
        unparsable,
        moved,
        "sweep finished"
    );

    result.add_message(CmdMessage::info(format!(
        "summary: {} fresh, {} expired, {} retired, {} unparsable, {} moved",
        classified.fresh().len(),
        classified.expired().len(),
        classified.retired().len(),
        unparsable,
        moved
    )));
    if plan.dry_run {
        result.add_message(CmdMessage::warning("noop: no changes were made"));
    }

    let mut result = result
        .with_keys(filtered.keys)
        .with_relocations(relocated.relocations);
    result.classification = classified.classification;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MongerConfig;
    use crate::error::MongerError;
    use crate::model::TagState;
    use crate::store::memory::InMemoryStore;

    const BUCKET: &str = "eups-tags";

    fn plan(noop: bool) -> SweepPlan {
        MongerConfig {
            bucket: Some(BUCKET.into()),
            noop,
            ..MongerConfig::default()
        }
        .resolve()
        .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    fn reference_bucket() -> InMemoryStore {
        InMemoryStore::with_keys(
            BUCKET,
            [
                "foo/d_2024_01_01.list",
                "foo/d_2024_01_20.list",
                "foo/old_tags/d_2023_12_01.list",
                "foo/notes.txt",
            ],
        )
    }

    #[test]
    fn sweeps_the_reference_bucket() {
        let store = reference_bucket();
        let result = run(&store, &plan(false), today()).unwrap();

        assert_eq!(
            store.keys(BUCKET),
            vec![
                "foo/d_2024_01_20.list",
                "foo/notes.txt",
                "foo/old_tags/d_2023_12_01.list",
                "foo/old_tags/d_2024_01_01.list",
            ]
        );
        assert_eq!(result.keys.len(), 3, "notes.txt is filtered out");
        assert_eq!(result.fresh().len(), 1);
        assert_eq!(result.expired()[0].state(), TagState::Expired);
        assert_eq!(result.retired().len(), 1);
        assert_eq!(result.relocations.len(), 1);
        assert!(result.messages.iter().any(|m| m.content
            == "summary: 1 fresh, 1 expired, 1 retired, 0 unparsable, 1 moved"));
    }

    #[test]
    fn second_sweep_finds_nothing_to_move() {
        let store = reference_bucket();
        run(&store, &plan(false), today()).unwrap();
        let mutations = store.mutations().len();

        let again = run(&store, &plan(false), today()).unwrap();
        assert!(again.expired().is_empty());
        assert_eq!(again.retired().len(), 2);
        assert_eq!(store.mutations().len(), mutations);
    }

    #[test]
    fn dry_run_reports_without_mutating() {
        let store = reference_bucket();
        let result = run(&store, &plan(true), today()).unwrap();

        assert!(store.mutations().is_empty());
        assert!(result.dry_run);
        assert_eq!(result.relocations.len(), 1);
        assert!(!result.relocations[0].moved);
        assert!(result
            .messages
            .iter()
            .any(|m| m.content
                == "foo/d_2024_01_01.list -> foo/old_tags/d_2024_01_01.list (noop)"));
        assert_eq!(
            result.messages.last().map(|m| m.content.as_str()),
            Some("noop: no changes were made")
        );
    }

    #[test]
    fn listing_failure_stops_before_any_move() {
        let store = reference_bucket();
        store.fail_listing_after(0);
        let err = run(&store, &plan(false), today()).unwrap_err();
        assert!(matches!(err, MongerError::Iteration(_)));
        assert!(store.mutations().is_empty());
    }

    #[test]
    fn max_objects_limits_what_is_considered() {
        let store = InMemoryStore::with_keys(
            BUCKET,
            ["a/d_2023_01_01.list", "b/d_2023_01_01.list", "c/d_2023_01_01.list"],
        );
        let mut plan = plan(false);
        plan.max_objects = 2;

        let result = run(&store, &plan, today()).unwrap();
        assert_eq!(result.relocations.len(), 2);
        assert!(store.contains(BUCKET, "c/d_2023_01_01.list"));
    }
}

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::ObjectStore;
use std::ops::ControlFlow;
use tracing::{debug, info};

/// Emit a progress line every this many keys.
pub const PROGRESS_EVERY: usize = 10_000;

/// List the keys of `bucket` in backend order, stopping as soon as
/// `max_objects` keys have been seen (even mid-page). `0` means no limit.
///
/// A listing error fails the whole fetch; keys gathered before the error are
/// discarded.
pub fn run<S: ObjectStore>(
    store: &S,
    bucket: &str,
    page_size: usize,
    max_objects: usize,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!(
        "looking for objects in bucket: {}",
        bucket
    )));
    result.add_message(CmdMessage::info(format!("page size: {}", page_size)));

    let limit = (max_objects > 0).then_some(max_objects);
    let mut keys: Vec<String> = Vec::new();
    let mut page_num = 0usize;

    store.list_objects(bucket, page_size, &mut |page| {
        debug!(page = page_num, keys = page.len(), "fetched listing page");
        page_num += 1;

        for key in page {
            keys.push(key.clone());
            if keys.len() % PROGRESS_EVERY == 0 {
                info!(count = keys.len(), bucket, "loaded objects from bucket");
            }
            if limit.is_some_and(|max| keys.len() >= max) {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    })?;

    result.add_message(CmdMessage::info(format!("found {} objects", keys.len())));
    Ok(result.with_keys(keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MongerError;
    use crate::store::memory::InMemoryStore;

    fn numbered(n: usize) -> InMemoryStore {
        InMemoryStore::with_keys("b", (0..n).map(|i| format!("k{:05}", i)))
    }

    #[test]
    fn fetches_everything_when_unbounded() {
        let store = numbered(250);
        let result = run(&store, "b", 100, 0).unwrap();
        assert_eq!(result.keys.len(), 250);
        assert_eq!(result.keys[0], "k00000");
        assert_eq!(result.keys[249], "k00249");
    }

    #[test]
    fn stops_mid_page_at_max() {
        let store = numbered(250);
        let result = run(&store, "b", 100, 150).unwrap();
        assert_eq!(result.keys.len(), 150);
        assert_eq!(result.keys.last().map(String::as_str), Some("k00149"));
    }

    #[test]
    fn max_larger_than_bucket_returns_all() {
        let store = numbered(7);
        let result = run(&store, "b", 3, 1000).unwrap();
        assert_eq!(result.keys.len(), 7);
    }

    #[test]
    fn preserves_backend_order() {
        let store = InMemoryStore::with_keys("b", ["z/1", "a/2", "m/3"]);
        let result = run(&store, "b", 2, 0).unwrap();
        assert_eq!(result.keys, vec!["a/2", "m/3", "z/1"]);
    }

    #[test]
    fn listing_error_is_fatal() {
        let store = numbered(50);
        store.fail_listing_after(2);
        let err = run(&store, "b", 10, 0).unwrap_err();
        assert!(matches!(err, MongerError::Iteration(_)));
    }

    #[test]
    fn reports_bucket_and_count() {
        let store = numbered(3);
        let result = run(&store, "b", 100, 0).unwrap();
        let text: Vec<_> = result.messages.iter().map(|m| m.content.as_str()).collect();
        assert!(text.contains(&"looking for objects in bucket: b"));
        assert!(text.contains(&"page size: 100"));
        assert!(text.contains(&"found 3 objects"));
    }
}

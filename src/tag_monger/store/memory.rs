use super::{ObjectStore, Waiter};
use crate::error::{MongerError, Result};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::ControlFlow;

/// A write recorded by [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Copy {
        bucket: String,
        src_key: String,
        dst_bucket: String,
        dst_key: String,
    },
    Delete {
        bucket: String,
        key: String,
    },
}

/// In-memory buckets for testing.
///
/// Keys list in lexical order, like S3. Uses `RefCell`/`Cell` for interior
/// mutability since the pipeline is single-threaded.
///
/// Besides plain storage it can:
/// - fail listing after a number of pages, or fail copy/delete of chosen keys
/// - keep writes invisible to `object_exists` for a number of existence checks,
///   emulating an eventually consistent backend
/// - report every mutation it performed
#[derive(Default)]
pub struct InMemoryStore {
    buckets: RefCell<HashMap<String, BTreeMap<String, Vec<u8>>>>,
    mutations: RefCell<Vec<Mutation>>,
    fail_listing_after: Cell<Option<usize>>,
    fail_copy: RefCell<HashSet<String>>,
    fail_delete: RefCell<HashSet<String>>,
    visibility_lag: Cell<u32>,
    stale: RefCell<HashMap<(String, String), (u32, bool)>>,
    waiter: Waiter,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store populated with empty objects at `keys` in `bucket`.
    pub fn with_keys<I, K>(bucket: &str, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let store = Self::new();
        store.create_bucket(bucket);
        for key in keys {
            store.put(bucket, key.as_ref(), Vec::new());
        }
        store
    }

    pub fn create_bucket(&self, bucket: &str) {
        self.buckets
            .borrow_mut()
            .entry(bucket.to_string())
            .or_default();
    }

    pub fn put(&self, bucket: &str, key: &str, body: Vec<u8>) {
        self.buckets
            .borrow_mut()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), body);
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.buckets
            .borrow()
            .get(bucket)
            .and_then(|objects| objects.get(key).cloned())
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.buckets
            .borrow()
            .get(bucket)
            .is_some_and(|objects| objects.contains_key(key))
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .borrow()
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.mutations.borrow().clone()
    }

    /// Deliver `pages` pages, then fail the listing.
    pub fn fail_listing_after(&self, pages: usize) {
        self.fail_listing_after.set(Some(pages));
    }

    pub fn fail_copy_of(&self, key: &str) {
        self.fail_copy.borrow_mut().insert(key.to_string());
    }

    pub fn fail_delete_of(&self, key: &str) {
        self.fail_delete.borrow_mut().insert(key.to_string());
    }

    /// Hide each subsequent write from the next `checks` existence checks.
    pub fn set_visibility_lag(&self, checks: u32) {
        self.visibility_lag.set(checks);
    }

    pub fn set_waiter(&mut self, waiter: Waiter) {
        self.waiter = waiter;
    }

    fn mark_stale(&self, bucket: &str, key: &str, stale_answer: bool) {
        let lag = self.visibility_lag.get();
        if lag > 0 {
            self.stale
                .borrow_mut()
                .insert((bucket.to_string(), key.to_string()), (lag, stale_answer));
        }
    }
}

impl ObjectStore for InMemoryStore {
    fn list_objects(
        &self,
        bucket: &str,
        page_size: usize,
        on_page: &mut dyn FnMut(&[String]) -> ControlFlow<()>,
    ) -> Result<()> {
        let keys = {
            let buckets = self.buckets.borrow();
            let objects = buckets
                .get(bucket)
                .ok_or_else(|| MongerError::Iteration(format!("no such bucket: {}", bucket)))?;
            objects.keys().cloned().collect::<Vec<_>>()
        };

        for (page_num, page) in keys.chunks(page_size.max(1)).enumerate() {
            if self.fail_listing_after.get() == Some(page_num) {
                return Err(MongerError::Iteration(format!(
                    "simulated listing failure on page {}",
                    page_num
                )));
            }
            if on_page(page).is_break() {
                break;
            }
        }
        Ok(())
    }

    fn copy_object(
        &self,
        bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<()> {
        if self.fail_copy.borrow().contains(src_key) {
            return Err(MongerError::backend(format!(
                "simulated copy failure for {}",
                src_key
            )));
        }
        let body = self.get(bucket, src_key).ok_or_else(|| {
            MongerError::backend(format!("no such key: {}/{}", bucket, src_key))
        })?;
        self.put(dst_bucket, dst_key, body);
        self.mark_stale(dst_bucket, dst_key, false);
        self.mutations.borrow_mut().push(Mutation::Copy {
            bucket: bucket.to_string(),
            src_key: src_key.to_string(),
            dst_bucket: dst_bucket.to_string(),
            dst_key: dst_key.to_string(),
        });
        Ok(())
    }

    fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        let id = (bucket.to_string(), key.to_string());
        let mut stale = self.stale.borrow_mut();
        if let Some((remaining, answer)) = stale.get_mut(&id) {
            let answer = *answer;
            *remaining -= 1;
            if *remaining == 0 {
                stale.remove(&id);
            }
            return Ok(answer);
        }
        drop(stale);
        Ok(self.contains(bucket, key))
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        if self.fail_delete.borrow().contains(key) {
            return Err(MongerError::backend(format!(
                "simulated delete failure for {}",
                key
            )));
        }
        if let Some(objects) = self.buckets.borrow_mut().get_mut(bucket) {
            objects.remove(key);
        }
        self.mark_stale(bucket, key, true);
        self.mutations.borrow_mut().push(Mutation::Delete {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        Ok(())
    }

    fn waiter(&self) -> Waiter {
        self.waiter
    }
}

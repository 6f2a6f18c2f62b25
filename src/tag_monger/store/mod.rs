//! # Storage Layer
//!
//! The pipeline talks to object storage only through the [`ObjectStore`]
//! trait: list keys page by page, copy, check existence, delete. The provider
//! is picked once at startup and the resulting store is handed to the API, so
//! nothing past this module branches on which cloud it is talking to.
//!
//! ## Implementations
//!
//! - [`cloud::CloudStore`]: production store built on the `object_store`
//!   crate, for AWS S3, Google Cloud Storage or a local directory.
//! - [`memory::InMemoryStore`]: in-memory buckets for tests, with failure
//!   injection and a log of every mutation.
//!
//! ## Consistency
//!
//! Backends differ in how soon a copy or delete becomes visible. Each store
//! reports a [`Waiter`] describing how long to poll before giving up, and the
//! default [`ObjectStore::wait_until_exists`] /
//! [`ObjectStore::wait_until_not_exists`] implementations poll
//! [`ObjectStore::object_exists`] under that policy.

use crate::error::{MongerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::ControlFlow;
use std::str::FromStr;
use std::time::Duration;

pub mod cloud;
pub mod memory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Gcs,
    Local,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Aws => write!(f, "aws"),
            Provider::Gcs => write!(f, "gcs"),
            Provider::Local => write!(f, "local"),
        }
    }
}

impl FromStr for Provider {
    type Err = MongerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aws" | "s3" => Ok(Provider::Aws),
            "gcs" | "gcp" => Ok(Provider::Gcs),
            "local" => Ok(Provider::Local),
            other => Err(MongerError::config(format!("unknown provider '{}'", other))),
        }
    }
}

/// Polling policy used while waiting for a write to become visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waiter {
    pub attempts: u32,
    pub delay: Duration,
}

impl Waiter {
    /// A single check with no sleeping, for strongly consistent stores.
    pub const fn immediate() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }

    pub const fn polling(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Run `check` up to `attempts` times, sleeping `delay` in between.
    /// Returns whether the check ever succeeded.
    pub fn poll(&self, mut check: impl FnMut() -> Result<bool>) -> Result<bool> {
        for attempt in 0..self.attempts.max(1) {
            if attempt > 0 && !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            if check()? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Default for Waiter {
    fn default() -> Self {
        Self::immediate()
    }
}

/// Capability interface over a bucket-oriented object store.
///
/// All methods take `&self`; implementations use interior mutability where
/// they need it. Errors from `list_objects` are `MongerError::Iteration`,
/// everything else is `MongerError::Backend`.
pub trait ObjectStore {
    /// Walk the bucket in the backend's native order, handing over up to
    /// `page_size` keys at a time. Listing stops early when `on_page`
    /// returns `ControlFlow::Break`.
    ///
    /// `page_size` only groups keys for `on_page`. It is not guaranteed to
    /// reach the backend: [`cloud::CloudStore`] streams whatever page size
    /// `object_store` requests and regroups the keys client-side.
    fn list_objects(
        &self,
        bucket: &str,
        page_size: usize,
        on_page: &mut dyn FnMut(&[String]) -> ControlFlow<()>,
    ) -> Result<()>;

    /// Server-side copy of `src_key` in `bucket` to `dst_key` in `dst_bucket`.
    fn copy_object(&self, bucket: &str, src_key: &str, dst_bucket: &str, dst_key: &str)
        -> Result<()>;

    fn object_exists(&self, bucket: &str, key: &str) -> Result<bool>;

    fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Polling policy for the consistency waiters.
    fn waiter(&self) -> Waiter {
        Waiter::immediate()
    }

    fn wait_until_exists(&self, bucket: &str, key: &str) -> Result<()> {
        if self.waiter().poll(|| self.object_exists(bucket, key))? {
            Ok(())
        } else {
            Err(MongerError::backend(format!(
                "timed out waiting for {}/{} to appear",
                bucket, key
            )))
        }
    }

    fn wait_until_not_exists(&self, bucket: &str, key: &str) -> Result<()> {
        if self
            .waiter()
            .poll(|| self.object_exists(bucket, key).map(|exists| !exists))?
        {
            Ok(())
        } else {
            Err(MongerError::backend(format!(
                "timed out waiting for {}/{} to disappear",
                bucket, key
            )))
        }
    }
}

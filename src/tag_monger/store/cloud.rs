use super::{ObjectStore, Provider, Waiter};
use crate::error::{MongerError, Result};
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path;
use object_store::ObjectStore as _;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

/// S3 `HEAD`-polling waiter, matching the SDK's object waiters.
const S3_WAITER: Waiter = Waiter::polling(20, Duration::from_secs(5));

type DynStore = Arc<dyn object_store::ObjectStore>;

/// Object storage through the `object_store` crate.
///
/// Credentials and region come from the provider's usual environment
/// (`AWS_*` for S3, `GOOGLE_*` / application default credentials for GCS).
/// For [`Provider::Local`] the bucket name is a directory on disk.
///
/// The calls are async underneath; each one is driven to completion on a
/// private current-thread runtime so the pipeline stays strictly sequential.
pub struct CloudStore {
    provider: Provider,
    runtime: Runtime,
    clients: RefCell<HashMap<String, DynStore>>,
}

impl CloudStore {
    pub fn new(provider: Provider) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(MongerError::Io)?;
        Ok(Self {
            provider,
            runtime,
            clients: RefCell::new(HashMap::new()),
        })
    }

    fn client(&self, bucket: &str) -> Result<DynStore> {
        if let Some(client) = self.clients.borrow().get(bucket) {
            return Ok(client.clone());
        }

        let client: DynStore = match self.provider {
            Provider::Aws => Arc::new(
                AmazonS3Builder::from_env()
                    .with_bucket_name(bucket)
                    .build()
                    .map_err(|e| connect_error(self.provider, bucket, e))?,
            ),
            Provider::Gcs => Arc::new(
                GoogleCloudStorageBuilder::from_env()
                    .with_bucket_name(bucket)
                    .build()
                    .map_err(|e| connect_error(self.provider, bucket, e))?,
            ),
            Provider::Local => Arc::new(
                LocalFileSystem::new_with_prefix(bucket)
                    .map_err(|e| connect_error(self.provider, bucket, e))?,
            ),
        };

        self.clients
            .borrow_mut()
            .insert(bucket.to_string(), client.clone());
        Ok(client)
    }
}

/// A key exactly as the listing reported it. `Path::from` would
/// percent-encode reserved characters and point at a different object.
fn object_path(key: &str) -> Result<Path> {
    Path::parse(key).map_err(|e| MongerError::backend(format!("invalid object key {}: {}", key, e)))
}

fn connect_error(provider: Provider, bucket: &str, err: object_store::Error) -> MongerError {
    MongerError::backend(format!(
        "failed to open {} bucket {}: {}",
        provider, bucket, err
    ))
}

impl ObjectStore for CloudStore {
    fn list_objects(
        &self,
        bucket: &str,
        page_size: usize,
        on_page: &mut dyn FnMut(&[String]) -> ControlFlow<()>,
    ) -> Result<()> {
        let client = self
            .client(bucket)
            .map_err(|e| MongerError::Iteration(e.to_string()))?;
        let page_size = page_size.max(1);

        self.runtime.block_on(async {
            let mut listing = client.list(None);
            let mut page = Vec::with_capacity(page_size);

            while let Some(meta) = listing.next().await {
                let meta = meta.map_err(|e| MongerError::Iteration(e.to_string()))?;
                page.push(meta.location.to_string());
                if page.len() == page_size {
                    if on_page(&page).is_break() {
                        return Ok(());
                    }
                    page.clear();
                }
            }
            if !page.is_empty() {
                let _ = on_page(&page);
            }
            Ok::<_, MongerError>(())
        })
    }

    fn copy_object(
        &self,
        bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<()> {
        let src = self.client(bucket)?;
        let from = object_path(src_key)?;
        let to = object_path(dst_key)?;
        let copy_error = |e: object_store::Error| {
            MongerError::backend(format!(
                "copy {}/{} -> {}/{}: {}",
                bucket, src_key, dst_bucket, dst_key, e
            ))
        };

        if bucket == dst_bucket {
            return self
                .runtime
                .block_on(src.copy(&from, &to))
                .map_err(copy_error);
        }

        // No server-side copy across buckets, stream the body through instead.
        let dst = self.client(dst_bucket)?;
        self.runtime.block_on(async {
            let body = src
                .get(&from)
                .await
                .map_err(copy_error)?
                .bytes()
                .await
                .map_err(copy_error)?;
            dst.put(&to, body.into()).await.map_err(copy_error)?;
            Ok::<_, MongerError>(())
        })
    }

    fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        let client = self.client(bucket)?;
        let location = object_path(key)?;
        match self.runtime.block_on(client.head(&location)) {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(MongerError::backend(format!(
                "head {}/{}: {}",
                bucket, key, e
            ))),
        }
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let client = self.client(bucket)?;
        let location = object_path(key)?;
        self.runtime
            .block_on(client.delete(&location))
            .map_err(|e| MongerError::backend(format!("delete {}/{}: {}", bucket, key, e)))
    }

    fn waiter(&self) -> Waiter {
        match self.provider {
            Provider::Aws => S3_WAITER,
            Provider::Gcs | Provider::Local => Waiter::immediate(),
        }
    }
}

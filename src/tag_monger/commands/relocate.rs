use crate::commands::{CmdMessage, CmdResult};
use crate::error::{MongerError, Result};
use crate::model::TagRecord;
use crate::store::ObjectStore;
use tracing::{debug, info};

/// One expired tag and where it went (or would have gone).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub key: String,
    pub target_key: String,
    /// False for dry runs.
    pub moved: bool,
}

/// Move each expired tag under its archive directory, in order.
///
/// A move is copy, wait for the copy to show up, delete, wait for the source
/// to go away. The first failure aborts the run; tags moved before it stay
/// moved. With `dry_run` set nothing is written to the store.
pub fn run<S: ObjectStore>(
    store: &S,
    bucket: &str,
    expired: &[TagRecord],
    dry_run: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    result.dry_run = dry_run;

    if expired.is_empty() {
        result.add_message(CmdMessage::info("no expired tag files to move"));
        return Ok(result);
    }

    let mut relocations = Vec::with_capacity(expired.len());

    for record in expired {
        let Some(target) = record.target_key() else {
            continue;
        };

        if dry_run {
            result.add_message(CmdMessage::info(format!(
                "{} -> {} (noop)",
                record.key(),
                target
            )));
        } else {
            move_object(store, bucket, record.key(), target)?;
            result.add_message(CmdMessage::success(format!("{} -> {}", record.key(), target)));
        }

        relocations.push(Relocation {
            key: record.key().to_string(),
            target_key: target.to_string(),
            moved: !dry_run,
        });
    }

    Ok(result.with_relocations(relocations))
}

fn move_object<S: ObjectStore>(store: &S, bucket: &str, key: &str, target: &str) -> Result<()> {
    let fail = |step: &str, e: MongerError| {
        MongerError::backend(format!("{} failed for {} -> {}: {}", step, key, target, e))
    };

    debug!(key, target, "copying tag");
    store
        .copy_object(bucket, key, bucket, target)
        .map_err(|e| fail("copy", e))?;
    store
        .wait_until_exists(bucket, target)
        .map_err(|e| fail("copy", e))?;

    debug!(key, "deleting original tag");
    store
        .delete_object(bucket, key)
        .map_err(|e| fail("delete", e))?;
    store
        .wait_until_not_exists(bucket, key)
        .map_err(|e| fail("delete", e))?;

    info!(key, target, "moved expired tag");
    Ok(())
}

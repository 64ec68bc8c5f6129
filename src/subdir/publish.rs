//! Pushes the rebased branch tip to the external integration (or upstream)
//! remote.

use anyhow::{Context, Result};

use crate::subdir::{record, refs};
use crate::vcs::error::SubdirError;
use crate::vcs::{PushOutcome, Repository};

/// Run `push <subdir> [--upstream]`. Returns the pushed commit hash.
pub fn push(container: &Repository, subdir_path: &str, use_upstream: bool) -> Result<String> {
    let record = record::load(container, subdir_path)?;

    let (url, branch) = if use_upstream {
        let url = record.upstream_url.clone().ok_or_else(|| SubdirError::ArgError {
            message: "--upstream was given but no upstream is configured for this subdir".to_string(),
        })?;
        if url == record.integration_url && record.upstream_branch() == record.integration_branch() {
            return Err(SubdirError::ArgError {
                message: "integration and upstream are the same remote; use 'push' without --upstream".to_string(),
            }
            .into());
        }
        (url, record.upstream_branch().to_string())
    } else {
        (record.integration_url.clone(), record.integration_branch().to_string())
    };

    let tip = resolve_rebased_tip(container, &record, subdir_path)?;

    match container
        .push(&url, &branch, &tip)
        .with_context(|| format!("Failed to push '{branch}' to {url}"))?
    {
        PushOutcome::Ok => Ok(tip),
        PushOutcome::Rejected => Err(SubdirError::PushRejected { url, branch }.into()),
    }
}

/// Resolve the tip produced by the last rebase: prefer the hidden
/// `subdir-local/<path>` tracking ref; if it was never set, rebuild the
/// projection from the recorded squash parentage.
fn resolve_rebased_tip(container: &Repository, record: &crate::subdir::record::Record, subdir_path: &str) -> Result<String> {
    if let Some(tip) = refs::resolve(container, &refs::local_ref(subdir_path)) {
        return Ok(tip);
    }

    let last_squash = record
        .last_squash_commit
        .as_deref()
        .context("subdir record has no last-squash-commit yet; run 'add' first")?;
    let last_integration = record
        .last_integration_commit
        .as_deref()
        .context("subdir record has no last-integration-commit yet; run 'add' first")?;
    let head = container.resolve("HEAD")?;
    crate::subdir::projection::project(container, last_squash, &head, subdir_path, last_integration)
}

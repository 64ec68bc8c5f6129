//! `branch`: projects only the local delta since the last squash, with no
//! network access, and writes it under a user-supplied branch name.

use anyhow::{Context, Result};

use crate::subdir::{projection, record, refs};
use crate::vcs::Repository;
use crate::vcs::error::SubdirError;

/// Build the local-delta branch for `subdir_path` and point `branch_name` at
/// its tip. Returns the tip hash.
pub fn branch(container: &Repository, subdir_path: &str, branch_name: &str) -> Result<String> {
    let record = record::load(container, subdir_path)?;

    let last_squash = record
        .last_squash_commit
        .as_deref()
        .context("subdir record has no last-squash-commit yet; run 'add' first")?;
    let last_integration = record.last_integration_commit.as_deref().ok_or_else(|| {
        SubdirError::InternalInvariant {
            message: "record has last-squash-commit but no last-integration-commit".to_string(),
        }
    })?;

    let head = container.resolve("HEAD")?;
    if !container.is_ancestor(last_squash, &head) {
        return Err(SubdirError::StaleMetadata {
            commit: last_squash.to_string(),
        }
        .into());
    }

    let tip = projection::project(
        container,
        last_squash,
        &head,
        subdir_path,
        last_integration,
    )?;

    container.update_ref(&format!("refs/heads/{branch_name}"), &tip)?;
    refs::update(container, &refs::local_ref(subdir_path), &tip)?;
    Ok(tip)
}

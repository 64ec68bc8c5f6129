//! Drives a full rebase cycle: fetch the external branches, rebase the
//! integration history onto upstream when configured, cherry-pick the local
//! projection onto that external base, then hand the result to the squash
//! engine.

use anyhow::{Context, Result};

use crate::subdir::record::Record;
use crate::subdir::{projection, record, refs, squash};
use crate::vcs::error::SubdirError;
use crate::vcs::{CherryPickOutcome, Repository};

pub struct RebaseOutcome {
    /// The container commit the rebase folded the result into.
    pub squash_commit: String,
    /// The external base (`E`) the result was rebased onto.
    pub external_base: String,
}

/// Run `rebase <subdir>`.
///
/// `onto` overrides the computed external base with a caller-supplied ref
/// (`rebase --onto`); the fetches in step 2 still run so hidden refs stay
/// current for `status`, but their result is not used to build `E`.
pub fn rebase(
    container: &Repository,
    subdir_path: &str,
    message: &str,
    onto: Option<&str>,
) -> Result<RebaseOutcome> {
    let record = record::load(container, subdir_path)?;
    let original_branch = container
        .current_branch()
        .context("rebase requires the container to be on a branch, not detached HEAD")?;
    // Captured before any scratch detached-checkout work (`compute_external_base`
    // may cherry-pick onto a detached HEAD), since that must not change which
    // container commit the local projection is built from.
    let head = container.resolve("HEAD")?;

    let integration_tip = fetch_branch(
        container,
        &record.integration_url,
        record.integration_branch(),
    )?;
    refs::update(
        container,
        &refs::integration_ref(subdir_path, record.integration_branch()),
        &integration_tip,
    )?;

    let upstream_tip = if let Some(upstream_url) = record.upstream_url.clone() {
        let tip = fetch_branch(container, &upstream_url, record.upstream_branch())?;
        refs::update(
            container,
            &refs::upstream_ref(subdir_path, record.upstream_branch()),
            &tip,
        )?;
        Some(tip)
    } else {
        None
    };

    let external_base = match onto {
        Some(r) => container.resolve(r).with_context(|| format!("Failed to resolve --onto ref '{r}'"))?,
        None => compute_external_base(container, &record, &integration_tip, upstream_tip.as_deref())?,
    };

    let last_squash = record
        .last_squash_commit
        .clone()
        .context("subdir record has no last-squash-commit yet; run 'add' first")?;
    let last_integration = record
        .last_integration_commit
        .clone()
        .context("subdir record has no last-integration-commit yet; run 'add' first")?;

    let local_tip = projection::project(container, &last_squash, &head, subdir_path, &last_integration)?;

    // `cherry_pick_onto` uses the container's own worktree as scratch space
    // via a detached checkout; restore the original branch before handing
    // off to the squash engine, which commits on whatever branch is current.
    let rebased_tip = cherry_pick_onto(container, &last_integration, &local_tip, &external_base)?;
    container.checkout_branch(&original_branch)?;
    refs::update(container, &refs::local_ref(subdir_path), &rebased_tip)?;

    let squash_commit = squash::squash(container, subdir_path, &rebased_tip, &external_base, message)?;

    Ok(RebaseOutcome {
        squash_commit,
        external_base,
    })
}

fn fetch_branch(container: &Repository, url: &str, branch: &str) -> Result<String> {
    container.fetch(url, branch).map_err(|err| {
        SubdirError::NetworkError {
            operation: format!("fetch '{branch}' from {url}"),
            message: err.to_string(),
        }
        .into()
    })
}

/// Build `E`, the external base the local projection is rebased onto.
///
/// Integration-only: `E = I_new`. With upstream configured: rebase
/// integration's exclusive commits onto the new upstream tip; when
/// integration has no exclusive commits (including the degenerate case
/// where integration and upstream coincide), `E = U_new`.
fn compute_external_base(
    container: &Repository,
    record: &Record,
    integration_tip: &str,
    upstream_tip: Option<&str>,
) -> Result<String> {
    let Some(upstream_tip) = upstream_tip else {
        return Ok(integration_tip.to_string());
    };

    let last_integration = record
        .last_integration_commit
        .as_deref()
        .context("subdir record has no last-integration-commit yet; run 'add' first")?;

    let exclusive = container.rev_list(&format!("{last_integration}..{integration_tip}"), &[])?;
    if exclusive.is_empty() {
        return Ok(upstream_tip.to_string());
    }

    cherry_pick_onto(container, last_integration, integration_tip, upstream_tip)
}

/// Cherry-pick every commit of `(since..branch_tip]` onto `onto`, in a
/// detached worktree, returning the resulting tip.
fn cherry_pick_onto(container: &Repository, since: &str, branch_tip: &str, onto: &str) -> Result<String> {
    if since == branch_tip {
        return Ok(onto.to_string());
    }
    let commits = container.rev_list(&format!("{since}..{branch_tip}"), &[])?;
    if commits.is_empty() {
        return Ok(onto.to_string());
    }

    container.checkout_detached(onto)?;
    let mut tip = onto.to_string();
    for commit in commits {
        match container.cherry_pick(&commit)? {
            CherryPickOutcome::Ok(new_tip) => tip = new_tip,
            CherryPickOutcome::Conflict => {
                return Err(SubdirError::RebaseConflict {
                    commit,
                    git_output: String::new(),
                }
                .into());
            }
        }
    }
    Ok(tip)
}

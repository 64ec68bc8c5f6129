//! Folds a rebased external branch tip back into the container as a single
//! commit whose tree replaces the subdir, self-referencing the commit that
//! carried it via a two-pass commit-then-amend.
//!
//! True bit-for-bit self-reference (a commit whose tree names its own hash)
//! is impossible — a commit's hash is a function of its tree. The two-pass
//! write instead produces a chain of two commits: the first (`placeholder`)
//! carries the rebased content with no recorded squash pointer; the second
//! (`sealed`) carries identical content plus a pointer back at the first.
//! `sealed` becomes the branch tip; the record (both on disk and the one
//! this function returns) names `placeholder`, its own parent. Because the
//! two commits' subdir content (ignoring `.git-subdir` itself) is identical,
//! the projection engine (`subdir::projection`) already treats `sealed` as a
//! no-op when it walks past `placeholder`, so this one-commit lag never
//! surfaces as a spurious entry in a projected branch.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::subdir::record::{self, Record};
use crate::vcs::Repository;
use crate::vcs::error::SubdirError;

const METADATA_DIR: &str = ".git-subdir";
const METADATA_FILE: &str = "config";

/// In-flight marker recording the placeholder commit of an interrupted
/// squash, so the next invocation can finish or diagnose it (§5).
fn marker_path(container: &Repository, subdir_path: &str) -> PathBuf {
    container
        .root()
        .join(subdir_path)
        .join(METADATA_DIR)
        .join(".squash-in-progress")
}

/// Fold `rebased_tip` (a branch whose tree is exactly the subdir's intended
/// new content) into the container on top of its current `HEAD`, recording
/// `external_base` as the new `last-integration-commit`. Returns the final
/// (sealed) commit hash, which becomes the container's new branch tip.
pub fn squash(
    container: &Repository,
    subdir_path: &str,
    rebased_tip: &str,
    external_base: &str,
    message: &str,
) -> Result<String> {
    repair_interrupted(container, subdir_path)?;

    let mut record = record::load(container, subdir_path)?;
    record.last_integration_commit = Some(external_base.to_string());

    let head = container.resolve("HEAD")?;
    let head_tree = container.read_tree(&head, ".")?.context("container HEAD has no tree")?;
    let identity = container.current_identity()?;

    let placeholder_record = Record {
        last_squash_commit: None,
        ..record.clone()
    };
    let placeholder = write_squash_commit(container, subdir_path, &head_tree, &[&head], rebased_tip, &placeholder_record, message, &identity)?;

    write_marker(container, subdir_path, &placeholder)?;

    record.last_squash_commit = Some(placeholder.clone());
    let sealed = write_squash_commit(
        container,
        subdir_path,
        &head_tree,
        &[&placeholder],
        rebased_tip,
        &record,
        message,
        &identity,
    )?;

    finish(container, subdir_path, &sealed)?;
    Ok(sealed)
}

/// Build the container commit for one pass of the squash (also reused by the
/// `add` engine for its own placeholder/sealed pair): splice `head_tree` for
/// `rebased_tip`'s content plus `record` at `subdir_path`, parented on
/// `parents` (empty for the very first commit in a brand new container).
#[allow(clippy::too_many_arguments)]
pub(crate) fn write_squash_commit(
    container: &Repository,
    subdir_path: &str,
    head_tree: &str,
    parents: &[&str],
    rebased_tip: &str,
    record: &Record,
    message: &str,
    identity: &crate::vcs::Identity,
) -> Result<String> {
    let rebased_tree = container
        .read_tree(rebased_tip, ".")?
        .context("rebased branch tip has no tree")?;

    let config_text = record::render_config_blob(container, record)?;
    let config_blob = container.write_blob(&config_text)?;
    let metadata_tree = container.blob_tree(METADATA_FILE, &config_blob)?;
    let subdir_tree = container.tree_with_entry(&rebased_tree, METADATA_DIR, &metadata_tree)?;

    let new_container_tree = container.replace_path_in_tree(head_tree, subdir_path, &subdir_tree)?;

    container.commit_tree(&new_container_tree, parents, message, identity, identity)
}

fn write_marker(container: &Repository, subdir_path: &str, placeholder: &str) -> Result<()> {
    let marker = marker_path(container, subdir_path);
    if let Some(parent) = marker.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&marker, placeholder).with_context(|| format!("Failed to write '{}'", marker.display()))
}

/// Move the current branch to `sealed` and sync the working tree/index to
/// match, then clear the in-flight marker.
fn finish(container: &Repository, subdir_path: &str, sealed: &str) -> Result<()> {
    container.reset_hard(sealed)?;
    let marker = marker_path(container, subdir_path);
    std::fs::remove_file(&marker).ok();
    Ok(())
}

/// If a prior squash left its marker behind, either finish the amend that
/// never landed or confirm it already did, else diagnose an unrecoverable
/// interruption.
fn repair_interrupted(container: &Repository, subdir_path: &str) -> Result<()> {
    let marker = marker_path(container, subdir_path);
    let Ok(placeholder) = std::fs::read_to_string(&marker) else {
        return Ok(());
    };
    let placeholder = placeholder.trim();
    let head = container.resolve("HEAD")?;

    if head == placeholder {
        // Interrupted between the placeholder commit and the amend: redo
        // the amend using the record already embedded in the placeholder.
        let mut record = record::load(container, subdir_path)?;
        record.last_squash_commit = Some(placeholder.to_string());
        let identity = container.current_identity()?;
        let message = container.commit_message(placeholder)?;
        let head_tree = container.read_tree(&head, ".")?.context("container HEAD has no tree")?;
        let rebased_tip = placeholder; // content is already correct
        let sealed = write_squash_commit(
            container,
            subdir_path,
            &head_tree,
            &[placeholder],
            rebased_tip,
            &record,
            &message,
            &identity,
        )?;
        finish(container, subdir_path, &sealed)?;
        Ok(())
    } else if container.is_ancestor(placeholder, &head) {
        // The amend already landed; the marker is simply stale.
        std::fs::remove_file(&marker).ok();
        Ok(())
    } else {
        Err(SubdirError::InternalInvariant {
            message: format!(
                "interrupted squash placeholder {placeholder} is no longer reachable from HEAD"
            ),
        }
        .into())
    }
}

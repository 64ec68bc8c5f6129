//! Projects a range of container commits touching one subdirectory into a
//! clean linear branch whose *i*-th commit's tree equals that subdirectory's
//! contents at the *i*-th qualifying container commit.

use anyhow::Result;

use crate::vcs::Repository;
use crate::vcs::error::SubdirError;

const METADATA_DIR: &str = ".git-subdir";

/// Project `(since .. container_head]` restricted to commits touching
/// `subdir_path`, as a new branch rooted at `base`.
///
/// Returns the hash of the tip of the projected branch. If no container
/// commit in range touches `subdir_path`, returns `base` unchanged (an empty
/// projection, per invariant 3: "no local modifications" means the local
/// branch's tip is exactly the external base).
pub fn project(
    container: &Repository,
    since: &str,
    container_head: &str,
    subdir_path: &str,
    base: &str,
) -> Result<String> {
    if !container.is_ancestor(since, container_head) {
        return Err(SubdirError::StaleMetadata {
            commit: since.to_string(),
        }
        .into());
    }
    if container.read_tree(container_head, subdir_path)?.is_none() {
        return Err(SubdirError::SubdirMissing {
            path: container.root().join(subdir_path),
        }
        .into());
    }

    let range = format!("{since}..{container_head}");
    let candidates = container.rev_list(&range, &[subdir_path])?;

    let mut tip = base.to_string();
    let mut previous_content_tree: Option<String> = match container.read_tree(since, subdir_path)? {
        Some(raw) => Some(container.tree_without_entry(&raw, METADATA_DIR)?),
        None => None,
    };

    for commit in candidates {
        let raw_tree = match container.read_tree(&commit, subdir_path)? {
            Some(tree) => tree,
            None => continue,
        };
        // Compare trees with the metadata directory stripped: a commit that
        // only updates `.git-subdir/config` (e.g. a squash engine's
        // self-reference amend) carries no content change and must not
        // appear as a spurious commit in the projected branch.
        let projected_tree = container.tree_without_entry(&raw_tree, METADATA_DIR)?;
        if previous_content_tree.as_deref() == Some(projected_tree.as_str()) {
            continue;
        }
        previous_content_tree = Some(projected_tree.clone());

        let message = container.commit_message(&commit)?;
        let identity = container.author_identity(&commit)?;

        tip = container.commit_tree(
            &projected_tree,
            &[&tip],
            &message,
            &identity,
            &crate::vcs::Identity {
                name: identity.name.clone(),
                email: identity.email.clone(),
                date: crate::utils::now_git_date(),
            },
        )?;
    }

    Ok(tip)
}

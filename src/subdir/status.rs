//! `status`: reports, without mutating any state or fetching, whether a
//! subdir has local work not yet folded by a rebase, and whether a rebase's
//! result has not yet been published.

use anyhow::Result;

use crate::subdir::{projection, record, refs};
use crate::vcs::Repository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// The container has commits under the subdir path since the last
    /// squash that a `rebase` has not yet folded in.
    pub has_unfolded_local_changes: bool,
    /// The last rebase produced a tip that `push` has not yet published to
    /// the integration remote's last-fetched tip.
    pub has_unpublished_rebase: bool,
}

pub fn status(container: &Repository, subdir_path: &str) -> Result<Status> {
    let record = record::load(container, subdir_path)?;

    let has_unfolded_local_changes = match (&record.last_squash_commit, &record.last_integration_commit) {
        (Some(last_squash), Some(last_integration)) => {
            let head = container.resolve("HEAD")?;
            let local_tip =
                projection::project(container, last_squash, &head, subdir_path, last_integration)?;
            local_tip != *last_integration
        }
        _ => false,
    };

    let has_unpublished_rebase = match refs::resolve(container, &refs::local_ref(subdir_path)) {
        Some(local_tip) => {
            let integration_tip =
                refs::resolve(container, &refs::integration_ref(subdir_path, record.integration_branch()));
            match integration_tip {
                Some(integration_tip) => local_tip != integration_tip,
                None => true,
            }
        }
        None => false,
    };

    Ok(Status {
        has_unfolded_local_changes,
        has_unpublished_rebase,
    })
}

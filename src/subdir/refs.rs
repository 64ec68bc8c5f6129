//! Names and access for the hidden tracking refs a container keeps per
//! subdir: `subdir-integration/<path>/<branch>`, `subdir-upstream/<path>/<branch>`,
//! and `subdir-local/<path>`. These live under `refs/` but outside the usual
//! `heads`/`tags` namespaces, so they never show up in ordinary branch
//! listings and are never pushed.

use anyhow::Result;

use crate::vcs::Repository;

pub fn integration_ref(subdir_path: &str, branch: &str) -> String {
    format!("refs/subdir-integration/{subdir_path}/{branch}")
}

pub fn upstream_ref(subdir_path: &str, branch: &str) -> String {
    format!("refs/subdir-upstream/{subdir_path}/{branch}")
}

pub fn local_ref(subdir_path: &str) -> String {
    format!("refs/subdir-local/{subdir_path}")
}

/// Update a hidden tracking ref to `hash`, creating it if absent.
pub fn update(container: &Repository, name: &str, hash: &str) -> Result<()> {
    container.update_ref(name, hash)
}

/// Resolve a hidden tracking ref, if it has been set at least once.
pub fn resolve(container: &Repository, name: &str) -> Option<String> {
    if container.ref_exists(name) {
        container.resolve(name).ok()
    } else {
        None
    }
}

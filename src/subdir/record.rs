//! The per-subdir metadata record, persisted at `<subdir>/.git-subdir/config`
//! in the container's native git-config format.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::vcs::Repository;
use crate::vcs::error::SubdirError;

/// Relative path, from the container root, to the record file inside a
/// subdir. `subdir_path` is itself relative to the container root.
fn config_path(container: &Repository, subdir_path: &Path) -> PathBuf {
    container.root().join(subdir_path).join(".git-subdir/config")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Full container-root-relative path; canonicalized on load/save so two
    /// subdirs sharing a basename never collide in the hidden ref namespace.
    pub path: String,
    pub integration_url: String,
    pub integration_branch: Option<String>,
    pub upstream_url: Option<String>,
    pub upstream_branch: Option<String>,
    pub last_integration_commit: Option<String>,
    pub last_squash_commit: Option<String>,
}

impl Record {
    pub fn integration_branch(&self) -> &str {
        self.integration_branch.as_deref().unwrap_or("master")
    }

    pub fn upstream_branch(&self) -> &str {
        self.upstream_branch.as_deref().unwrap_or("master")
    }

    /// Whether upstream is configured, i.e. integration acts only as the
    /// rebase target/push destination rather than a hybrid upstream.
    pub fn has_upstream(&self) -> bool {
        self.upstream_url.is_some()
    }
}

/// Canonicalize `subdir_path` (as given on the CLI, relative to the
/// container root, or absolute) to the container-root-relative path
/// recorded in the config and used to build hidden ref names.
///
/// Unlike `std::fs::canonicalize`, this never requires the path to exist,
/// since `add` is the one caller that canonicalizes a path before it does.
pub fn canonical_subdir_path(container: &Repository, subdir_path: &Path) -> Result<String> {
    let relative = if subdir_path.is_absolute() {
        subdir_path
            .strip_prefix(container.root())
            .with_context(|| {
                format!(
                    "'{}' is not inside the container repository",
                    subdir_path.display()
                )
            })?
    } else {
        subdir_path
    };

    let mut components = Vec::new();
    for component in relative.components() {
        match component {
            std::path::Component::Normal(part) => components.push(part.to_string_lossy().into_owned()),
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                anyhow::ensure!(
                    components.pop().is_some(),
                    "'{}' escapes the container repository",
                    subdir_path.display()
                );
            }
            std::path::Component::RootDir | std::path::Component::Prefix(_) => {}
        }
    }
    Ok(components.join("/"))
}

/// Load the record for `subdir_path` (container-root-relative, already
/// canonicalized). Fails with [`SubdirError::NotInitialized`] if no record
/// file exists there.
pub fn load(container: &Repository, subdir_path: &str) -> Result<Record> {
    let file = config_path(container, Path::new(subdir_path));
    if !file.exists() {
        return Err(SubdirError::NotInitialized {
            path: container.root().join(subdir_path),
        }
        .into());
    }

    let get = |key: &str| container.config_get(&file, key);
    let path = get("subdir.path")?.unwrap_or_else(|| subdir_path.to_string());
    let integration_url = get("subdir.integration.url")?
        .context("subdir record is missing subdir.integration.url")?;
    let integration_branch = get("subdir.integration.branch")?;
    let upstream_url = get("subdir.upstream.url")?.filter(|s| !s.is_empty());
    let upstream_branch = get("subdir.upstream.branch")?;
    let last_integration_commit = get("subdir.last-integration-commit")?;
    let last_squash_commit = get("subdir.last-squash-commit")?;

    Ok(Record {
        path,
        integration_url,
        integration_branch,
        upstream_url,
        upstream_branch,
        last_integration_commit,
        last_squash_commit,
    })
}

/// Write `record` to `<subdir_path>/.git-subdir/config`, creating the
/// `.git-subdir` directory if needed. Only non-`None` optional fields are
/// written; `None` fields are simply absent (never written as empty
/// strings), since `config_get` already treats a missing key as `None`.
pub fn save(container: &Repository, subdir_path: &str, record: &Record) -> Result<()> {
    let file = config_path(container, Path::new(subdir_path));
    if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }

    write_fields(container, &file, record)
}

/// Write every present field of `record` into the config file at `path`,
/// shared by [`save`] (writes into the subdir's working-tree location) and
/// [`render_config_blob`] (writes into a scratch file destined for a blob).
fn write_fields(container: &Repository, path: &Path, record: &Record) -> Result<()> {
    container.config_set(path, "subdir.path", &record.path)?;
    container.config_set(path, "subdir.integration.url", &record.integration_url)?;
    if let Some(branch) = &record.integration_branch {
        container.config_set(path, "subdir.integration.branch", branch)?;
    }
    if let Some(url) = &record.upstream_url {
        container.config_set(path, "subdir.upstream.url", url)?;
    }
    if let Some(branch) = &record.upstream_branch {
        container.config_set(path, "subdir.upstream.branch", branch)?;
    }
    if let Some(commit) = &record.last_integration_commit {
        container.config_set(path, "subdir.last-integration-commit", commit)?;
    }
    if let Some(commit) = &record.last_squash_commit {
        container.config_set(path, "subdir.last-squash-commit", commit)?;
    }
    Ok(())
}

/// Validate that `subdir_path` is eligible for `add`.
///
/// Fails with [`SubdirError::AlreadyInitialized`] if a record already exists,
/// and with [`SubdirError::PathTaken`] if the directory exists and is
/// non-empty, unless `allow_existing` (the `--pre-integrated-commit` escape
/// hatch) is set.
pub fn validate_new(container: &Repository, subdir_path: &str, allow_existing: bool) -> Result<()> {
    let full_path = container.root().join(subdir_path);
    let file = config_path(container, Path::new(subdir_path));
    if file.exists() {
        return Err(SubdirError::AlreadyInitialized { path: full_path }.into());
    }
    if !allow_existing
        && full_path.exists()
        && full_path
            .read_dir()
            .with_context(|| format!("Failed to read '{}'", full_path.display()))?
            .next()
            .is_some()
    {
        return Err(SubdirError::PathTaken { path: full_path }.into());
    }
    Ok(())
}

/// Render `record` as the text content of a `.git-subdir/config` file,
/// without touching the working tree, by writing it through the gateway's
/// config plumbing into a scratch file and reading the result back. Keeps
/// the "config is the VCS's own format" boundary even for a blob that will
/// be embedded directly into a tree object rather than checked out.
pub fn render_config_blob(container: &Repository, record: &Record) -> Result<String> {
    let scratch = tempfile::NamedTempFile::new().context("Failed to create scratch config file")?;
    let path = scratch.path();
    write_fields(container, path, record)?;
    std::fs::read_to_string(path).context("Failed to read back rendered config")
}

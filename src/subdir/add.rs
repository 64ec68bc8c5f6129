//! `add`: embeds an external repository's integration branch into a new
//! subdirectory of the container, recording the subdir's metadata.

use std::path::Path;

use anyhow::{Context, Result};

use crate::subdir::record::{self, Record};
use crate::subdir::refs;
use crate::subdir::squash::write_squash_commit;
use crate::vcs::Repository;
use crate::vcs::error::SubdirError;

pub struct AddOptions<'a> {
    pub integration_url: &'a str,
    pub integration_branch: Option<&'a str>,
    pub upstream_url: Option<&'a str>,
    pub upstream_branch: Option<&'a str>,
    pub message: &'a str,
    /// `--pre-integrated-commit`: allow a pre-existing, non-empty directory.
    pub allow_existing: bool,
}

/// Run `add <integration-url> [--upstream <url>] [--message <m>] <path>`.
/// Returns the new container commit that materialized the subdir.
///
/// Builds the new commit purely out of tree/blob plumbing (the same
/// placeholder/sealed pair the squash engine uses) and only touches the
/// working tree once, at the very end, via [`Repository::reset_hard`].
pub fn add(container: &Repository, subdir_path: &Path, options: &AddOptions) -> Result<String> {
    if options.integration_url.is_empty() {
        return Err(SubdirError::ArgError {
            message: "an integration URL is required".to_string(),
        }
        .into());
    }

    let canonical_path = record::canonical_subdir_path(container, subdir_path)?;
    record::validate_new(container, &canonical_path, options.allow_existing)?;

    let integration_branch = options.integration_branch.unwrap_or("master");
    let integration_tip = container
        .fetch(options.integration_url, integration_branch)
        .map_err(|err| SubdirError::NetworkError {
            operation: format!("fetch '{integration_branch}' from {}", options.integration_url),
            message: err.to_string(),
        })?;
    refs::update(
        container,
        &refs::integration_ref(&canonical_path, integration_branch),
        &integration_tip,
    )?;

    if let Some(upstream_url) = options.upstream_url {
        let upstream_branch = options.upstream_branch.unwrap_or("master");
        let upstream_tip = container
            .fetch(upstream_url, upstream_branch)
            .map_err(|err| SubdirError::NetworkError {
                operation: format!("fetch '{upstream_branch}' from {upstream_url}"),
                message: err.to_string(),
            })?;
        refs::update(
            container,
            &refs::upstream_ref(&canonical_path, upstream_branch),
            &upstream_tip,
        )?;
    }

    let record = Record {
        path: canonical_path.clone(),
        integration_url: options.integration_url.to_string(),
        integration_branch: options.integration_branch.map(str::to_string),
        upstream_url: options.upstream_url.map(str::to_string),
        upstream_branch: options.upstream_branch.map(str::to_string),
        last_integration_commit: Some(integration_tip.clone()),
        last_squash_commit: None,
    };

    let identity = container.current_identity()?;
    let head = container.resolve("HEAD").unwrap_or_default();
    let head_tree = if head.is_empty() {
        container.empty_tree()?
    } else {
        container.read_tree(&head, ".")?.context("container HEAD has no tree")?
    };
    let parents: Vec<&str> = if head.is_empty() { vec![] } else { vec![head.as_str()] };

    let placeholder_record = Record {
        last_squash_commit: None,
        ..record.clone()
    };
    let placeholder = write_squash_commit(
        container,
        &canonical_path,
        &head_tree,
        &parents,
        &integration_tip,
        &placeholder_record,
        options.message,
        &identity,
    )?;

    let mut sealed_record = record;
    sealed_record.last_squash_commit = Some(placeholder.clone());
    let sealed_commit = write_squash_commit(
        container,
        &canonical_path,
        &head_tree,
        &[&placeholder],
        &integration_tip,
        &sealed_record,
        options.message,
        &identity,
    )?;

    container.reset_hard(&sealed_commit)?;
    Ok(sealed_commit)
}

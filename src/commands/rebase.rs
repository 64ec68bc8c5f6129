use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::styling::{HINT, HINT_EMOJI, println};
use crate::subdir::rebase;
use crate::vcs::Repository;

#[derive(Args, Debug)]
pub struct RebaseArgs {
    /// Override the computed external base, skipping fetch-derivation of it.
    #[arg(long)]
    pub onto: Option<String>,

    /// Commit message for the resulting squash commit.
    #[arg(long, short = 'm')]
    pub message: String,

    /// The subdir to rebase.
    pub path: PathBuf,
}

pub fn run(container: &Repository, args: &RebaseArgs) -> Result<()> {
    let subdir_path = crate::subdir::record::canonical_subdir_path(container, &args.path)?;
    let outcome = rebase::rebase(container, &subdir_path, &args.message, args.onto.as_deref())?;
    println!(
        "{HINT_EMOJI} {HINT}rebased onto {}, folded into {}{HINT:#}",
        outcome.external_base, outcome.squash_commit
    );
    Ok(())
}

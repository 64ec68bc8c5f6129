use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::styling::{HINT, HINT_EMOJI, println};
use crate::subdir::add::{self, AddOptions};
use crate::vcs::Repository;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// URL of the external repository to embed.
    pub integration_url: String,

    /// Branch on the integration remote, if not its default.
    #[arg(long)]
    pub integration_branch: Option<String>,

    /// URL of an upstream repository integration should track.
    #[arg(long)]
    pub upstream: Option<String>,

    /// Branch on upstream, if not its default.
    #[arg(long)]
    pub upstream_branch: Option<String>,

    /// Commit message for the materializing commit.
    #[arg(long, short = 'm')]
    pub message: String,

    /// Allow embedding into a path that already exists and is non-empty.
    #[arg(long)]
    pub pre_integrated_commit: bool,

    /// Where, inside the container, to embed the external repository.
    pub path: PathBuf,
}

pub fn run(container: &Repository, args: &AddArgs) -> Result<()> {
    let options = AddOptions {
        integration_url: &args.integration_url,
        integration_branch: args.integration_branch.as_deref(),
        upstream_url: args.upstream.as_deref(),
        upstream_branch: args.upstream_branch.as_deref(),
        message: &args.message,
        allow_existing: args.pre_integrated_commit,
    };
    let commit = add::add(container, &args.path, &options)?;
    println!("{HINT_EMOJI} {HINT}added subdir at {} ({commit}){HINT:#}", args.path.display());
    Ok(())
}

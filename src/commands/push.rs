use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::styling::{HINT, HINT_EMOJI, println};
use crate::subdir::publish;
use crate::vcs::Repository;

#[derive(Args, Debug)]
pub struct PushArgs {
    /// Push to the upstream remote instead of integration.
    #[arg(long)]
    pub upstream: bool,

    /// The subdir to publish.
    pub path: PathBuf,
}

pub fn run(container: &Repository, args: &PushArgs) -> Result<()> {
    let subdir_path = crate::subdir::record::canonical_subdir_path(container, &args.path)?;
    let tip = publish::push(container, &subdir_path, args.upstream)?;
    println!("{HINT_EMOJI} {HINT}pushed {tip}{HINT:#}");
    Ok(())
}

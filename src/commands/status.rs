use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::styling::{HINT, HINT_EMOJI, INFO_EMOJI, println};
use crate::subdir::status;
use crate::vcs::Repository;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// The subdir to report on.
    pub path: PathBuf,
}

pub fn run(container: &Repository, args: &StatusArgs) -> Result<()> {
    let subdir_path = crate::subdir::record::canonical_subdir_path(container, &args.path)?;
    let status = status::status(container, &subdir_path)?;

    if status.has_unfolded_local_changes {
        println!("{HINT_EMOJI} {HINT}local commits under this subdir are not yet rebased{HINT:#}");
    } else {
        println!("{INFO_EMOJI} no local changes since the last squash");
    }

    if status.has_unpublished_rebase {
        println!("{HINT_EMOJI} {HINT}the last rebase has not been pushed yet{HINT:#}");
    } else {
        println!("{INFO_EMOJI} nothing to publish");
    }
    Ok(())
}

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::styling::{HINT, HINT_EMOJI, println};
use crate::subdir::branch;
use crate::vcs::Repository;

#[derive(Args, Debug)]
pub struct BranchArgs {
    /// Name of the branch to write the local-delta projection to.
    #[arg(short = 'b')]
    pub branch_name: String,

    /// The subdir to project.
    pub path: PathBuf,
}

pub fn run(container: &Repository, args: &BranchArgs) -> Result<()> {
    let subdir_path = crate::subdir::record::canonical_subdir_path(container, &args.path)?;
    let tip = branch::branch(container, &subdir_path, &args.branch_name)?;
    println!("{HINT_EMOJI} {HINT}{} now points at {tip}{HINT:#}", args.branch_name);
    Ok(())
}

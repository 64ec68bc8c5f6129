//! Domain errors for subdir operations.
//!
//! `SubdirError` is a typed enum that can be pattern-matched, carries its own
//! exit code, and renders a styled, human-facing message via `.styled()`. VCS
//! gateway failures (plain `anyhow::Error`) are converted to a `SubdirError`
//! variant at the point where enough context exists to pick the right one.

use std::path::PathBuf;

use crate::path::format_path_for_display;
use crate::styling::{ERROR, ERROR_BOLD, ERROR_EMOJI, HINT, HINT_EMOJI, format_with_gutter};

#[derive(Debug, Clone, thiserror::Error)]
pub enum SubdirError {
    /// Missing or malformed required argument.
    #[error("{message}")]
    ArgError { message: String },

    /// `<path>` has no `.git-subdir/config`.
    #[error("'{}' is not a subdir", .path.display())]
    NotInitialized { path: PathBuf },

    /// `<path>` already has a `.git-subdir/config`.
    #[error("'{}' is already a subdir", .path.display())]
    AlreadyInitialized { path: PathBuf },

    /// `<path>` exists and is non-empty, and `add` was not given
    /// `--pre-integrated-commit`.
    #[error("'{}' already exists and is not empty", .path.display())]
    PathTaken { path: PathBuf },

    /// `last-squash-commit` is unreachable from the container's current HEAD.
    #[error("recorded last-squash-commit {commit} is unreachable from HEAD")]
    StaleMetadata { commit: String },

    /// The subdir path does not exist at the container's current HEAD.
    #[error("'{}' does not exist at HEAD", .path.display())]
    SubdirMissing { path: PathBuf },

    /// A fetch or push failed.
    #[error("{operation} failed: {message}")]
    NetworkError { operation: String, message: String },

    /// Cherry-pick halted mid-rebase; the worktree is left for the user.
    #[error("rebase halted: conflict cherry-picking {commit}")]
    RebaseConflict { commit: String, git_output: String },

    /// Push was non-fast-forward.
    #[error("push to '{branch}' on {url} rejected (non-fast-forward)")]
    PushRejected { url: String, branch: String },

    /// A post-condition of an otherwise-successful operation failed.
    #[error("internal invariant violated: {message}")]
    InternalInvariant { message: String },
}

impl SubdirError {
    /// Process exit code for this error, per the CLI surface's documented
    /// exit codes.
    pub fn code(&self) -> i32 {
        match self {
            SubdirError::ArgError { .. } => 2,
            SubdirError::NotInitialized { .. }
            | SubdirError::AlreadyInitialized { .. }
            | SubdirError::PathTaken { .. } => 1,
            SubdirError::StaleMetadata { .. } => 3,
            SubdirError::SubdirMissing { .. } => 4,
            SubdirError::NetworkError { .. } => 5,
            SubdirError::RebaseConflict { .. } => 6,
            SubdirError::PushRejected { .. } => 7,
            SubdirError::InternalInvariant { .. } => 70,
        }
    }

    /// Styled, emoji-prefixed message with an optional hint line. This is the
    /// only surface error content reaches besides the `--debug` trace of the
    /// commands that produced it.
    pub fn styled(&self) -> String {
        match self {
            SubdirError::ArgError { message } => {
                format!("{ERROR_EMOJI} {ERROR}{message}{ERROR:#}")
            }

            SubdirError::NotInitialized { path } => format!(
                "{ERROR_EMOJI} {ERROR}'{ERROR_BOLD}{}{ERROR_BOLD:#}{ERROR}' is not a subdir{ERROR:#}\n\n{HINT_EMOJI} {HINT}Run 'subdir add' first{HINT:#}",
                format_path_for_display(path)
            ),

            SubdirError::AlreadyInitialized { path } => format!(
                "{ERROR_EMOJI} {ERROR}'{ERROR_BOLD}{}{ERROR_BOLD:#}{ERROR}' is already a subdir{ERROR:#}",
                format_path_for_display(path)
            ),

            SubdirError::PathTaken { path } => format!(
                "{ERROR_EMOJI} {ERROR}'{ERROR_BOLD}{}{ERROR_BOLD:#}{ERROR}' already exists and is not empty{ERROR:#}\n\n{HINT_EMOJI} {HINT}Remove the directory first, or pass --pre-integrated-commit{HINT:#}",
                format_path_for_display(path)
            ),

            SubdirError::StaleMetadata { commit } => format!(
                "{ERROR_EMOJI} {ERROR}Recorded last-squash-commit {ERROR_BOLD}{commit}{ERROR_BOLD:#}{ERROR} is unreachable from HEAD{ERROR:#}"
            ),

            SubdirError::SubdirMissing { path } => format!(
                "{ERROR_EMOJI} {ERROR}'{ERROR_BOLD}{}{ERROR_BOLD:#}{ERROR}' does not exist at HEAD{ERROR:#}",
                format_path_for_display(path)
            ),

            SubdirError::NetworkError { operation, message } => {
                let header = format!("{ERROR_EMOJI} {ERROR}{operation} failed{ERROR:#}");
                format!("{header}\n{}", format_with_gutter(message.trim(), "", None))
            }

            SubdirError::RebaseConflict { commit, git_output } => {
                let header = format!(
                    "{ERROR_EMOJI} {ERROR}Rebase halted: conflict cherry-picking {ERROR_BOLD}{commit}{ERROR_BOLD:#}{ERROR:#}"
                );
                let body = if git_output.trim().is_empty() {
                    String::new()
                } else {
                    format_with_gutter(git_output.trim(), "", None)
                };
                format!(
                    "{header}\n{body}\n{HINT_EMOJI} {HINT}Resolve conflicts and re-run 'subdir rebase'{HINT:#}\n{HINT_EMOJI} {HINT}Or abort with 'git cherry-pick --abort'{HINT:#}"
                )
            }

            SubdirError::PushRejected { url, branch } => format!(
                "{ERROR_EMOJI} {ERROR}Push to {ERROR_BOLD}{branch}{ERROR_BOLD:#}{ERROR} on {url} rejected (non-fast-forward){ERROR:#}\n\n{HINT_EMOJI} {HINT}Run 'subdir rebase' again to incorporate the remote's new commits{HINT:#}"
            ),

            SubdirError::InternalInvariant { message } => format!(
                "{ERROR_EMOJI} {ERROR}Internal invariant violated: {message}{ERROR:#}"
            ),
        }
    }
}

/// Check if an error is a specific `SubdirError` variant.
pub fn is_subdir_error<F>(err: &anyhow::Error, predicate: F) -> bool
where
    F: FnOnce(&SubdirError) -> bool,
{
    err.downcast_ref::<SubdirError>().is_some_and(predicate)
}

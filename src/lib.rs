//! Embeds a repository's history inside a subdirectory of another ("container")
//! repository while preserving a bidirectional, rebaseable relationship with
//! the embedded project's own history.
//!
//! The library API is not stable.

#[cfg(feature = "cli")]
pub mod commands;
pub mod path;
pub mod styling;
pub mod subdir;
pub mod utils;
pub mod vcs;

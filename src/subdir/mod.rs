//! The domain engine: projects a subdirectory's commit history out of a
//! container repository, rebases it against an external remote, and folds
//! the result back in. See the submodules for each of the five user-facing
//! operations and the components they compose.

pub mod add;
pub mod branch;
pub mod projection;
pub mod publish;
pub mod rebase;
pub mod record;
pub mod refs;
pub mod squash;
pub mod status;

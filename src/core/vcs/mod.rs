pub mod system_git;

pub use system_git::{SystemGit, require_commit_ref};

//! Core building blocks shared by every command
//!
//! - **config**: `updates.toml` parsing and validation
//! - **context**: release context, resolves every path for one date
//! - **error**: error types with contextual help messages
//! - **process**: external tool invocation
//! - **vcs**: git access (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod process;
pub mod vcs;

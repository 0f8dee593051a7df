//! Release building blocks
//!
//! # Invariants
//!
//! 1. **One release per date**
//!    - A published `updates/<date>` folder is never rebuilt in place
//!    - The caption header always names the same date as the folder
//!
//! 2. **Only stapled bundles are published**
//!    - The archive sent for notarization is rebuilt after stapling
//!
//! 3. **Changelogs cover `<last commit>..HEAD`, oldest first**
//!
//! # Modules
//!
//! - **pipeline**: compile, sign, stage, archive and publish steps
//! - **changelog**: `git log` to bullet list
//! - **template**: command file rendering and caption checks

pub mod changelog;
pub mod pipeline;
pub mod template;

pub use changelog::Changelog;
pub use pipeline::{BuildPipeline, archive_digest};
pub use template::Caption;

//! CLI commands for desk-updates
//!
//! - **build**: compile, sign, notarize, staple and publish the archive
//! - **compose**: render the send command with the changelog since a commit
//! - **send**: check the caption and hand the command file to the app
//! - **status**: show how far the release for a date has progressed
//!
//! All commands take `&ReleaseContext` so paths are derived in one place.

pub mod build;
pub mod compose;
pub mod send;
pub mod status;

pub use build::run_build;
pub use compose::run_compose;
pub use send::run_send;
pub use status::run_status;

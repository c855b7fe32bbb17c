//! Persistence.
//!
//! Scan history lives in a JSON-per-run store under the XDG data directory;
//! the recon pipeline writes its artifacts into a user-chosen output
//! directory.

mod artifacts;
mod json_store;

pub use artifacts::{write_json_artifact, write_text_artifact};
pub use json_store::ScanStore;

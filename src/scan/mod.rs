//! Filesystem measurement
//!
//! Expands configured roots into concrete files and fingerprints each one
//! (content digest and permission mode).

pub mod digest;
pub mod path;
pub mod walker;

pub use digest::{content_digest, path_exists, permission_mode};
pub use walker::{expand_paths, Walker};

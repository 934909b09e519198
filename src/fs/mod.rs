//! Filesystem module.
//!
//! Provides:
//! - Download filename derivation
//! - Directory and target path management

pub mod naming;
pub mod paths;

pub use naming::{
    ascii_filename, derive_filename, make_unique_filename, sanitize_filename, sanitize_username,
};
pub use paths::{download_target, ensure_dir};

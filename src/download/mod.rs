//! Download module.
//!
//! This module provides:
//! - The streaming download proxy
//! - Saving proxied downloads to disk

pub mod proxy;
pub mod save;

pub use proxy::{parse_key, DownloadProxy, DownloadStreamResult};
pub use save::save_to_directory;

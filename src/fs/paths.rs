//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs::naming::{make_unique_filename, sanitize_filename};

/// Pick a non-clobbering path for `filename` inside `directory`, creating the directory.
pub fn download_target(directory: &Path, filename: &str) -> Result<PathBuf> {
    let filename = sanitize_filename(filename)?;
    ensure_dir(directory)?;
    make_unique_filename(&directory.join(filename))
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

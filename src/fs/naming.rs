//! Filename generation and manipulation.

use std::path::{Path, PathBuf};

use crate::content::{ContentKind, OptionKey};
use crate::error::{Error, Result};

/// Segment used in place of a content id for profiles and stories.
const NO_CONTENT_ID: &str = "profile";

/// Username segment used when nothing printable survives sanitizing.
const FALLBACK_USERNAME: &str = "unknown";

/// Highest `_N` suffix tried before giving up on a free filename.
const MAX_UNIQUE_SUFFIX: u32 = 1000;

/// Build the download filename `{username}_{kind}_{id-or-profile}_{key}.{ext}`.
///
/// The username is reduced to a single safe path component; every other
/// segment is already restricted by the classifier and option key grammar.
pub fn derive_filename(
    username: &str,
    kind: ContentKind,
    content_id: Option<&str>,
    key: OptionKey,
    extension: &str,
) -> String {
    let id = content_id
        .map(|id| sanitize_segment(id, false))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| NO_CONTENT_ID.to_string());

    let extension = sanitize_segment(extension, false);
    let extension = if extension.is_empty() {
        "bin".to_string()
    } else {
        extension.to_lowercase()
    };

    format!(
        "{}_{}_{}_{}.{}",
        sanitize_username(username),
        kind.as_str(),
        id,
        key,
        extension
    )
}

/// Strip path separators and control characters from a username.
///
/// Interior dots are legal in Instagram usernames and kept; leading, trailing
/// and repeated dots are collapsed so the result is never `.`, `..` or hidden.
pub fn sanitize_username(username: &str) -> String {
    let cleaned = sanitize_segment(username.trim().trim_start_matches('@'), true);
    let cleaned = cleaned
        .split('.')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".");
    if cleaned.is_empty() {
        FALLBACK_USERNAME.to_string()
    } else {
        cleaned
    }
}

fn sanitize_segment(value: &str, keep_dots: bool) -> String {
    value
        .chars()
        .filter(|c| !c.is_control())
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .filter(|c| keep_dots || *c != '.')
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// ASCII-only variant of a filename for the plain `filename=` parameter.
pub fn ascii_filename(name: &str) -> String {
    let ascii: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if ascii.trim_matches(|c| c == '_' || c == '.').is_empty() {
        "download".to_string()
    } else {
        ascii
    }
}

/// Validate and sanitize a filename by removing or replacing invalid characters.
///
/// Returns an error if the filename contains path traversal patterns.
pub fn sanitize_filename(name: &str) -> Result<String> {
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Generate a unique filename by appending a number if the file exists.
///
/// Fails rather than overwrite once every suffix up to 1000 is taken.
pub fn make_unique_filename(path: &Path) -> Result<PathBuf> {
    unique_with_limit(path, MAX_UNIQUE_SUFFIX)
}

fn unique_with_limit(path: &Path, limit: u32) -> Result<PathBuf> {
    if !path.exists() {
        return Ok(path.to_path_buf());
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parent = path.parent().unwrap_or(Path::new("."));

    for counter in 1..=limit {
        let new_name = if ext.is_empty() {
            format!("{}_{}", stem, counter)
        } else {
            format!("{}_{}.{}", stem, counter, ext)
        };

        let new_path = parent.join(&new_name);
        if !new_path.exists() {
            return Ok(new_path);
        }
    }

    Err(Error::InvalidFilename(format!(
        "No free name for '{}' after {} attempts",
        path.display(),
        limit
    )))
}

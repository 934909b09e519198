//! Instagram URL classification.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::content::reference::ContentReference;
use crate::error::{Error, Result};

/// Hosts accepted as Instagram.
const INSTAGRAM_HOSTS: &[&str] = &["instagram.com", "www.instagram.com", "m.instagram.com"];

/// First path segments that are platform pages rather than profiles.
const RESERVED_SEGMENTS: &[&str] = &[
    "p",
    "reel",
    "reels",
    "tv",
    "stories",
    "explore",
    "accounts",
    "about",
    "legal",
    "developer",
    "directory",
    "api",
    "static",
    "graphql",
    "direct",
    "emails",
    "challenge",
    "session",
    "privacy",
    "terms",
    "press",
    "blog",
    "web",
    "oauth",
    "login",
    "logout",
    "nametag",
    "create",
    "lite",
    "favicon.ico",
    "robots.txt",
];

/// Usernames: letters, digits, dots and underscores, at most 30 characters.
static HANDLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._]{1,30}$").unwrap());

/// Shortcodes: URL-safe base64 alphabet.
static SHORTCODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());

/// Parse a user-supplied URL into a [`ContentReference`].
///
/// Recognized shapes, in priority order:
/// - `/p/{id}` and `/tv/{id}` (optionally prefixed by `/{handle}`) → post
/// - `/reel/{id}` and `/reels/{id}` (optionally prefixed by `/{handle}`) → reel
/// - `/stories/{handle}/...` → story
/// - `/{handle}` → profile, unless the segment is reserved
///
/// Pure parsing, no network access.
pub fn classify(raw: &str) -> Result<ContentReference> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(Error::InvalidUrl("URL is empty".to_string()));
    }

    let with_scheme = if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| Error::InvalidUrl(format!("'{}' is not a valid URL ({})", input, e)))?;

    let host = url.host_str().unwrap_or_default().to_lowercase();
    if !INSTAGRAM_HOSTS.contains(&host.as_str()) {
        return Err(Error::InvalidUrl(format!(
            "'{}' is not an Instagram URL",
            input
        )));
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    if segments.is_empty() {
        return Err(Error::InvalidUrl(
            "URL does not point to a post, reel, story or profile".to_string(),
        ));
    }

    classify_segments(&segments)
}

fn classify_segments(segments: &[&str]) -> Result<ContentReference> {
    let first = segments[0].to_lowercase();

    match first.as_str() {
        "p" | "tv" => {
            let id = shortcode(segments.get(1).copied())?;
            return Ok(ContentReference::post(id, None));
        }
        "reel" | "reels" => {
            let id = shortcode(segments.get(1).copied())?;
            return Ok(ContentReference::reel(id, None));
        }
        "stories" => return classify_story(segments),
        _ => {}
    }

    // `/{handle}/p/{id}` and `/{handle}/reel/{id}`
    if segments.len() >= 2 && !is_reserved(&first) {
        let owner = handle(segments[0])?;
        match segments[1].to_lowercase().as_str() {
            "p" | "tv" => {
                let id = shortcode(segments.get(2).copied())?;
                return Ok(ContentReference::post(id, Some(owner)));
            }
            "reel" | "reels" => {
                let id = shortcode(segments.get(2).copied())?;
                return Ok(ContentReference::reel(id, Some(owner)));
            }
            _ => {}
        }
    }

    if segments.len() == 1 {
        if is_reserved(&first) {
            return Err(Error::InvalidUrl(format!(
                "'/{}' is an Instagram page, not a profile",
                segments[0]
            )));
        }
        return Ok(ContentReference::profile(handle(segments[0])?));
    }

    Err(Error::InvalidUrl(format!(
        "unsupported Instagram path '/{}'",
        segments.join("/")
    )))
}

fn classify_story(segments: &[&str]) -> Result<ContentReference> {
    let owner = segments
        .get(1)
        .ok_or_else(|| Error::InvalidUrl("story URL is missing the username".to_string()))?;

    if owner.eq_ignore_ascii_case("highlights") {
        return Err(Error::InvalidUrl(
            "story highlights are not supported".to_string(),
        ));
    }

    Ok(ContentReference::story(handle(owner)?))
}

fn shortcode(segment: Option<&str>) -> Result<&str> {
    match segment {
        Some(code) if SHORTCODE_PATTERN.is_match(code) => Ok(code),
        Some(code) => Err(Error::InvalidUrl(format!(
            "'{}' is not a valid post id",
            code
        ))),
        None => Err(Error::InvalidUrl("URL is missing the post id".to_string())),
    }
}

fn handle(segment: &str) -> Result<&str> {
    let clean = segment.trim_start_matches('@');
    if HANDLE_PATTERN.is_match(clean) {
        Ok(clean)
    } else {
        Err(Error::InvalidUrl(format!(
            "'{}' is not a valid Instagram username",
            segment
        )))
    }
}

fn is_reserved(segment: &str) -> bool {
    RESERVED_SEGMENTS.contains(&segment)
}

//! Typed references to Instagram content.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Owner handle used when a post URL carries no username segment.
pub const UNKNOWN_OWNER: &str = "unknown";

/// Kind of content a URL points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Reel,
    Profile,
    Story,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Reel => "reel",
            ContentKind::Profile => "profile",
            ContentKind::Story => "story",
        }
    }

    /// Whether references of this kind carry a content id.
    pub fn has_content_id(&self) -> bool {
        matches!(self, ContentKind::Post | ContentKind::Reel)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized identification of a piece of Instagram content.
///
/// Built only through the constructors below, which keep the content id
/// present exactly for posts and reels and lowercase the owner handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentReference {
    kind: ContentKind,
    owner_handle: String,
    content_id: Option<String>,
}

impl ContentReference {
    /// Reference to a post by shortcode. `owner` comes from `/{handle}/p/{id}` URLs.
    pub fn post(shortcode: impl Into<String>, owner: Option<&str>) -> Self {
        Self::media(ContentKind::Post, shortcode.into(), owner)
    }

    /// Reference to a reel by shortcode.
    pub fn reel(shortcode: impl Into<String>, owner: Option<&str>) -> Self {
        Self::media(ContentKind::Reel, shortcode.into(), owner)
    }

    pub fn profile(handle: &str) -> Self {
        Self {
            kind: ContentKind::Profile,
            owner_handle: normalize_handle(handle),
            content_id: None,
        }
    }

    pub fn story(handle: &str) -> Self {
        Self {
            kind: ContentKind::Story,
            owner_handle: normalize_handle(handle),
            content_id: None,
        }
    }

    fn media(kind: ContentKind, shortcode: String, owner: Option<&str>) -> Self {
        let owner_handle = owner
            .map(normalize_handle)
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| UNKNOWN_OWNER.to_string());

        Self {
            kind,
            owner_handle,
            content_id: Some(shortcode),
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn owner_handle(&self) -> &str {
        &self.owner_handle
    }

    pub fn content_id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }
}

impl fmt::Display for ContentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.content_id {
            Some(id) => write!(f, "{} {} (@{})", self.kind, id, self.owner_handle),
            None => write!(f, "{} @{}", self.kind, self.owner_handle),
        }
    }
}

fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_lowercase()
}

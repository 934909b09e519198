//! Resolved content descriptors and their download options.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::media::MediaType;

/// Stable identifier of one downloadable asset within a descriptor.
///
/// Clients send the string form back verbatim in download requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionKey {
    Video,
    Image,
    Thumbnail,
    ProfilePic,
    Story,
    /// 1-indexed carousel item.
    CarouselItem(usize),
    /// Story item by its Instagram media id. Positions shift as older
    /// items expire, ids do not.
    StoryItem(u64),
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKey::Video => write!(f, "video"),
            OptionKey::Image => write!(f, "image"),
            OptionKey::Thumbnail => write!(f, "thumbnail"),
            OptionKey::ProfilePic => write!(f, "profile_pic"),
            OptionKey::Story => write!(f, "story"),
            OptionKey::CarouselItem(n) => write!(f, "carousel_item_{}", n),
            OptionKey::StoryItem(n) => write!(f, "story_item_{}", n),
        }
    }
}

impl FromStr for OptionKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let number = |prefix: &str| {
            s.strip_prefix(prefix)
                .filter(|n| !n.starts_with('0') && n.chars().all(|c| c.is_ascii_digit()))
        };

        match s {
            "video" => Ok(OptionKey::Video),
            "image" => Ok(OptionKey::Image),
            "thumbnail" => Ok(OptionKey::Thumbnail),
            "profile_pic" => Ok(OptionKey::ProfilePic),
            "story" => Ok(OptionKey::Story),
            _ => {
                if let Some(n) = number("carousel_item_").and_then(|n| n.parse().ok()) {
                    Ok(OptionKey::CarouselItem(n))
                } else if let Some(id) = number("story_item_").and_then(|n| n.parse().ok()) {
                    Ok(OptionKey::StoryItem(id))
                } else {
                    Err(format!("Unknown download option: {}", s))
                }
            }
        }
    }
}

impl Serialize for OptionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One entry in a descriptor's download menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadOption {
    #[serde(skip)]
    pub key: OptionKey,
    pub description: String,
    pub available: bool,
    /// Kind of media behind this option, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    /// Upstream asset location. Never sent to clients.
    #[serde(skip)]
    source_url: Option<String>,
}

impl DownloadOption {
    /// An option backed by a resolved asset URL.
    pub fn available(
        key: OptionKey,
        description: impl Into<String>,
        media_type: MediaType,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            key,
            description: description.into(),
            available: true,
            media_type: Some(media_type),
            source_url: Some(source_url.into()),
        }
    }

    /// An option the caller cannot download, with the reason as description.
    pub fn unavailable(key: OptionKey, reason: impl Into<String>) -> Self {
        Self {
            key,
            description: reason.into(),
            available: false,
            media_type: None,
            source_url: None,
        }
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }
}

/// Download menu keyed by option key.
pub type DownloadOptions = BTreeMap<OptionKey, DownloadOption>;

/// Display-ready metadata for a content reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentDescriptor {
    pub content_type: String,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub username: String,
    pub download_options: DownloadOptions,
}

impl ContentDescriptor {
    /// Look up a download option by its client-facing key.
    pub fn option(&self, key: &str) -> Option<&DownloadOption> {
        let key: OptionKey = key.parse().ok()?;
        self.download_options.get(&key)
    }
}

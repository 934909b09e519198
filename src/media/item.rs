//! Media asset representation.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Type of media content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Classify a MIME type, ignoring parameters.
    pub fn from_mimetype(mimetype: &str) -> Option<Self> {
        let essence = mimetype.split(';').next().unwrap_or("").trim();
        if essence.starts_with("image/") {
            Some(MediaType::Image)
        } else if essence.starts_with("video/") {
            Some(MediaType::Video)
        } else {
            None
        }
    }

    /// MIME type assumed when upstream does not declare one.
    pub fn default_mimetype(&self) -> &'static str {
        match self {
            MediaType::Image => "image/jpeg",
            MediaType::Video => "video/mp4",
        }
    }

    pub fn default_extension(&self) -> &'static str {
        match self {
            MediaType::Image => "jpg",
            MediaType::Video => "mp4",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

/// A single downloadable image or video.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAsset {
    pub media_type: MediaType,

    /// Full-resolution asset URL, if Instagram exposed one.
    pub url: Option<String>,

    /// Still frame for videos, or the image itself.
    pub preview_url: Option<String>,
}

impl MediaAsset {
    pub fn image(url: Option<String>) -> Self {
        Self {
            media_type: MediaType::Image,
            preview_url: url.clone(),
            url,
        }
    }

    pub fn video(url: Option<String>, preview_url: Option<String>) -> Self {
        Self {
            media_type: MediaType::Video,
            url,
            preview_url,
        }
    }

    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }
}

/// A story frame with its expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryMedia {
    /// Instagram media pk.
    pub id: u64,
    pub asset: MediaAsset,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoryMedia {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

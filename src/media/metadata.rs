//! Per-kind metadata parsed from Instagram responses.
//!
//! These are the only shapes that leave the API boundary; nothing past it
//! sees raw JSON.

use chrono::{DateTime, Utc};

use crate::media::item::{MediaAsset, StoryMedia};

/// A post or reel.
#[derive(Debug, Clone, PartialEq)]
pub struct PostMedia {
    pub shortcode: String,
    pub owner: String,
    pub caption: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_carousel: bool,
    pub items: Vec<MediaAsset>,
}

/// Public profile information.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileInfo {
    pub user_id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub biography: Option<String>,
    pub is_private: bool,
    pub profile_pic_url: Option<String>,
    /// False when the account shows Instagram's default avatar.
    pub has_custom_picture: bool,
}

/// Whether a user's stories can be read anonymously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryAccess {
    Available,
    LoginRequired,
    PrivateAccount,
}

/// A user's current stories.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryFeed {
    pub owner: String,
    pub access: StoryAccess,
    pub profile_pic_url: Option<String>,
    pub items: Vec<StoryMedia>,
}

impl StoryFeed {
    /// Drop frames that expired before `now`.
    pub fn retain_active(&mut self, now: DateTime<Utc>) {
        self.items.retain(|item| !item.is_expired(now));
    }
}

/// Metadata for any content kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RawMetadata {
    Post(PostMedia),
    Profile(ProfileInfo),
    Story(StoryFeed),
}

impl RawMetadata {
    /// Username Instagram reports for the content owner.
    pub fn owner(&self) -> &str {
        match self {
            RawMetadata::Post(post) => &post.owner,
            RawMetadata::Profile(profile) => &profile.username,
            RawMetadata::Story(feed) => &feed.owner,
        }
    }
}

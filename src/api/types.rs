//! Instagram API response type definitions.

use serde::Deserialize;
use std::collections::HashMap;

/// Status fields Instagram attaches to failed JSON responses.
#[derive(Debug, Default, Deserialize)]
pub struct ApiStatus {
    pub status: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub require_login: bool,
}

impl ApiStatus {
    /// Whether the response asks for an authenticated session.
    pub fn requires_login(&self) -> bool {
        self.require_login
            || self.message.as_deref().is_some_and(|m| {
                m.contains("login_required") || m.contains("checkpoint_required")
            })
    }
}

/// GraphQL response for a shortcode query.
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    pub data: Option<GraphqlData>,
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// GraphQL data payload. Instagram has used both field names.
#[derive(Debug, Deserialize)]
pub struct GraphqlData {
    pub xdt_shortcode_media: Option<ShortcodeMedia>,
    pub shortcode_media: Option<ShortcodeMedia>,
}

impl GraphqlData {
    pub fn into_media(self) -> Option<ShortcodeMedia> {
        self.xdt_shortcode_media.or(self.shortcode_media)
    }
}

/// Post or reel returned by a shortcode query.
#[derive(Debug, Clone, Deserialize)]
pub struct ShortcodeMedia {
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
    pub shortcode: String,
    #[serde(default)]
    pub is_video: bool,
    pub video_url: Option<String>,
    pub display_url: Option<String>,
    pub thumbnail_src: Option<String>,
    pub owner: Option<MediaOwner>,
    #[serde(default)]
    pub edge_media_to_caption: EdgeList<CaptionNode>,
    pub edge_sidecar_to_children: Option<EdgeList<SidecarNode>>,
}

/// Owner of a post.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaOwner {
    pub username: String,
    #[serde(default)]
    pub is_private: bool,
}

/// GraphQL connection wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeList<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

impl<T> Default for EdgeList<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptionNode {
    pub text: String,
}

/// Carousel child.
#[derive(Debug, Clone, Deserialize)]
pub struct SidecarNode {
    #[serde(default)]
    pub is_video: bool,
    pub video_url: Option<String>,
    pub display_url: Option<String>,
}

/// Response of the `web_profile_info` endpoint.
#[derive(Debug, Deserialize)]
pub struct WebProfileResponse {
    pub data: Option<WebProfileData>,
    #[serde(flatten)]
    pub status: ApiStatus,
}

#[derive(Debug, Deserialize)]
pub struct WebProfileData {
    pub user: Option<WebUser>,
}

/// Public profile fields.
#[derive(Debug, Clone, Deserialize)]
pub struct WebUser {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub biography: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    pub profile_pic_url: Option<String>,
    pub profile_pic_url_hd: Option<String>,
    #[serde(default)]
    pub has_anonymous_profile_picture: bool,
}

/// Response of the `feed/reels_media` endpoint.
#[derive(Debug, Deserialize)]
pub struct ReelsMediaResponse {
    #[serde(default)]
    pub reels: HashMap<String, StoryReel>,
    #[serde(default)]
    pub reels_media: Vec<StoryReel>,
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// A user's current story tray.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryReel {
    #[serde(default)]
    pub items: Vec<StoryItem>,
}

/// Single story frame.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryItem {
    /// `{media_pk}_{user_id}`.
    #[serde(default)]
    pub id: String,
    /// 1 = image, 2 = video.
    pub media_type: i32,
    pub taken_at: Option<i64>,
    pub expiring_at: Option<i64>,
    pub image_versions2: Option<ImageVersions>,
    #[serde(default)]
    pub video_versions: Vec<VersionCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageVersions {
    #[serde(default)]
    pub candidates: Vec<VersionCandidate>,
}

/// One rendition of a story image or video.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionCandidate {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

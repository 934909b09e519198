//! Media parsing utilities.

use chrono::{TimeZone, Utc};

use crate::api::types::{ShortcodeMedia, StoryItem, StoryReel, VersionCandidate, WebUser};
use crate::media::item::{MediaAsset, MediaType, StoryMedia};
use crate::media::metadata::{PostMedia, ProfileInfo, StoryAccess, StoryFeed};

/// File id fragment of Instagram's anonymous avatar.
const DEFAULT_AVATAR_MARKER: &str = "44884218_345707102882519_2446069589734326272_n";

/// Story `media_type` value for videos.
const STORY_MEDIA_VIDEO: i32 = 2;

/// Convert a GraphQL shortcode media node into a [`PostMedia`].
pub fn parse_shortcode_media(media: ShortcodeMedia) -> PostMedia {
    let caption = media
        .edge_media_to_caption
        .edges
        .into_iter()
        .next()
        .map(|edge| edge.node.text)
        .filter(|text| !text.trim().is_empty());

    let owner = media
        .owner
        .map(|o| o.username)
        .unwrap_or_default();

    let thumbnail_url = media.thumbnail_src.or_else(|| media.display_url.clone());

    let sidecar = media
        .edge_sidecar_to_children
        .map(|children| children.edges)
        .filter(|edges| !edges.is_empty());

    let (is_carousel, items) = match sidecar {
        Some(edges) => (
            true,
            edges
                .into_iter()
                .map(|edge| {
                    let node = edge.node;
                    if node.is_video {
                        MediaAsset::video(node.video_url, node.display_url)
                    } else {
                        MediaAsset::image(node.display_url)
                    }
                })
                .collect(),
        ),
        None if media.is_video => (
            false,
            vec![MediaAsset::video(media.video_url, media.display_url)],
        ),
        None => (false, vec![MediaAsset::image(media.display_url)]),
    };

    PostMedia {
        shortcode: media.shortcode,
        owner,
        caption,
        thumbnail_url,
        is_carousel,
        items,
    }
}

/// Convert a `web_profile_info` user into a [`ProfileInfo`].
pub fn parse_profile(user: WebUser) -> ProfileInfo {
    let profile_pic_url = user
        .profile_pic_url_hd
        .or(user.profile_pic_url)
        .filter(|url| !url.is_empty());

    let has_custom_picture = !user.has_anonymous_profile_picture
        && profile_pic_url
            .as_deref()
            .is_some_and(|url| !is_default_profile_pic(url));

    ProfileInfo {
        user_id: user.id,
        username: user.username,
        full_name: user.full_name.filter(|n| !n.is_empty()),
        biography: user.biography.filter(|b| !b.trim().is_empty()),
        is_private: user.is_private,
        profile_pic_url,
        has_custom_picture,
    }
}

/// Build a story feed from a `reels_media` tray.
pub fn parse_story_reel(profile: &ProfileInfo, reel: Option<StoryReel>) -> StoryFeed {
    let items = reel
        .map(|r| r.items.iter().filter_map(parse_story_item).collect())
        .unwrap_or_default();

    StoryFeed {
        owner: profile.username.clone(),
        access: StoryAccess::Available,
        profile_pic_url: profile.profile_pic_url.clone(),
        items,
    }
}

/// Frames without a parsable media id are skipped, since option keys are built from it.
fn parse_story_item(item: &StoryItem) -> Option<StoryMedia> {
    let id = item.id.split('_').next()?.parse().ok()?;

    let image = item
        .image_versions2
        .as_ref()
        .and_then(|v| select_best_variant(&v.candidates))
        .map(|c| c.url.clone());

    let asset = if item.media_type == STORY_MEDIA_VIDEO {
        let video = select_best_variant(&item.video_versions).map(|c| c.url.clone());
        MediaAsset::video(video, image)
    } else {
        MediaAsset::image(Some(image?))
    };

    let expires_at = item
        .expiring_at
        .or_else(|| item.taken_at.map(|t| t + 24 * 60 * 60))
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single());

    Some(StoryMedia {
        id,
        asset,
        expires_at,
    })
}

/// Select the highest-resolution rendition.
pub fn select_best_variant(candidates: &[VersionCandidate]) -> Option<&VersionCandidate> {
    // Instagram lists the largest rendition first; keep the first on ties.
    candidates.iter().reduce(|best, candidate| {
        if resolution(candidate) > resolution(best) {
            candidate
        } else {
            best
        }
    })
}

fn resolution(candidate: &VersionCandidate) -> u64 {
    candidate.width.unwrap_or(0) as u64 * candidate.height.unwrap_or(0) as u64
}

/// Whether a profile picture URL points at Instagram's default avatar.
pub fn is_default_profile_pic(url: &str) -> bool {
    url.contains(DEFAULT_AVATAR_MARKER)
}

/// Determine the file extension for a fetched asset.
///
/// The declared MIME type wins; the URL path and then the expected media
/// type are fallbacks.
pub fn extension_for(mimetype: Option<&str>, url: &str, fallback: MediaType) -> String {
    if let Some(ext) = mimetype.and_then(mime_to_extension) {
        return ext.to_string();
    }

    if let Some(ext) = extract_extension_from_url(url) {
        return ext;
    }

    fallback.default_extension().to_string()
}

/// Guess a MIME type from the URL path, for responses without `Content-Type`.
pub fn guess_mimetype(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

/// Extract extension from URL path.
fn extract_extension_from_url(url: &str) -> Option<String> {
    // Remove query string
    let path = url.split('?').next()?;

    // Get the last segment
    let filename = path.rsplit('/').next()?;

    let (_, ext) = filename.rsplit_once('.')?;

    // Validate it looks like an extension (1-10 chars, alphanumeric)
    if !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext.to_lowercase())
    } else {
        None
    }
}

/// Convert MIME type to file extension.
fn mime_to_extension(mimetype: &str) -> Option<&'static str> {
    let essence = mimetype.split(';').next().unwrap_or("").trim();
    let ext = match essence.to_ascii_lowercase().as_str() {
        // Images
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/heic" => "heic",

        // Videos
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",

        _ => return None,
    };
    Some(ext)
}

//! Download option derivation.
//!
//! Pure mapping from typed metadata to the download menu. Keys depend only on
//! the content's shape, so re-resolving unchanged content yields the same keys.
//! Story items are keyed by media id: a key keeps naming the same frame after
//! older frames expire, and names nothing once its own frame is gone.

use crate::content::{ContentKind, DownloadOption, DownloadOptions, OptionKey};
use crate::media::{MediaAsset, MediaType, PostMedia, ProfileInfo, RawMetadata, StoryAccess, StoryFeed};

const NO_MEDIA: &str = "No downloadable media found. The content may have been removed";
const VIDEO_URL_MISSING: &str = "Video URL not available";
const DEFAULT_PICTURE: &str = "This account uses the default profile picture";
const STORIES_LOGIN: &str = "Stories require login";
const STORIES_PRIVATE: &str = "This account is private";
const STORIES_NONE: &str = "No active stories. Stories expire after 24 hours";

/// Build the download menu for resolved metadata.
///
/// Never returns an empty map: content without any discoverable asset gets a
/// single unavailable option explaining why.
pub fn build_options(kind: ContentKind, raw: &RawMetadata) -> DownloadOptions {
    let mut options = match raw {
        RawMetadata::Post(post) => post_options(post),
        RawMetadata::Profile(profile) => profile_options(profile),
        RawMetadata::Story(feed) => story_options(feed),
    };

    if options.is_empty() {
        let key = fallback_key(kind);
        options.insert(key, DownloadOption::unavailable(key, NO_MEDIA));
    }

    options
}

fn fallback_key(kind: ContentKind) -> OptionKey {
    match kind {
        ContentKind::Post => OptionKey::Image,
        ContentKind::Reel => OptionKey::Video,
        ContentKind::Profile => OptionKey::ProfilePic,
        ContentKind::Story => OptionKey::Story,
    }
}

fn post_options(post: &PostMedia) -> DownloadOptions {
    if post.is_carousel {
        let keyed = post
            .items
            .iter()
            .enumerate()
            .map(|(index, asset)| (OptionKey::CarouselItem(index + 1), asset));
        return indexed_options(keyed, "item");
    }

    let mut options = DownloadOptions::new();
    if let Some(asset) = post.items.first() {
        insert_single(&mut options, asset, post.thumbnail_url.as_deref());
    }
    options
}

fn profile_options(profile: &ProfileInfo) -> DownloadOptions {
    let option = match profile.profile_pic_url.as_deref() {
        Some(url) if profile.has_custom_picture => DownloadOption::available(
            OptionKey::ProfilePic,
            "Download profile picture",
            MediaType::Image,
            url,
        ),
        _ => DownloadOption::unavailable(OptionKey::ProfilePic, DEFAULT_PICTURE),
    };

    DownloadOptions::from([(OptionKey::ProfilePic, option)])
}

fn story_options(feed: &StoryFeed) -> DownloadOptions {
    let reason = match feed.access {
        StoryAccess::LoginRequired => Some(STORIES_LOGIN),
        StoryAccess::PrivateAccount => Some(STORIES_PRIVATE),
        StoryAccess::Available if feed.items.is_empty() => Some(STORIES_NONE),
        StoryAccess::Available => None,
    };

    if let Some(reason) = reason {
        return DownloadOptions::from([(
            OptionKey::Story,
            DownloadOption::unavailable(OptionKey::Story, reason),
        )]);
    }

    let keyed = feed
        .items
        .iter()
        .map(|story| (OptionKey::StoryItem(story.id), &story.asset));
    indexed_options(keyed, "story")
}

/// Options for a lone asset: `image`, or `video` plus `thumbnail`.
fn insert_single(options: &mut DownloadOptions, asset: &MediaAsset, thumbnail: Option<&str>) {
    match asset.media_type {
        MediaType::Image => {
            let option = match asset.url.as_deref() {
                Some(url) => {
                    DownloadOption::available(OptionKey::Image, "Download image", MediaType::Image, url)
                }
                None => DownloadOption::unavailable(OptionKey::Image, "Image URL not available"),
            };
            options.insert(OptionKey::Image, option);
        }
        MediaType::Video => {
            let option = match asset.url.as_deref() {
                Some(url) => DownloadOption::available(
                    OptionKey::Video,
                    "Download video file",
                    MediaType::Video,
                    url,
                ),
                None => DownloadOption::unavailable(OptionKey::Video, VIDEO_URL_MISSING),
            };
            options.insert(OptionKey::Video, option);

            let option = match asset.preview_url.as_deref().or(thumbnail) {
                Some(url) => DownloadOption::available(
                    OptionKey::Thumbnail,
                    "Download video thumbnail",
                    MediaType::Image,
                    url,
                ),
                None => DownloadOption::unavailable(OptionKey::Thumbnail, "Thumbnail not available"),
            };
            options.insert(OptionKey::Thumbnail, option);
        }
    }
}

/// One option per item plus an `image`/`video` aggregate for every media type
/// present. The aggregate points at the first downloadable item of its type,
/// or is unavailable when none has a URL.
fn indexed_options<'a>(
    items: impl Iterator<Item = (OptionKey, &'a MediaAsset)>,
    noun: &str,
) -> DownloadOptions {
    let mut options = DownloadOptions::new();

    for (index, (key, asset)) in items.enumerate() {
        let label = asset.media_type.label();

        let option = match asset.url.as_deref() {
            Some(url) => DownloadOption::available(
                key,
                format!("Download {} {} ({})", noun, index + 1, label),
                asset.media_type,
                url,
            ),
            None => DownloadOption::unavailable(
                key,
                format!("{} {} has no downloadable {}", capitalize(noun), index + 1, label),
            ),
        };
        options.insert(key, option);

        let aggregate = match asset.media_type {
            MediaType::Image => OptionKey::Image,
            MediaType::Video => OptionKey::Video,
        };
        let resolved = options.get(&aggregate).is_some_and(|o| o.available);
        match asset.url.as_deref() {
            Some(url) if !resolved => {
                options.insert(
                    aggregate,
                    DownloadOption::available(
                        aggregate,
                        format!("Download first {} ({} {})", label, noun, index + 1),
                        asset.media_type,
                        url,
                    ),
                );
            }
            Some(_) => {}
            None => {
                options.entry(aggregate).or_insert_with(|| {
                    DownloadOption::unavailable(aggregate, format!("No downloadable {} found", label))
                });
            }
        }
    }

    options
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

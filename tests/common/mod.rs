//! In-memory content source shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};

use insta_downloader::api::{AssetStream, ContentSource};
use insta_downloader::config::Config;
use insta_downloader::error::{Error, Result};
use insta_downloader::media::{
    MediaAsset, PostMedia, ProfileInfo, StoryAccess, StoryFeed, StoryMedia,
};

/// Content source backed by hash maps, counting every call.
#[derive(Default)]
pub struct FakeSource {
    posts: Mutex<HashMap<String, PostMedia>>,
    profiles: Mutex<HashMap<String, ProfileInfo>>,
    stories: Mutex<HashMap<String, StoryFeed>>,
    assets: Mutex<HashMap<String, (Option<String>, Vec<u8>)>>,
    metadata_calls: AtomicUsize,
    asset_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_post(&self, post: PostMedia) {
        self.posts.lock().unwrap().insert(post.shortcode.clone(), post);
    }

    pub fn remove_post(&self, shortcode: &str) {
        self.posts.lock().unwrap().remove(shortcode);
    }

    pub fn set_profile(&self, profile: ProfileInfo) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.username.clone(), profile);
    }

    /// Serve `feed` for its owner; other handles get a login wall.
    pub fn set_stories(&self, feed: StoryFeed) {
        self.stories.lock().unwrap().insert(feed.owner.clone(), feed);
    }

    pub fn set_asset(&self, url: &str, content_type: Option<&str>, data: &[u8]) {
        self.assets.lock().unwrap().insert(
            url.to_string(),
            (content_type.map(str::to_string), data.to_vec()),
        );
    }

    pub fn remove_asset(&self, url: &str) {
        self.assets.lock().unwrap().remove(url);
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn asset_calls(&self) -> usize {
        self.asset_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn fetch_post(&self, shortcode: &str) -> Result<PostMedia> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.posts
            .lock()
            .unwrap()
            .get(shortcode)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("post {}", shortcode)))
    }

    async fn fetch_profile(&self, handle: &str) -> Result<ProfileInfo> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .lock()
            .unwrap()
            .get(handle)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("profile @{}", handle)))
    }

    async fn fetch_stories(&self, handle: &str) -> Result<StoryFeed> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        let stored = self.stories.lock().unwrap().get(handle).cloned();
        Ok(stored.unwrap_or_else(|| StoryFeed {
            owner: handle.to_string(),
            access: StoryAccess::LoginRequired,
            profile_pic_url: None,
            items: Vec::new(),
        }))
    }

    async fn open_asset(&self, url: &str) -> Result<AssetStream> {
        self.asset_calls.fetch_add(1, Ordering::SeqCst);
        let (content_type, data) = self
            .assets
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| Error::NotFound("the media file is no longer available".into()))?;

        // Two chunks, so consumers see a real stream.
        let mid = data.len() / 2;
        let chunks = vec![
            Ok(Bytes::copy_from_slice(&data[..mid])),
            Ok(Bytes::copy_from_slice(&data[mid..])),
        ];

        Ok(AssetStream {
            content_type,
            content_length: Some(data.len() as u64),
            body: stream::iter(chunks).boxed(),
        })
    }
}

pub fn image_post(shortcode: &str, owner: &str, url: &str) -> PostMedia {
    PostMedia {
        shortcode: shortcode.to_string(),
        owner: owner.to_string(),
        caption: Some("A caption".to_string()),
        thumbnail_url: Some(url.to_string()),
        is_carousel: false,
        items: vec![MediaAsset::image(Some(url.to_string()))],
    }
}

pub fn carousel_post(shortcode: &str, owner: &str, urls: &[&str]) -> PostMedia {
    PostMedia {
        shortcode: shortcode.to_string(),
        owner: owner.to_string(),
        caption: None,
        thumbnail_url: urls.first().map(|u| u.to_string()),
        is_carousel: true,
        items: urls
            .iter()
            .map(|u| MediaAsset::image(Some(u.to_string())))
            .collect(),
    }
}

/// Available image stories, one per `(media id, url)`.
pub fn story_feed(owner: &str, frames: &[(u64, &str)]) -> StoryFeed {
    StoryFeed {
        owner: owner.to_string(),
        access: StoryAccess::Available,
        profile_pic_url: None,
        items: frames
            .iter()
            .map(|(id, url)| StoryMedia {
                id: *id,
                asset: MediaAsset::image(Some(url.to_string())),
                expires_at: None,
            })
            .collect(),
    }
}

pub fn profile(username: &str, is_private: bool) -> ProfileInfo {
    ProfileInfo {
        user_id: "42".to_string(),
        username: username.to_string(),
        full_name: Some("Some One".to_string()),
        biography: Some("Just a bio".to_string()),
        is_private,
        profile_pic_url: Some(format!("https://cdn.test/{}.jpg", username)),
        has_custom_picture: true,
    }
}

/// Defaults with near-zero retry delay.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.upstream.retry_base_delay_ms = 1;
    config
}

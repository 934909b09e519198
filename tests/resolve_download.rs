//! Resolver and download proxy behavior against an in-memory source.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use futures::TryStreamExt;
use regex::Regex;
use tokio_test::{assert_err, assert_ok};

use common::{carousel_post, image_post, profile, story_feed, test_config, FakeSource};
use insta_downloader::content::{classify, OptionKey};
use insta_downloader::download::{save_to_directory, DownloadProxy, DownloadStreamResult};
use insta_downloader::error::Error;
use insta_downloader::media::{MediaAsset, PostMedia};
use insta_downloader::resolve::{MetadataCache, Resolver};

fn resolver(source: Arc<FakeSource>) -> Arc<Resolver> {
    Arc::new(Resolver::from_config(source, &test_config()))
}

async fn body(result: DownloadStreamResult) -> Vec<u8> {
    result
        .stream
        .map_ok(|chunk| chunk.to_vec())
        .try_concat()
        .await
        .unwrap()
}

fn filename_pattern() -> Regex {
    Regex::new(r"^[^/\\\x00-\x1f]+_(post|reel|profile|story)_[A-Za-z0-9_-]+_[a-z0-9_]+\.[a-z0-9]+$").unwrap()
}

#[tokio::test]
async fn resolving_twice_yields_identical_keys() {
    let source = Arc::new(FakeSource::new());
    source.set_post(carousel_post(
        "CAR",
        "someone",
        &["https://cdn.test/1.jpg", "https://cdn.test/2.jpg"],
    ));
    let resolver = resolver(source);
    let reference = classify("https://www.instagram.com/p/CAR/").unwrap();

    let first = resolver.resolve_fresh(&reference).await.unwrap();
    let second = resolver.resolve_fresh(&reference).await.unwrap();

    let keys = |d: &insta_downloader::ContentDescriptor| {
        d.download_options.keys().copied().collect::<Vec<OptionKey>>()
    };
    assert_eq!(keys(&first), keys(&second));
    assert!(!first.download_options.is_empty());
}

#[tokio::test]
async fn valid_post_urls_always_get_options() {
    let source = Arc::new(FakeSource::new());
    source.set_post(PostMedia {
        shortcode: "EMPTY".into(),
        owner: "someone".into(),
        caption: None,
        thumbnail_url: None,
        is_carousel: false,
        items: vec![],
    });
    source.set_post(PostMedia {
        shortcode: "NOURL".into(),
        owner: "someone".into(),
        caption: None,
        thumbnail_url: None,
        is_carousel: false,
        items: vec![MediaAsset::video(None, None)],
    });
    let resolver = resolver(source);

    for url in ["instagram.com/p/EMPTY", "instagram.com/reel/EMPTY", "instagram.com/tv/NOURL"] {
        let reference = classify(url).unwrap();
        let descriptor = resolver.resolve_fresh(&reference).await.unwrap();
        assert!(!descriptor.download_options.is_empty(), "{}", url);
        assert!(descriptor
            .download_options
            .values()
            .all(|o| !o.available || o.source_url().is_some()));
    }
}

#[tokio::test]
async fn cache_never_serves_another_reference() {
    let source = Arc::new(FakeSource::new());
    source.set_post(image_post("AAA", "alice", "https://cdn.test/a.jpg"));
    source.set_post(image_post("BBB", "bob", "https://cdn.test/b.jpg"));
    let resolver = Resolver::from_config(source.clone(), &test_config())
        .with_cache(MetadataCache::new(std::time::Duration::from_secs(60), 1));

    let a = resolver.resolve(&classify("instagram.com/p/AAA").unwrap()).await.unwrap();
    let b = resolver.resolve(&classify("instagram.com/p/BBB").unwrap()).await.unwrap();
    let a_again = resolver.resolve(&classify("instagram.com/p/AAA").unwrap()).await.unwrap();

    assert_eq!(a.username, "alice");
    assert_eq!(b.username, "bob");
    assert_eq!(a_again.username, "alice");
    // Capacity of one: AAA was evicted by BBB and fetched again.
    assert_eq!(source.metadata_calls(), 3);
}

#[tokio::test]
async fn filenames_follow_the_pattern_for_every_kind() {
    let source = Arc::new(FakeSource::new());
    source.set_post(image_post("ABC123", "some/one", "https://cdn.test/abc.jpg"));
    source.set_profile(profile("someone", false));
    source.set_asset("https://cdn.test/abc.jpg", Some("image/jpeg"), b"img");
    source.set_asset("https://cdn.test/someone.jpg", None, b"pic");

    let resolver = resolver(source);
    let proxy = DownloadProxy::new(resolver, &test_config().upstream);

    let post = proxy
        .download(&classify("instagram.com/p/ABC123").unwrap(), "image")
        .await
        .unwrap();
    assert_eq!(post.filename, "someone_post_ABC123_image.jpg");
    assert!(filename_pattern().is_match(&post.filename));

    let pic = proxy
        .download(&classify("instagram.com/someone").unwrap(), "profile_pic")
        .await
        .unwrap();
    assert_eq!(pic.filename, "someone_profile_profile_profile_pic.jpg");
    assert_eq!(pic.media_type, "image/jpeg");
    assert!(filename_pattern().is_match(&pic.filename));
}

#[tokio::test]
async fn declared_content_type_decides_extension() {
    let source = Arc::new(FakeSource::new());
    source.set_post(image_post("PNG", "someone", "https://cdn.test/pic"));
    source.set_asset("https://cdn.test/pic", Some("image/png"), b"png");

    let proxy = DownloadProxy::new(resolver(source), &test_config().upstream);
    let result = proxy
        .download(&classify("instagram.com/p/PNG").unwrap(), "image")
        .await
        .unwrap();

    assert_eq!(result.media_type, "image/png");
    assert!(result.filename.ends_with(".png"));
}

#[tokio::test]
async fn unavailable_option_is_refused() {
    let source = Arc::new(FakeSource::new());
    source.set_post(PostMedia {
        shortcode: "REEL".into(),
        owner: "someone".into(),
        caption: None,
        thumbnail_url: None,
        is_carousel: false,
        items: vec![MediaAsset::video(None, None)],
    });

    let proxy = DownloadProxy::new(resolver(source.clone()), &test_config().upstream);
    let err = assert_err!(
        proxy
            .download(&classify("instagram.com/reel/REEL").unwrap(), "video")
            .await
    );

    assert!(matches!(err, Error::OptionUnavailable(_)));
    assert_eq!(source.asset_calls(), 0);
}

#[tokio::test]
async fn download_resolved_reuses_descriptor() {
    let source = Arc::new(FakeSource::new());
    source.set_post(image_post("ABC123", "someone", "https://cdn.test/abc.jpg"));
    source.set_asset("https://cdn.test/abc.jpg", Some("image/jpeg"), b"abcdef");

    let resolver = resolver(source.clone());
    let proxy = DownloadProxy::new(resolver.clone(), &test_config().upstream);
    let reference = classify("instagram.com/p/ABC123").unwrap();

    let descriptor = resolver.resolve_fresh(&reference).await.unwrap();
    let result = assert_ok!(
        proxy
            .download_resolved(&reference, &descriptor, OptionKey::Image)
            .await
    );
    assert_eq!(source.metadata_calls(), 1);

    let bytes: Vec<u8> = result
        .stream
        .map_ok(|chunk| chunk.to_vec())
        .try_concat()
        .await
        .unwrap();
    assert_eq!(bytes, b"abcdef");
}

#[tokio::test]
async fn cli_save_writes_file() {
    let source = Arc::new(FakeSource::new());
    source.set_post(image_post("ABC123", "someone", "https://cdn.test/abc.jpg"));
    source.set_asset("https://cdn.test/abc.jpg", Some("image/jpeg"), b"jpeg-bytes");

    let proxy = DownloadProxy::new(resolver(source), &test_config().upstream);
    let dir = tempfile::tempdir().unwrap();

    let result = proxy
        .download(&classify("instagram.com/p/ABC123").unwrap(), "image")
        .await
        .unwrap();
    let path = save_to_directory(result, dir.path(), false).await.unwrap();

    assert_eq!(path, dir.path().join("someone_post_ABC123_image.jpg"));
    assert_eq!(std::fs::read(path).unwrap(), b"jpeg-bytes");
}

#[tokio::test]
async fn carousel_item_downloads_its_own_asset() {
    let source = Arc::new(FakeSource::new());
    source.set_post(carousel_post(
        "CAR",
        "someone",
        &["https://cdn.test/1.jpg", "https://cdn.test/2.jpg"],
    ));
    source.set_asset("https://cdn.test/1.jpg", Some("image/jpeg"), b"first");
    source.set_asset("https://cdn.test/2.jpg", Some("image/jpeg"), b"second");

    let proxy = DownloadProxy::new(resolver(source), &test_config().upstream);
    let result = proxy
        .download(&classify("instagram.com/p/CAR").unwrap(), "carousel_item_2")
        .await
        .unwrap();

    assert_eq!(result.filename, "someone_post_CAR_carousel_item_2.jpg");
    assert!(filename_pattern().is_match(&result.filename));
    assert_eq!(body(result).await, b"second");
}

#[tokio::test]
async fn story_item_downloads_its_own_asset() {
    let source = Arc::new(FakeSource::new());
    source.set_stories(story_feed(
        "someone",
        &[(3001, "https://cdn.test/s1.jpg"), (3002, "https://cdn.test/s2.jpg")],
    ));
    source.set_asset("https://cdn.test/s1.jpg", Some("image/jpeg"), b"s1");
    source.set_asset("https://cdn.test/s2.jpg", Some("image/jpeg"), b"s2");

    let proxy = DownloadProxy::new(resolver(source), &test_config().upstream);
    let result = proxy
        .download(&classify("instagram.com/stories/someone/").unwrap(), "story_item_3002")
        .await
        .unwrap();

    assert_eq!(result.filename, "someone_story_profile_story_item_3002.jpg");
    assert!(filename_pattern().is_match(&result.filename));
    assert_eq!(body(result).await, b"s2");
}

#[tokio::test]
async fn story_key_still_names_its_frame_after_older_frame_expires() {
    let source = Arc::new(FakeSource::new());
    let frames = [
        (3001, "https://cdn.test/s1.jpg"),
        (3002, "https://cdn.test/s2.jpg"),
        (3003, "https://cdn.test/s3.jpg"),
    ];
    source.set_stories(story_feed("someone", &frames));
    for (name, url) in [("s1", frames[0].1), ("s2", frames[1].1), ("s3", frames[2].1)] {
        source.set_asset(url, Some("image/jpeg"), name.as_bytes());
    }

    let resolver = resolver(source.clone());
    let proxy = DownloadProxy::new(resolver.clone(), &test_config().upstream);
    let reference = classify("instagram.com/stories/someone/").unwrap();

    let descriptor = resolver.resolve_fresh(&reference).await.unwrap();
    let second = &descriptor.download_options[&OptionKey::StoryItem(3002)];
    assert_eq!(second.source_url(), Some("https://cdn.test/s2.jpg"));

    // First frame expires between analyze and download.
    let mut feed = story_feed("someone", &frames);
    feed.items[0].expires_at = Some(Utc::now() - Duration::minutes(1));
    source.set_stories(feed);

    let result = proxy.download(&reference, "story_item_3002").await.unwrap();
    assert_eq!(body(result).await, b"s2");
    assert_eq!(source.asset_calls(), 1);

    let err = assert_err!(proxy.download(&reference, "story_item_3001").await);
    assert!(matches!(err, Error::OptionUnavailable(_)));
    assert_eq!(source.asset_calls(), 1);
}

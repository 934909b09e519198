//! Media module for asset representation and parsing.

pub mod item;
pub mod metadata;
pub mod parser;

pub use item::{MediaAsset, MediaType, StoryMedia};
pub use metadata::{PostMedia, ProfileInfo, RawMetadata, StoryAccess, StoryFeed};
pub use parser::{extension_for, guess_mimetype, parse_profile, parse_shortcode_media, parse_story_reel};

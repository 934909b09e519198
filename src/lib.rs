//! Insta Downloader - resolve and download public Instagram content.
//!
//! This library turns Instagram URLs into typed content references, resolves
//! them into display-ready descriptors with a menu of download options, and
//! streams the chosen asset back without buffering it.
//!
//! # Features
//!
//! - Posts, carousels, reels, profile pictures and stories
//! - Stable download option keys across analyze and download calls
//! - Bounded retries, timeouts and rate-limit reporting
//! - Optional short-lived metadata cache
//! - HTTP API (axum) and CLI
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use insta_downloader::{classify, Config, InstagramApi, Resolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let api = InstagramApi::new(&config.upstream)?;
//!     let resolver = Resolver::from_config(Arc::new(api), &config);
//!
//!     let reference = classify("https://www.instagram.com/p/ABC123/")?;
//!     let descriptor = resolver.resolve(&reference).await?;
//!     println!("{}", descriptor.title);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod content;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod options;
pub mod output;
pub mod resolve;
pub mod server;

// Re-exports for convenience
pub use api::{ContentSource, InstagramApi};
pub use config::Config;
pub use content::{classify, ContentDescriptor, ContentKind, ContentReference, OptionKey};
pub use download::{DownloadProxy, DownloadStreamResult};
pub use error::{Error, ErrorKind, Result};
pub use media::MediaType;
pub use resolve::{MetadataCache, Resolver};

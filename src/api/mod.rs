//! Instagram API module.
//!
//! This module provides:
//! - The `ContentSource` seam over the external provider
//! - HTTP client for Instagram's public web endpoints
//! - API response types

pub mod client;
pub mod source;
pub mod types;

pub use client::InstagramApi;
pub use source::{AssetStream, ByteStream, ContentSource};

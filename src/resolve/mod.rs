//! Content resolution.
//!
//! Provides:
//! - The per-kind metadata resolver
//! - An optional short-lived descriptor cache

pub mod cache;
pub mod resolver;

pub use cache::MetadataCache;
pub use resolver::{describe, truncate_description, Resolver};

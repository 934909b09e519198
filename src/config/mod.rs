//! Configuration module.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Configuration validation

pub mod loader;
pub mod validation;

pub use loader::{CacheConfig, Config, OutputConfig, ServerConfig, UpstreamConfig};
pub use validation::validate_config;

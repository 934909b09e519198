//! Content model module.
//!
//! This module provides:
//! - URL classification into typed content references
//! - Content descriptors and download option keys

pub mod classifier;
pub mod descriptor;
pub mod reference;

pub use classifier::classify;
pub use descriptor::{ContentDescriptor, DownloadOption, DownloadOptions, OptionKey};
pub use reference::{ContentKind, ContentReference, UNKNOWN_OWNER};

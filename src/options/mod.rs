//! Download option derivation from resolved metadata.

pub mod builder;

pub use builder::build_options;

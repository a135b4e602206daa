//! Crawl and mirror configuration.

mod builder;
mod getters;
mod types;

pub use builder::{MirrorConfigBuilder, WithTargetDir};
pub use types::MirrorConfig;

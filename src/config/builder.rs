//! Type-safe builder for `MirrorConfig`.
//!
//! A typestate builder: `build()` is only available once the target
//! directory has been provided, so an unconfigured mirror root is a
//! compile error rather than a runtime one.

use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::MirrorConfig;

/// Marker for a builder whose target directory is set.
pub struct WithTargetDir;

pub struct MirrorConfigBuilder<State = ()> {
    pub(crate) config: MirrorConfig,
    pub(crate) _phantom: PhantomData<State>,
}

impl MirrorConfig {
    /// Create a builder with a fluent interface.
    #[must_use]
    pub fn builder() -> MirrorConfigBuilder<()> {
        MirrorConfigBuilder {
            config: MirrorConfig::default(),
            _phantom: PhantomData,
        }
    }
}

impl MirrorConfigBuilder<()> {
    /// Set the mirror root. Required before `build()`.
    pub fn target_dir(self, dir: impl Into<PathBuf>) -> MirrorConfigBuilder<WithTargetDir> {
        let mut config = self.config;
        config.target_dir = dir.into();
        MirrorConfigBuilder {
            config,
            _phantom: PhantomData,
        }
    }
}

impl MirrorConfigBuilder<WithTargetDir> {
    #[must_use]
    pub fn build(self) -> MirrorConfig {
        self.config
    }
}

impl<State> MirrorConfigBuilder<State> {
    #[must_use]
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.config.follow_links = follow;
        self
    }

    #[must_use]
    pub fn rewrite_links(mut self, rewrite: bool) -> Self {
        self.config.rewrite_links = rewrite;
        self
    }

    #[must_use]
    pub fn within_site(mut self, within: bool) -> Self {
        self.config.within_site = within;
        self
    }

    #[must_use]
    pub fn below_document(mut self, below: bool) -> Self {
        self.config.below_document = below;
        self
    }

    #[must_use]
    pub fn scan_only(mut self, scan_only: bool) -> Self {
        self.config.scan_only = scan_only;
        self
    }

    #[must_use]
    pub fn max_fetches(mut self, limit: Option<usize>) -> Self {
        self.config.max_fetches = limit;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, depth: Option<u32>) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Deny content types by prefix, e.g. `image/`.
    #[must_use]
    pub fn denied_mime_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.config.denied_mime_prefixes = prefixes;
        self
    }

    /// Deny file extensions, with or without the leading dot.
    #[must_use]
    pub fn denied_extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.denied_extensions = extensions;
        self
    }

    #[must_use]
    pub fn depth_first(mut self, depth_first: bool) -> Self {
        self.config.depth_first = depth_first;
        self
    }

    #[must_use]
    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn read_timeout_secs(mut self, secs: u64) -> Self {
        self.config.read_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn max_redirect_hops(mut self, hops: usize) -> Self {
        self.config.max_redirect_hops = hops;
        self
    }

    #[must_use]
    pub fn connection_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.connection_cache_capacity = capacity;
        self
    }

    #[must_use]
    pub fn visited_capacity(mut self, capacity: usize) -> Self {
        self.config.visited_capacity = capacity;
        self
    }

    #[must_use]
    pub fn crawl_delay_ms(mut self, delay: Option<u64>) -> Self {
        self.config.crawl_delay_ms = delay;
        self
    }
}

//! Read accessors for `MirrorConfig`.

use std::path::Path;

use super::types::MirrorConfig;

impl MirrorConfig {
    #[must_use]
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    #[must_use]
    pub fn follow_links(&self) -> bool {
        self.follow_links
    }

    #[must_use]
    pub fn rewrite_links(&self) -> bool {
        self.rewrite_links
    }

    #[must_use]
    pub fn within_site(&self) -> bool {
        self.within_site
    }

    #[must_use]
    pub fn below_document(&self) -> bool {
        self.below_document
    }

    #[must_use]
    pub fn scan_only(&self) -> bool {
        self.scan_only
    }

    #[must_use]
    pub fn max_fetches(&self) -> Option<usize> {
        self.max_fetches
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<u32> {
        self.max_depth
    }

    #[must_use]
    pub fn denied_mime_prefixes(&self) -> &[String] {
        &self.denied_mime_prefixes
    }

    #[must_use]
    pub fn denied_extensions(&self) -> &[String] {
        &self.denied_extensions
    }

    #[must_use]
    pub fn depth_first(&self) -> bool {
        self.depth_first
    }

    #[must_use]
    pub fn connect_timeout_secs(&self) -> u64 {
        self.connect_timeout_secs
    }

    #[must_use]
    pub fn read_timeout_secs(&self) -> u64 {
        self.read_timeout_secs
    }

    #[must_use]
    pub fn max_redirect_hops(&self) -> usize {
        self.max_redirect_hops
    }

    #[must_use]
    pub fn connection_cache_capacity(&self) -> usize {
        self.connection_cache_capacity
    }

    #[must_use]
    pub fn visited_capacity(&self) -> usize {
        self.visited_capacity
    }

    #[must_use]
    pub fn crawl_delay_ms(&self) -> Option<u64> {
        self.crawl_delay_ms
    }
}

//! Core configuration types for crawling and mirroring.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_CONNECTION_CACHE_CAPACITY, DEFAULT_MAX_REDIRECT_HOPS,
    DEFAULT_READ_TIMEOUT_SECS, DEFAULT_VISITED_CAPACITY,
};

/// Configuration for a crawl/mirror run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Root directory of the mirror tree.
    pub(crate) target_dir: PathBuf,

    /// Follow hyperlinks to further HTML pages. When false, discovered
    /// HTML targets are rejected outright; non-HTML resources are still
    /// fetched.
    pub(crate) follow_links: bool,

    /// Rewrite recognized URLs in mirrored HTML to relative paths.
    pub(crate) rewrite_links: bool,

    /// Restrict discovery to the seed's hostname.
    pub(crate) within_site: bool,

    /// Restrict discovery to paths below the originating document.
    pub(crate) below_document: bool,

    /// Scan and discover without writing anything to disk.
    pub(crate) scan_only: bool,

    /// Cap on total fetched items. `None` means unbounded.
    pub(crate) max_fetches: Option<usize>,

    /// Maximum link depth from a seed. `None` means unbounded.
    pub(crate) max_depth: Option<u32>,

    /// Denied content-type prefixes, e.g. `image/` or `application/zip`.
    pub(crate) denied_mime_prefixes: Vec<String>,

    /// Denied file extensions, e.g. `zip` or `.zip`.
    pub(crate) denied_extensions: Vec<String>,

    /// Depth-first traversal: discovered links go to the head of the
    /// queue instead of the tail.
    pub(crate) depth_first: bool,

    /// Connect timeout in seconds. Bounds how long one unresponsive
    /// server can stall the crawl.
    pub(crate) connect_timeout_secs: u64,

    /// Per-request read timeout in seconds.
    pub(crate) read_timeout_secs: u64,

    /// Maximum redirect hops followed for one URL.
    pub(crate) max_redirect_hops: usize,

    /// Connection cache capacity. Each entry may hold an open socket.
    pub(crate) connection_cache_capacity: usize,

    /// Visited-set window size.
    pub(crate) visited_capacity: usize,

    /// Optional fixed delay between fetches, in milliseconds.
    pub(crate) crawl_delay_ms: Option<u64>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from("./mirror"),
            follow_links: true,
            rewrite_links: true,
            within_site: true,
            below_document: false,
            scan_only: false,
            max_fetches: None,
            max_depth: None,
            denied_mime_prefixes: Vec::new(),
            denied_extensions: Vec::new(),
            depth_first: false,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            max_redirect_hops: DEFAULT_MAX_REDIRECT_HOPS,
            connection_cache_capacity: DEFAULT_CONNECTION_CACHE_CAPACITY,
            visited_capacity: DEFAULT_VISITED_CAPACITY,
            crawl_delay_ms: None,
        }
    }
}

impl MirrorConfig {
    /// Whether an extension (without dot, lowercased comparison) is on
    /// the denylist.
    #[must_use]
    pub fn extension_denied(&self, extension: &str) -> bool {
        self.denied_extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }

    /// Whether a content type matches a denied MIME prefix.
    #[must_use]
    pub fn mime_denied(&self, content_type: &str) -> bool {
        self.denied_mime_prefixes
            .iter()
            .any(|p| content_type.starts_with(p.as_str()))
    }
}

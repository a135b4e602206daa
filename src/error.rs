//! Error types for crawl and mirror operations.
//!
//! Per-item errors are logged and dropped by the frontier; only setup
//! failures (unusable target directory, malformed seed) abort the process.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mirror operations.
pub type MirrorResult<T> = Result<T, MirrorError>;

/// Error taxonomy for the crawler core.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// A seed or discovered link could not be parsed as an absolute URL.
    #[error("malformed URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    /// DNS or I/O failure while opening a URL.
    #[error("failed to open {url}: {reason}")]
    Connection { url: String, reason: String },

    /// A redirect chain exceeded the configured hop cap.
    #[error("redirect chain from {url} exceeded {hops} hops")]
    TooManyRedirects { url: String, hops: usize },

    /// Filesystem failure while persisting a fetched resource.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MirrorError {
    /// Whether this error counts against the process exit code.
    ///
    /// Write failures aggregate into exit code 4; everything else is
    /// reported per item and dropped.
    #[must_use]
    pub fn is_write_failure(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

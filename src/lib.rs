//! Streaming HTML link scanner/rewriter and site-mirroring crawler.
//!
//! The scanner is a single-pass, byte-level recognizer for every HTML
//! construct carrying a URL or title; the rewriting layer substitutes
//! replacement text in place inside a resizable look-ahead buffer; the
//! frontier drives policy-gated recursive discovery over a synchronous,
//! pull-based pipeline; and the mirror writer persists the resulting
//! byte streams to a local tree.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod frontier;
pub mod mirror;
pub mod rewrite;
pub mod scanner;
pub mod utils;

pub use cache::GenerationalCache;
pub use config::MirrorConfig;
pub use error::{MirrorError, MirrorResult};
pub use fetch::{Fetcher, PreparedConnection};
pub use frontier::{CrawlItem, CrawlStats, FetchedItem, Frontier};
pub use mirror::{MirrorWriter, WriteOutcome};
pub use rewrite::{LookAheadBuffer, RewritingScanner};
pub use scanner::{ScannedToken, TokenEditor, TokenKind, TokenScanner, TokenSink};

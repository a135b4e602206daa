//! Shared configuration constants.
//!
//! Default values used throughout the crate to keep behavior consistent
//! and avoid magic numbers.

/// Default connect timeout in seconds.
///
/// Without a timeout one unresponsive server stalls the entire crawl.
/// Thirty seconds is generous for slow hosts while still bounding the
/// damage.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default read timeout in seconds, applied to the whole request.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Maximum redirect hops followed for a single URL.
///
/// Redirect loops are not detectable in general since each hop may be a
/// new URL, so a fixed cap is the guard.
pub const DEFAULT_MAX_REDIRECT_HOPS: usize = 10;

/// Connection cache capacity.
///
/// Each cached entry may hold an open socket, so the bound tracks OS
/// file-handle limits rather than memory.
pub const DEFAULT_CONNECTION_CACHE_CAPACITY: usize = 60;

/// Visited-set window size.
///
/// A URL is fetched at most once while resident in this window. Very long
/// crawls may refetch a URL after it ages out, which is the accepted cost
/// of bounded memory.
pub const DEFAULT_VISITED_CAPACITY: usize = 2048;

/// Chunk size for streamed copies to disk.
pub const COPY_CHUNK_BYTES: usize = 4096;

/// User agent sent on every request.
pub const USER_AGENT: &str = concat!("sitemirror/", env!("CARGO_PKG_VERSION"));

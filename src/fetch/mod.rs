//! Blocking HTTP fetch layer.
//!
//! Opens URLs with explicit redirect handling and timeouts, and memoizes
//! connections and directory-test results in small generational caches so
//! a long crawl cannot exhaust OS socket limits or hit the same URL twice
//! while deciding what it is.

use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::{Client, Response};
use url::Url;

use crate::cache::GenerationalCache;
use crate::config::MirrorConfig;
use crate::error::{MirrorError, MirrorResult};
use crate::utils::constants::USER_AGENT;
use crate::utils::{guess_content_type, has_known_file_extension};

/// An opened connection with its response metadata extracted.
///
/// The body is an unconsumed stream; reading it is the caller's business.
#[derive(Debug)]
pub struct PreparedConnection {
    /// Final URL after redirects.
    pub url: Url,
    /// Raw `Content-Type` header, if any.
    pub content_type: Option<String>,
    /// `Content-Length` if the server declared one.
    pub content_length: Option<u64>,
    /// The response body stream.
    pub body: Response,
}

impl PreparedConnection {
    /// Whether the response declares an HTML body.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("text/html"))
    }
}

enum CacheEntry {
    /// A connection opened by the directory probe, parked for the fetch.
    Ready(Box<PreparedConnection>),
    /// A remembered failure, replayed without re-connecting.
    Failed(String),
}

/// HTTP fetcher with bounded connection and directory-test caches.
pub struct Fetcher {
    client: Client,
    connections: GenerationalCache<String, CacheEntry>,
    dir_cache: GenerationalCache<String, bool>,
    max_hops: usize,
}

impl Fetcher {
    pub fn new(config: &MirrorConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs()))
            .timeout(Duration::from_secs(config.read_timeout_secs()))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            connections: GenerationalCache::new(config.connection_cache_capacity()),
            dir_cache: GenerationalCache::new(config.connection_cache_capacity()),
            max_hops: config.max_redirect_hops(),
        })
    }

    /// Open a URL, reusing a connection parked by an earlier directory
    /// probe and replaying remembered failures.
    pub fn open(&mut self, url: &Url) -> MirrorResult<PreparedConnection> {
        let key = url.as_str().to_string();
        match self.connections.remove(&key) {
            Some(CacheEntry::Ready(conn)) => return Ok(*conn),
            Some(CacheEntry::Failed(reason)) => {
                // Keep the failure resident for further references.
                self.connections
                    .insert(key.clone(), CacheEntry::Failed(reason.clone()));
                return Err(MirrorError::Connection { url: key, reason });
            }
            None => {}
        }
        match self.connect(url) {
            Ok(conn) => Ok(conn),
            Err(err) => {
                self.connections
                    .insert(key, CacheEntry::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Walk redirects by hand, capped at the configured hop count.
    fn connect(&self, url: &Url) -> MirrorResult<PreparedConnection> {
        let mut current = url.clone();
        for _hop in 0..=self.max_hops {
            let response = self
                .client
                .get(current.clone())
                .send()
                .map_err(|e| MirrorError::Connection {
                    url: current.to_string(),
                    reason: e.to_string(),
                })?;
            let status = response.status();
            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| MirrorError::Connection {
                        url: current.to_string(),
                        reason: format!("HTTP {status} without a Location header"),
                    })?;
                let next = current
                    .join(location)
                    .map_err(|e| MirrorError::MalformedUrl {
                        url: location.to_string(),
                        reason: e.to_string(),
                    })?;
                log::debug!(target: "sitemirror::fetch", "redirect {current} -> {next}");
                current = next;
                continue;
            }
            if !status.is_success() {
                return Err(MirrorError::Connection {
                    url: current.to_string(),
                    reason: format!("HTTP {status}"),
                });
            }
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let content_length = response.content_length();
            return Ok(PreparedConnection {
                url: current,
                content_type,
                content_length,
                body: response,
            });
        }
        Err(MirrorError::TooManyRedirects {
            url: url.to_string(),
            hops: self.max_hops,
        })
    }

    /// Whether the URL names something directory-like.
    ///
    /// Cheap shape rules first (a trailing slash is a directory, a known
    /// file extension is not); otherwise this opens a live connection and
    /// treats a missing `Content-Length` as directory-like. A probed
    /// connection is parked in the connection cache so the subsequent
    /// fetch of the same URL does not connect twice. Results are cached
    /// either way.
    pub fn probe_directory(&mut self, url: &Url) -> bool {
        let key = url.as_str().to_string();
        if let Some(&cached) = self.dir_cache.get(&key) {
            return cached;
        }
        let path = url.path();
        let is_dir = if path.is_empty() || path.ends_with('/') {
            true
        } else if has_known_file_extension(url) {
            false
        } else {
            log::debug!(target: "sitemirror::fetch", "directory probe opens {url}");
            match self.connect(url) {
                Ok(conn) => {
                    let is_dir = conn.content_length.is_none();
                    self.connections
                        .insert(key.clone(), CacheEntry::Ready(Box::new(conn)));
                    is_dir
                }
                Err(err) => {
                    self.connections
                        .insert(key.clone(), CacheEntry::Failed(err.to_string()));
                    false
                }
            }
        };
        self.dir_cache.insert(key, is_dir);
        is_dir
    }

    /// Guess whether a URL will serve HTML.
    ///
    /// Known extensions answer without network traffic. Extension-less
    /// candidates fall back to the directory heuristic, since a
    /// directory serves an HTML index; that may open a live connection,
    /// which is parked for the eventual fetch.
    pub fn looks_like_html(&mut self, url: &Url) -> bool {
        match guess_content_type(url) {
            Some(ct) => ct.starts_with("text/html"),
            None => self.probe_directory(url),
        }
    }
}

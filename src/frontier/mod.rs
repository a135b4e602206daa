//! The crawl frontier.
//!
//! A lazy, finite, non-restartable sequence of fetched items. The caller
//! drives the whole pipeline by iterating: each step pops the next
//! unvisited candidate, opens its connection through the cache, and for
//! HTML bodies attaches a rewriting scanner whose editor feeds newly
//! discovered links back into the queue.

mod editor;
mod item;
mod policy;

pub use item::{CrawlItem, site_base_of};

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read};
use std::rc::Rc;
use std::time::Duration;

use url::Url;

use crate::cache::GenerationalCache;
use crate::config::MirrorConfig;
use crate::error::{MirrorError, MirrorResult};
use crate::fetch::Fetcher;
use crate::rewrite::RewritingScanner;
use crate::utils::normalize_url;
use editor::{PageEditor, SharedTitle};

/// A successfully opened item, yielded by frontier iteration.
///
/// Reading the body drives scanning, link discovery, and rewriting for
/// HTML; raw resources pass through untouched. Consume the body fully
/// before advancing the frontier, or the page's links go undiscovered.
pub struct FetchedItem {
    pub item: CrawlItem,
    pub content_type: Option<String>,
    body: Body,
    title: SharedTitle,
}

enum Body {
    Html(RewritingScanner<reqwest::blocking::Response, PageEditor>),
    Raw(reqwest::blocking::Response),
}

impl FetchedItem {
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.item.url
    }

    #[must_use]
    pub fn is_html(&self) -> bool {
        matches!(self.body, Body::Html(_))
    }

    /// Page title (or first-heading fallback) seen while the body was
    /// streamed. Empty until the `<title>` bytes have been read.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.title.borrow().clone()
    }
}

impl Read for FetchedItem {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.body {
            Body::Html(scanner) => scanner.read(buf),
            Body::Raw(body) => body.read(buf),
        }
    }
}

/// Counters aggregated over a crawl, for the end-of-run summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlStats {
    /// Items whose connection was opened.
    pub fetched: usize,
    /// Links that failed to parse or connect.
    pub broken_links: usize,
}

/// The crawl frontier: discovery queue, visited window, and the fetch
/// pipeline, driven by [`Iterator`].
pub struct Frontier {
    config: MirrorConfig,
    fetcher: Rc<RefCell<Fetcher>>,
    queue: VecDeque<CrawlItem>,
    visited: GenerationalCache<String, ()>,
    /// Links queued by page editors while a body is streamed, drained
    /// into the queue on the next iteration step.
    discovered: Rc<RefCell<Vec<CrawlItem>>>,
    broken: Rc<RefCell<usize>>,
    fetched: usize,
}

impl Frontier {
    pub fn new(config: MirrorConfig) -> anyhow::Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        let visited = GenerationalCache::new(config.visited_capacity());
        Ok(Self {
            config,
            fetcher: Rc::new(RefCell::new(fetcher)),
            queue: VecDeque::new(),
            visited,
            discovered: Rc::new(RefCell::new(Vec::new())),
            broken: Rc::new(RefCell::new(0)),
            fetched: 0,
        })
    }

    /// Seed the frontier with an absolute URL at depth zero.
    pub fn add_url(&mut self, seed: &str) -> MirrorResult<()> {
        let url = Url::parse(seed).map_err(|e| MirrorError::MalformedUrl {
            url: seed.to_string(),
            reason: e.to_string(),
        })?;
        if !crate::utils::is_crawlable_url(url.as_str()) {
            return Err(MirrorError::MalformedUrl {
                url: seed.to_string(),
                reason: "not an http or https URL".to_string(),
            });
        }
        log::debug!(target: "sitemirror::frontier", "seed {url}");
        self.queue.push_back(CrawlItem::seed(url));
        Ok(())
    }

    /// Counters for the end-of-run summary.
    #[must_use]
    pub fn stats(&self) -> CrawlStats {
        CrawlStats {
            fetched: self.fetched,
            broken_links: *self.broken.borrow(),
        }
    }

    /// Move links discovered during the previous item's streaming into
    /// the queue, honoring the traversal order.
    fn drain_discoveries(&mut self) {
        let mut found = self.discovered.borrow_mut();
        if found.is_empty() {
            return;
        }
        log::debug!(
            target: "sitemirror::frontier",
            "{} links discovered",
            found.len()
        );
        if self.config.depth_first() {
            for item in found.drain(..) {
                self.queue.push_front(item);
            }
        } else {
            self.queue.extend(found.drain(..));
        }
    }

    fn report_broken(&self, item: &CrawlItem, err: &MirrorError) {
        let referrer = item
            .referrer
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        log::warn!(
            target: "sitemirror::frontier",
            "broken link {} (referrer {referrer}): {err}",
            item.url
        );
        *self.broken.borrow_mut() += 1;
    }

    /// Open the next unvisited candidate, skipping failures.
    fn next_item(&mut self) -> Option<FetchedItem> {
        self.drain_discoveries();
        loop {
            if let Some(limit) = self.config.max_fetches()
                && self.fetched >= limit
            {
                log::debug!(target: "sitemirror::frontier", "fetch cap of {limit} reached");
                return None;
            }
            let mut item = self.queue.pop_front()?;

            let key = normalize_url(&item.url);
            if self.visited.contains(&key) {
                continue;
            }
            self.visited.insert(key, ());

            if let Some(delay) = self.config.crawl_delay_ms()
                && self.fetched > 0
            {
                std::thread::sleep(Duration::from_millis(delay));
            }

            let conn = match self.fetcher.borrow_mut().open(&item.url) {
                Ok(conn) => conn,
                Err(err) => {
                    self.report_broken(&item, &err);
                    continue;
                }
            };
            self.fetched += 1;

            // The denylist already saw the guessed type; the server's
            // actual answer is checked once it is known.
            if let Some(ct) = &conn.content_type
                && self.config.mime_denied(ct)
            {
                log::debug!(
                    target: "sitemirror::frontier",
                    "skipping {} with denied content type {ct}",
                    item.url
                );
                continue;
            }

            // Redirects may have moved the item; the final URL is what
            // gets mirrored, and it counts as visited too.
            if conn.url != item.url {
                self.visited.insert(normalize_url(&conn.url), ());
                item.url = conn.url.clone();
            }

            let title: SharedTitle = Rc::new(RefCell::new(None));
            let body = if conn.is_html() {
                let page_url = conn.url.clone();
                // Directory-likeness of the page itself, for
                // relativization: shape rules first, then the missing
                // Content-Length signal from the live connection.
                let page_is_dir = if page_url.path().ends_with('/') {
                    true
                } else if crate::utils::has_known_file_extension(&page_url) {
                    false
                } else {
                    conn.content_length.is_none()
                };
                let editor = PageEditor::new(
                    self.config.clone(),
                    Rc::clone(&self.fetcher),
                    Rc::clone(&self.discovered),
                    page_url.clone(),
                    page_is_dir,
                    item.depth,
                    item.site_base.clone(),
                    Rc::clone(&title),
                    Rc::clone(&self.broken),
                );
                Body::Html(RewritingScanner::new(conn.body, page_url, editor))
            } else {
                Body::Raw(conn.body)
            };

            return Some(FetchedItem {
                content_type: conn.content_type,
                item,
                body,
                title,
            });
        }
    }
}

impl Iterator for Frontier {
    type Item = FetchedItem;

    fn next(&mut self) -> Option<FetchedItem> {
        self.next_item()
    }
}

//! The frontier's editing observer.
//!
//! One editor is attached per HTML page being streamed. For every
//! recognized token it resolves the literal against the page context,
//! runs the inclusion policy, queues approved links for the frontier to
//! drain, and when rewriting is enabled returns the relativized
//! replacement that the rewriting scanner splices into the output.

use std::cell::RefCell;
use std::rc::Rc;

use url::Url;

use super::item::CrawlItem;
use super::policy;
use crate::config::MirrorConfig;
use crate::fetch::Fetcher;
use crate::scanner::{ScannedToken, TokenEditor, TokenKind};
use crate::utils::{fragment_of, is_crawlable_url, relative_url_above};

/// Title slot shared between an editor and the fetched item it belongs
/// to, filled in while the body is streamed.
pub(crate) type SharedTitle = Rc<RefCell<Option<String>>>;

pub(crate) struct PageEditor {
    config: MirrorConfig,
    fetcher: Rc<RefCell<Fetcher>>,
    discovered: Rc<RefCell<Vec<CrawlItem>>>,
    /// Final URL of the page being rewritten; links are made relative to
    /// this so they resolve from the mirrored file's location.
    page_url: Url,
    page_is_dir: bool,
    depth: u32,
    site_base: Url,
    title: SharedTitle,
    broken: Rc<RefCell<usize>>,
}

impl PageEditor {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: MirrorConfig,
        fetcher: Rc<RefCell<Fetcher>>,
        discovered: Rc<RefCell<Vec<CrawlItem>>>,
        page_url: Url,
        page_is_dir: bool,
        depth: u32,
        site_base: Url,
        title: SharedTitle,
        broken: Rc<RefCell<usize>>,
    ) -> Self {
        Self {
            config,
            fetcher,
            discovered,
            page_url,
            page_is_dir,
            depth,
            site_base,
            title,
            broken,
        }
    }

    fn record_title(&self, kind: TokenKind, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let mut slot = self.title.borrow_mut();
        // The heading is only a fallback for pages without a <title>.
        if kind == TokenKind::Title || slot.is_none() {
            *slot = Some(text.to_string());
        }
    }
}

impl TokenEditor for PageEditor {
    fn edit(&mut self, token: &ScannedToken<'_>) -> Option<String> {
        if token.kind.is_text() {
            self.record_title(token.kind, token.literal);
            return None;
        }

        let literal = token.literal.trim();
        if literal.is_empty() || literal.starts_with('#') {
            // Fragment-only links navigate within the page.
            return None;
        }

        let resolved = match token.base.join(literal) {
            Ok(u) => u,
            Err(e) => {
                log::warn!(
                    target: "sitemirror::frontier",
                    "broken link '{literal}' on {}: {e}",
                    self.page_url
                );
                *self.broken.borrow_mut() += 1;
                return None;
            }
        };
        if !is_crawlable_url(resolved.as_str()) {
            return None;
        }

        let mut candidate = resolved;
        candidate.set_fragment(None);

        let approved = policy::approve(
            &candidate,
            self.depth,
            &self.site_base,
            &self.config,
            &mut self.fetcher.borrow_mut(),
        );
        if !approved {
            return None;
        }

        // A <base href> shapes resolution but is not itself a page to
        // fetch; duplicates are dropped at pop time against the visited
        // window.
        if token.kind != TokenKind::BaseHref {
            self.discovered.borrow_mut().push(CrawlItem::discovered(
                candidate.clone(),
                self.page_url.clone(),
                self.depth,
                self.site_base.clone(),
            ));
        }

        if !self.config.rewrite_links() {
            return None;
        }
        let mut relative = relative_url_above(&candidate, &self.page_url, self.page_is_dir);
        if let Some(fragment) = fragment_of(literal) {
            relative.push_str(fragment);
        }
        Some(relative)
    }
}

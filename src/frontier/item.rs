//! Crawl queue items.

use url::Url;

/// One discovered URL awaiting (or undergoing) processing.
///
/// Owned exclusively by the frontier while pending; ownership transfers
/// to the caller once the item is yielded from iteration.
#[derive(Debug, Clone)]
pub struct CrawlItem {
    /// Absolute URL to fetch. Updated to the final URL once redirects
    /// have been followed.
    pub url: Url,
    /// The page this URL was discovered on, `None` for seeds.
    pub referrer: Option<Url>,
    /// Link distance from the seed.
    pub depth: u32,
    /// Scope anchor for the inclusion policy, inherited from the seed.
    pub site_base: Url,
}

impl CrawlItem {
    /// Build a depth-zero item from a seed URL.
    #[must_use]
    pub fn seed(url: Url) -> Self {
        let site_base = site_base_of(&url);
        Self {
            url,
            referrer: None,
            depth: 0,
            site_base,
        }
    }

    /// Build an item for a link discovered on a page.
    #[must_use]
    pub fn discovered(url: Url, referrer: Url, referrer_depth: u32, site_base: Url) -> Self {
        Self {
            url,
            referrer: Some(referrer),
            depth: referrer_depth + 1,
            site_base,
        }
    }
}

/// The site base of a URL: scheme and host kept, path truncated to its
/// containing directory, query and fragment dropped.
#[must_use]
pub fn site_base_of(url: &Url) -> Url {
    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);
    let path = base.path();
    let dir = match path.rfind('/') {
        Some(i) => path[..=i].to_string(),
        None => "/".to_string(),
    };
    base.set_path(&dir);
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_base_truncates_to_directory() {
        let base = site_base_of(&Url::parse("http://h/a/b/page.html?q=1#f").unwrap());
        assert_eq!(base.as_str(), "http://h/a/b/");
    }

    #[test]
    fn site_base_of_directory_url_is_itself() {
        let base = site_base_of(&Url::parse("http://h/a/").unwrap());
        assert_eq!(base.as_str(), "http://h/a/");
    }

    #[test]
    fn seed_starts_at_depth_zero() {
        let item = CrawlItem::seed(Url::parse("http://h/docs/index.html").unwrap());
        assert_eq!(item.depth, 0);
        assert!(item.referrer.is_none());
        assert_eq!(item.site_base.path(), "/docs/");
    }
}

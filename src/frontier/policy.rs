//! Link inclusion policy.
//!
//! Evaluated for every discovered link before it may join the frontier.
//! Rules apply in a fixed priority order; the first failing rule rejects.

use url::Url;

use crate::config::MirrorConfig;
use crate::fetch::Fetcher;
use crate::utils::{extension_of, guess_content_type};

/// Decide whether a discovered link may be enqueued.
///
/// Order: (1) depth cap, (2) below-document scope, (3) within-site scope,
/// (4) HTML rejection when links are not followed, (5) extension and
/// MIME denylists. Rule 4 may consult the fetcher's directory heuristic
/// for extension-less candidates, which can open a live connection; the
/// opened connection is parked for the eventual fetch.
pub(crate) fn approve(
    candidate: &Url,
    referrer_depth: u32,
    site_base: &Url,
    config: &MirrorConfig,
    fetcher: &mut Fetcher,
) -> bool {
    if let Some(max) = config.max_depth()
        && referrer_depth + 1 > max
    {
        return false;
    }

    if config.below_document()
        && (candidate.host_str() != site_base.host_str()
            || !candidate.path().starts_with(site_base.path()))
    {
        return false;
    }

    if config.within_site() && candidate.host_str() != site_base.host_str() {
        return false;
    }

    if !config.follow_links() && fetcher.looks_like_html(candidate) {
        return false;
    }

    if let Some(ext) = extension_of(candidate)
        && config.extension_denied(&ext)
    {
        return false;
    }
    if let Some(ct) = guess_content_type(candidate)
        && config.mime_denied(ct)
    {
        return false;
    }

    true
}

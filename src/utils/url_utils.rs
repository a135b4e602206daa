//! URL and path manipulation utilities.
//!
//! Helpers for URL normalization, mirror-tree path mapping, and the
//! relativization algorithm used when rewriting links for an offline
//! mirror.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use std::collections::HashMap;
use url::Url;

/// Extensions with a well-known content type.
///
/// Used both to guess a MIME type for policy checks before any network
/// traffic and as the cheap first stage of the is-directory heuristic
/// (a known file extension is never a directory).
static EXTENSION_MIME: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("html", "text/html"),
        ("htm", "text/html"),
        ("shtml", "text/html"),
        ("txt", "text/plain"),
        ("css", "text/css"),
        ("js", "application/javascript"),
        ("xml", "text/xml"),
        ("gif", "image/gif"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("png", "image/png"),
        ("ico", "image/x-icon"),
        ("svg", "image/svg+xml"),
        ("pdf", "application/pdf"),
        ("zip", "application/zip"),
        ("gz", "application/gzip"),
        ("tar", "application/x-tar"),
        ("jar", "application/java-archive"),
        ("class", "application/java-vm"),
        ("mp3", "audio/mpeg"),
        ("wav", "audio/wav"),
        ("mp4", "video/mp4"),
        ("avi", "video/x-msvideo"),
    ])
});

/// Check whether a URL is something the crawler can fetch.
///
/// Skips data URLs, javascript URLs, mail and phone links, and anything
/// that is not plain http or https.
#[must_use]
pub fn is_crawlable_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    if url.starts_with("data:")
        || url.starts_with("javascript:")
        || url.starts_with("mailto:")
        || url.starts_with("tel:")
    {
        return false;
    }
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Normalize a URL by stripping its fragment anchor.
///
/// Fragments are client-side navigation markers, not distinct HTTP
/// resources; removing them is what makes visited-set deduplication work.
#[must_use]
pub fn normalize_url(url: &Url) -> String {
    let mut stripped = url.clone();
    stripped.set_fragment(None);
    stripped.to_string()
}

/// The `#fragment` suffix of a literal link spelling, if any.
///
/// URL normalization drops fragments, so rewritten links recover the
/// fragment from the literal token text and reattach it verbatim.
#[must_use]
pub fn fragment_of(literal: &str) -> Option<&str> {
    literal.find('#').map(|i| &literal[i..])
}

/// Lowercased extension of the last path segment, if any.
#[must_use]
pub fn extension_of(url: &Url) -> Option<String> {
    let path = url.path();
    let last = path.rsplit('/').next().unwrap_or("");
    let dot = last.rfind('.')?;
    if dot + 1 == last.len() {
        return None;
    }
    Some(last[dot + 1..].to_ascii_lowercase())
}

/// Guess a content type from the URL's extension, without any network
/// traffic. Returns `None` for unknown extensions and extension-less
/// paths.
#[must_use]
pub fn guess_content_type(url: &Url) -> Option<&'static str> {
    let ext = extension_of(url)?;
    EXTENSION_MIME.get(ext.as_str()).copied()
}

/// Whether the extension alone proves the URL names a file.
#[must_use]
pub fn has_known_file_extension(url: &Url) -> bool {
    guess_content_type(url).is_some()
}

/// Directory name for a host in the mirror tree.
///
/// Non-default ports are folded into the name so two servers on the same
/// host cannot collide.
#[must_use]
pub fn host_dir_name(url: &Url) -> String {
    let host = url.host_str().unwrap_or("unknown-host");
    match url.port() {
        Some(port) => format!("{host}_{port}"),
        None => host.to_string(),
    }
}

/// Map a URL to its path in the mirror tree, preserving the host and path
/// structure: `<root>/<host>/<url-path>`.
///
/// Percent-escapes are decoded and each segment is sanitized for the
/// filesystem. A trailing slash is dropped, so a directory-like URL maps
/// to a plain file named after its last segment; the collision logic in
/// the mirror writer relocates it if a child arrives later. An empty path
/// maps to `index.html` under the host directory.
#[must_use]
pub fn mirror_path_for(url: &Url, root: &Path) -> PathBuf {
    let mut path = root.join(sanitize_filename::sanitize(host_dir_name(url)));
    let mut any = false;
    for segment in url.path().split('/') {
        if segment.is_empty() {
            continue;
        }
        let decoded = urlencoding::decode(segment)
            .map(|c| c.into_owned())
            .unwrap_or_else(|_| segment.to_string());
        let clean = sanitize_filename::sanitize(decoded);
        if clean.is_empty() {
            continue;
        }
        path.push(clean);
        any = true;
    }
    if !any {
        path.push("index.html");
    }
    path
}

/// Rewrite an absolute target URL as a path relative to `base`.
///
/// Both paths are taken without their leading separator. If the base is
/// not itself directory-like its last segment is truncated first. The
/// base path is then reduced one trailing segment at a time, prepending
/// `../` per step, until the target path starts with it; the remaining
/// target suffix is appended. A cross-host target climbs one extra level
/// and re-enters through the target's host directory, matching the mirror
/// tree layout.
///
/// Fragments are not handled here; callers reattach them from the literal
/// spelling via [`fragment_of`].
#[must_use]
pub fn relative_url_above(target: &Url, base: &Url, base_is_dir: bool) -> String {
    let target_path = target.path().trim_start_matches('/');
    let mut base_path = base.path().trim_start_matches('/').to_string();

    if !base_is_dir {
        base_path = match base_path.rfind('/') {
            Some(i) => base_path[..=i].to_string(),
            None => String::new(),
        };
    }

    let same_host = target.host_str() == base.host_str() && target.port() == base.port();

    let mut prefix = String::new();
    if same_host {
        // base_path is empty or ends with '/', so starts_with cannot match
        // across a segment boundary.
        while !base_path.is_empty() && !target_path.starts_with(&base_path) {
            strip_last_segment(&mut base_path);
            prefix.push_str("../");
        }
        format!("{prefix}{}", &target_path[base_path.len()..])
    } else {
        while !base_path.is_empty() {
            strip_last_segment(&mut base_path);
            prefix.push_str("../");
        }
        // One more level to climb out of the base host's directory.
        prefix.push_str("../");
        format!("{prefix}{}/{target_path}", host_dir_name(target))
    }
}

/// Remove the trailing segment of a path that is empty or ends with '/'.
fn strip_last_segment(path: &mut String) {
    path.pop();
    match path.rfind('/') {
        Some(i) => path.truncate(i + 1),
        None => path.clear(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn relative_below_base() {
        let rel = relative_url_above(&url("http://h/a/b/c.html"), &url("http://h/a/"), true);
        assert_eq!(rel, "b/c.html");
    }

    #[test]
    fn relative_sibling_branch() {
        let rel = relative_url_above(&url("http://h/x/y.html"), &url("http://h/a/"), true);
        assert_eq!(rel, "../x/y.html");
    }

    #[test]
    fn relative_cross_host() {
        let rel = relative_url_above(&url("http://other/p.html"), &url("http://h/a/"), true);
        assert_eq!(rel, "../../other/p.html");
    }

    #[test]
    fn relative_from_non_directory_base() {
        let rel = relative_url_above(
            &url("http://h/a/b/c.html"),
            &url("http://h/a/index.html"),
            false,
        );
        assert_eq!(rel, "b/c.html");
    }

    #[test]
    fn relative_same_directory() {
        let rel = relative_url_above(&url("http://h/a/d.html"), &url("http://h/a/x.html"), false);
        assert_eq!(rel, "d.html");
    }

    #[test]
    fn relative_to_shallower_target() {
        let rel = relative_url_above(&url("http://h/top.html"), &url("http://h/a/b/"), true);
        assert_eq!(rel, "../../top.html");
    }

    #[test]
    fn segment_boundary_is_respected() {
        // "ab/c" must not be treated as inside "a/".
        let rel = relative_url_above(&url("http://h/ab/c.html"), &url("http://h/a/"), true);
        assert_eq!(rel, "../ab/c.html");
    }

    #[test]
    fn fragment_extraction() {
        assert_eq!(fragment_of("x.html#top"), Some("#top"));
        assert_eq!(fragment_of("x.html"), None);
    }

    #[test]
    fn mirror_path_layout() {
        let root = PathBuf::from("/mirror");
        assert_eq!(
            mirror_path_for(&url("http://h/a/b/c.html"), &root),
            PathBuf::from("/mirror/h/a/b/c.html")
        );
        assert_eq!(
            mirror_path_for(&url("http://h/"), &root),
            PathBuf::from("/mirror/h/index.html")
        );
        // Trailing slash drops the empty segment.
        assert_eq!(
            mirror_path_for(&url("http://h/a/"), &root),
            PathBuf::from("/mirror/h/a")
        );
        // Non-default port is folded into the host directory.
        assert_eq!(
            mirror_path_for(&url("http://h:8080/p.html"), &root),
            PathBuf::from("/mirror/h_8080/p.html")
        );
    }

    #[test]
    fn mirror_path_decodes_escapes() {
        let root = PathBuf::from("/mirror");
        assert_eq!(
            mirror_path_for(&url("http://h/a%20b.html"), &root),
            PathBuf::from("/mirror/h/a b.html")
        );
    }

    #[test]
    fn normalize_strips_fragment() {
        assert_eq!(
            normalize_url(&url("http://h/p.html#frag")),
            "http://h/p.html"
        );
    }

    #[test]
    fn crawlable_url_filter() {
        assert!(is_crawlable_url("http://example.com/a"));
        assert!(is_crawlable_url("https://example.com/"));
        assert!(!is_crawlable_url("javascript:void(0)"));
        assert!(!is_crawlable_url("mailto:x@example.com"));
        assert!(!is_crawlable_url("ftp://example.com/f"));
        assert!(!is_crawlable_url(""));
    }

    #[test]
    fn content_type_guessing() {
        assert_eq!(
            guess_content_type(&url("http://h/x.HTML")),
            Some("text/html")
        );
        assert_eq!(
            guess_content_type(&url("http://h/x.gif")),
            Some("image/gif")
        );
        assert_eq!(guess_content_type(&url("http://h/x")), None);
        assert_eq!(guess_content_type(&url("http://h/dir/")), None);
    }
}

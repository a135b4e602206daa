//! End-to-end crawl tests against a local HTTP server.

use std::fs;
use std::io::{self, Read};

use sitemirror::{Frontier, MirrorConfig, MirrorWriter};
use tempfile::TempDir;

fn drain(frontier: &mut Frontier) -> usize {
    let mut consumed = 0;
    while let Some(mut fetched) = frontier.next() {
        io::copy(&mut fetched, &mut io::sink()).unwrap();
        consumed += 1;
    }
    consumed
}

fn mirror_all(frontier: &mut Frontier, writer: &MirrorWriter) {
    while let Some(mut fetched) = frontier.next() {
        let item = fetched.item.clone();
        writer.write(&item, &mut fetched, None).unwrap();
    }
}

#[test]
fn mirrors_a_small_site_and_rewrites_links() {
    let mut server = mockito::Server::new();
    let base = server.url();

    let index_body = format!(
        concat!(
            "<html><head><title>Front</title></head><body>",
            "<a href=\"{base}/a.html\">absolute</a>",
            "<a href=\"./a.html\">relative spelling</a>",
            "<a href=\"sub/b.html#part\">child</a>",
            "<img src=\"pic.gif\">",
            "<a href=\"http://elsewhere.invalid/x.html\">offsite</a>",
            "<a href=\"#local\">fragment only</a>",
            "<a href=\"mailto:someone@example.com\">mail</a>",
            "</body></html>"
        ),
        base = base
    );
    let index = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(&index_body)
        .expect(1)
        .create();
    // Reached through two different relative spellings; fetched once.
    let a = server
        .mock("GET", "/a.html")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><body>a</body></html>")
        .expect(1)
        .create();
    let b = server
        .mock("GET", "/sub/b.html")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><body><a href=\"../a.html\">up</a></body></html>")
        .expect(1)
        .create();
    let gif_bytes: &[u8] = &[0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x00, 0x01];
    let gif = server
        .mock("GET", "/pic.gif")
        .with_status(200)
        .with_header("content-type", "image/gif")
        .with_body(gif_bytes)
        .expect(1)
        .create();

    let dir = TempDir::new().unwrap();
    let config = MirrorConfig::builder().target_dir(dir.path()).build();
    let writer = MirrorWriter::create(&config).unwrap();
    let mut frontier = Frontier::new(config).unwrap();
    frontier.add_url(&format!("{base}/")).unwrap();

    mirror_all(&mut frontier, &writer);

    index.assert();
    a.assert();
    b.assert();
    gif.assert();

    let stats = frontier.stats();
    assert_eq!(stats.fetched, 4);
    assert_eq!(stats.broken_links, 0, "the offsite link must be filtered, not attempted");

    let host_dir = {
        let url = url::Url::parse(&base).unwrap();
        format!("{}_{}", url.host_str().unwrap(), url.port().unwrap())
    };
    let index_file = dir.path().join(&host_dir).join("index.html");
    let mirrored = fs::read_to_string(&index_file).unwrap();
    // The absolute link was relativized; the fragment survived on the
    // child link; the offsite link is untouched.
    assert!(mirrored.contains("<a href=\"a.html\">absolute</a>"));
    assert!(mirrored.contains("<a href=\"sub/b.html#part\">child</a>"));
    assert!(mirrored.contains("http://elsewhere.invalid/x.html"));
    assert!(mirrored.contains("<a href=\"#local\">fragment only</a>"));

    let gif_file = dir.path().join(&host_dir).join("pic.gif");
    assert_eq!(fs::read(gif_file).unwrap(), gif_bytes);

    // The child page links back up relative to its own location.
    let b_file = dir.path().join(&host_dir).join("sub/b.html");
    let b_html = fs::read_to_string(&b_file).unwrap();
    assert!(b_html.contains("<a href=\"../a.html\">up</a>"));
}

#[test]
fn depth_cap_stops_discovery() {
    let mut server = mockito::Server::new();
    let base = server.url();

    let _index = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><a href=\"one.html\">1</a></html>")
        .expect(1)
        .create();
    let _one = server
        .mock("GET", "/one.html")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><a href=\"two.html\">2</a></html>")
        .expect(1)
        .create();
    let two = server
        .mock("GET", "/two.html")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>deep</html>")
        .expect(0)
        .create();

    let dir = TempDir::new().unwrap();
    let config = MirrorConfig::builder()
        .target_dir(dir.path())
        .max_depth(Some(1))
        .scan_only(true)
        .build();
    let mut frontier = Frontier::new(config).unwrap();
    frontier.add_url(&format!("{base}/")).unwrap();

    let consumed = drain(&mut frontier);
    assert_eq!(consumed, 2);
    two.assert();
    assert_eq!(frontier.stats().fetched, 2);
}

#[test]
fn fetch_cap_bounds_the_crawl() {
    let mut server = mockito::Server::new();
    let base = server.url();

    let _index = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><a href=\"one.html\">1</a><a href=\"two.html\">2</a></html>")
        .create();
    let _one = server
        .mock("GET", "/one.html")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>1</html>")
        .create();

    let dir = TempDir::new().unwrap();
    let config = MirrorConfig::builder()
        .target_dir(dir.path())
        .max_fetches(Some(2))
        .scan_only(true)
        .build();
    let mut frontier = Frontier::new(config).unwrap();
    frontier.add_url(&format!("{base}/")).unwrap();

    drain(&mut frontier);
    assert_eq!(frontier.stats().fetched, 2);
}

#[test]
fn no_follow_still_fetches_resources() {
    let mut server = mockito::Server::new();
    let base = server.url();

    let _index = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><a href=\"page.html\">p</a><img src=\"pic.gif\"></html>")
        .expect(1)
        .create();
    let page = server
        .mock("GET", "/page.html")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>never</html>")
        .expect(0)
        .create();
    let gif = server
        .mock("GET", "/pic.gif")
        .with_status(200)
        .with_header("content-type", "image/gif")
        .with_body("gif")
        .expect(1)
        .create();

    let dir = TempDir::new().unwrap();
    let config = MirrorConfig::builder()
        .target_dir(dir.path())
        .follow_links(false)
        .scan_only(true)
        .build();
    let mut frontier = Frontier::new(config).unwrap();
    frontier.add_url(&format!("{base}/")).unwrap();

    drain(&mut frontier);
    page.assert();
    gif.assert();
}

#[test]
fn broken_links_are_reported_and_skipped() {
    let mut server = mockito::Server::new();
    let base = server.url();

    let _index = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><a href=\"gone.html\">x</a><a href=\"ok.html\">y</a></html>")
        .create();
    let _gone = server.mock("GET", "/gone.html").with_status(404).create();
    let _ok = server
        .mock("GET", "/ok.html")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>fine</html>")
        .create();

    let dir = TempDir::new().unwrap();
    let config = MirrorConfig::builder()
        .target_dir(dir.path())
        .scan_only(true)
        .build();
    let mut frontier = Frontier::new(config).unwrap();
    frontier.add_url(&format!("{base}/")).unwrap();

    let consumed = drain(&mut frontier);
    // The 404 item is reported, not yielded; the crawl continues.
    assert_eq!(consumed, 2);
    let stats = frontier.stats();
    assert_eq!(stats.fetched, 2);
    assert_eq!(stats.broken_links, 1);
}

#[test]
fn scan_only_writes_nothing() {
    let mut server = mockito::Server::new();
    let base = server.url();

    let _index = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><title>T</title></html>")
        .create();

    let dir = TempDir::new().unwrap();
    let config = MirrorConfig::builder()
        .target_dir(dir.path().join("never-created"))
        .scan_only(true)
        .build();
    let mut frontier = Frontier::new(config).unwrap();
    frontier.add_url(&format!("{base}/")).unwrap();

    let mut fetched = frontier.next().unwrap();
    let mut sink = Vec::new();
    fetched.read_to_end(&mut sink).unwrap();
    assert_eq!(fetched.title().as_deref(), Some("T"));
    assert!(frontier.next().is_none());
    assert!(!dir.path().join("never-created").exists());
}

#[test]
fn malformed_seed_is_rejected_up_front() {
    let dir = TempDir::new().unwrap();
    let config = MirrorConfig::builder().target_dir(dir.path()).build();
    let mut frontier = Frontier::new(config).unwrap();
    assert!(frontier.add_url("not a url").is_err());
    assert!(frontier.add_url("ftp://example.com/x").is_err());
    assert!(frontier.next().is_none());
}

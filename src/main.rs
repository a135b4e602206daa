//! Command-line site mirroring tool.
//!
//! Crawls one or more seed URLs and mirrors every policy-approved
//! resource under the target directory, rewriting links in HTML pages so
//! the mirror browses offline.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;

use sitemirror::mirror::WriteOutcome;
use sitemirror::{Frontier, MirrorConfig, MirrorWriter};

const EXIT_USAGE: i32 = 1;
const EXIT_TARGET_DIR: i32 = 2;
const EXIT_BAD_SEED: i32 = 3;
const EXIT_WRITE_FAILED: i32 = 4;

#[derive(Parser, Debug)]
#[command(
    name = "sitemirror",
    version,
    about = "Mirror a web site into a local directory, rewriting links for offline browsing."
)]
struct Cli {
    /// Directory to mirror into.
    target_dir: PathBuf,

    /// Seed URLs to crawl.
    #[arg(required = true)]
    seeds: Vec<String>,

    /// Do not follow hyperlinks to further HTML pages.
    #[arg(short = 'f')]
    no_follow: bool,

    /// Do not relativize rewritten links.
    #[arg(short = 'c')]
    no_relativize: bool,

    /// Ignore the same-site restriction.
    #[arg(short = 'w')]
    whole_web: bool,

    /// Restrict to links below the originating document.
    #[arg(short = 'b')]
    below_document: bool,

    /// Scan only; do not write to disk.
    #[arg(short = 's')]
    scan_only: bool,

    /// Maximum number of items fetched.
    #[arg(short = 'n', value_name = "N")]
    max_fetches: Option<usize>,

    /// Maximum link depth.
    #[arg(short = 'd', value_name = "N")]
    max_depth: Option<u32>,

    /// Denied MIME-type prefixes.
    #[arg(short = 'm', value_delimiter = ',', value_name = "a,b,c")]
    denied_mime_prefixes: Vec<String>,

    /// Denied file extensions.
    #[arg(short = 'e', value_delimiter = ',', value_name = "a,b,c")]
    denied_extensions: Vec<String>,
}

fn main() {
    env_logger::init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_USAGE,
            };
            std::process::exit(code);
        }
    };
    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let config = MirrorConfig::builder()
        .target_dir(&cli.target_dir)
        .follow_links(!cli.no_follow)
        .rewrite_links(!cli.no_relativize)
        .within_site(!cli.whole_web)
        .below_document(cli.below_document)
        .scan_only(cli.scan_only)
        .max_fetches(cli.max_fetches)
        .max_depth(cli.max_depth)
        .denied_mime_prefixes(cli.denied_mime_prefixes)
        .denied_extensions(cli.denied_extensions)
        .build();

    let writer = if config.scan_only() {
        None
    } else {
        match MirrorWriter::create(&config) {
            Ok(writer) => Some(writer),
            Err(err) => {
                eprintln!("cannot create target directory: {err}");
                return EXIT_TARGET_DIR;
            }
        }
    };

    let mut frontier = match Frontier::new(config) {
        Ok(frontier) => frontier,
        Err(err) => {
            eprintln!("setup failed: {err:#}");
            return EXIT_USAGE;
        }
    };
    for seed in &cli.seeds {
        if let Err(err) = frontier.add_url(seed) {
            eprintln!("bad seed URL: {err}");
            return EXIT_BAD_SEED;
        }
    }

    let mut written = 0usize;
    let mut write_failures = 0usize;
    let mut body_failures = 0usize;
    while let Some(mut fetched) = frontier.next() {
        let item = fetched.item.clone();
        match &writer {
            Some(writer) => match writer.write(&item, &mut fetched, None) {
                Ok(WriteOutcome::Written { path, bytes }) => {
                    written += 1;
                    log::info!("{} -> {} ({bytes} bytes)", item.url, path.display());
                }
                Ok(WriteOutcome::Cancelled { .. }) => {}
                Err(err) => {
                    log::warn!("{err}");
                    if err.is_write_failure() {
                        write_failures += 1;
                    } else {
                        body_failures += 1;
                    }
                }
            },
            // Scan only: the body still has to be consumed to drive
            // discovery.
            None => {
                if let Err(err) = io::copy(&mut fetched, &mut io::sink()) {
                    log::warn!("failed reading {}: {err}", item.url);
                    body_failures += 1;
                }
            }
        }
    }

    let stats = frontier.stats();
    println!(
        "fetched {} items, wrote {written}, {} broken links, {body_failures} body failures, \
         {write_failures} write failures",
        stats.fetched, stats.broken_links
    );
    if write_failures > 0 {
        EXIT_WRITE_FAILED
    } else {
        0
    }
}

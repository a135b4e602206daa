//! Streaming scanner with in-place token substitution.

use std::io::{self, Read};

use url::Url;

use super::buffer::{LookAheadBuffer, READ_AHEAD_BYTES};
use crate::scanner::{Machine, ScannedToken, TokenEditor, TokenKind};

/// Reader decorator that lets an editing observer replace recognized
/// tokens before the bytes reach the caller.
///
/// Implements the same streaming read contract as the pass-through
/// scanner. While a token capture is open, bytes from the capture start
/// onward are held in the look-ahead buffer, reading ahead of the caller
/// in [`READ_AHEAD_BYTES`] increments until the token closes, so the full
/// token is resident before substitution. Everything before the capture
/// start flows out freely; substitution never touches bytes the caller
/// has already received.
///
/// A substitution whose bookkeeping does not fit the buffer is logged
/// with the full buffer geometry and the token passes through unmodified.
/// The stream itself never fails for that reason.
pub struct RewritingScanner<R, E> {
    inner: R,
    editor: E,
    machine: Machine,
    buf: LookAheadBuffer,
    context: Url,
    /// Feed-space coordinate of the first pending byte.
    out_base: usize,
    eof: bool,
    scratch: String,
}

impl<R: Read, E: TokenEditor> RewritingScanner<R, E> {
    pub fn new(inner: R, page_url: Url, editor: E) -> Self {
        Self {
            inner,
            editor,
            machine: Machine::new(),
            buf: LookAheadBuffer::new(),
            context: page_url,
            out_base: 0,
            eof: false,
            scratch: String::new(),
        }
    }

    /// The current context URL (page URL, adjusted by `<base href>`).
    #[must_use]
    pub fn context(&self) -> &Url {
        &self.context
    }

    #[must_use]
    pub fn editor(&self) -> &E {
        &self.editor
    }

    /// Recover the editor after the stream is consumed.
    pub fn into_editor(self) -> E {
        self.editor
    }

    /// Pull one chunk from the inner reader, scan it, and apply any
    /// substitutions for tokens that completed. Returns the raw byte
    /// count read, zero at end of input.
    fn fill_and_scan(&mut self, want: usize) -> io::Result<usize> {
        let before = self.buf.pending_len();
        let n = self.buf.fill_from(&mut self.inner, want)?;
        if n == 0 {
            self.eof = true;
            return Ok(0);
        }
        let mut i = before;
        let mut end = before + n;
        while i < end {
            let byte = self.buf.pending()[i];
            if let Some(span) = self.machine.feed(self.out_base + i, byte) {
                let at = span.start - self.out_base;
                let old_len = span.end - span.start;
                if let Some(replacement) = self.edit_token(span.kind) {
                    match self.buf.substitute(at, old_len, replacement.as_bytes()) {
                        Ok(delta) => {
                            i = i.wrapping_add_signed(delta);
                            end = end.wrapping_add_signed(delta);
                        }
                        Err(err) => {
                            log::error!(
                                target: "sitemirror::rewrite",
                                "substitution skipped, token delivered unmodified: {err}"
                            );
                        }
                    }
                }
            }
            i += 1;
        }
        Ok(n)
    }

    /// Ask the editor about a completed token and track `<base href>`.
    fn edit_token(&mut self, kind: TokenKind) -> Option<String> {
        self.scratch.clear();
        self.scratch
            .push_str(&String::from_utf8_lossy(self.machine.value()));
        let token = ScannedToken {
            kind,
            literal: &self.scratch,
            base: &self.context,
        };
        let replacement = self.editor.edit(&token);
        if kind == TokenKind::BaseHref
            && let Ok(new_base) = self.context.join(&self.scratch)
        {
            self.context = new_base;
        }
        replacement
    }

    /// Bytes at the buffer front that are safe to hand out.
    fn deliverable(&self) -> usize {
        if self.eof {
            // Nothing more will complete; an unterminated capture is
            // flushed as-is.
            return self.buf.pending_len();
        }
        match self.machine.capture_start() {
            Some(start) => start - self.out_base,
            None => self.buf.pending_len(),
        }
    }
}

impl<R: Read, E: TokenEditor> Read for RewritingScanner<R, E> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        loop {
            let deliverable = self.deliverable();
            if deliverable > 0 {
                let n = deliverable.min(out.len());
                out[..n].copy_from_slice(&self.buf.pending()[..n]);
                self.buf.consume(n);
                self.out_base += n;
                return Ok(n);
            }
            if self.eof {
                return Ok(0);
            }
            // While a capture is open the caller's request is already
            // satisfied as far as possible; read ahead in fixed
            // increments until the token closes.
            let want = if self.machine.capture_start().is_some() {
                READ_AHEAD_BYTES
            } else {
                out.len().max(READ_AHEAD_BYTES)
            };
            self.fill_and_scan(want)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    struct MapEditor<F>(F);
    impl<F: FnMut(&ScannedToken<'_>) -> Option<String>> TokenEditor for MapEditor<F> {
        fn edit(&mut self, token: &ScannedToken<'_>) -> Option<String> {
            (self.0)(token)
        }
    }

    fn rewrite(html: &str, editor: impl FnMut(&ScannedToken<'_>) -> Option<String>) -> String {
        let page = Url::parse("http://example.com/").unwrap();
        let mut scanner = RewritingScanner::new(html.as_bytes(), page, MapEditor(editor));
        let mut out = String::new();
        scanner.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn no_editor_means_pass_through() {
        let html = "<a href=\"x.html\">x</a><!-- <a href=y> --><img src=un quoted>";
        let page = Url::parse("http://example.com/").unwrap();
        let mut scanner = RewritingScanner::new(html.as_bytes(), page, ());
        let mut out = String::new();
        scanner.read_to_string(&mut out).unwrap();
        assert_eq!(out, html);
    }

    #[test]
    fn same_length_substitution() {
        let out = rewrite("<a href=\"x.html\">x</a>", |t| {
            assert_eq!(t.literal, "x.html");
            Some("y.html".to_string())
        });
        assert_eq!(out, "<a href=\"y.html\">x</a>");
    }

    #[test]
    fn shorter_substitution() {
        let out = rewrite("<a href=\"a/very/long/path.html\">x</a>", |_| {
            Some("p.html".to_string())
        });
        assert_eq!(out, "<a href=\"p.html\">x</a>");
    }

    #[test]
    fn longer_substitution() {
        let out = rewrite("<a href=\"x\">x</a>", |_| {
            Some("../../deeply/nested/replacement.html".to_string())
        });
        assert_eq!(out, "<a href=\"../../deeply/nested/replacement.html\">x</a>");
    }

    #[test]
    fn unquoted_token_substitution() {
        let out = rewrite("<img src=x.gif height=10>", |t| {
            assert_eq!(t.literal, "x.gif");
            Some("images/x.gif".to_string())
        });
        assert_eq!(out, "<img src=images/x.gif height=10>");
    }

    #[test]
    fn multiple_tokens_on_one_page() {
        let out = rewrite(
            "<a href=\"a\">1</a><img src=\"b\"><area href=\"c\">",
            |t| Some(format!("{}{}", t.literal, t.literal)),
        );
        assert_eq!(out, "<a href=\"aa\">1</a><img src=\"bb\"><area href=\"cc\">");
    }

    #[test]
    fn replacement_longer_than_default_capacity() {
        let big = "x".repeat(10_000);
        let out = rewrite("<a href=\"small\">x</a>", |_| Some(big.clone()));
        assert_eq!(out, format!("<a href=\"{big}\">x</a>"));
    }

    #[test]
    fn token_longer_than_default_capacity() {
        let long_url = format!("http://example.com/{}.html", "p".repeat(8192));
        let html = format!("<a href=\"{long_url}\">x</a>");
        let out = rewrite(&html, |_| Some("short.html".to_string()));
        assert_eq!(out, "<a href=\"short.html\">x</a>");
    }

    #[test]
    fn bytes_outside_tokens_are_untouched() {
        let html = "<p>before</p><a href=\"x\">mid</a><p>after &amp; more</p>";
        let out = rewrite(html, |_| Some("Y".to_string()));
        assert_eq!(out, "<p>before</p><a href=\"Y\">mid</a><p>after &amp; more</p>");
    }

    #[test]
    fn comments_are_not_rewritten() {
        let html = "<!-- <a href=\"z\"> -->";
        let out = rewrite(html, |_| Some("SHOULD_NOT_APPEAR".to_string()));
        assert_eq!(out, html);
    }

    #[test]
    fn title_can_be_replaced() {
        let out = rewrite("<title>Old</title>", |t| {
            assert_eq!(t.kind, TokenKind::Title);
            Some("New Title".to_string())
        });
        assert_eq!(out, "<title>New Title</title>");
    }

    #[test]
    fn unterminated_token_is_flushed_at_eof() {
        let html = "<a href=\"never-closed";
        let out = rewrite(html, |_| Some("X".to_string()));
        assert_eq!(out, html);
    }

    #[test]
    fn small_destination_buffers_work() {
        let html = "<a href=\"x.html\">first</a> text <img src=\"y.gif\">";
        let page = Url::parse("http://example.com/").unwrap();
        let mut scanner = RewritingScanner::new(
            html.as_bytes(),
            page,
            MapEditor(|t: &ScannedToken<'_>| Some(format!("rw/{}", t.literal))),
        );
        let mut out = Vec::new();
        let mut chunk = [0u8; 3];
        loop {
            let n = scanner.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<a href=\"rw/x.html\">first</a> text <img src=\"rw/y.gif\">"
        );
    }
}

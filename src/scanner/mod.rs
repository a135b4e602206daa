//! Streaming HTML token scanner.
//!
//! A pass-through byte filter that recognizes every HTML construct
//! carrying a URL or title and reports each one to an observer, without
//! ever mutating or holding back the stream. Recognition is table-driven:
//! see [`rules`] for the construct table and [`machine`] for the state
//! machine.

mod machine;
mod rules;
mod token;

pub(crate) use machine::Machine;
pub use token::{ScannedToken, TokenEditor, TokenKind, TokenSink};

use std::io::{self, Read};

use url::Url;

/// Pass-through reader that scans bytes as they flow through.
///
/// Wraps any [`Read`] source. Output bytes equal input bytes exactly; the
/// only side effect is the synchronous observer callback per recognized
/// token. The context URL handed to the observer starts at the page URL
/// and tracks `<base href>` declarations as they are scanned.
pub struct TokenScanner<R, S> {
    inner: R,
    sink: S,
    machine: Machine,
    context: Url,
    offset: usize,
    scratch: String,
}

impl<R: Read, S: TokenSink> TokenScanner<R, S> {
    pub fn new(inner: R, page_url: Url, sink: S) -> Self {
        Self {
            inner,
            sink,
            machine: Machine::new(),
            context: page_url,
            offset: 0,
            scratch: String::new(),
        }
    }

    /// The current context URL (page URL, adjusted by `<base href>`).
    #[must_use]
    pub fn context(&self) -> &Url {
        &self.context
    }

    /// Recover the observer after scanning.
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn emit(&mut self, kind: TokenKind) {
        self.scratch.clear();
        self.scratch
            .push_str(&String::from_utf8_lossy(self.machine.value()));
        let token = ScannedToken {
            kind,
            literal: &self.scratch,
            base: &self.context,
        };
        self.sink.token(&token);
        if kind == TokenKind::BaseHref
            && let Ok(new_base) = self.context.join(&self.scratch)
        {
            self.context = new_base;
        }
    }
}

impl<R: Read, S: TokenSink> Read for TokenScanner<R, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for i in 0..n {
            if let Some(span) = self.machine.feed(self.offset + i, buf[i]) {
                self.emit(span.kind);
            }
        }
        self.offset += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn scan_all(html: &str) -> (Vec<(TokenKind, String, String)>, Vec<u8>) {
        let tokens = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = {
            let tokens = tokens.clone();
            move |t: &ScannedToken<'_>| {
                tokens.borrow_mut().push((
                    t.kind,
                    t.literal.to_string(),
                    t.base.as_str().to_string(),
                ));
            }
        };
        let page = Url::parse("http://example.com/dir/page.html").unwrap();
        let mut scanner = TokenScanner::new(html.as_bytes(), page, sink);
        let mut out = Vec::new();
        scanner.read_to_end(&mut out).unwrap();
        let collected = tokens.borrow().clone();
        (collected, out)
    }

    #[test]
    fn output_equals_input_exactly() {
        let html = "<html><body><a href=\"x.html\">x</a><img src=un quoted></body></html>";
        let (_, out) = scan_all(html);
        assert_eq!(out, html.as_bytes());
    }

    #[test]
    fn one_callback_per_construct() {
        let (tokens, _) = scan_all("<a href=\"x.html\">x</a>");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].0, TokenKind::AHref);
        assert_eq!(tokens[0].1, "x.html");
        assert_eq!(tokens[0].2, "http://example.com/dir/page.html");
    }

    #[test]
    fn base_href_switches_context() {
        let (tokens, _) = scan_all(
            "<base href=\"http://other.example/sub/\"><a href=\"rel.html\">x</a>",
        );
        assert_eq!(tokens.len(), 2);
        // The base token itself resolves against the page URL.
        assert_eq!(tokens[0].0, TokenKind::BaseHref);
        assert_eq!(tokens[0].2, "http://example.com/dir/page.html");
        // Later tokens see the declared base.
        assert_eq!(tokens[1].0, TokenKind::AHref);
        assert_eq!(tokens[1].2, "http://other.example/sub/");
    }

    #[test]
    fn tokens_cross_read_boundaries() {
        struct OneByte<'a>(&'a [u8], usize);
        impl Read for OneByte<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.1 >= self.0.len() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0[self.1];
                self.1 += 1;
                Ok(1)
            }
        }

        let html = b"<title>Split Title</title><a href='q.html'>";
        let tokens = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = {
            let tokens = tokens.clone();
            move |t: &ScannedToken<'_>| {
                tokens.borrow_mut().push((t.kind, t.literal.to_string()));
            }
        };
        let page = Url::parse("http://example.com/").unwrap();
        let mut scanner = TokenScanner::new(OneByte(html, 0), page, sink);
        let mut out = Vec::new();
        scanner.read_to_end(&mut out).unwrap();
        assert_eq!(out, html);
        assert_eq!(
            tokens.borrow().clone(),
            vec![
                (TokenKind::Title, "Split Title".to_string()),
                (TokenKind::AHref, "q.html".to_string()),
            ]
        );
    }
}

//! The byte-level recognition state machine.
//!
//! A single-pass scanner over raw HTML bytes. Instead of one state chain
//! per recognized construct, two generic sub-automata (name matching and
//! value capture) are parametrized by the rule table, which keeps the
//! state space down to the handful below.

use super::rules;
use super::token::TokenKind;

/// A completed token. `start..end` are coordinates in the caller's feed
/// space (quotes excluded); the literal bytes are in [`Machine::value`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct TokenSpan {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Outside any markup.
    Text,
    /// Just past `<`.
    TagOpen,
    /// Just past `<!`.
    Bang,
    /// Just past `<!-`, expecting the second dash.
    CommentOpen,
    /// Inside `<!-- ... -->`.
    Comment,
    /// One dash seen inside a comment.
    CommentDash,
    /// Two dashes seen inside a comment; `>` ends it.
    CommentDashDash,
    /// Accumulating a tag name.
    TagName,
    /// Skipping a closing tag.
    CloseTag,
    /// Inside a tag, between attributes. Unknown tags and malformed
    /// input land here and are skipped generically.
    InTag,
    /// Accumulating an attribute name.
    AttrName,
    /// Whitespace after an attribute name, before `=` or the next name.
    AfterAttrName,
    /// Past `=`, skipping whitespace before the value.
    BeforeValue,
    /// Inside a quoted value; the byte is the closing quote.
    Quoted(u8),
    /// Inside an unquoted value; whitespace or `>` ends it.
    Unquoted,
    /// Capturing `<title>` or first-`<h1>` text until the next `<`.
    CaptureText(TokenKind),
}

fn is_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0c)
}

fn is_name(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

/// The scanner FSM. Feed it one byte at a time; it never mutates or
/// buffers the stream, only accumulates the small name/value scratch
/// buffers it needs for disambiguation.
#[derive(Debug)]
pub(crate) struct Machine {
    state: State,
    tag: Vec<u8>,
    attr: Vec<u8>,
    value: Vec<u8>,
    value_start: usize,
    seen_heading: bool,
}

impl Machine {
    pub fn new() -> Self {
        Self {
            state: State::Text,
            tag: Vec::new(),
            attr: Vec::new(),
            value: Vec::new(),
            value_start: 0,
            seen_heading: false,
        }
    }

    /// Literal bytes of the token most recently reported by [`feed`].
    /// Valid until the next call to `feed`.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Start coordinate of an in-progress value or text capture.
    ///
    /// While this returns `Some`, bytes from that coordinate on may still
    /// be rewritten and must not be released downstream.
    pub fn capture_start(&self) -> Option<usize> {
        match self.state {
            State::Quoted(_) | State::Unquoted | State::CaptureText(_) => Some(self.value_start),
            _ => None,
        }
    }

    /// Advance the machine by one byte at coordinate `at`. Returns a span
    /// when a recognized token just completed.
    pub fn feed(&mut self, at: usize, byte: u8) -> Option<TokenSpan> {
        match self.state {
            State::Text => {
                if byte == b'<' {
                    self.state = State::TagOpen;
                }
                None
            }
            State::TagOpen => {
                match byte {
                    b'!' => self.state = State::Bang,
                    b'/' => self.state = State::CloseTag,
                    b'<' => {} // stray '<', restart
                    c if c.is_ascii_alphabetic() => {
                        self.tag.clear();
                        self.tag.push(c.to_ascii_lowercase());
                        self.state = State::TagName;
                    }
                    _ => self.state = State::Text,
                }
                None
            }
            State::Bang => {
                match byte {
                    b'-' => self.state = State::CommentOpen,
                    b'>' => self.state = State::Text,
                    _ => {
                        // A declaration such as <!DOCTYPE ...>.
                        self.tag.clear();
                        self.state = State::InTag;
                    }
                }
                None
            }
            State::CommentOpen => {
                match byte {
                    b'-' => self.state = State::Comment,
                    b'>' => self.state = State::Text,
                    _ => {
                        self.tag.clear();
                        self.state = State::InTag;
                    }
                }
                None
            }
            State::Comment => {
                if byte == b'-' {
                    self.state = State::CommentDash;
                }
                None
            }
            State::CommentDash => {
                self.state = if byte == b'-' {
                    State::CommentDashDash
                } else {
                    State::Comment
                };
                None
            }
            State::CommentDashDash => {
                match byte {
                    b'>' => self.state = State::Text,
                    b'-' => {} // still closing, e.g. --->
                    _ => self.state = State::Comment,
                }
                None
            }
            State::CloseTag => {
                if byte == b'>' {
                    self.state = State::Text;
                }
                None
            }
            State::TagName => {
                match byte {
                    c if is_name(c) => self.tag.push(c.to_ascii_lowercase()),
                    b'>' => self.tag_closed(at),
                    _ => self.state = State::InTag,
                }
                None
            }
            State::InTag => {
                match byte {
                    b'>' => self.tag_closed(at),
                    c if is_name(c) => {
                        self.attr.clear();
                        self.attr.push(c.to_ascii_lowercase());
                        self.state = State::AttrName;
                    }
                    _ => {} // whitespace, '/', stray bytes
                }
                None
            }
            State::AttrName => {
                match byte {
                    c if is_name(c) => self.attr.push(c.to_ascii_lowercase()),
                    b'=' => self.state = State::BeforeValue,
                    b'>' => self.tag_closed(at),
                    c if is_ws(c) => self.state = State::AfterAttrName,
                    _ => self.state = State::InTag,
                }
                None
            }
            State::AfterAttrName => {
                match byte {
                    b'=' => self.state = State::BeforeValue,
                    b'>' => self.tag_closed(at),
                    c if is_ws(c) => {}
                    c if is_name(c) => {
                        // Previous attribute was boolean.
                        self.attr.clear();
                        self.attr.push(c.to_ascii_lowercase());
                        self.state = State::AttrName;
                    }
                    _ => self.state = State::InTag,
                }
                None
            }
            State::BeforeValue => match byte {
                c if is_ws(c) => None,
                b'"' | b'\'' => {
                    self.value.clear();
                    self.value_start = at + 1;
                    self.state = State::Quoted(byte);
                    None
                }
                b'>' => {
                    self.value.clear();
                    let span = self.finish_value(at, at);
                    self.tag_closed(at);
                    span
                }
                c => {
                    self.value.clear();
                    self.value.push(c);
                    self.value_start = at;
                    self.state = State::Unquoted;
                    None
                }
            },
            State::Quoted(quote) => {
                if byte == quote {
                    let span = self.finish_value(self.value_start, at);
                    self.state = State::InTag;
                    span
                } else {
                    self.value.push(byte);
                    None
                }
            }
            State::Unquoted => match byte {
                c if is_ws(c) => {
                    let span = self.finish_value(self.value_start, at);
                    self.state = State::InTag;
                    span
                }
                b'>' => {
                    let span = self.finish_value(self.value_start, at);
                    self.tag_closed(at);
                    span
                }
                c => {
                    self.value.push(c);
                    None
                }
            },
            State::CaptureText(kind) => {
                if byte == b'<' {
                    let span = TokenSpan {
                        kind,
                        start: self.value_start,
                        end: at,
                    };
                    self.state = State::TagOpen;
                    Some(span)
                } else {
                    self.value.push(byte);
                    None
                }
            }
        }
    }

    /// Handle `>`: leave the tag, entering text capture for `<title>`
    /// and the first `<h1>`.
    fn tag_closed(&mut self, at: usize) {
        if self.tag == b"title" {
            self.begin_capture(TokenKind::Title, at);
        } else if self.tag == b"h1" && !self.seen_heading {
            self.seen_heading = true;
            self.begin_capture(TokenKind::Heading, at);
        } else {
            self.state = State::Text;
        }
    }

    fn begin_capture(&mut self, kind: TokenKind, at: usize) {
        self.value.clear();
        self.value_start = at + 1;
        self.state = State::CaptureText(kind);
    }

    /// An attribute value just completed; report it if the rule table
    /// recognizes the `(tag, attribute)` pair.
    fn finish_value(&mut self, start: usize, end: usize) -> Option<TokenSpan> {
        let kind = rules::lookup(&self.tag, &self.attr)?;
        Some(TokenSpan { kind, start, end })
    }
}

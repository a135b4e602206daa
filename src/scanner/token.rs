//! Token vocabulary and observer traits for the scanner.

use url::Url;

/// Identifies which HTML construct produced a token.
///
/// This is the callback id of the recognition table: one variant per
/// URL-bearing attribute the scanner knows, plus the two text captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    AHref,
    ImgSrc,
    FrameSrc,
    BaseHref,
    AreaHref,
    LinkHref,
    BodyBackground,
    TableBackground,
    InputSrc,
    ScriptSrc,
    AppletCode,
    AppletCodebase,
    AppletArchive,
    ObjectData,
    ObjectClassid,
    LayerSrc,
    LayerBackground,
    /// `<title>` text.
    Title,
    /// First `<h1>` text, treated as the page heading.
    Heading,
}

impl TokenKind {
    /// Text captures carry page prose rather than a URL.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, Self::Title | Self::Heading)
    }

    /// URL-bearing attribute values.
    #[must_use]
    pub fn is_url(self) -> bool {
        !self.is_text()
    }
}

/// A recognized token, handed to observers while the stream is scanned.
///
/// `literal` is the exact byte text as it appeared in the document
/// (quotes excluded); `base` is the context URL to resolve it against,
/// which tracks `<base href>` as the page is scanned.
#[derive(Debug)]
pub struct ScannedToken<'a> {
    pub kind: TokenKind,
    pub literal: &'a str,
    pub base: &'a Url,
}

/// Read-only observer, invoked synchronously once per recognized token.
pub trait TokenSink {
    fn token(&mut self, token: &ScannedToken<'_>);
}

/// Editing observer. Return `Some(replacement)` to substitute the literal
/// token text in the output stream, `None` to leave it unchanged.
pub trait TokenEditor {
    fn edit(&mut self, token: &ScannedToken<'_>) -> Option<String>;
}

/// No-op editor, turning the rewriting scanner into a pass-through.
impl TokenEditor for () {
    fn edit(&mut self, _token: &ScannedToken<'_>) -> Option<String> {
        None
    }
}

/// Closures observe tokens directly.
impl<F> TokenSink for F
where
    F: FnMut(&ScannedToken<'_>),
{
    fn token(&mut self, token: &ScannedToken<'_>) {
        self(token);
    }
}

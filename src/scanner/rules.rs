//! Recognition table for URL-bearing attributes.
//!
//! One row per `(tag, attribute)` pair the scanner recognizes. The
//! machine matches tag and attribute names generically and consults this
//! table when an attribute value completes, so adding a construct is one
//! table row rather than a new chain of states.

use super::token::TokenKind;

pub(crate) struct AttrRule {
    pub tag: &'static [u8],
    pub attr: &'static [u8],
    pub kind: TokenKind,
}

const fn rule(tag: &'static [u8], attr: &'static [u8], kind: TokenKind) -> AttrRule {
    AttrRule { tag, attr, kind }
}

pub(crate) const ATTR_RULES: &[AttrRule] = &[
    rule(b"a", b"href", TokenKind::AHref),
    rule(b"img", b"src", TokenKind::ImgSrc),
    rule(b"frame", b"src", TokenKind::FrameSrc),
    rule(b"iframe", b"src", TokenKind::FrameSrc),
    rule(b"base", b"href", TokenKind::BaseHref),
    rule(b"area", b"href", TokenKind::AreaHref),
    rule(b"link", b"href", TokenKind::LinkHref),
    rule(b"body", b"background", TokenKind::BodyBackground),
    rule(b"table", b"background", TokenKind::TableBackground),
    rule(b"tr", b"background", TokenKind::TableBackground),
    rule(b"td", b"background", TokenKind::TableBackground),
    rule(b"th", b"background", TokenKind::TableBackground),
    rule(b"input", b"src", TokenKind::InputSrc),
    rule(b"script", b"src", TokenKind::ScriptSrc),
    rule(b"applet", b"code", TokenKind::AppletCode),
    rule(b"applet", b"codebase", TokenKind::AppletCodebase),
    rule(b"applet", b"archive", TokenKind::AppletArchive),
    rule(b"object", b"data", TokenKind::ObjectData),
    rule(b"object", b"classid", TokenKind::ObjectClassid),
    rule(b"layer", b"src", TokenKind::LayerSrc),
    rule(b"layer", b"background", TokenKind::LayerBackground),
];

/// Look up the token kind for a completed attribute value. Tag and
/// attribute names arrive already lowercased.
pub(crate) fn lookup(tag: &[u8], attr: &[u8]) -> Option<TokenKind> {
    ATTR_RULES
        .iter()
        .find(|r| r.tag == tag && r.attr == attr)
        .map(|r| r.kind)
}

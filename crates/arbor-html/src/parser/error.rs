use arbor_dom::DomError;
use strum_macros::Display;
use thiserror::Error;

use super::core::InsertionMode;
use crate::token::Token;

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// The tree construction errors the constructor reports. Displayed in the
/// kebab-case style of the standard's error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ParseErrorKind {
    /// A doctype whose name, public or system identifier is not the HTML one.
    MalformedDoctype,
    /// A doctype after the initial insertion mode.
    UnexpectedDoctype,
    /// Content before any doctype.
    MissingDoctype,
    /// A start tag the current insertion mode ignores or repairs.
    UnexpectedStartTag,
    /// An end tag the current insertion mode ignores or repairs.
    UnexpectedEndTag,
    /// Character data where the current insertion mode expects none.
    UnexpectedCharacter,
    /// A comment where the current insertion mode expects none.
    UnexpectedComment,
    /// A U+0000 NULL character token.
    UnexpectedNullCharacter,
    /// End of file while elements that need an end tag are still open.
    UnexpectedEndOfFile,
    /// "non-void-html-element-start-tag-with-trailing-solidus"
    NonVoidSelfClosingTag,
    /// An end tag that closes an element other than the current node.
    MisnestedTag,
}

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// "The handling of parse errors is well-defined": a parse error is a
/// diagnostic only, and parsing continues after it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} in {mode} at token {token_index}")]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// The insertion mode the token was processed in.
    pub mode: InsertionMode,
    /// Zero-based position of the token in the stream.
    pub token_index: usize,
}

/// Failures that end a tree construction run.
///
/// The tree built so far stays with the constructor and can still be taken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeConstructionError {
    /// A token that needs an insertion mode or algorithm this constructor
    /// does not build (tables, select, templates, framesets, misnested
    /// formatting elements).
    #[error("unsupported input in {mode}: {token}")]
    UnsupportedInput {
        /// The insertion mode when the token arrived.
        mode: InsertionMode,
        /// The offending token.
        token: Token,
    },

    /// A DOM mutation was rejected.
    #[error(transparent)]
    Structural(#[from] DomError),

    /// The constructor reached a state its own bookkeeping rules out.
    #[error("tree construction invariant violated: {0}")]
    InvariantViolation(&'static str),

    /// A parse error in strict mode.
    #[error("parse error in strict mode: {0}")]
    Parse(ParseError),
}

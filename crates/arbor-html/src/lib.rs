//! HTML tree construction for the arbor parsing core.
//!
//! # Scope
//!
//! This crate implements:
//! - **Token model** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - The six token kinds a tokenizer hands to tree construction
//!   - [`TokenSource`], the pull interface to an external tokenizer
//!
//! - **Tree construction** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Insertion modes: Initial, BeforeHtml, BeforeHead, InHead, InHeadNoscript,
//!     AfterHead, InBody, Text, AfterBody, AfterAfterBody
//!   - The rules for parsing tokens in foreign content (SVG and MathML)
//!   - Stack of open elements and its scope queries
//!   - Quirks mode selection from the doctype
//!
//! # Not Yet Implemented
//!
//! Tokens that need one of these are reported as
//! [`TreeConstructionError::UnsupportedInput`]:
//!
//! - Table, select, template and frameset insertion modes
//! - The list of active formatting elements and the adoption agency algorithm
//! - Fragment parsing

mod dump;
/// Tree construction.
pub mod parser;
mod source;
mod token;

pub use dump::dump_tree;
pub use parser::{
    ConstructorOptions, InsertionMode, OpenElements, ParseError, ParseErrorKind, Scope,
    TreeConstructionError, TreeConstructor,
};
pub use source::{TokenList, TokenSource, TokenizerState};
pub use token::{Attribute, Token};

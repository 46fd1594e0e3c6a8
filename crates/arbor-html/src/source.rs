//! The pull interface between tree construction and a tokenizer.

use strum_macros::Display;

use crate::token::Token;

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer states tree construction can ask for. "The tree
/// construction stage can affect the state of the tokenization stage" when
/// it inserts `title`, `textarea`, `style`, `script`, `plaintext` and
/// similar elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    Rcdata,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    Rawtext,
    /// [§ 13.2.5.4 Script data state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-state)
    ScriptData,
    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    Plaintext,
}

/// A producer of tokens for tree construction.
///
/// The constructor pulls one token at a time and finishes all of its work
/// for that token before pulling the next, so a tokenizer that honours
/// [`TokenSource::switch_state`] sees state requests before it lexes the
/// following input. Returning `None` ends the run.
pub trait TokenSource {
    /// The next token, or `None` when the input is exhausted.
    fn next_token(&mut self) -> Option<Token>;

    /// Switch the tokenizer to `state`. Sources that replay already-lexed
    /// tokens have nothing to switch and may ignore the request.
    fn switch_state(&mut self, state: TokenizerState) {
        let _ = state;
    }
}

/// Replays a fixed list of tokens.
///
/// State switch requests cannot change tokens that already exist; they are
/// recorded so callers can check what the constructor asked for.
#[derive(Debug, Clone)]
pub struct TokenList {
    tokens: std::vec::IntoIter<Token>,
    state_requests: Vec<TokenizerState>,
}

impl TokenList {
    /// A source that yields `tokens` in order.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter(),
            state_requests: Vec::new(),
        }
    }

    /// Every state switch requested so far, oldest first.
    #[must_use]
    pub fn state_requests(&self) -> &[TokenizerState] {
        &self.state_requests
    }

    /// Number of tokens not yet pulled.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.tokens.len()
    }
}

impl TokenSource for TokenList {
    fn next_token(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    fn switch_state(&mut self, state: TokenizerState) {
        self.state_requests.push(state);
    }
}

impl From<Vec<Token>> for TokenList {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

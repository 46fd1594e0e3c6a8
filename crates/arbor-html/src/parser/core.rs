//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! The constructor state, the dispatcher, the insertion helpers and every
//! insertion mode except "in body".

use std::mem;

use arbor_common::warning::warn_once;
use arbor_dom::{DomTree, ElementData, Namespace, NodeId, NodeType, QuirksMode};
use log::{debug, trace};
use strum_macros::{Display, EnumIter};

use super::error::{ParseError, ParseErrorKind, TreeConstructionError};
use super::open_elements::OpenElements;
use super::quirks::quirks_mode_for_doctype;
use crate::source::{TokenList, TokenSource, TokenizerState};
use crate::token::{Attribute, Token};

/// Result of processing one token.
pub(in crate::parser) type ConstructResult<T = ()> = Result<T, TreeConstructionError>;

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary
/// operation of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    #[default]
    Initial,
    /// [§ 13.2.6.4.2](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.10](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    InTableText,
    /// [§ 13.2.6.4.11](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolgroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
    InTableBody,
    /// [§ 13.2.6.4.14](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intr)
    InRow,
    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intd)
    InCell,
    /// [§ 13.2.6.4.16](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.18](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    InTemplate,
    /// [§ 13.2.6.4.19](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

/// Switches that change how a document is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstructorOptions {
    /// Return the first parse error as [`TreeConstructionError::Parse`]
    /// instead of recording it and carrying on.
    pub strict: bool,
    /// "The scripting flag is set to "enabled" if scripting was enabled for
    /// the Document with which the parser is associated when the parser was
    /// created, and "disabled" otherwise."
    pub scripting: bool,
    /// The document is an iframe srcdoc document, which never switches to
    /// quirks mode from its doctype.
    pub iframe_srcdoc: bool,
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Consumes tokens and builds a [`DomTree`].
///
/// # Example
/// ```
/// use arbor_html::{Token, TreeConstructor, dump_tree};
///
/// let mut tokens = vec![Token::doctype("html"), Token::start_tag("p")];
/// tokens.extend(Token::characters("Hi"));
/// tokens.push(Token::EndOfFile);
///
/// let tree = TreeConstructor::construct_from(tokens).unwrap();
/// assert_eq!(
///     dump_tree(&tree),
///     "| <!DOCTYPE html>\n| <html>\n|   <head>\n|   <body>\n|     <p>\n|       \"Hi\"\n"
/// );
/// ```
#[derive(Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct TreeConstructor {
    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(in crate::parser) insertion_mode: InsertionMode,

    /// "When the insertion mode is switched to "text" or "in table text",
    /// the original insertion mode is also set. This is the insertion mode
    /// to which the tree construction stage will return."
    pub(in crate::parser) original_insertion_mode: Option<InsertionMode>,

    /// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    pub(in crate::parser) open_elements: OpenElements,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    ///
    /// "Once a head element has been parsed (whether implicitly or
    /// explicitly) the head element pointer gets set to point to this node."
    pub(in crate::parser) head_element_pointer: Option<NodeId>,

    /// "The form element pointer points to the last form element that was
    /// opened and whose end tag has not yet been seen."
    pub(in crate::parser) form_element_pointer: Option<NodeId>,

    /// [§ 13.2.4.5 Other parsing state flags](https://html.spec.whatwg.org/multipage/parsing.html#other-parsing-state-flags)
    ///
    /// "The frameset-ok flag is set to "ok" when the parser is created. It
    /// is set to "not ok" after certain tokens are seen."
    pub(in crate::parser) frameset_ok: bool,

    /// Set after `pre`, `listing` and `textarea` start tags: "If the next
    /// token is a U+000A LINE FEED (LF) character token, then ignore that
    /// token and move on to the next one."
    pub(in crate::parser) ignore_next_line_feed: bool,

    /// Tokenizer state requested while processing the current token.
    pub(in crate::parser) pending_tokenizer_state: Option<TokenizerState>,

    /// Whether the rule that handled the current token acknowledged its
    /// self-closing flag.
    pub(in crate::parser) self_closing_acknowledged: bool,

    /// The document being built.
    pub(in crate::parser) tree: DomTree,

    /// Zero-based index of the token being processed.
    pub(in crate::parser) token_index: usize,

    /// Set by "stop parsing".
    pub(in crate::parser) stopped: bool,

    /// Parse errors recorded so far, in order.
    pub(in crate::parser) errors: Vec<ParseError>,

    pub(in crate::parser) options: ConstructorOptions,
}

impl Default for TreeConstructor {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeConstructor {
    /// A constructor for a new, empty document with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ConstructorOptions::default())
    }

    /// A constructor for a new, empty document.
    #[must_use]
    pub fn with_options(options: ConstructorOptions) -> Self {
        Self {
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            open_elements: OpenElements::new(),
            head_element_pointer: None,
            form_element_pointer: None,
            frameset_ok: true,
            ignore_next_line_feed: false,
            pending_tokenizer_state: None,
            self_closing_acknowledged: false,
            tree: DomTree::new(),
            token_index: 0,
            stopped: false,
            errors: Vec::new(),
            options,
        }
    }

    /// Fail on the first parse error.
    #[must_use]
    pub const fn with_strict_mode(mut self) -> Self {
        self.options.strict = true;
        self
    }

    /// Parse as if scripting were enabled.
    #[must_use]
    pub const fn with_scripting(mut self) -> Self {
        self.options.scripting = true;
        self
    }

    /// Parse an iframe srcdoc document.
    #[must_use]
    pub const fn with_iframe_srcdoc(mut self) -> Self {
        self.options.iframe_srcdoc = true;
        self
    }

    /// The options this constructor was created with.
    #[must_use]
    pub const fn options(&self) -> ConstructorOptions {
        self.options
    }

    /// Build a document from `tokens`.
    ///
    /// No end-of-file token is implied; end the list with
    /// [`Token::EndOfFile`] for a finished document.
    ///
    /// # Errors
    ///
    /// Any error [`TreeConstructor::run`] returns.
    pub fn construct_from(tokens: Vec<Token>) -> Result<DomTree, TreeConstructionError> {
        let mut constructor = Self::new();
        constructor.run_tokens(tokens)?;
        Ok(constructor.take_document())
    }

    /// Build a document from `tokens` and return it with the parse errors
    /// seen along the way.
    ///
    /// # Errors
    ///
    /// Any error [`TreeConstructor::run`] returns.
    pub fn parse_with_errors(
        tokens: Vec<Token>,
    ) -> Result<(DomTree, Vec<ParseError>), TreeConstructionError> {
        let mut constructor = Self::new();
        constructor.run_tokens(tokens)?;
        let errors = mem::take(&mut constructor.errors);
        Ok((constructor.take_document(), errors))
    }

    /// Pull tokens from `source` until it runs dry or parsing stops.
    ///
    /// "The tree construction stage can affect the state of the tokenization
    /// stage": a tokenizer state requested while processing a token is
    /// passed to [`TokenSource::switch_state`] before the next token is
    /// pulled.
    ///
    /// # Errors
    ///
    /// - [`TreeConstructionError::UnsupportedInput`] for tokens that need
    ///   table, select, template or frameset parsing, or the adoption agency
    ///   algorithm.
    /// - [`TreeConstructionError::Parse`] for the first parse error in strict
    ///   mode.
    /// - [`TreeConstructionError::Structural`] and
    ///   [`TreeConstructionError::InvariantViolation`] for internal failures.
    ///
    /// The tree built up to the failing token stays available through
    /// [`TreeConstructor::take_document`].
    pub fn run<S: TokenSource + ?Sized>(&mut self, source: &mut S) -> Result<(), TreeConstructionError> {
        while !self.stopped {
            let Some(token) = source.next_token() else {
                break;
            };
            let result = self.process(token);
            if let Some(state) = self.pending_tokenizer_state.take() {
                debug!(target: "arbor::tree", "switching tokenizer to {state}");
                source.switch_state(state);
            }
            result?;
        }
        Ok(())
    }

    /// Replay `tokens` through [`TreeConstructor::run`].
    ///
    /// # Errors
    ///
    /// Any error [`TreeConstructor::run`] returns.
    pub fn run_tokens(&mut self, tokens: Vec<Token>) -> Result<(), TreeConstructionError> {
        self.run(&mut TokenList::new(tokens))
    }

    /// Process an end-of-file token unless parsing has already stopped.
    ///
    /// # Errors
    ///
    /// Any error [`TreeConstructor::run`] returns.
    pub fn finish(&mut self) -> Result<(), TreeConstructionError> {
        if self.stopped {
            return Ok(());
        }
        self.process(Token::EndOfFile)
    }

    /// Move the document out, leaving an empty one behind.
    pub fn take_document(&mut self) -> DomTree {
        mem::take(&mut self.tree)
    }

    /// The current insertion mode.
    #[must_use]
    pub const fn insertion_mode(&self) -> InsertionMode {
        self.insertion_mode
    }

    /// The stack of open elements.
    #[must_use]
    pub const fn open_elements(&self) -> &OpenElements {
        &self.open_elements
    }

    /// The document built so far.
    #[must_use]
    pub const fn document(&self) -> &DomTree {
        &self.tree
    }

    /// Parse errors recorded so far, oldest first.
    #[must_use]
    pub fn parse_errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Whether "stop parsing" has run.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn process(&mut self, token: Token) -> Result<(), TreeConstructionError> {
        trace!(target: "arbor::tree", "{}: {token}", self.insertion_mode);

        if mem::take(&mut self.ignore_next_line_feed) && token == Token::character('\n') {
            self.token_index += 1;
            return Ok(());
        }

        self.self_closing_acknowledged = false;
        let result = self
            .process_token(&token)
            .and_then(|()| self.check_self_closing_acknowledged(&token));
        self.token_index += 1;
        result
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// "As each token is emitted from the tokenizer, the user agent must
    /// follow the appropriate steps from the following list, known as the
    /// tree construction dispatcher"
    pub(in crate::parser) fn process_token(&mut self, token: &Token) -> ConstructResult {
        if self.uses_foreign_content_rules(token) {
            self.handle_in_foreign_content(token)
        } else {
            self.process_using_rules_for(self.insertion_mode, token)
        }
    }

    /// "process the token using the rules for" `mode`.
    pub(in crate::parser) fn process_using_rules_for(
        &mut self,
        mode: InsertionMode,
        token: &Token,
    ) -> ConstructResult {
        match mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::InHeadNoscript => self.handle_in_head_noscript_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
            InsertionMode::InTable
            | InsertionMode::InTableText
            | InsertionMode::InCaption
            | InsertionMode::InColumnGroup
            | InsertionMode::InTableBody
            | InsertionMode::InRow
            | InsertionMode::InCell
            | InsertionMode::InSelect
            | InsertionMode::InSelectInTable
            | InsertionMode::InTemplate
            | InsertionMode::InFrameset
            | InsertionMode::AfterFrameset
            | InsertionMode::AfterAfterFrameset => Err(self.unsupported(token)),
        }
    }

    /// Report `token` as input this constructor does not handle.
    pub(in crate::parser) fn unsupported(&self, token: &Token) -> TreeConstructionError {
        let what = match token {
            Token::StartTag { name, .. } => format!("<{name}>"),
            other => other.to_string(),
        };
        let _ = warn_once(
            "HTML",
            &format!("no handling for {what} in {} mode", self.insertion_mode),
        );
        TreeConstructionError::UnsupportedInput {
            mode: self.insertion_mode,
            token: token.clone(),
        }
    }

    /// Record a parse error, or fail with it in strict mode.
    pub(in crate::parser) fn parse_error(&mut self, kind: ParseErrorKind) -> ConstructResult {
        let error = ParseError {
            kind,
            mode: self.insertion_mode,
            token_index: self.token_index,
        };
        debug!(target: "arbor::tree", "parse error: {error}");
        self.errors.push(error.clone());
        if self.options.strict {
            return Err(TreeConstructionError::Parse(error));
        }
        Ok(())
    }

    /// The parse error for a token a mode has no rule for.
    pub(in crate::parser) fn unexpected(&mut self, token: &Token) -> ConstructResult {
        let kind = match token {
            Token::Doctype { .. } => ParseErrorKind::UnexpectedDoctype,
            Token::StartTag { .. } => ParseErrorKind::UnexpectedStartTag,
            Token::EndTag { .. } => ParseErrorKind::UnexpectedEndTag,
            Token::Comment { .. } => ParseErrorKind::UnexpectedComment,
            Token::Character { data: '\0' } => ParseErrorKind::UnexpectedNullCharacter,
            Token::Character { .. } => ParseErrorKind::UnexpectedCharacter,
            Token::EndOfFile => ParseErrorKind::UnexpectedEndOfFile,
        };
        self.parse_error(kind)
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#acknowledge-self-closing-flag)
    ///
    /// "When a start tag token is emitted with its self-closing flag set, if
    /// the flag is not acknowledged when it is processed by the tree
    /// construction stage, that is a
    /// non-void-html-element-start-tag-with-trailing-solidus parse error."
    fn check_self_closing_acknowledged(&mut self, token: &Token) -> ConstructResult {
        if token.is_self_closing_start_tag() && !self.self_closing_acknowledged {
            return self.parse_error(ParseErrorKind::NonVoidSelfClosingTag);
        }
        Ok(())
    }

    pub(in crate::parser) const fn acknowledge_self_closing_flag(&mut self) {
        self.self_closing_acknowledged = true;
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    pub(in crate::parser) fn current_node(&self) -> ConstructResult<NodeId> {
        self.open_elements
            .current()
            .ok_or(TreeConstructionError::InvariantViolation(
                "current node requested with no open elements",
            ))
    }

    /// The current node's element data. Without a context element the
    /// adjusted current node is always the current node.
    pub(in crate::parser) fn current_element(&self) -> Option<&ElementData> {
        self.open_elements
            .current()
            .and_then(|id| self.tree.as_element(id))
    }

    /// Whether the current node is an HTML element named `tag_name`.
    pub(in crate::parser) fn current_is_html(&self, tag_name: &str) -> bool {
        self.current_element().is_some_and(|e| e.is_html(tag_name))
    }

    /// [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// STEP 1: "If there was an override target specified, then let target be
    ///          the override target. Otherwise, let target be the current
    ///          node."
    ///
    /// Foster parenting and template contents are never needed because
    /// tables and templates are not built.
    fn appropriate_place(&self, override_target: Option<NodeId>) -> ConstructResult<NodeId> {
        override_target.map_or_else(|| self.current_node(), Ok)
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// "create an element for the token" with the given local name. When the
    /// token repeats an attribute name the first value wins.
    pub(in crate::parser) fn create_element_for_token(
        &mut self,
        local_name: &str,
        attributes: &[Attribute],
        namespace: Namespace,
    ) -> NodeId {
        let mut element = ElementData::new(local_name, namespace);
        for attr in attributes {
            let _ = element
                .attrs
                .entry(attr.name.clone())
                .or_insert_with(|| attr.value.clone());
        }
        self.tree.alloc(NodeType::Element(element))
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    ///
    /// "insert a foreign element" for a start tag.
    pub(in crate::parser) fn insert_foreign_element(
        &mut self,
        local_name: &str,
        attributes: &[Attribute],
        namespace: Namespace,
    ) -> ConstructResult<NodeId> {
        // STEP 1: "Let the adjusted insertion location be the appropriate
        //          place for inserting a node."
        let place = self.appropriate_place(None)?;

        // STEP 2: "Let element be the result of creating an element for the
        //          token in the given namespace, with the intended parent
        //          being the element in which the adjusted insertion location
        //          finds itself."
        let element = self.create_element_for_token(local_name, attributes, namespace);

        // STEP 3: "If it is possible to insert element at the adjusted
        //          insertion location, then: ... Insert element at the
        //          adjusted insertion location."
        // The location is the current node, an element, so it is possible.
        let _ = self.tree.append_child(place, element)?;

        // STEP 4: "Push element onto the stack of open elements so that it is
        //          the new current node."
        self.open_elements.push(element);

        // STEP 5: "Return element."
        Ok(element)
    }

    /// "When the steps below require the user agent to insert an HTML element
    /// for a token, the user agent must insert a foreign element for the
    /// token, with the HTML namespace and false."
    pub(in crate::parser) fn insert_html_element(&mut self, token: &Token) -> ConstructResult<NodeId> {
        match token {
            Token::StartTag {
                name, attributes, ..
            } => self.insert_foreign_element(name, attributes, Namespace::Html),
            _ => Err(TreeConstructionError::InvariantViolation(
                "HTML element requested for a token that is not a start tag",
            )),
        }
    }

    /// Insert an HTML element for a start tag named `tag_name` with no
    /// attributes (implied `head`, `body`, `p` and friends).
    pub(in crate::parser) fn insert_html_element_named(&mut self, tag_name: &str) -> ConstructResult<NodeId> {
        self.insert_foreign_element(tag_name, &[], Namespace::Html)
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    pub(in crate::parser) fn insert_character(&mut self, c: char) -> ConstructResult {
        // STEP 2: "Let the adjusted insertion location be the appropriate
        //          place for inserting a node."
        let place = self.appropriate_place(None)?;

        // STEP 3: "If the adjusted insertion location is in a Document node,
        //          then return."
        if matches!(
            self.tree.get(place).map(|n| &n.node_type),
            Some(NodeType::Document)
        ) {
            return Ok(());
        }

        let mut buf = [0; 4];
        let data = c.encode_utf8(&mut buf);

        // STEP 4: "If there is a Text node immediately before the adjusted
        //          insertion location, then append data to that Text node's
        //          data."
        if let Some(last) = self.tree.last_child(place)
            && self.tree.as_text(last).is_some()
            && let Some(text) = self.tree.character_data_mut(last)
        {
            text.append_data(data);
            return Ok(());
        }

        // "Otherwise, create a new Text node whose data is data and whose
        // node document is the same as that of the element in which the
        // adjusted insertion location finds itself, and insert the newly
        // created node at the adjusted insertion location."
        let text = self.tree.create_text(data);
        let _ = self.tree.append_child(place, text)?;
        Ok(())
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    ///
    /// With `position`, the comment is appended to that node; otherwise to
    /// the appropriate place.
    pub(in crate::parser) fn insert_comment(&mut self, data: &str, position: Option<NodeId>) -> ConstructResult {
        let parent = self.appropriate_place(position)?;
        let comment = self.tree.create_comment(data);
        let _ = self.tree.append_child(parent, comment)?;
        Ok(())
    }

    /// Copy attributes the element does not have yet, as for a repeated
    /// `html` or `body` start tag.
    pub(in crate::parser) fn merge_attributes(&mut self, target: NodeId, attributes: &[Attribute]) {
        let Some(element) = self.tree.as_element_mut(target) else {
            return;
        };
        for attr in attributes {
            let _ = element
                .attrs
                .entry(attr.name.clone())
                .or_insert_with(|| attr.value.clone());
        }
    }

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#parsing-elements-that-contain-only-text)
    ///
    /// The generic raw text (`Rawtext`) and generic RCDATA (`Rcdata`)
    /// element parsing algorithms.
    pub(in crate::parser) fn parse_text_only_element(
        &mut self,
        token: &Token,
        state: TokenizerState,
    ) -> ConstructResult {
        // STEP 1: "Insert an HTML element for the token."
        let _ = self.insert_html_element(token)?;

        // STEP 2: "If the algorithm that was invoked is the generic raw text
        //          element parsing algorithm, switch the tokenizer to the
        //          RAWTEXT state; otherwise the algorithm invoked was the
        //          generic RCDATA element parsing algorithm, switch the
        //          tokenizer to the RCDATA state."
        self.pending_tokenizer_state = Some(state);

        // STEP 3: "Set the original insertion mode to the current insertion
        //          mode."
        self.original_insertion_mode = Some(self.insertion_mode);

        // STEP 4: "Then, switch the insertion mode to "text"."
        self.insertion_mode = InsertionMode::Text;
        Ok(())
    }

    /// [§ 13.2.9 The end](https://html.spec.whatwg.org/multipage/parsing.html#stop-parsing)
    ///
    /// "Pop all the nodes off the stack of open elements."
    pub(in crate::parser) fn stop_parsing(&mut self) {
        debug!(
            target: "arbor::tree",
            "stop parsing after {} tokens with {} parse errors",
            self.token_index + 1,
            self.errors.len()
        );
        self.open_elements.clear();
        self.stopped = true;
    }

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    fn handle_initial_mode(&mut self, token: &Token) -> ConstructResult {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Character { data } if is_whitespace(*data) => Ok(()),

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => self.insert_comment(data, Some(NodeId::ROOT)),

            // "A DOCTYPE token"
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                // "If the DOCTYPE token's name is not "html", or the token's
                // public identifier is not missing, or the token's system
                // identifier is neither missing nor "about:legacy-compat",
                // then there is a parse error."
                if name.as_deref() != Some("html")
                    || public_identifier.is_some()
                    || system_identifier
                        .as_deref()
                        .is_some_and(|id| id != "about:legacy-compat")
                {
                    self.parse_error(ParseErrorKind::MalformedDoctype)?;
                }

                // "Append a DocumentType node to the Document node, with its
                // name set to the name given in the DOCTYPE token, or the
                // empty string if the name was missing; its public ID set to
                // the public identifier given in the DOCTYPE token, or the
                // empty string if the public identifier was missing; and its
                // system ID set to the system identifier given in the DOCTYPE
                // token, or the empty string if the system identifier was
                // missing."
                let doctype = self.tree.create_document_type(
                    name.as_deref().unwrap_or_default(),
                    public_identifier.as_deref().unwrap_or_default(),
                    system_identifier.as_deref().unwrap_or_default(),
                );
                let _ = self.tree.append_child(NodeId::ROOT, doctype)?;

                // "Then, if the document is not an iframe srcdoc document,
                // and the parser cannot change the mode flag is false, and
                // the DOCTYPE token matches one of the conditions in the
                // following list, then set the Document to quirks mode"
                if !self.options.iframe_srcdoc {
                    self.tree.set_quirks_mode(quirks_mode_for_doctype(
                        name.as_deref(),
                        public_identifier.as_deref(),
                        system_identifier.as_deref(),
                        *force_quirks,
                    ));
                }

                // "Then, switch the insertion mode to "before html"."
                self.insertion_mode = InsertionMode::BeforeHtml;
                Ok(())
            }

            // "Anything else"
            _ => {
                // "If the document is not an iframe srcdoc document, then this
                // is a parse error; if the parser cannot change the mode flag
                // is false, set the Document to quirks mode."
                if !self.options.iframe_srcdoc {
                    self.parse_error(ParseErrorKind::MissingDoctype)?;
                    self.tree.set_quirks_mode(QuirksMode::Quirks);
                }

                // "In any case, switch the insertion mode to "before html",
                // then reprocess the token."
                self.insertion_mode = InsertionMode::BeforeHtml;
                self.process_token(token)
            }
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    fn handle_before_html_mode(&mut self, token: &Token) -> ConstructResult {
        match token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorKind::UnexpectedDoctype),

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => self.insert_comment(data, Some(NodeId::ROOT)),

            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Character { data } if is_whitespace(*data) => Ok(()),

            // "A start tag whose tag name is "html""
            // "Create an element for the token in the HTML namespace, with
            // the Document as the intended parent. Append it to the Document
            // object. Put this element in the stack of open elements."
            // "Switch the insertion mode to "before head"."
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                let html = self.create_element_for_token(name, attributes, Namespace::Html);
                let _ = self.tree.append_child(NodeId::ROOT, html)?;
                self.open_elements.push(html);
                self.insertion_mode = InsertionMode::BeforeHead;
                Ok(())
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { name } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.parse_error(ParseErrorKind::UnexpectedEndTag)
            }

            // "An end tag whose tag name is one of: "head", "body", "html",
            // "br"" / "Anything else"
            // "Create an html element whose node document is the Document
            // object. Append it to the Document object. Put this element in
            // the stack of open elements."
            // "Switch the insertion mode to "before head", then reprocess the
            // token."
            _ => {
                let html = self.create_element_for_token("html", &[], Namespace::Html);
                let _ = self.tree.append_child(NodeId::ROOT, html)?;
                self.open_elements.push(html);
                self.insertion_mode = InsertionMode::BeforeHead;
                self.process_token(token)
            }
        }
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    fn handle_before_head_mode(&mut self, token: &Token) -> ConstructResult {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Character { data } if is_whitespace(*data) => Ok(()),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorKind::UnexpectedDoctype),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules_for(InsertionMode::InBody, token)
            }

            // "A start tag whose tag name is "head""
            // "Insert an HTML element for the token."
            // "Set the head element pointer to the newly created head
            // element."
            // "Switch the insertion mode to "in head"."
            Token::StartTag { name, .. } if name == "head" => {
                let head = self.insert_html_element(token)?;
                self.head_element_pointer = Some(head);
                self.insertion_mode = InsertionMode::InHead;
                Ok(())
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { name } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.parse_error(ParseErrorKind::UnexpectedEndTag)
            }

            // "An end tag whose tag name is one of: "head", "body", "html",
            // "br"" / "Anything else"
            // "Insert an HTML element for a "head" start tag token with no
            // attributes."
            // "Set the head element pointer to the newly created head
            // element."
            // "Switch the insertion mode to "in head"."
            // "Reprocess the current token."
            _ => {
                let head = self.insert_html_element_named("head")?;
                self.head_element_pointer = Some(head);
                self.insertion_mode = InsertionMode::InHead;
                self.process_token(token)
            }
        }
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(in crate::parser) fn handle_in_head_mode(&mut self, token: &Token) -> ConstructResult {
        match token {
            // Whitespace before the body is dropped rather than inserted.
            Token::Character { data } if is_whitespace(*data) => Ok(()),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorKind::UnexpectedDoctype),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules_for(InsertionMode::InBody, token)
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link""
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            //
            // "A start tag whose tag name is "meta"" is handled the same way;
            // encoding changes are the byte stream decoder's concern.
            Token::StartTag { name, .. }
                if matches!(name.as_str(), "base" | "basefont" | "bgsound" | "link" | "meta") =>
            {
                self.insert_void_element(token)
            }

            // "A start tag whose tag name is "title""
            // "Follow the generic RCDATA element parsing algorithm."
            Token::StartTag { name, .. } if name == "title" => {
                self.parse_text_only_element(token, TokenizerState::Rcdata)
            }

            // "A start tag whose tag name is "noscript", if the scripting flag
            // is enabled"
            // "A start tag whose tag name is one of: "noframes", "style""
            // "Follow the generic raw text element parsing algorithm."
            Token::StartTag { name, .. }
                if (name == "noscript" && self.options.scripting)
                    || name == "noframes"
                    || name == "style" =>
            {
                self.parse_text_only_element(token, TokenizerState::Rawtext)
            }

            // "A start tag whose tag name is "noscript", if the scripting flag
            // is disabled"
            // "Insert an HTML element for the token."
            // "Switch the insertion mode to "in head noscript"."
            Token::StartTag { name, .. } if name == "noscript" => {
                let _ = self.insert_html_element(token)?;
                self.insertion_mode = InsertionMode::InHeadNoscript;
                Ok(())
            }

            // "A start tag whose tag name is "script""
            Token::StartTag { name, .. } if name == "script" => {
                // STEP 1-5: "Let the adjusted insertion location be the
                //           appropriate place for inserting a node." ...
                //           "Insert the newly created element at the
                //           adjusted insertion location."
                // STEP 6: "Push the element onto the stack of open elements so
                //          that it is the new current node."
                let _ = self.insert_html_element(token)?;

                // STEP 7: "Switch the tokenizer to the script data state."
                self.pending_tokenizer_state = Some(TokenizerState::ScriptData);

                // STEP 8: "Set the original insertion mode to the current
                //          insertion mode."
                self.original_insertion_mode = Some(self.insertion_mode);

                // STEP 9: "Switch the insertion mode to "text"."
                self.insertion_mode = InsertionMode::Text;
                Ok(())
            }

            // "An end tag whose tag name is "head""
            // "Pop the current node (which will be the head element) off the
            // stack of open elements."
            // "Switch the insertion mode to "after head"."
            Token::EndTag { name } if name == "head" => {
                let _ = self.open_elements.pop();
                self.insertion_mode = InsertionMode::AfterHead;
                Ok(())
            }

            // "A start tag whose tag name is "template""
            // "An end tag whose tag name is "template""
            Token::StartTag { name, .. } | Token::EndTag { name } if name == "template" => {
                Err(self.unsupported(token))
            }

            // "A start tag whose tag name is "head""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error(ParseErrorKind::UnexpectedStartTag)
            }
            Token::EndTag { name } if !matches!(name.as_str(), "body" | "html" | "br") => {
                self.parse_error(ParseErrorKind::UnexpectedEndTag)
            }

            // "An end tag whose tag name is one of: "body", "html", "br"" /
            // "Anything else"
            // "Pop the current node (which will be the head element) off the
            // stack of open elements."
            // "Switch the insertion mode to "after head"."
            // "Reprocess the token."
            _ => {
                let _ = self.open_elements.pop();
                self.insertion_mode = InsertionMode::AfterHead;
                self.process_token(token)
            }
        }
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    fn handle_in_head_noscript_mode(&mut self, token: &Token) -> ConstructResult {
        match token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorKind::UnexpectedDoctype),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules_for(InsertionMode::InBody, token)
            }

            // "An end tag whose tag name is "noscript""
            // "Pop the current node (which will be a noscript element) from
            // the stack of open elements; the new current node will be a head
            // element."
            // "Switch the insertion mode to "in head"."
            Token::EndTag { name } if name == "noscript" => {
                let _ = self.open_elements.pop();
                self.insertion_mode = InsertionMode::InHead;
                Ok(())
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "A comment token"
            // "A start tag whose tag name is one of: "basefont", "bgsound",
            // "link", "meta", "noframes", "style""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            Token::Character { data } if is_whitespace(*data) => {
                self.process_using_rules_for(InsertionMode::InHead, token)
            }
            Token::Comment { .. } => self.process_using_rules_for(InsertionMode::InHead, token),
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                ) =>
            {
                self.process_using_rules_for(InsertionMode::InHead, token)
            }

            // "A start tag whose tag name is one of: "head", "noscript""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" || name == "noscript" => {
                self.parse_error(ParseErrorKind::UnexpectedStartTag)
            }
            Token::EndTag { name } if name != "br" => {
                self.parse_error(ParseErrorKind::UnexpectedEndTag)
            }

            // "An end tag whose tag name is "br"" / "Anything else"
            // "Parse error."
            // "Pop the current node (which will be a noscript element) from
            // the stack of open elements; the new current node will be a head
            // element."
            // "Switch the insertion mode to "in head"."
            // "Reprocess the token."
            _ => {
                self.unexpected(token)?;
                let _ = self.open_elements.pop();
                self.insertion_mode = InsertionMode::InHead;
                self.process_token(token)
            }
        }
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    fn handle_after_head_mode(&mut self, token: &Token) -> ConstructResult {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Insert the character."
            Token::Character { data } if is_whitespace(*data) => self.insert_character(*data),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorKind::UnexpectedDoctype),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules_for(InsertionMode::InBody, token)
            }

            // "A start tag whose tag name is "body""
            // "Insert an HTML element for the token."
            // "Set the frameset-ok flag to "not ok"."
            // "Switch the insertion mode to "in body"."
            Token::StartTag { name, .. } if name == "body" => {
                let _ = self.insert_html_element(token)?;
                self.frameset_ok = false;
                self.insertion_mode = InsertionMode::InBody;
                Ok(())
            }

            // "A start tag whose tag name is "frameset""
            Token::StartTag { name, .. } if name == "frameset" => Err(self.unsupported(token)),

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "base"
                        | "basefont"
                        | "bgsound"
                        | "link"
                        | "meta"
                        | "noframes"
                        | "script"
                        | "style"
                        | "template"
                        | "title"
                ) =>
            {
                // "Parse error."
                self.parse_error(ParseErrorKind::UnexpectedStartTag)?;

                // "Push the node pointed to by the head element pointer onto
                // the stack of open elements."
                let head = self
                    .head_element_pointer
                    .ok_or(TreeConstructionError::InvariantViolation(
                        "head element pointer unset after the head",
                    ))?;
                self.open_elements.push(head);

                // "Process the token using the rules for the "in head"
                // insertion mode."
                let result = self.process_using_rules_for(InsertionMode::InHead, token);

                // "Remove the node pointed to by the head element pointer from
                // the stack of open elements. (It might not be the current
                // node at this point.)"
                let _ = self.open_elements.remove(head);
                result
            }

            // "An end tag whose tag name is "template""
            Token::EndTag { name } if name == "template" => {
                self.process_using_rules_for(InsertionMode::InHead, token)
            }

            // "A start tag whose tag name is "head""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error(ParseErrorKind::UnexpectedStartTag)
            }
            Token::EndTag { name } if !matches!(name.as_str(), "body" | "html" | "br") => {
                self.parse_error(ParseErrorKind::UnexpectedEndTag)
            }

            // "An end tag whose tag name is one of: "body", "html", "br"" /
            // "Anything else"
            // "Insert an HTML element for a "body" start tag token with no
            // attributes."
            // "Switch the insertion mode to "in body"."
            // "Reprocess the current token."
            _ => {
                let _ = self.insert_html_element_named("body")?;
                self.insertion_mode = InsertionMode::InBody;
                self.process_token(token)
            }
        }
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    fn handle_text_mode(&mut self, token: &Token) -> ConstructResult {
        match token {
            // "A character token"
            // "Insert the token's character."
            Token::Character { data } => self.insert_character(*data),

            // "An end-of-file token"
            // "Parse error."
            // "Pop the current node off the stack of open elements."
            // "Switch the insertion mode to the original insertion mode and
            // reprocess the token."
            Token::EndOfFile => {
                self.parse_error(ParseErrorKind::UnexpectedEndOfFile)?;
                let _ = self.open_elements.pop();
                self.restore_original_insertion_mode()?;
                self.process_token(token)
            }

            // "An end tag whose tag name is "script""
            // "Any other end tag"
            // "Pop the current node off the stack of open elements."
            // "Switch the insertion mode to the original insertion mode."
            //
            // Scripts are not run.
            Token::EndTag { .. } => {
                let _ = self.open_elements.pop();
                self.restore_original_insertion_mode()
            }

            // The tokenizer cannot emit anything else in the RCDATA, RAWTEXT,
            // script data or PLAINTEXT states.
            _ => Err(self.unsupported(token)),
        }
    }

    fn restore_original_insertion_mode(&mut self) -> ConstructResult {
        self.insertion_mode = self.original_insertion_mode.take().ok_or(
            TreeConstructionError::InvariantViolation("text mode without an original insertion mode"),
        )?;
        Ok(())
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    fn handle_after_body_mode(&mut self, token: &Token) -> ConstructResult {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::Character { data } if is_whitespace(*data) => {
                self.process_using_rules_for(InsertionMode::InBody, token)
            }

            // "A comment token"
            // "Insert a comment as the last child of the first element in the
            // stack of open elements (the html element)."
            Token::Comment { data } => {
                let html = self
                    .open_elements
                    .first()
                    .ok_or(TreeConstructionError::InvariantViolation(
                        "no html element after the body",
                    ))?;
                self.insert_comment(data, Some(html))
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorKind::UnexpectedDoctype),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules_for(InsertionMode::InBody, token)
            }

            // "An end tag whose tag name is "html""
            // "Switch the insertion mode to "after after body"."
            Token::EndTag { name } if name == "html" => {
                self.insertion_mode = InsertionMode::AfterAfterBody;
                Ok(())
            }

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => {
                self.stop_parsing();
                Ok(())
            }

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token."
            _ => {
                self.unexpected(token)?;
                self.insertion_mode = InsertionMode::InBody;
                self.process_token(token)
            }
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    fn handle_after_after_body_mode(&mut self, token: &Token) -> ConstructResult {
        match token {
            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => self.insert_comment(data, Some(NodeId::ROOT)),

            // "A DOCTYPE token"
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::Doctype { .. } => self.process_using_rules_for(InsertionMode::InBody, token),
            Token::Character { data } if is_whitespace(*data) => {
                self.process_using_rules_for(InsertionMode::InBody, token)
            }
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules_for(InsertionMode::InBody, token)
            }

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => {
                self.stop_parsing();
                Ok(())
            }

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token."
            _ => {
                self.unexpected(token)?;
                self.insertion_mode = InsertionMode::InBody;
                self.process_token(token)
            }
        }
    }

    /// Insert a void element and pop it straight away, acknowledging the
    /// self-closing flag.
    pub(in crate::parser) fn insert_void_element(&mut self, token: &Token) -> ConstructResult {
        let _ = self.insert_html_element(token)?;
        let _ = self.open_elements.pop();
        self.acknowledge_self_closing_flag();
        Ok(())
    }
}

/// "U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF), U+000C FORM FEED
/// (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
pub(in crate::parser) const fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    const BUILT_MODES: &[InsertionMode] = &[
        InsertionMode::Initial,
        InsertionMode::BeforeHtml,
        InsertionMode::BeforeHead,
        InsertionMode::InHead,
        InsertionMode::InHeadNoscript,
        InsertionMode::AfterHead,
        InsertionMode::InBody,
        InsertionMode::Text,
        InsertionMode::AfterBody,
        InsertionMode::AfterAfterBody,
    ];

    #[test]
    fn unbuilt_modes_report_unsupported_input() {
        for mode in InsertionMode::iter().filter(|m| !BUILT_MODES.contains(m)) {
            let mut constructor = TreeConstructor::new();
            constructor.insertion_mode = mode;
            let result = constructor.run_tokens(vec![Token::comment("x")]);
            assert_eq!(
                result,
                Err(TreeConstructionError::UnsupportedInput {
                    mode,
                    token: Token::comment("x"),
                }),
                "{mode}"
            );
        }
    }

    #[test]
    fn line_feed_after_pre_is_skipped_once() {
        let mut constructor = TreeConstructor::new();
        constructor.ignore_next_line_feed = true;
        constructor
            .run_tokens(vec![Token::character('\n'), Token::character('\n')])
            .unwrap();
        // The first line feed is dropped; the second one is whitespace in
        // the "initial" mode and ignored there.
        assert_eq!(constructor.token_index, 2);
        assert!(!constructor.ignore_next_line_feed);
        assert!(constructor.parse_errors().is_empty());
    }

    #[test]
    fn whitespace_matches_html_definition() {
        for c in ['\t', '\n', '\x0C', '\r', ' '] {
            assert!(is_whitespace(c));
        }
        assert!(!is_whitespace('\u{A0}'));
        assert!(!is_whitespace('\x0B'));
    }
}

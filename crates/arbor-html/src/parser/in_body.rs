//! [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)

use arbor_dom::{ElementData, Namespace, NodeId};

use super::core::{ConstructResult, InsertionMode, TreeConstructor, is_whitespace};
use super::error::{ParseErrorKind, TreeConstructionError};
use super::open_elements::Scope;
use crate::source::TokenizerState;
use crate::token::Token;

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// "A start tag whose tag name is one of: "address", "article", "aside",
/// "blockquote", "center", "details", "dialog", "dir", "div", "dl",
/// "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "main",
/// "menu", "nav", "ol", "p", "search", "section", "summary", "ul""
fn is_block_start_tag(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "center"
            | "details"
            | "dialog"
            | "dir"
            | "div"
            | "dl"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "header"
            | "hgroup"
            | "main"
            | "menu"
            | "nav"
            | "ol"
            | "p"
            | "search"
            | "section"
            | "summary"
            | "ul"
    )
}

/// "An end tag whose tag name is one of: "address", "article", "aside",
/// "blockquote", "button", "center", "details", "dialog", "dir", "div",
/// "dl", "fieldset", "figcaption", "figure", "footer", "header", "hgroup",
/// "listing", "main", "menu", "nav", "ol", "pre", "search", "section",
/// "summary", "ul""
fn is_block_end_tag(name: &str) -> bool {
    (is_block_start_tag(name) && name != "p") || matches!(name, "button" | "listing" | "pre")
}

/// The formatting elements: "a", "b", "big", "code", "em", "font", "i",
/// "nobr", "s", "small", "strike", "strong", "tt", "u".
fn is_formatting_tag(name: &str) -> bool {
    matches!(
        name,
        "a" | "b"
            | "big"
            | "code"
            | "em"
            | "font"
            | "i"
            | "nobr"
            | "s"
            | "small"
            | "strike"
            | "strong"
            | "tt"
            | "u"
    )
}

/// Elements that push a marker onto the list of active formatting elements
/// when they are inserted in body: "applet", "marquee", "object" and
/// "template".
fn is_marker_tag(name: &str) -> bool {
    matches!(name, "applet" | "marquee" | "object" | "template")
}

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// "The following elements have varying levels of special parsing rules"
fn is_special(element: &ElementData) -> bool {
    let name = element.local_name.as_str();
    match element.namespace {
        Namespace::Html => matches!(
            name,
            "address"
                | "applet"
                | "area"
                | "article"
                | "aside"
                | "base"
                | "basefont"
                | "bgsound"
                | "blockquote"
                | "body"
                | "br"
                | "button"
                | "caption"
                | "center"
                | "col"
                | "colgroup"
                | "dd"
                | "details"
                | "dir"
                | "div"
                | "dl"
                | "dt"
                | "embed"
                | "fieldset"
                | "figcaption"
                | "figure"
                | "footer"
                | "form"
                | "frame"
                | "frameset"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "head"
                | "header"
                | "hgroup"
                | "hr"
                | "html"
                | "iframe"
                | "img"
                | "input"
                | "keygen"
                | "li"
                | "link"
                | "listing"
                | "main"
                | "marquee"
                | "menu"
                | "meta"
                | "nav"
                | "noembed"
                | "noframes"
                | "noscript"
                | "object"
                | "ol"
                | "p"
                | "param"
                | "plaintext"
                | "pre"
                | "script"
                | "search"
                | "section"
                | "select"
                | "source"
                | "style"
                | "summary"
                | "table"
                | "tbody"
                | "td"
                | "template"
                | "textarea"
                | "tfoot"
                | "th"
                | "thead"
                | "title"
                | "tr"
                | "track"
                | "ul"
                | "wbr"
                | "xmp"
        ),
        Namespace::MathMl => matches!(name, "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"),
        Namespace::Svg => matches!(name, "foreignObject" | "desc" | "title"),
        _ => false,
    }
}

/// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
///
/// "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc"
fn has_implied_end_tag(element: &ElementData) -> bool {
    element.namespace == Namespace::Html
        && matches!(
            element.local_name.as_str(),
            "dd" | "dt" | "li" | "optgroup" | "option" | "p" | "rb" | "rp" | "rt" | "rtc"
        )
}

/// Elements that may still be open at the end of the body without a parse
/// error: "a dd element, a dt element, an li element, an optgroup element,
/// an option element, a p element, an rb element, an rp element, an rt
/// element, an rtc element, a tbody element, a td element, a tfoot element,
/// a th element, a thead element, a tr element, the body element, or the
/// html element"
fn may_be_left_open(element: &ElementData) -> bool {
    has_implied_end_tag(element)
        || (element.namespace == Namespace::Html
            && matches!(
                element.local_name.as_str(),
                "tbody" | "td" | "tfoot" | "th" | "thead" | "tr" | "body" | "html"
            ))
}

impl TreeConstructor {
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// The list of active formatting elements is not kept. Formatting
    /// elements are inserted as ordinary elements and only leave the stack
    /// through their own end tag, so nothing needs reconstructing before
    /// character and element insertion. Input that would pop one any other
    /// way is reported as unsupported.
    pub(in crate::parser) fn handle_in_body_mode(&mut self, token: &Token) -> ConstructResult {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::Character { data: '\0' } => {
                self.parse_error(ParseErrorKind::UnexpectedNullCharacter)
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Insert the token's character."
            Token::Character { data } if is_whitespace(*data) => self.insert_character(*data),

            // "Any other character token"
            // "Insert the token's character."
            // "Set the frameset-ok flag to "not ok"."
            Token::Character { data } => {
                self.insert_character(*data)?;
                self.frameset_ok = false;
                Ok(())
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorKind::UnexpectedDoctype),

            Token::StartTag { .. } => self.in_body_start_tag(token),
            Token::EndTag { name } => self.in_body_end_tag(name, token),

            // "An end-of-file token"
            Token::EndOfFile => {
                // "Otherwise, follow these steps: If there is a node in the
                // stack of open elements that is not either a dd element, a
                // dt element, ... the body element, or the html element, then
                // this is a parse error."
                if self.has_element_that_needs_end_tag() {
                    self.parse_error(ParseErrorKind::UnexpectedEndOfFile)?;
                }
                // "Stop parsing."
                self.stop_parsing();
                Ok(())
            }
        }
    }

    fn in_body_start_tag(&mut self, token: &Token) -> ConstructResult {
        let Token::StartTag {
            name,
            self_closing,
            attributes,
        } = token
        else {
            return Err(TreeConstructionError::InvariantViolation(
                "start tag handler called with another token",
            ));
        };

        match name.as_str() {
            // "A start tag whose tag name is "html""
            "html" => {
                // "Parse error."
                self.parse_error(ParseErrorKind::UnexpectedStartTag)?;
                // "If there is a template element on the stack of open
                // elements, then ignore the token."
                if self.open_elements.contains_html(&self.tree, "template") {
                    return Ok(());
                }
                // "Otherwise, for each attribute on the token, check to see if
                // the attribute is already present on the top element of the
                // stack of open elements. If it is not, add the attribute and
                // its corresponding value to that element."
                if let Some(html) = self.open_elements.first() {
                    self.merge_attributes(html, attributes);
                }
                Ok(())
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script" | "style"
            | "template" | "title" => self.process_using_rules_for(InsertionMode::InHead, token),

            // "A start tag whose tag name is "body""
            "body" => {
                // "Parse error."
                self.parse_error(ParseErrorKind::UnexpectedStartTag)?;
                // "If the stack of open elements has only one node on it, if
                // the second element on the stack of open elements is not a
                // body element, or if there is a template element on the stack
                // of open elements, then ignore the token. (fragment case or
                // there is a template element on the stack)"
                let Some(body) = self.second_element_if_body() else {
                    return Ok(());
                };
                if self.open_elements.contains_html(&self.tree, "template") {
                    return Ok(());
                }
                // "Otherwise, set the frameset-ok flag to "not ok"; then, for
                // each attribute on the token, check to see if the attribute
                // is already present on the body element (the second element)
                // on the stack of open elements, and if it is not, add the
                // attribute and its corresponding value to that element."
                self.frameset_ok = false;
                self.merge_attributes(body, attributes);
                Ok(())
            }

            // "A start tag whose tag name is "frameset""
            "frameset" => {
                // "Parse error."
                self.parse_error(ParseErrorKind::UnexpectedStartTag)?;
                // "If the stack of open elements has only one node on it, or
                // if the second element on the stack of open elements is not
                // a body element, then ignore the token."
                // "If the frameset-ok flag is set to "not ok", ignore the
                // token."
                if self.second_element_if_body().is_none() || !self.frameset_ok {
                    return Ok(());
                }
                Err(self.unsupported(token))
            }

            name if is_block_start_tag(name) => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element."
                self.close_p_element_in_button_scope(token)?;
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token)?;
                Ok(())
            }

            // "A start tag whose tag name is one of: "h1", "h2", "h3", "h4",
            // "h5", "h6""
            name if HEADINGS.contains(&name) => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element."
                self.close_p_element_in_button_scope(token)?;
                // "If the current node is an HTML element whose tag name is
                // one of "h1", "h2", "h3", "h4", "h5", or "h6", then this is a
                // parse error; pop the current node off the stack of open
                // elements."
                if HEADINGS.iter().any(|h| self.current_is_html(h)) {
                    self.parse_error(ParseErrorKind::UnexpectedStartTag)?;
                    let _ = self.open_elements.pop();
                }
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token)?;
                Ok(())
            }

            // "A start tag whose tag name is one of: "pre", "listing""
            "pre" | "listing" => {
                self.close_p_element_in_button_scope(token)?;
                let _ = self.insert_html_element(token)?;
                // "If the next token is a U+000A LINE FEED (LF) character
                // token, then ignore that token and move on to the next one.
                // (Newlines at the start of pre blocks are ignored as an
                // authoring convenience.)"
                self.ignore_next_line_feed = true;
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                Ok(())
            }

            // "A start tag whose tag name is "form""
            "form" => {
                let has_template = self.open_elements.contains_html(&self.tree, "template");
                // "If the form element pointer is not null, and there is no
                // template element on the stack of open elements, then this is
                // a parse error; ignore the token."
                if self.form_element_pointer.is_some() && !has_template {
                    return self.parse_error(ParseErrorKind::UnexpectedStartTag);
                }
                // "Otherwise: If the stack of open elements has a p element in
                // button scope, then close a p element."
                self.close_p_element_in_button_scope(token)?;
                // "Insert an HTML element for the token, and, if there is no
                // template element on the stack of open elements, set the form
                // element pointer to point to the element created."
                let form = self.insert_html_element(token)?;
                if !has_template {
                    self.form_element_pointer = Some(form);
                }
                Ok(())
            }

            // "A start tag whose tag name is "li""
            "li" => self.start_list_item(token, &["li"]),

            // "A start tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => self.start_list_item(token, &["dd", "dt"]),

            // "A start tag whose tag name is "plaintext""
            "plaintext" => {
                self.close_p_element_in_button_scope(token)?;
                let _ = self.insert_html_element(token)?;
                // "Switch the tokenizer to the PLAINTEXT state."
                self.pending_tokenizer_state = Some(TokenizerState::Plaintext);
                Ok(())
            }

            // "A start tag whose tag name is "button""
            "button" => {
                // "If the stack of open elements has a button element in
                // scope, then run these substeps:"
                if self.open_elements.has_in_scope(&self.tree, "button", Scope::Default) {
                    // "Parse error."
                    self.parse_error(ParseErrorKind::UnexpectedStartTag)?;
                    self.ensure_pop_keeps_formatting(&["button"], token)?;
                    // "Generate implied end tags."
                    self.generate_implied_end_tags(None);
                    // "Pop elements from the stack of open elements until a
                    // button element has been popped from the stack."
                    self.open_elements.pop_until_tag(&self.tree, "button");
                }
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token)?;
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                Ok(())
            }

            // "A start tag whose tag name is "a""
            "a" => {
                // "If the list of active formatting elements contains an a
                // element between the end of the list and the last marker on
                // the list (or the start of the list if there is no marker on
                // the list), then this is a parse error; run the adoption
                // agency algorithm for the token, then remove that element
                // from the list of active formatting elements and the stack
                // of open elements if the adoption agency algorithm didn't
                // already remove it (it might not have if the element is not
                // in table scope)."
                if self.has_open_a_after_last_marker() {
                    return Err(self.unsupported(token));
                }
                let _ = self.insert_html_element(token)?;
                Ok(())
            }

            // "A start tag whose tag name is "nobr""
            "nobr" => {
                // "If the stack of open elements has a nobr element in scope,
                // then this is a parse error; run the adoption agency
                // algorithm for the token, then once again reconstruct the
                // active formatting elements, if any."
                if self.open_elements.has_in_scope(&self.tree, "nobr", Scope::Default) {
                    return Err(self.unsupported(token));
                }
                let _ = self.insert_html_element(token)?;
                Ok(())
            }

            // "A start tag whose tag name is one of: "b", "big", "code",
            // "em", "font", "i", "s", "small", "strike", "strong", "tt", "u""
            name if is_formatting_tag(name) => {
                let _ = self.insert_html_element(token)?;
                Ok(())
            }

            // "A start tag whose tag name is one of: "applet", "marquee",
            // "object""
            "applet" | "marquee" | "object" => {
                let _ = self.insert_html_element(token)?;
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                Ok(())
            }

            // "A start tag whose tag name is "table""
            "table" => Err(self.unsupported(token)),

            // "A start tag whose tag name is one of: "area", "br", "embed",
            // "img", "keygen", "wbr""
            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                self.insert_void_element(token)?;
                self.frameset_ok = false;
                Ok(())
            }

            // "A start tag whose tag name is "input""
            "input" => {
                self.insert_void_element(token)?;
                // "If the token does not have an attribute with the name
                // "type", or if it does, but that attribute's value is not an
                // ASCII case-insensitive match for the string "hidden", then:
                // set the frameset-ok flag to "not ok"."
                let hidden = attributes
                    .iter()
                    .find(|a| a.name == "type")
                    .is_some_and(|a| a.value.eq_ignore_ascii_case("hidden"));
                if !hidden {
                    self.frameset_ok = false;
                }
                Ok(())
            }

            // "A start tag whose tag name is one of: "param", "source",
            // "track""
            "param" | "source" | "track" => self.insert_void_element(token),

            // "A start tag whose tag name is "hr""
            "hr" => {
                self.close_p_element_in_button_scope(token)?;
                self.insert_void_element(token)?;
                self.frameset_ok = false;
                Ok(())
            }

            // "A start tag whose tag name is "image""
            // "Parse error. Change the token's tag name to "img" and
            // reprocess it. (Don't ask.)"
            "image" => {
                self.parse_error(ParseErrorKind::UnexpectedStartTag)?;
                let img = Token::StartTag {
                    name: "img".to_string(),
                    self_closing: *self_closing,
                    attributes: attributes.clone(),
                };
                self.process_token(&img)
            }

            // "A start tag whose tag name is "textarea""
            "textarea" => {
                // STEP 1: "Insert an HTML element for the token."
                let _ = self.insert_html_element(token)?;
                // STEP 2: "If the next token is a U+000A LINE FEED (LF)
                //          character token, then ignore that token and move on
                //          to the next one."
                self.ignore_next_line_feed = true;
                // STEP 3: "Switch the tokenizer to the RCDATA state."
                self.pending_tokenizer_state = Some(TokenizerState::Rcdata);
                // STEP 4: "Set the original insertion mode to the current
                //          insertion mode."
                self.original_insertion_mode = Some(self.insertion_mode);
                // STEP 5: "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                // STEP 6: "Switch the insertion mode to "text"."
                self.insertion_mode = InsertionMode::Text;
                Ok(())
            }

            // "A start tag whose tag name is "xmp""
            "xmp" => {
                self.close_p_element_in_button_scope(token)?;
                self.frameset_ok = false;
                // "Follow the generic raw text element parsing algorithm."
                self.parse_text_only_element(token, TokenizerState::Rawtext)
            }

            // "A start tag whose tag name is "iframe""
            "iframe" => {
                self.frameset_ok = false;
                self.parse_text_only_element(token, TokenizerState::Rawtext)
            }

            // "A start tag whose tag name is "noembed""
            // "A start tag whose tag name is "noscript", if the scripting flag
            // is enabled"
            "noembed" => self.parse_text_only_element(token, TokenizerState::Rawtext),
            "noscript" if self.options.scripting => {
                self.parse_text_only_element(token, TokenizerState::Rawtext)
            }

            // "A start tag whose tag name is "select""
            "select" => Err(self.unsupported(token)),

            // "A start tag whose tag name is one of: "optgroup", "option""
            "optgroup" | "option" => {
                // "If the current node is an option element, then pop the
                // current node off the stack of open elements."
                if self.current_is_html("option") {
                    let _ = self.open_elements.pop();
                }
                let _ = self.insert_html_element(token)?;
                Ok(())
            }

            // "A start tag whose tag name is one of: "rb", "rtc""
            "rb" | "rtc" => {
                // "If the stack of open elements has a ruby element in scope,
                // then generate implied end tags. If the current node is not
                // now a ruby element, this is a parse error."
                if self.open_elements.has_in_scope(&self.tree, "ruby", Scope::Default) {
                    self.generate_implied_end_tags(None);
                    if !self.current_is_html("ruby") {
                        self.parse_error(ParseErrorKind::UnexpectedStartTag)?;
                    }
                }
                let _ = self.insert_html_element(token)?;
                Ok(())
            }

            // "A start tag whose tag name is one of: "rp", "rt""
            "rp" | "rt" => {
                // "If the stack of open elements has a ruby element in scope,
                // then generate implied end tags, except for rtc elements. If
                // the current node is not now a rtc element or a ruby element,
                // this is a parse error."
                if self.open_elements.has_in_scope(&self.tree, "ruby", Scope::Default) {
                    self.generate_implied_end_tags(Some("rtc"));
                    if !(self.current_is_html("rtc") || self.current_is_html("ruby")) {
                        self.parse_error(ParseErrorKind::UnexpectedStartTag)?;
                    }
                }
                let _ = self.insert_html_element(token)?;
                Ok(())
            }

            // "A start tag whose tag name is "math""
            "math" => self.insert_foreign_element_for_token(token, Namespace::MathMl),

            // "A start tag whose tag name is "svg""
            "svg" => self.insert_foreign_element_for_token(token, Namespace::Svg),

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "frame", "head", "tbody", "td", "tfoot", "th",
            // "thead", "tr""
            // "Parse error. Ignore the token."
            "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot" | "th"
            | "thead" | "tr" => self.parse_error(ParseErrorKind::UnexpectedStartTag),

            // "Any other start tag"
            // "Insert an HTML element for the token."
            _ => {
                let _ = self.insert_html_element(token)?;
                Ok(())
            }
        }
    }

    fn in_body_end_tag(&mut self, tag_name: &str, token: &Token) -> ConstructResult {
        match tag_name {
            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            "template" => self.process_using_rules_for(InsertionMode::InHead, token),

            // "An end tag whose tag name is "body""
            "body" => {
                let _ = self.close_body()?;
                Ok(())
            }

            // "An end tag whose tag name is "html""
            "html" => {
                // "If the stack of open elements does not have a body element
                // in scope, this is a parse error; ignore the token."
                if !self.close_body()? {
                    return Ok(());
                }
                // "Reprocess the token."
                self.process_token(token)
            }

            name if is_block_end_tag(name) => {
                self.close_element_in_scope(name, Scope::Default, false, token)
            }

            // "An end tag whose tag name is "form""
            "form" => {
                // "Let node be the element that the form element pointer is
                // set to, or null if it is not set to an element."
                // "Set the form element pointer to null."
                let node = self.form_element_pointer.take();
                match node {
                    // "If node is null or the stack of open elements does not
                    // have node in scope, then this is a parse error; return
                    // and ignore the token."
                    Some(node) if self.open_elements.has_node_in_scope(&self.tree, node) => {
                        // "Generate implied end tags."
                        self.generate_implied_end_tags(None);
                        // "If the current node is not node, then this is a
                        // parse error."
                        if self.open_elements.current() != Some(node) {
                            self.parse_error(ParseErrorKind::MisnestedTag)?;
                        }
                        // "Remove node from the stack of open elements."
                        let _ = self.open_elements.remove(node);
                        Ok(())
                    }
                    _ => self.parse_error(ParseErrorKind::UnexpectedEndTag),
                }
            }

            // "An end tag whose tag name is "p""
            "p" => {
                // "If the stack of open elements does not have a p element in
                // button scope, then this is a parse error; insert an HTML
                // element for a "p" start tag token with no attributes."
                if !self.open_elements.has_in_scope(&self.tree, "p", Scope::Button) {
                    self.parse_error(ParseErrorKind::UnexpectedEndTag)?;
                    let _ = self.insert_html_element_named("p")?;
                }
                // "Close a p element."
                self.close_p_element(token)
            }

            // "An end tag whose tag name is "li""
            "li" => self.close_element_in_scope("li", Scope::ListItem, true, token),

            // "An end tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => self.close_element_in_scope(tag_name, Scope::Default, true, token),

            // "An end tag whose tag name is one of: "h1", "h2", "h3", "h4",
            // "h5", "h6""
            name if HEADINGS.contains(&name) => {
                // "If the stack of open elements does not have an element in
                // scope that is an HTML element and whose tag name is one of
                // "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
                // error; ignore the token."
                if !self
                    .open_elements
                    .has_one_of_in_scope(&self.tree, HEADINGS, Scope::Default)
                {
                    return self.parse_error(ParseErrorKind::UnexpectedEndTag);
                }
                self.ensure_pop_keeps_formatting(HEADINGS, token)?;
                // "Generate implied end tags."
                self.generate_implied_end_tags(None);
                // "If the current node is not an HTML element with the same
                // tag name as that of the token, then this is a parse error."
                if !self.current_is_html(name) {
                    self.parse_error(ParseErrorKind::MisnestedTag)?;
                }
                // "Pop elements from the stack of open elements until an HTML
                // element whose tag name is one of "h1", "h2", "h3", "h4",
                // "h5", or "h6" has been popped from the stack."
                self.open_elements.pop_until_one_of(&self.tree, HEADINGS);
                Ok(())
            }

            // "An end tag whose tag name is one of: "a", "b", "big", "code",
            // "em", "font", "i", "nobr", "s", "small", "strike", "strong",
            // "tt", "u""
            // "Run the adoption agency algorithm for the token."
            name if is_formatting_tag(name) => self.close_formatting_element(name, token),

            // "An end tag token whose tag name is one of: "applet",
            // "marquee", "object""
            "applet" | "marquee" | "object" => {
                self.close_element_in_scope(tag_name, Scope::Default, false, token)
            }

            // "An end tag whose tag name is "br""
            // "Parse error. Drop the attributes from the token, and act as
            // described in the next entry; i.e. act as if this was a "br"
            // start tag token with no attributes, rather than the end tag
            // token that it actually is."
            "br" => {
                self.parse_error(ParseErrorKind::UnexpectedEndTag)?;
                let _ = self.insert_html_element_named("br")?;
                let _ = self.open_elements.pop();
                self.frameset_ok = false;
                Ok(())
            }

            // "Any other end tag"
            _ => self.close_any_other_end_tag(tag_name, token),
        }
    }

    /// Shared steps of the `body` and `html` end tags. Returns whether the
    /// insertion mode switched to "after body".
    fn close_body(&mut self) -> ConstructResult<bool> {
        // "If the stack of open elements does not have a body element in
        // scope, this is a parse error; ignore the token."
        if !self.open_elements.has_in_scope(&self.tree, "body", Scope::Default) {
            self.parse_error(ParseErrorKind::UnexpectedEndTag)?;
            return Ok(false);
        }
        // "Otherwise, if there is a node in the stack of open elements that
        // is not either a dd element, a dt element, ... the body element, or
        // the html element, then this is a parse error."
        if self.has_element_that_needs_end_tag() {
            self.parse_error(ParseErrorKind::UnexpectedEndTag)?;
        }
        // "Switch the insertion mode to "after body"."
        self.insertion_mode = InsertionMode::AfterBody;
        Ok(true)
    }

    fn has_element_that_needs_end_tag(&self) -> bool {
        self.open_elements
            .as_slice()
            .iter()
            .filter_map(|&id| self.tree.as_element(id))
            .any(|element| !may_be_left_open(element))
    }

    /// The `body` element when it is the second entry on the stack.
    fn second_element_if_body(&self) -> Option<NodeId> {
        self.open_elements
            .get(1)
            .filter(|&id| self.tree.as_element(id).is_some_and(|e| e.is_html("body")))
    }

    /// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is a dd element, a dt element, an li element,
    /// an optgroup element, an option element, a p element, an rb element,
    /// an rp element, an rt element, or an rtc element, the user agent must
    /// pop the current node off the stack of open elements."
    ///
    /// "If a step requires the UA to generate implied end tags but lists an
    /// element to exclude from the process, then the UA must perform the
    /// above steps as if that element was not in the above list."
    pub(in crate::parser) fn generate_implied_end_tags(&mut self, except: Option<&str>) {
        while self
            .current_element()
            .is_some_and(|e| has_implied_end_tag(e) && except != Some(e.local_name.as_str()))
        {
            let _ = self.open_elements.pop();
        }
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "When the steps above say the user agent is to close a p element, it
    /// means that the user agent must run the following steps:"
    fn close_p_element(&mut self, token: &Token) -> ConstructResult {
        self.ensure_pop_keeps_formatting(&["p"], token)?;
        // STEP 1: "Generate implied end tags, except for p elements."
        self.generate_implied_end_tags(Some("p"));
        // STEP 2: "If the current node is not a p element, then this is a
        //          parse error."
        if !self.current_is_html("p") {
            self.parse_error(ParseErrorKind::MisnestedTag)?;
        }
        // STEP 3: "Pop elements from the stack of open elements until a p
        //          element has been popped from the stack."
        self.open_elements.pop_until_tag(&self.tree, "p");
        Ok(())
    }

    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element."
    fn close_p_element_in_button_scope(&mut self, token: &Token) -> ConstructResult {
        if self.open_elements.has_in_scope(&self.tree, "p", Scope::Button) {
            self.close_p_element(token)?;
        }
        Ok(())
    }

    /// Start tags for `li`, `dd` and `dt`. `closes` lists the elements a new
    /// item implicitly ends.
    fn start_list_item(&mut self, token: &Token, closes: &[&str]) -> ConstructResult {
        // STEP 1: "Set the frameset-ok flag to "not ok"."
        self.frameset_ok = false;

        // STEP 2: "Initialize node to be the current node (the bottommost
        //          node of the stack)."
        for index in (0..self.open_elements.len()).rev() {
            let Some(element) = self
                .open_elements
                .get(index)
                .and_then(|id| self.tree.as_element(id))
            else {
                continue;
            };

            // STEP 3: "Loop: If node is an li element, then run these
            //          substeps:"
            if element.namespace == Namespace::Html && closes.contains(&element.local_name.as_str()) {
                let item = element.local_name.clone();
                self.ensure_no_formatting_below(index, token)?;
                // "Generate implied end tags, except for li elements."
                self.generate_implied_end_tags(Some(&item));
                // "If the current node is not an li element, then this is a
                // parse error."
                if !self.current_is_html(&item) {
                    self.parse_error(ParseErrorKind::MisnestedTag)?;
                }
                // "Pop elements from the stack of open elements until an li
                // element has been popped from the stack."
                self.open_elements.pop_until_tag(&self.tree, &item);
                // "Jump to the step labeled done below."
                break;
            }

            // STEP 4: "If node is in the special category, but is not an
            //          address, div, or p element, then jump to the step
            //          labeled done below."
            if is_special(element)
                && !(element.is_html("address") || element.is_html("div") || element.is_html("p"))
            {
                break;
            }

            // STEP 5: "Otherwise, set node to the previous entry in the stack
            //          of open elements and return to the step labeled loop."
        }

        // STEP 6: "Done: If the stack of open elements has a p element in
        //          button scope, then close a p element."
        self.close_p_element_in_button_scope(token)?;

        // STEP 7: "Finally, insert an HTML element for the token."
        let _ = self.insert_html_element(token)?;
        Ok(())
    }

    /// End tags that close an element found in `scope`: block elements,
    /// `li`, `dd`, `dt`, `applet`, `marquee` and `object`. With
    /// `implied_except_self`, implied end tags are generated "except for"
    /// elements with the token's tag name.
    fn close_element_in_scope(
        &mut self,
        tag_name: &str,
        scope: Scope,
        implied_except_self: bool,
        token: &Token,
    ) -> ConstructResult {
        // "If the stack of open elements does not have an element in scope
        // that is an HTML element with the same tag name as that of the
        // token, then this is a parse error; ignore the token."
        if !self.open_elements.has_in_scope(&self.tree, tag_name, scope) {
            return self.parse_error(ParseErrorKind::UnexpectedEndTag);
        }
        // applet, marquee and object mark the list of active formatting
        // elements and their end tags clear it up to that marker, so the
        // formatting elements opened inside them are never reconstructed.
        if !is_marker_tag(tag_name) {
            self.ensure_pop_keeps_formatting(&[tag_name], token)?;
        }
        // "Generate implied end tags."
        self.generate_implied_end_tags(implied_except_self.then_some(tag_name));
        // "If the current node is not an HTML element with the same tag name
        // as that of the token, then this is a parse error."
        if !self.current_is_html(tag_name) {
            self.parse_error(ParseErrorKind::MisnestedTag)?;
        }
        // "Pop elements from the stack of open elements until an HTML element
        // with the same tag name as the token has been popped from the
        // stack."
        self.open_elements.pop_until_tag(&self.tree, tag_name);
        Ok(())
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
    ///
    /// The parts of the adoption agency algorithm that do not need the list
    /// of active formatting elements. A formatting element that is open but
    /// not the current node would need the full algorithm.
    fn close_formatting_element(&mut self, tag_name: &str, token: &Token) -> ConstructResult {
        // STEP 2: "If the current node is an HTML element whose tag name is
        //          subject, and the current node is not in the list of active
        //          formatting elements, then pop the current node off the
        //          stack of open elements and return."
        if self.current_is_html(tag_name) {
            let _ = self.open_elements.pop();
            return Ok(());
        }
        // STEP 4.3: "If there is no such element, then return and instead act
        //            as described in the "any other end tag" entry above."
        if !self.open_elements.contains_html(&self.tree, tag_name) {
            return self.close_any_other_end_tag(tag_name, token);
        }
        Err(self.unsupported(token))
    }

    /// Fails with unsupported input when popping down to the lowest open
    /// HTML element with one of `tag_names` would pop a formatting element
    /// on the way.
    fn ensure_pop_keeps_formatting(&self, tag_names: &[&str], token: &Token) -> ConstructResult {
        self.open_elements
            .position_of_one_of(&self.tree, tag_names)
            .map_or(Ok(()), |index| self.ensure_no_formatting_below(index, token))
    }

    /// Fails with unsupported input when an HTML formatting element sits
    /// below stack entry `index`. A formatting element popped by anything
    /// but its own end tag stays in the list of active formatting elements
    /// and is reconstructed later, which needs the list.
    fn ensure_no_formatting_below(&self, index: usize, token: &Token) -> ConstructResult {
        let pops_formatting = self
            .open_elements
            .as_slice()
            .iter()
            .skip(index + 1)
            .filter_map(|&id| self.tree.as_element(id))
            .any(|e| e.namespace == Namespace::Html && is_formatting_tag(&e.local_name));
        if pops_formatting {
            return Err(self.unsupported(token));
        }
        Ok(())
    }

    /// Whether an HTML `a` element is open with no marker element (`applet`,
    /// `marquee`, `object`, `template`) opened after it. Formatting elements
    /// only leave the stack through their own end tag or the end tag of a
    /// marker element, so this mirrors the list of active formatting
    /// elements back to its last marker.
    fn has_open_a_after_last_marker(&self) -> bool {
        for &id in self.open_elements.as_slice().iter().rev() {
            let Some(element) = self.tree.as_element(id) else {
                continue;
            };
            if element.namespace != Namespace::Html {
                continue;
            }
            if element.local_name == "a" {
                return true;
            }
            if is_marker_tag(&element.local_name) {
                return false;
            }
        }
        false
    }

    /// "Any other end tag"
    fn close_any_other_end_tag(&mut self, tag_name: &str, token: &Token) -> ConstructResult {
        // STEP 1: "Initialize node to be the current node (the bottommost
        //          node of the stack)."
        for index in (0..self.open_elements.len()).rev() {
            let Some(node) = self.open_elements.get(index) else {
                continue;
            };
            let Some(element) = self.tree.as_element(node) else {
                continue;
            };

            // STEP 2: "Loop: If node is an HTML element with the same tag name
            //          as the token, then:"
            if element.is_html(tag_name) {
                self.ensure_no_formatting_below(index, token)?;
                // STEP 2.1: "Generate implied end tags, except for HTML
                //            elements with the same tag name as the token."
                self.generate_implied_end_tags(Some(tag_name));
                // STEP 2.2: "If node is not the current node, then this is a
                //            parse error."
                if self.open_elements.current() != Some(node) {
                    self.parse_error(ParseErrorKind::MisnestedTag)?;
                }
                // STEP 2.3: "Pop all the nodes from the current node up to
                //            node, including node, then stop these steps."
                self.open_elements.truncate(index);
                return Ok(());
            }

            // STEP 3: "Otherwise, if node is in the special category, then
            //          this is a parse error; ignore the token, and return."
            if is_special(element) {
                return self.parse_error(ParseErrorKind::UnexpectedEndTag);
            }

            // STEP 4: "Set node to the previous entry in the stack of open
            //          elements."
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_end_tags_include_button_but_not_p() {
        assert!(is_block_end_tag("button"));
        assert!(is_block_end_tag("pre"));
        assert!(is_block_end_tag("div"));
        assert!(!is_block_end_tag("p"));
        assert!(!is_block_end_tag("span"));
    }

    #[test]
    fn special_category_spans_namespaces() {
        assert!(is_special(&ElementData::new("div", Namespace::Html)));
        assert!(!is_special(&ElementData::new("span", Namespace::Html)));
        assert!(is_special(&ElementData::new("mtext", Namespace::MathMl)));
        assert!(is_special(&ElementData::new("foreignObject", Namespace::Svg)));
        assert!(!is_special(&ElementData::new("div", Namespace::Svg)));
    }
}

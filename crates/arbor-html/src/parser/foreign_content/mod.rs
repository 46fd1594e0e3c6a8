//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)

mod mathml;
mod svg;

use arbor_dom::{ElementData, Namespace};

use self::mathml::{adjust_mathml_attributes, is_text_integration_point_name};
use self::svg::{adjust_svg_attributes, adjust_svg_tag_name};
use super::core::{ConstructResult, TreeConstructor, is_whitespace};
use super::error::{ParseErrorKind, TreeConstructionError};
use crate::token::Token;

/// [§ 13.2.6.1 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// "When the steps below require the user agent to adjust foreign attributes
/// for a token, then, if any of the attributes on the token match the
/// strings given in the first column of the following table, let the
/// attribute be a namespaced attribute, with the prefix being the string
/// given in the corresponding cell in the second column, the local name
/// being the string given in the corresponding cell in the third column, and
/// the namespace being the namespace given in the corresponding cell in the
/// fourth column."
///
/// Attributes are stored under their qualified name, so the table is
/// consulted when a tree is printed rather than when it is built.
/// Returns `(prefix, local name, namespace)`.
pub(crate) fn foreign_attribute(qualified_name: &str) -> Option<(Option<&'static str>, &str, Namespace)> {
    let (prefix, namespace) = match qualified_name.split_once(':') {
        Some(("xlink", local)) => match local {
            "actuate" | "arcrole" | "href" | "role" | "show" | "title" | "type" => {
                (Some("xlink"), Namespace::XLink)
            }
            _ => return None,
        },
        Some(("xml", "lang" | "space")) => (Some("xml"), Namespace::Xml),
        Some(("xmlns", "xlink")) => (Some("xmlns"), Namespace::XmlNs),
        None if qualified_name == "xmlns" => (None, Namespace::XmlNs),
        _ => return None,
    };
    let local = qualified_name
        .split_once(':')
        .map_or(qualified_name, |(_, local)| local);
    Some((prefix, local, namespace))
}

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#mathml-text-integration-point)
pub(crate) fn is_mathml_text_integration_point(element: &ElementData) -> bool {
    element.namespace == Namespace::MathMl && is_text_integration_point_name(&element.local_name)
}

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#html-integration-point)
///
/// "A node is an HTML integration point if it is one of the following
/// elements:
/// - A MathML annotation-xml element whose start tag token had an attribute
///   with the name "encoding" whose value was an ASCII case-insensitive
///   match for the string "text/html"
/// - A MathML annotation-xml element whose start tag token had an attribute
///   with the name "encoding" whose value was an ASCII case-insensitive
///   match for the string "application/xhtml+xml"
/// - An SVG foreignObject element
/// - An SVG desc element
/// - An SVG title element"
pub(crate) fn is_html_integration_point(element: &ElementData) -> bool {
    match element.namespace {
        Namespace::MathMl => {
            element.local_name == "annotation-xml"
                && element.attribute("encoding").is_some_and(|encoding| {
                    encoding.eq_ignore_ascii_case("text/html")
                        || encoding.eq_ignore_ascii_case("application/xhtml+xml")
                })
        }
        Namespace::Svg => matches!(element.local_name.as_str(), "foreignObject" | "desc" | "title"),
        _ => false,
    }
}

/// "A start tag whose tag name is one of: ..." followed by "A start tag
/// whose tag name is "font", if the token has any attributes named "color",
/// "face", or "size"" and "An end tag whose tag name is "br", "p""
fn breaks_out_of_foreign_content(token: &Token) -> bool {
    match token {
        Token::StartTag {
            name, attributes, ..
        } => {
            matches!(
                name.as_str(),
                "b" | "big"
                    | "blockquote"
                    | "body"
                    | "br"
                    | "center"
                    | "code"
                    | "dd"
                    | "div"
                    | "dl"
                    | "dt"
                    | "em"
                    | "embed"
                    | "h1"
                    | "h2"
                    | "h3"
                    | "h4"
                    | "h5"
                    | "h6"
                    | "head"
                    | "hr"
                    | "i"
                    | "img"
                    | "li"
                    | "listing"
                    | "menu"
                    | "meta"
                    | "nobr"
                    | "ol"
                    | "p"
                    | "pre"
                    | "ruby"
                    | "s"
                    | "small"
                    | "span"
                    | "strong"
                    | "strike"
                    | "sub"
                    | "sup"
                    | "table"
                    | "tt"
                    | "u"
                    | "ul"
                    | "var"
            ) || (name == "font"
                && attributes
                    .iter()
                    .any(|a| matches!(a.name.as_str(), "color" | "face" | "size")))
        }
        Token::EndTag { name } => name == "br" || name == "p",
        _ => false,
    }
}

impl TreeConstructor {
    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// Whether `token` is processed by the foreign content rules. It is when
    /// the adjusted current node is a foreign element and none of these
    /// hold:
    /// - "If the adjusted current node is a MathML text integration point and
    ///   the token is a start tag whose tag name is neither "mglyph" nor
    ///   "malignmark""
    /// - "If the adjusted current node is a MathML text integration point and
    ///   the token is a character token"
    /// - "If the adjusted current node is a MathML annotation-xml element and
    ///   the token is a start tag whose tag name is "svg""
    /// - "If the adjusted current node is an HTML integration point and the
    ///   token is a start tag"
    /// - "If the adjusted current node is an HTML integration point and the
    ///   token is a character token"
    /// - "If the token is an end-of-file token"
    pub(in crate::parser) fn uses_foreign_content_rules(&self, token: &Token) -> bool {
        let Some(element) = self.current_element() else {
            return false;
        };
        if element.namespace == Namespace::Html || token.is_eof() {
            return false;
        }
        let is_start_tag = matches!(token, Token::StartTag { .. });
        let is_character = matches!(token, Token::Character { .. });

        if is_mathml_text_integration_point(element)
            && (is_character
                || (is_start_tag && !matches!(token.tag_name(), Some("mglyph" | "malignmark"))))
        {
            return false;
        }
        if element.namespace == Namespace::MathMl
            && element.local_name == "annotation-xml"
            && is_start_tag
            && token.tag_name() == Some("svg")
        {
            return false;
        }
        !(is_html_integration_point(element) && (is_start_tag || is_character))
    }

    /// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    pub(in crate::parser) fn handle_in_foreign_content(&mut self, token: &Token) -> ConstructResult {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Insert a U+FFFD REPLACEMENT CHARACTER character."
            Token::Character { data: '\0' } => {
                self.parse_error(ParseErrorKind::UnexpectedNullCharacter)?;
                self.insert_character('\u{FFFD}')
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Insert the token's character."
            Token::Character { data } if is_whitespace(*data) => self.insert_character(*data),

            // "Any other character token"
            // "Insert the token's character. Set the frameset-ok flag to
            // "not ok"."
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

            _ if breaks_out_of_foreign_content(token) => {
                // "Parse error."
                let kind = if matches!(token, Token::StartTag { .. }) {
                    ParseErrorKind::UnexpectedStartTag
                } else {
                    ParseErrorKind::UnexpectedEndTag
                };
                self.parse_error(kind)?;

                // "While the current node is not a MathML text integration
                // point, an HTML integration point, or an element in the HTML
                // namespace, pop elements from the stack of open elements."
                while self.current_element().is_some_and(|element| {
                    !(element.namespace == Namespace::Html
                        || is_mathml_text_integration_point(element)
                        || is_html_integration_point(element))
                }) {
                    let _ = self.open_elements.pop();
                }

                // "Reprocess the token according to the rules given in the
                // section corresponding to the current insertion mode in HTML
                // content."
                self.process_using_rules_for(self.insertion_mode, token)
            }

            // "Any other start tag"
            Token::StartTag { .. } => {
                let namespace = self
                    .current_element()
                    .map(|element| element.namespace)
                    .ok_or(TreeConstructionError::InvariantViolation(
                        "foreign content rules without an adjusted current node",
                    ))?;
                self.insert_foreign_element_for_token(token, namespace)
            }

            // "An end tag whose tag name is "script", if the current node is
            // an SVG script element"
            // "Pop the current node off the stack of open elements."
            Token::EndTag { name }
                if name == "script"
                    && self
                        .current_element()
                        .is_some_and(|e| e.namespace == Namespace::Svg && e.local_name == "script") =>
            {
                let _ = self.open_elements.pop();
                Ok(())
            }

            // "Any other end tag"
            Token::EndTag { name } => self.foreign_end_tag(name, token),

            Token::EndOfFile => self.process_using_rules_for(self.insertion_mode, token),
        }
    }

    /// "Any other start tag" in foreign content, also used by the "in body"
    /// rules for `math` and `svg` start tags.
    ///
    /// "If the adjusted current node is an element in the MathML namespace,
    /// adjust MathML attributes for the token. If the adjusted current node
    /// is an element in the SVG namespace, and the token's tag name is one of
    /// the ones in the first column of the following table, change the tag
    /// name to the name given in the corresponding cell in the second column.
    /// If the adjusted current node is an element in the SVG namespace,
    /// adjust SVG attributes for the token. Adjust foreign attributes for the
    /// token. Insert a foreign element for the token, with adjusted current
    /// node's namespace and false. If the token has its self-closing flag
    /// set, then ... pop the current node off the stack of open elements and
    /// acknowledge the token's self-closing flag."
    pub(in crate::parser) fn insert_foreign_element_for_token(
        &mut self,
        token: &Token,
        namespace: Namespace,
    ) -> ConstructResult {
        let Token::StartTag {
            name,
            self_closing,
            attributes,
        } = token
        else {
            return Err(TreeConstructionError::InvariantViolation(
                "foreign element requested for a token that is not a start tag",
            ));
        };

        let mut attributes = attributes.clone();
        let mut local_name = name.as_str();
        match namespace {
            Namespace::MathMl => adjust_mathml_attributes(&mut attributes),
            Namespace::Svg => {
                if let Some(adjusted) = adjust_svg_tag_name(name) {
                    local_name = adjusted;
                }
                adjust_svg_attributes(&mut attributes);
            }
            _ => {}
        }

        let _ = self.insert_foreign_element(local_name, &attributes, namespace)?;
        if *self_closing {
            let _ = self.open_elements.pop();
            self.acknowledge_self_closing_flag();
        }
        Ok(())
    }

    /// "Any other end tag" in foreign content.
    fn foreign_end_tag(&mut self, tag_name: &str, token: &Token) -> ConstructResult {
        let matches_token = |element: &ElementData| element.local_name.to_ascii_lowercase() == tag_name;

        // STEP 1: "Initialize node to be the current node (the bottommost node
        //          of the stack)."
        // STEP 2: "If node's tag name, converted to ASCII lowercase, is not
        //          the same as the tag name of the token, then this is a parse
        //          error."
        if self.current_element().is_some_and(|e| !matches_token(e)) {
            self.parse_error(ParseErrorKind::UnexpectedEndTag)?;
        }

        for index in (0..self.open_elements.len()).rev() {
            // STEP 3: "Loop: If node is the topmost element in the stack of
            //          open elements, then return. (fragment case)"
            if index == 0 {
                return Ok(());
            }
            let node = self.open_elements.get(index);

            // STEP 4: "If node's tag name, converted to ASCII lowercase, is the
            //          same as the tag name of the token, pop elements from the
            //          stack of open elements until node has been popped from
            //          the stack, and then return."
            if node
                .and_then(|id| self.tree.as_element(id))
                .is_some_and(matches_token)
            {
                self.open_elements.truncate(index);
                return Ok(());
            }

            // STEP 5: "Set node to the previous entry in the stack of open
            //          elements."
            // STEP 6: "If node is not an element in the HTML namespace, return
            //          to the step labeled loop."
            // STEP 7: "Otherwise, process the token according to the rules
            //          given in the section corresponding to the current
            //          insertion mode in HTML content."
            let previous_is_html = self
                .open_elements
                .get(index - 1)
                .and_then(|id| self.tree.as_element(id))
                .is_some_and(|e| e.namespace == Namespace::Html);
            if previous_is_html {
                return self.process_using_rules_for(self.insertion_mode, token);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_attribute_table() {
        assert_eq!(
            foreign_attribute("xlink:href"),
            Some((Some("xlink"), "href", Namespace::XLink))
        );
        assert_eq!(
            foreign_attribute("xml:lang"),
            Some((Some("xml"), "lang", Namespace::Xml))
        );
        assert_eq!(foreign_attribute("xmlns"), Some((None, "xmlns", Namespace::XmlNs)));
        assert_eq!(foreign_attribute("xlink:foo"), None);
        assert_eq!(foreign_attribute("href"), None);
    }

    #[test]
    fn annotation_xml_needs_html_encoding() {
        let mut annotation = ElementData::new("annotation-xml", Namespace::MathMl);
        assert!(!is_html_integration_point(&annotation));
        let _ = annotation
            .attrs
            .insert("encoding".to_string(), "Text/HTML".to_string());
        assert!(is_html_integration_point(&annotation));
    }

    #[test]
    fn font_breaks_out_only_with_presentational_attributes() {
        assert!(!breaks_out_of_foreign_content(&Token::start_tag("font")));
        assert!(breaks_out_of_foreign_content(
            &Token::start_tag("font").with_attribute("color", "red")
        ));
        assert!(breaks_out_of_foreign_content(&Token::end_tag("p")));
        assert!(!breaks_out_of_foreign_content(&Token::end_tag("div")));
    }
}

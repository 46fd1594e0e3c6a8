//! Integration tests for SVG and MathML content inside HTML documents.

use arbor_dom::{Namespace, NodeId};
use arbor_html::{ParseErrorKind, Token, TreeConstructor, dump_tree};

fn text(s: &str) -> Vec<Token> {
    Token::characters(s).collect()
}

/// `<!DOCTYPE html><body>`, then `content`, then end of file.
fn in_document_body(content: Vec<Token>) -> Vec<Token> {
    let mut tokens = vec![Token::doctype("html"), Token::start_tag("body")];
    tokens.extend(content);
    tokens.push(Token::EndOfFile);
    tokens
}

fn parse(tokens: Vec<Token>) -> (String, Vec<ParseErrorKind>) {
    let (tree, errors) = TreeConstructor::parse_with_errors(tokens).expect("construction failed");
    (dump_tree(&tree), errors.into_iter().map(|e| e.kind).collect())
}

/// Expected dump: the skeleton, then `lines` as children of `<body>`.
fn body_dump(lines: &[&str]) -> String {
    let mut out = String::from("| <!DOCTYPE html>\n| <html>\n|   <head>\n|   <body>\n");
    for line in lines {
        out.push_str("|     ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[test]
fn test_svg_names_are_case_adjusted() {
    let (dump, errors) = parse(in_document_body(vec![
        Token::start_tag("svg").with_attribute("viewbox", "0 0 1 1"),
        Token::start_tag("lineargradient"),
        Token::end_tag("lineargradient"),
        Token::end_tag("svg"),
    ]));
    assert_eq!(
        dump,
        body_dump(&[
            "<svg svg>",
            "  viewBox=\"0 0 1 1\"",
            "  <svg linearGradient>",
        ])
    );
    assert!(errors.is_empty());
}

#[test]
fn test_foreign_elements_get_their_namespace() {
    let mut constructor = TreeConstructor::new();
    constructor
        .run_tokens(in_document_body(vec![
            Token::start_tag("svg"),
            Token::start_tag("g"),
        ]))
        .unwrap();
    let tree = constructor.take_document();

    let html = tree.document_element().unwrap();
    let body = tree.last_child(html).unwrap();
    let svg = tree.first_child(body).unwrap();
    let g = tree.first_child(svg).unwrap();
    assert_eq!(tree.as_element(svg).unwrap().namespace, Namespace::Svg);
    assert_eq!(tree.as_element(g).unwrap().namespace, Namespace::Svg);
    assert_eq!(tree.as_element(body).unwrap().namespace, Namespace::Html);
    assert_eq!(tree.parent(svg), Some(body));
    assert_ne!(svg, NodeId::ROOT);
}

#[test]
fn test_self_closing_foreign_element_is_acknowledged() {
    let (dump, errors) = parse(in_document_body(vec![
        Token::start_tag("svg"),
        Token::start_tag("circle").with_attribute("r", "1").self_closing(),
        Token::end_tag("svg"),
    ]));
    assert_eq!(
        dump,
        body_dump(&["<svg svg>", "  <svg circle>", "    r=\"1\""])
    );
    assert!(errors.is_empty());
}

#[test]
fn test_html_start_tag_breaks_out_of_svg() {
    let tokens = in_document_body(
        [
            vec![Token::start_tag("svg"), Token::start_tag("p")],
            text("x"),
        ]
        .concat(),
    );

    let (dump, errors) = parse(tokens);
    assert_eq!(dump, body_dump(&["<svg svg>", "<p>", "  \"x\""]));
    assert_eq!(errors, vec![ParseErrorKind::UnexpectedStartTag]);
}

#[test]
fn test_font_breaks_out_only_with_presentational_attributes() {
    let (dump, errors) = parse(in_document_body(vec![
        Token::start_tag("svg"),
        Token::start_tag("font"),
        Token::end_tag("font"),
        Token::start_tag("font").with_attribute("color", "red"),
    ]));
    assert_eq!(
        dump,
        body_dump(&[
            "<svg svg>",
            "  <svg font>",
            "<font>",
            "  color=\"red\"",
        ])
    );
    assert_eq!(
        errors,
        vec![
            ParseErrorKind::UnexpectedStartTag,
            ParseErrorKind::UnexpectedEndOfFile,
        ]
    );
}

#[test]
fn test_foreign_object_holds_html() {
    let content = [
        vec![
            Token::start_tag("svg"),
            Token::start_tag("foreignobject"),
            Token::start_tag("div"),
        ],
        text("x"),
        vec![
            Token::end_tag("div"),
            Token::end_tag("foreignobject"),
            Token::end_tag("svg"),
        ],
    ]
    .concat();
    let (dump, errors) = parse(in_document_body(content));
    assert_eq!(
        dump,
        body_dump(&[
            "<svg svg>",
            "  <svg foreignObject>",
            "    <div>",
            "      \"x\"",
        ])
    );
    assert!(errors.is_empty());
}

#[test]
fn test_mathml_text_integration_point_takes_text() {
    let content = [
        vec![
            Token::start_tag("math").with_attribute("definitionurl", "u"),
            Token::start_tag("mi"),
        ],
        text("x"),
        vec![Token::end_tag("mi"), Token::end_tag("math")],
    ]
    .concat();
    let (dump, errors) = parse(in_document_body(content));
    assert_eq!(
        dump,
        body_dump(&[
            "<math math>",
            "  definitionURL=\"u\"",
            "  <math mi>",
            "    \"x\"",
        ])
    );
    assert!(errors.is_empty());
}

#[test]
fn test_svg_inside_annotation_xml() {
    let (dump, errors) = parse(in_document_body(vec![
        Token::start_tag("math"),
        Token::start_tag("annotation-xml"),
        Token::start_tag("svg"),
    ]));
    assert_eq!(
        dump,
        body_dump(&["<math math>", "  <math annotation-xml>", "    <svg svg>"])
    );
    assert_eq!(errors, vec![ParseErrorKind::UnexpectedEndOfFile]);
}

#[test]
fn test_xlink_attributes_print_with_namespace_prefix() {
    let (dump, _) = parse(in_document_body(vec![
        Token::start_tag("svg"),
        Token::start_tag("use").with_attribute("xlink:href", "#a"),
    ]));
    assert_eq!(
        dump,
        body_dump(&["<svg svg>", "  <svg use>", "    xlink href=\"#a\""])
    );
}

#[test]
fn test_null_in_foreign_content_is_replaced() {
    let (dump, errors) = parse(in_document_body(vec![
        Token::start_tag("svg"),
        Token::character('\0'),
    ]));
    assert_eq!(dump, body_dump(&["<svg svg>", "  \"\u{FFFD}\""]));
    assert_eq!(
        errors,
        vec![
            ParseErrorKind::UnexpectedNullCharacter,
            ParseErrorKind::UnexpectedEndOfFile,
        ]
    );
}

#[test]
fn test_html_end_tag_closes_foreign_subtree() {
    let (dump, errors) = parse(in_document_body(vec![
        Token::start_tag("div"),
        Token::start_tag("svg"),
        Token::start_tag("g"),
        Token::end_tag("div"),
        Token::start_tag("span"),
        Token::end_tag("span"),
    ]));
    assert_eq!(
        dump,
        body_dump(&["<div>", "  <svg svg>", "    <svg g>", "<span>"])
    );
    assert_eq!(
        errors,
        vec![ParseErrorKind::UnexpectedEndTag, ParseErrorKind::MisnestedTag]
    );
}

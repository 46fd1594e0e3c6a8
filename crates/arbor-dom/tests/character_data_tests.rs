//! Tests for CharacterData: UTF-16 offsets, clamping, and sequential edits on
//! nodes stored in the tree.

use arbor_dom::{CharacterData, DomTree, NodeKind, NodeType, ProcessingInstructionData};

#[test]
fn test_substring_clamps_count() {
    let data = CharacterData::new("oh no");
    assert_eq!(data.substring_data(0, 100), "oh no");
    assert_eq!(data.substring_data(1, 3), "h n");
}

#[test]
fn test_substring_past_end_is_empty() {
    let data = CharacterData::new("oh no");
    assert_eq!(data.substring_data(5, 1), "");
    assert_eq!(data.substring_data(50, usize::MAX), "");
}

#[test]
fn test_delete_composes_left_to_right() {
    let mut data = CharacterData::new("hello world");
    data.delete_data(5, 100);
    assert_eq!(data.data(), "hello");
    data.delete_data(0, 1);
    assert_eq!(data.data(), "ello");
}

#[test]
fn test_insert_and_append() {
    let mut data = CharacterData::new("world");
    data.insert_data(0, "hello ");
    data.append_data("!");
    assert_eq!(data.data(), "hello world!");

    // Inserting past the end appends.
    data.insert_data(99, "?");
    assert_eq!(data.data(), "hello world!?");
}

#[test]
fn test_replace_data() {
    let mut data = CharacterData::new("hello world");
    data.replace_data(6, 5, "there");
    assert_eq!(data.data(), "hello there");

    data.replace_data(0, 0, ">> ");
    assert_eq!(data.data(), ">> hello there");

    data.set_data("fresh");
    assert_eq!(data.data(), "fresh");
    assert_eq!(data.length(), 5);
}

#[test]
fn test_length_counts_utf16_code_units() {
    assert_eq!(CharacterData::new("").length(), 0);
    assert_eq!(CharacterData::new("caf\u{e9}").length(), 4);
    // Outside the BMP: one char, two code units.
    assert_eq!(CharacterData::new("\u{1D11E}").length(), 2);
}

#[test]
fn test_offsets_after_astral_character() {
    let mut data = CharacterData::new("\u{1D11E}ab");
    assert_eq!(data.substring_data(2, 1), "a");
    data.delete_data(2, 1);
    assert_eq!(data.data(), "\u{1D11E}b");
}

#[test]
fn test_edit_text_node_in_tree() {
    let mut tree = DomTree::new();
    let text = tree.create_text("hello world");

    tree.character_data_mut(text)
        .expect("text node has character data")
        .delete_data(5, 100);

    assert_eq!(tree.as_text(text), Some("hello"));
}

#[test]
fn test_character_data_variants() {
    let mut tree = DomTree::new();
    let comment = tree.create_comment("note");
    let cdata = tree.alloc(NodeType::CdataSection("raw".into()));
    let pi = tree.alloc(NodeType::ProcessingInstruction(ProcessingInstructionData {
        target: "xml-stylesheet".to_string(),
        data: CharacterData::new("href=\"a.css\""),
    }));
    let element = tree.create_element("p", arbor_dom::Namespace::Html);

    assert_eq!(
        tree.character_data(comment).map(CharacterData::data),
        Some("note")
    );
    assert_eq!(tree.character_data(cdata).map(CharacterData::length), Some(3));
    assert_eq!(
        tree.character_data(pi).map(|d| d.substring_data(0, 4)),
        Some("href".to_string())
    );
    assert!(tree.character_data(element).is_none());

    assert_eq!(tree.get(cdata).map(|n| n.kind()), Some(NodeKind::CdataSection));
    assert_eq!(
        tree.get(pi).map(|n| n.kind() as u16),
        Some(NodeKind::ProcessingInstruction as u16)
    );
}

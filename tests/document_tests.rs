use scenario_sync::document::{
    DEFAULT_CODE_LANGUAGE, Mark, Node, collect_links, extract_code_blocks, extract_tables,
    from_plain_text, has_media, to_text, with_code_block,
};
use serde_json::json;

fn doc(value: serde_json::Value) -> Node {
    Node::from_value(&value).expect("fixture is a document")
}

// ============================================================================
// Building documents
// ============================================================================

#[test]
fn from_plain_text_one_paragraph_per_line() {
    let built = from_plain_text("Hello\nWorld");
    let expected = json!({
        "type": "doc", "version": 1,
        "content": [
            {"type": "paragraph", "content": [{"type": "text", "text": "Hello"}]},
            {"type": "paragraph", "content": [{"type": "text", "text": "World"}]}
        ]
    });
    assert_eq!(serde_json::to_value(&built).unwrap(), expected);
}

#[test]
fn from_plain_text_blank_lines_and_empty_input() {
    let built = from_plain_text("a\n\nb");
    assert_eq!(built.content.len(), 3);
    assert!(built.content[1].content.is_empty());

    let empty = from_plain_text("");
    assert_eq!(empty.content.len(), 1);
    assert_eq!(empty.content[0].kind, "paragraph");
    assert!(empty.content[0].content.is_empty());
}

#[test]
fn with_code_block_heading_and_block() {
    let built = with_code_block("My Title", "Given...");
    let value = serde_json::to_value(&built).unwrap();

    assert_eq!(value["content"][0]["type"], "heading");
    assert_eq!(value["content"][0]["attrs"]["level"], 3);
    assert_eq!(value["content"][0]["content"][0]["text"], "My Title");
    assert_eq!(value["content"][1]["type"], "codeBlock");
    assert_eq!(value["content"][1]["attrs"]["language"], "gherkin");
    assert_eq!(value["content"][1]["content"][0]["text"], "Given...");
}

#[test]
fn with_code_block_without_title() {
    let built = with_code_block("", "Given x");
    assert_eq!(built.content.len(), 1);
    assert_eq!(built.content[0].kind, "codeBlock");
}

// ============================================================================
// to_text
// ============================================================================

#[test]
fn to_text_round_trips_plain_text() {
    assert_eq!(to_text(&from_plain_text("Hello\nWorld")), "Hello\nWorld");
    assert_eq!(to_text(&from_plain_text("Hello World")), "Hello World");
}

#[test]
fn to_text_lists_breaks_and_containers() {
    let document = doc(json!({
        "type": "doc",
        "content": [
            {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Goal  "}]},
            {"type": "paragraph", "content": [
                {"type": "text", "text": "line one"},
                {"type": "hardBreak"},
                {"type": "text", "text": "line two"}
            ]},
            {"type": "bulletList", "content": [
                {"type": "listItem", "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "first"}]}
                ]},
                {"type": "listItem", "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "second"}]},
                    {"type": "orderedList", "content": [
                        {"type": "listItem", "content": [
                            {"type": "paragraph", "content": [{"type": "text", "text": "nested"}]}
                        ]}
                    ]}
                ]}
            ]},
            {"type": "panel", "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "inside panel"}]}
            ]},
            {"type": "blockquote", "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "quoted"}]}
            ]},
            {"type": "expand", "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "unknown container"}]}
            ]},
            {"type": "paragraph"}
        ]
    }));

    assert_eq!(
        to_text(&document),
        "Goal\nline one\nline two\n- first\n- second\n- nested\ninside panel\nquoted\nunknown container"
    );
}

#[test]
fn to_text_empty_document() {
    assert_eq!(to_text(&Node::new("doc")), "");
}

// ============================================================================
// Tables, links, media
// ============================================================================

#[test]
fn extract_tables_rows_and_cells() {
    let document = doc(json!({
        "type": "doc",
        "content": [{
            "type": "table",
            "content": [
                {"type": "tableRow", "content": [
                    {"type": "tableHeader", "content": [{"type": "paragraph", "content": [{"type": "text", "text": " Key "}]}]},
                    {"type": "tableHeader", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "ES"}]}]}
                ]},
                {"type": "tableRow", "content": [
                    {"type": "tableCell", "content": [{"type": "paragraph", "content": [
                        {"type": "text", "text": "login."},
                        {"type": "text", "text": "title"}
                    ]}]},
                    {"type": "tableCell", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Entrar"}]}]}
                ]}
            ]
        }]
    }));

    let tables = extract_tables(&document);
    assert_eq!(tables.len(), 1);
    assert_eq!(
        tables[0],
        vec![
            vec!["Key".to_string(), "ES".to_string()],
            vec!["login.title".to_string(), "Entrar".to_string()],
        ]
    );
}

#[test]
fn extract_tables_requires_document_root() {
    let paragraph = doc(json!({"type": "paragraph"}));
    assert!(extract_tables(&paragraph).is_empty());

    let bare_table = doc(json!({
        "type": "table",
        "content": [{"type": "tableRow", "content": []}]
    }));
    assert!(extract_tables(&bare_table).is_empty());
}

#[test]
fn collect_links_unique_in_order() {
    let document = Node::new("doc").with_content(vec![
        Node::new("paragraph").with_content(vec![
            Node::text_run("b").with_mark(Mark::link("https://b.example")),
            Node::text_run("a").with_mark(Mark::link("https://a.example")),
        ]),
        Node::new("paragraph").with_content(vec![
            Node::text_run("b again").with_mark(Mark::link("https://b.example")),
            Node::text_run("plain"),
        ]),
    ]);

    assert_eq!(
        collect_links(&document),
        vec!["https://b.example".to_string(), "https://a.example".to_string()]
    );
}

#[test]
fn has_media_detects_nested_media() {
    let with_media = doc(json!({
        "type": "doc",
        "content": [{"type": "mediaSingle", "content": [{"type": "media", "attrs": {"id": "x"}}]}]
    }));
    assert!(has_media(&with_media));
    assert!(!has_media(&from_plain_text("no media")));
}

// ============================================================================
// Code blocks
// ============================================================================

#[test]
fn code_block_round_trip() {
    let built = with_code_block("Title", "Given a user\nWhen...");
    assert_eq!(
        extract_code_blocks(&built, Some(DEFAULT_CODE_LANGUAGE)),
        vec!["Given a user\nWhen...".to_string()]
    );
}

#[test]
fn extract_code_blocks_ignores_other_content() {
    let mut built = with_code_block("Test Steps", "Given a user\nWhen...");
    built
        .content
        .push(Node::new("paragraph").with_content(vec![Node::text_run("Some other text")]));

    assert_eq!(extract_code_blocks(&built, Some("gherkin")).len(), 1);
}

#[test]
fn extract_code_blocks_filters_by_language() {
    let document = Node::new("doc").with_content(vec![
        Node::new("codeBlock")
            .with_attr("language", "json")
            .with_content(vec![Node::text_run("{}")]),
        Node::new("panel").with_content(vec![
            Node::new("codeBlock")
                .with_attr("language", "gherkin")
                .with_content(vec![Node::text_run("Given "), Node::text_run("x")]),
        ]),
        Node::new("codeBlock").with_content(vec![Node::text_run("untagged")]),
    ]);

    assert_eq!(extract_code_blocks(&document, Some("gherkin")), vec!["Given x".to_string()]);
    assert_eq!(extract_code_blocks(&document, None).len(), 3);
    assert_eq!(extract_code_blocks(&document, Some("")).len(), 3);
}

#[test]
fn from_value_rejects_non_nodes() {
    assert!(Node::from_value(&json!("text")).is_none());
    assert!(Node::from_value(&json!({"content": []})).is_none());
    assert!(Node::from_value(&json!({"type": 3})).is_none());
}

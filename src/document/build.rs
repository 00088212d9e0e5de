use super::node::{Node, kind};

/// Language tag carried by generated code blocks.
pub const DEFAULT_CODE_LANGUAGE: &str = "gherkin";

const DOCUMENT_VERSION: u32 = 1;

fn document(content: Vec<Node>) -> Node {
    let mut doc = Node::new(kind::DOC).with_content(content);
    doc.version = Some(DOCUMENT_VERSION);
    doc
}

/// One paragraph per input line. Blank lines become empty paragraphs and an
/// empty input still yields a single empty paragraph.
pub fn from_plain_text(text: &str) -> Node {
    let mut paragraphs: Vec<Node> = text
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                Node::new(kind::PARAGRAPH)
            } else {
                Node::new(kind::PARAGRAPH).with_content(vec![Node::text_run(line)])
            }
        })
        .collect();

    if paragraphs.is_empty() {
        paragraphs.push(Node::new(kind::PARAGRAPH));
    }

    document(paragraphs)
}

/// A document holding an optional level-3 heading and one gherkin code block.
pub fn with_code_block(title: &str, code: &str) -> Node {
    let mut blocks = Vec::with_capacity(2);

    if !title.is_empty() {
        blocks.push(
            Node::new(kind::HEADING)
                .with_attr("level", 3)
                .with_content(vec![Node::text_run(title)]),
        );
    }

    blocks.push(
        Node::new(kind::CODE_BLOCK)
            .with_attr("language", DEFAULT_CODE_LANGUAGE)
            .with_content(vec![Node::text_run(code)]),
    );

    document(blocks)
}

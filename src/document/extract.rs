use super::node::{Node, kind};

// ============================================================================
// Plain text
// ============================================================================

/// Flatten a document into plain text, one line per paragraph, heading or
/// list item. List items are prefixed with `- `.
pub fn to_text(doc: &Node) -> String {
    let mut lines = Vec::new();
    walk_text(doc, &mut lines);

    let joined = lines
        .into_iter()
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    joined
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn walk_text(node: &Node, lines: &mut Vec<String>) {
    match node.kind.as_str() {
        kind::DOC | kind::BLOCKQUOTE | kind::PANEL => {
            for child in &node.content {
                walk_text(child, lines);
            }
        }
        kind::PARAGRAPH | kind::HEADING => {
            lines.push(inline_text(node, true).trim().to_string());
        }
        kind::BULLET_LIST | kind::ORDERED_LIST => {
            for item in node.content.iter().filter(|c| c.is(kind::LIST_ITEM)) {
                for child in &item.content {
                    if child.is(kind::PARAGRAPH) {
                        let segment = inline_text(child, false);
                        if !segment.is_empty() {
                            lines.push(format!("- {}", segment.trim()));
                        }
                    } else {
                        walk_text(child, lines);
                    }
                }
            }
        }
        // Unknown containers may still hold paragraphs.
        _ => {
            for child in &node.content {
                walk_text(child, lines);
            }
        }
    }
}

/// Concatenated direct text children of `node`.
fn inline_text(node: &Node, keep_breaks: bool) -> String {
    let mut out = String::new();
    for child in &node.content {
        if child.is(kind::TEXT) {
            out.push_str(child.text.as_deref().unwrap_or(""));
        } else if keep_breaks && child.is(kind::HARD_BREAK) {
            out.push('\n');
        }
    }
    out
}

/// Every text run below `node`, concatenated and trimmed.
fn collect_text(node: &Node) -> String {
    fn walk(node: &Node, out: &mut String) {
        if node.is(kind::TEXT) {
            out.push_str(node.text.as_deref().unwrap_or(""));
        }
        for child in &node.content {
            walk(child, out);
        }
    }

    let mut out = String::new();
    walk(node, &mut out);
    out.trim().to_string()
}

// ============================================================================
// Tables
// ============================================================================

/// All tables in the document as rows of cell text. Empty unless the root is
/// a `doc` node.
pub fn extract_tables(doc: &Node) -> Vec<Vec<Vec<String>>> {
    let mut tables = Vec::new();
    if doc.is(kind::DOC) {
        walk_tables(doc, &mut tables);
    }
    tables
}

fn walk_tables(node: &Node, tables: &mut Vec<Vec<Vec<String>>>) {
    if node.is(kind::TABLE) {
        let rows: Vec<Vec<String>> = node
            .content
            .iter()
            .filter(|r| r.is(kind::TABLE_ROW))
            .map(|row| row.content.iter().map(collect_text).collect())
            .collect();

        if !rows.is_empty() {
            tables.push(rows);
        }
    }

    for child in &node.content {
        walk_tables(child, tables);
    }
}

// ============================================================================
// Links and media
// ============================================================================

/// Hrefs of every link mark, in first-seen order, without duplicates.
pub fn collect_links(doc: &Node) -> Vec<String> {
    fn walk(node: &Node, links: &mut Vec<String>) {
        for mark in node.marks.iter().filter(|m| m.kind == kind::LINK) {
            if let Some(href) = mark.href().filter(|h| !h.is_empty()) {
                if !links.iter().any(|l| l == href) {
                    links.push(href.to_string());
                }
            }
        }
        for child in &node.content {
            walk(child, links);
        }
    }

    let mut links = Vec::new();
    walk(doc, &mut links);
    links
}

/// Whether any node in the tree is a media node.
pub fn has_media(doc: &Node) -> bool {
    doc.is(kind::MEDIA) || doc.is(kind::MEDIA_SINGLE) || doc.content.iter().any(has_media)
}

// ============================================================================
// Code blocks
// ============================================================================

/// Text of every code block, depth-first. With `language` set, only blocks
/// tagged with that language are returned.
pub fn extract_code_blocks(doc: &Node, language: Option<&str>) -> Vec<String> {
    fn walk(node: &Node, language: Option<&str>, blocks: &mut Vec<String>) {
        if node.is(kind::CODE_BLOCK) {
            let matches = match language {
                Some(lang) if !lang.is_empty() => node.attr_str("language") == Some(lang),
                _ => true,
            };
            if matches {
                blocks.push(inline_text(node, false));
            }
        }
        for child in &node.content {
            walk(child, language, blocks);
        }
    }

    let mut blocks = Vec::new();
    walk(doc, language, &mut blocks);
    blocks
}

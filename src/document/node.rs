use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node type names used by the tracker's rich-text format.
pub mod kind {
    pub const DOC: &str = "doc";
    pub const PARAGRAPH: &str = "paragraph";
    pub const HEADING: &str = "heading";
    pub const BULLET_LIST: &str = "bulletList";
    pub const ORDERED_LIST: &str = "orderedList";
    pub const LIST_ITEM: &str = "listItem";
    pub const TABLE: &str = "table";
    pub const TABLE_ROW: &str = "tableRow";
    pub const CODE_BLOCK: &str = "codeBlock";
    pub const TEXT: &str = "text";
    pub const HARD_BREAK: &str = "hardBreak";
    pub const MEDIA: &str = "media";
    pub const MEDIA_SINGLE: &str = "mediaSingle";
    pub const BLOCKQUOTE: &str = "blockquote";
    pub const PANEL: &str = "panel";
    pub const LINK: &str = "link";
}

/// One node of a structured document. Leaves are `text` nodes carrying
/// `text` and optional `marks`; everything else nests through `content`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

/// Inline style applied to a text node (link, strong, code, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
}

impl Node {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Self::default()
        }
    }

    pub fn text_run(text: &str) -> Self {
        Self {
            kind: kind::TEXT.to_string(),
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = content;
        self
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// String attribute lookup.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.as_ref()?.get(key)?.as_str()
    }

    /// Parse a node out of an arbitrary JSON value. Anything that is not an
    /// object with a `type` yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.get("type").is_some_and(Value::is_string) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

impl Mark {
    pub fn link(href: &str) -> Self {
        let mut attrs = Map::new();
        attrs.insert("href".to_string(), Value::String(href.to_string()));
        Self {
            kind: kind::LINK.to_string(),
            attrs: Some(attrs),
        }
    }

    pub fn href(&self) -> Option<&str> {
        self.attrs.as_ref()?.get("href")?.as_str()
    }
}

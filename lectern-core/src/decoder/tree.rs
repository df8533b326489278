//! Structured document tree (rich-text editor JSON)

use crate::error::ParseError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A node of the stored document tree.
///
/// Fields are read leniently: a value of the wrong type reads as absent and
/// list entries that are not nodes are skipped, so one odd attribute never
/// turns a whole document into something else.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TreeNode {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: NodeKind,

    #[serde(default, deserialize_with = "lenient")]
    pub attrs: Option<NodeAttrs>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub content: Vec<TreeNode>,

    /// Text payload of `text` nodes
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub marks: Vec<Mark>,
}

/// Node kinds understood by the builder; anything else is `Unknown`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Doc,
    Paragraph,
    Heading,
    BulletList,
    OrderedList,
    ListItem,
    Blockquote,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    Text,
    HardBreak,
    #[default]
    #[serde(other)]
    Unknown,
}

impl NodeKind {
    /// Whether nodes of this kind carry inline content
    pub fn is_inline(&self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::HardBreak)
    }
}

/// Node attributes the builder reads; others are ignored
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeAttrs {
    /// Heading level, given as a number or a numeric string
    #[serde(default, deserialize_with = "lenient_level")]
    pub level: Option<u8>,

    #[serde(default, deserialize_with = "lenient")]
    pub text_align: Option<String>,
}

/// Inline mark on a text node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mark {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: MarkKind,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MarkKind {
    #[serde(alias = "strong")]
    Bold,
    #[serde(alias = "em")]
    Italic,
    Underline,
    #[serde(alias = "strikethrough")]
    Strike,
    Code,
    #[default]
    #[serde(other)]
    Other,
}

/// Deserialize `T`, falling back to its default when the value has the wrong shape
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Deserialize a list, keeping only the entries that read as `T`
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_level<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl TreeNode {
    pub fn level(&self) -> Option<u8> {
        self.attrs.as_ref().and_then(|a| a.level)
    }

    pub fn text_align(&self) -> Option<&str> {
        self.attrs.as_ref().and_then(|a| a.text_align.as_deref())
    }
}

/// Parse `raw` as a document tree.
///
/// The root must be an object with a `content` array; when it names its type,
/// that type must be `doc`.
pub(crate) fn parse_tree(raw: &str) -> Result<TreeNode, ParseError> {
    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|e| ParseError::InvalidTree(e.to_string()))?;

    let root = value
        .as_object()
        .ok_or_else(|| ParseError::InvalidTree("root is not an object".to_string()))?;

    if !root.get("content").is_some_and(Value::is_array) {
        return Err(ParseError::MissingContent);
    }

    if let Some(kind) = root.get("type") {
        if kind.as_str() != Some("doc") {
            return Err(ParseError::InvalidTree(format!(
                "unexpected root type {}",
                kind
            )));
        }
    }

    serde_json::from_value(value).map_err(|e| ParseError::InvalidTree(e.to_string()))
}

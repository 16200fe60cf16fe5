//! Content tree model.
//!
//! A content tree is the JSON-like document that gets localized: mappings of
//! named fields, ordered lists, and scalar leaves. Only string leaves carry
//! localizable text. Mapping key order is preserved through parsing,
//! localization and serialization.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Insertion-ordered field mapping.
pub type ContentMap = IndexMap<String, ContentNode>;

/// One node of a content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentNode {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<ContentNode>),
    Map(ContentMap),
}

impl ContentNode {
    pub fn text(value: impl Into<String>) -> Self {
        ContentNode::Text(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContentNode::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ContentMap> {
        match self {
            ContentNode::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the node's shape, for log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentNode::Null => "null",
            ContentNode::Bool(_) => "bool",
            ContentNode::Number(_) => "number",
            ContentNode::Text(_) => "string",
            ContentNode::List(_) => "list",
            ContentNode::Map(_) => "mapping",
        }
    }

    /// Check that two trees have the same structure.
    ///
    /// Mappings must have the same keys in the same order, lists the same
    /// length, and every non-string leaf must be equal. String leaves only need
    /// to be strings on both sides.
    pub fn same_shape(&self, other: &ContentNode) -> bool {
        match (self, other) {
            (ContentNode::Text(_), ContentNode::Text(_)) => true,
            (ContentNode::List(a), ContentNode::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
            }
            (ContentNode::Map(a), ContentNode::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same_shape(vb))
            }
            (a, b) => a == b,
        }
    }

    /// Descend through nested mappings following `keys`.
    ///
    /// Returns `None` as soon as a step hits a non-mapping or a missing key.
    pub fn lookup<'a, K: AsRef<str>>(&'a self, keys: &[K]) -> Option<&'a ContentNode> {
        keys.iter()
            .try_fold(self, |node, key| node.as_map()?.get(key.as_ref()))
    }

    /// Number of string leaves in the tree.
    pub fn text_leaf_count(&self) -> usize {
        match self {
            ContentNode::Text(_) => 1,
            ContentNode::List(items) => items.iter().map(ContentNode::text_leaf_count).sum(),
            ContentNode::Map(map) => map.values().map(ContentNode::text_leaf_count).sum(),
            _ => 0,
        }
    }
}

impl From<&str> for ContentNode {
    fn from(value: &str) -> Self {
        ContentNode::Text(value.to_string())
    }
}

impl From<ContentMap> for ContentNode {
    fn from(value: ContentMap) -> Self {
        ContentNode::Map(value)
    }
}

//! Parsed node tree consumed by the builder.
//!
//! The tree is produced by an external markup tokenizer. A [`SourceTree`]
//! holds document-level properties and the top-level page nodes; every
//! [`Node`] carries a property map, its body lines and nested sections.

mod properties;

pub use properties::{parse_bool, Properties};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A fully parsed document, before resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTree {
    /// Document-level properties (PAGESIZE, GRID, STYLE_*, ...)
    #[serde(default)]
    pub meta: Properties,

    /// Top-level page nodes in declaration order
    #[serde(default)]
    pub pages: Vec<Node>,
}

impl SourceTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a document-level property.
    pub fn with_meta(mut self, key: &str, value: &str) -> Self {
        self.meta.insert(key, value);
        self
    }

    /// Append a page node.
    pub fn with_page(mut self, page: Node) -> Self {
        self.pages.push(page);
        self
    }

    /// Deserialize a tree from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and deserialize a tree from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }
}

/// A page or section node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Headline text
    #[serde(default)]
    pub title: String,

    /// Property drawer
    #[serde(default)]
    pub properties: Properties,

    /// Body lines (already stripped of leading indentation)
    #[serde(default)]
    pub content: Vec<String>,

    /// Nested section nodes
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set a property.
    pub fn prop(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Append a body line.
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.content.push(line.into());
        self
    }

    /// Append a child node.
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }
}

//! Schema tree nodes.
//!
//! A schema tree describes one record type: every declared field, its type tag,
//! whether it is a list, and the fields nested under it. Trees are built once
//! (usually decoded from JSON) and only read afterwards.

use std::{fmt, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Type tag given to fields the schema does not declare.
pub const CUSTOM_TYPE: &str = "Custom";

/// One declared field of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Field name as declared.
    pub name: String,
    /// Declared type tag (`"String"`, `"Integer"`, a record type name, ...).
    #[serde(rename = "type")]
    pub type_tag: String,
    /// The field holds a list of values or records.
    #[serde(default)]
    pub list: bool,
    /// False for synthetic nodes standing in for undeclared paths.
    #[serde(default = "default_exists")]
    pub exists: bool,
    /// Nested fields, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

/// Serde default for [`SchemaNode::exists`].
fn default_exists() -> bool {
    true
}

impl SchemaNode {
    /// Creates a declared scalar field with no children.
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            list: false,
            exists: true,
            children: Vec::new(),
        }
    }

    /// Creates the synthetic node for a path the schema does not declare.
    ///
    /// The name is the full path as the caller wrote it.
    pub fn non_existent(path: impl Into<String>) -> Self {
        Self {
            name: path.into(),
            type_tag: CUSTOM_TYPE.into(),
            list: false,
            exists: false,
            children: Vec::new(),
        }
    }

    /// Marks this field as a list.
    pub fn into_list(mut self) -> Self {
        self.list = true;
        self
    }

    /// Appends a nested field.
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several nested fields.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Returns true if this field has nested fields.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Follows the first child until reaching a node with no children.
    pub fn deepest_leaf(&self) -> &Self {
        let mut node = self;
        while let Some(first) = node.children.first() {
            node = first;
        }
        node
    }

    /// Looks up a direct child by exact name.
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Counts this node and every node below it.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Decodes a schema tree from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(|source| SchemaError::ParseJson {
            origin: "<string>".into(),
            source,
        })
    }

    /// Reads and decodes a schema tree from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path).map_err(|source| SchemaError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SchemaError::ParseJson {
            origin: path.display().to_string(),
            source,
        })
    }

    /// Formats the tree with the given indentation level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        let list = if self.list { "[]" } else { "" };
        let missing = if self.exists { "" } else { " (undeclared)" };
        writeln!(f, "{prefix}{}: {}{list}{missing}", self.name, self.type_tag)?;
        for child in &self.children {
            child.fmt_tree(f, indent + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

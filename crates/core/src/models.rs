//! Domain model types used throughout semadiff.
//!
//! These types bridge the diff engine and whatever front end consumes the
//! result tree; every field serializes with the snake_case names the UI
//! expects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// Location of a definition inside its source file.
///
/// All fields are zero when the position is unknown (file and folder nodes,
/// or a parsing service that did not report positions).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodePosition {
    pub start_line: u32,
    pub end_line: u32,
    pub start_column: u32,
    pub end_column: u32,
}

// ---------------------------------------------------------------------------
// Node kinds and statuses
// ---------------------------------------------------------------------------

/// Kind of a node in the result tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
    Function,
    Class,
    /// Fallback for definitions whose kind the parsing service did not name.
    Definition,
}

impl NodeKind {
    /// Parse a kind string reported by a parsing service.
    pub fn from_str_val(s: &str) -> Self {
        match s {
            "function" => Self::Function,
            "class" => Self::Class,
            "file" => Self::File,
            "folder" => Self::Folder,
            _ => Self::Definition,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Folder => write!(f, "folder"),
            Self::Function => write!(f, "function"),
            Self::Class => write!(f, "class"),
            Self::Definition => write!(f, "definition"),
        }
    }
}

/// High-level change status for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Removed => write!(f, "removed"),
            Self::Modified => write!(f, "modified"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Three-way classification of one definition across merge-base, the base
/// branch head, and the compare branch head.
///
/// "Changed on neither" is represented by absence from the classification
/// map rather than by a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictClassification {
    ModifiedOnTarget,
    ModifiedOnSource,
    ModifiedOnBoth,
    Conflict,
}

impl std::fmt::Display for ConflictClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModifiedOnTarget => write!(f, "modified_on_target"),
            Self::ModifiedOnSource => write!(f, "modified_on_source"),
            Self::ModifiedOnBoth => write!(f, "modified_on_both"),
            Self::Conflict => write!(f, "conflict"),
        }
    }
}

// ---------------------------------------------------------------------------
// Structure maps
// ---------------------------------------------------------------------------

/// One function or class extracted from a file version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// `function` or `class` (`definition` when the service left it unnamed).
    pub kind: NodeKind,
    /// Exact source text of the definition, byte-compared across versions.
    pub source: String,
    #[serde(default)]
    pub position: CodePosition,
}

/// Mapping from qualified name (dot-joined nesting path, e.g. `Outer.inner`)
/// to the definition extracted from one file version.
///
/// Built fresh per request and never mutated after construction; the ordered
/// map keeps every later iteration alphabetical.
pub type StructureMap = BTreeMap<String, Definition>;

// ---------------------------------------------------------------------------
// Result tree
// ---------------------------------------------------------------------------

/// A renderable node of the branch-diff result tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    /// `path` for file/folder nodes, `path:qualified_name` for definitions.
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub status: ChangeStatus,
    /// True iff this node or any descendant carries a genuine conflict.
    #[serde(default)]
    pub has_conflict: bool,
    /// Location of the node in the (new) source file.
    pub code_position: CodePosition,
    /// Repository-relative file path.
    pub path: String,
    /// Unified diff text (git-style) for this node or file.
    pub source: String,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

/// Shape of the final result: a flat list of file nodes, or the same files
/// grouped under synthesized folder nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeMode {
    Flat,
    Tree,
}

impl TreeMode {
    /// Parse a mode string; anything unrecognized falls back to `flat`.
    pub fn from_str_val(s: &str) -> Self {
        match s {
            "tree" => Self::Tree,
            _ => Self::Flat,
        }
    }
}

impl std::fmt::Display for TreeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Tree => write!(f, "tree"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_parse() {
        assert_eq!(NodeKind::from_str_val("function"), NodeKind::Function);
        assert_eq!(NodeKind::from_str_val("class"), NodeKind::Class);
        assert_eq!(NodeKind::from_str_val("whatever"), NodeKind::Definition);
    }

    #[test]
    fn test_tree_node_serializes_snake_case() {
        let node = TreeNode {
            id: "a.py:foo".into(),
            label: "foo".into(),
            kind: NodeKind::Function,
            status: ChangeStatus::Modified,
            has_conflict: true,
            code_position: CodePosition {
                start_line: 1,
                end_line: 3,
                start_column: 0,
                end_column: 8,
            },
            path: "a.py".into(),
            source: String::new(),
            children: Vec::new(),
        };

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "function");
        assert_eq!(json["status"], "modified");
        assert_eq!(json["has_conflict"], true);
        assert_eq!(json["code_position"]["start_line"], 1);
    }

    #[test]
    fn test_classification_serialization() {
        let json = serde_json::to_value(ConflictClassification::ModifiedOnBoth).unwrap();
        assert_eq!(json, "modified_on_both");
        assert_eq!(ConflictClassification::Conflict.to_string(), "conflict");
    }

    #[test]
    fn test_tree_mode_parse() {
        assert_eq!(TreeMode::from_str_val("tree"), TreeMode::Tree);
        assert_eq!(TreeMode::from_str_val("flat"), TreeMode::Flat);
        assert_eq!(TreeMode::from_str_val("bogus"), TreeMode::Flat);
    }
}

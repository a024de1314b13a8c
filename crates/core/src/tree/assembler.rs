//! Builds per-file nodes with nested definition children, propagates
//! conflict flags, and optionally groups files under folder nodes.

use std::collections::BTreeMap;

use tracing::debug;

use crate::diff::structure::StructureDiff;
use crate::diff::text::build_definition_diff;
use crate::models::{
    ChangeStatus, CodePosition, ConflictClassification, NodeKind, StructureMap, TreeNode,
};
use crate::vcs::ChangeType;

// ---------------------------------------------------------------------------
// File nodes
// ---------------------------------------------------------------------------

/// Derive a file's change status from its VCS change type, falling back to
/// blob-presence inference when the change type is unavailable.
fn file_status(
    change_type: Option<ChangeType>,
    has_blob_before: bool,
    has_blob_after: bool,
) -> ChangeStatus {
    match change_type {
        Some(ChangeType::Added) => ChangeStatus::Added,
        Some(ChangeType::Deleted) => ChangeStatus::Removed,
        Some(_) => ChangeStatus::Modified,
        None => {
            if !has_blob_before && has_blob_after {
                ChangeStatus::Added
            } else if has_blob_before && !has_blob_after {
                ChangeStatus::Removed
            } else {
                ChangeStatus::Modified
            }
        }
    }
}

/// Build the tree node for one changed file, with its changed definitions
/// nested below it.
///
/// Returns `None` when the file is modified but has no structural changes;
/// added and removed files are always kept, even with zero definitions.
#[allow(clippy::too_many_arguments)]
pub fn build_file_node(
    path: &str,
    change_type: Option<ChangeType>,
    has_blob_before: bool,
    has_blob_after: bool,
    file_diff: String,
    before: &StructureMap,
    after: &StructureMap,
    diff: &StructureDiff,
    conflicts: &BTreeMap<String, ConflictClassification>,
) -> Option<TreeNode> {
    let status = file_status(change_type, has_blob_before, has_blob_after);

    // A modified file with only non-structural text changes carries no
    // information for the tree; drop it.
    if !matches!(status, ChangeStatus::Added | ChangeStatus::Removed) && diff.is_empty() {
        debug!(path, "no structural changes, dropping file");
        return None;
    }

    let mut file_node = TreeNode {
        id: path.to_string(),
        label: path.to_string(),
        kind: NodeKind::File,
        status,
        has_conflict: false,
        code_position: CodePosition::default(),
        path: path.to_string(),
        source: file_diff,
        children: Vec::new(),
    };

    // Flat map of definition nodes plus the order they were created in:
    // added, removed, modified, each alphabetical. The order decides how
    // siblings line up under their parent.
    let mut nodes: BTreeMap<String, TreeNode> = BTreeMap::new();
    let mut order: Vec<String> = Vec::new();

    for name in &diff.added {
        if let Some(def) = after.get(name) {
            let diff_text = build_definition_diff(path, name, "", &def.source);
            push_definition_node(
                &mut nodes,
                &mut order,
                path,
                name,
                def.kind,
                ChangeStatus::Added,
                def.position,
                diff_text,
                conflicts,
            );
        }
    }

    for name in &diff.removed {
        if let Some(def) = before.get(name) {
            let diff_text = build_definition_diff(path, name, &def.source, "");
            push_definition_node(
                &mut nodes,
                &mut order,
                path,
                name,
                def.kind,
                ChangeStatus::Removed,
                def.position,
                diff_text,
                conflicts,
            );
        }
    }

    for name in &diff.modified {
        let before_def = before.get(name);
        let after_def = after.get(name);
        let (Some(before_def), Some(after_def)) = (before_def, after_def) else {
            continue;
        };
        let diff_text = build_definition_diff(path, name, &before_def.source, &after_def.source);
        // Prefer the post-change version for kind and position.
        push_definition_node(
            &mut nodes,
            &mut order,
            path,
            name,
            after_def.kind,
            ChangeStatus::Modified,
            after_def.position,
            diff_text,
            conflicts,
        );
    }

    attach_definitions(&mut file_node, nodes, &order);
    propagate_conflicts(&mut file_node);

    Some(file_node)
}

#[allow(clippy::too_many_arguments)]
fn push_definition_node(
    nodes: &mut BTreeMap<String, TreeNode>,
    order: &mut Vec<String>,
    path: &str,
    name: &str,
    kind: NodeKind,
    status: ChangeStatus,
    position: CodePosition,
    diff_text: String,
    conflicts: &BTreeMap<String, ConflictClassification>,
) {
    let label = name.rsplit('.').next().unwrap_or(name).to_string();
    let has_conflict = matches!(conflicts.get(name), Some(ConflictClassification::Conflict));

    nodes.insert(
        name.to_string(),
        TreeNode {
            id: format!("{path}:{name}"),
            label,
            kind,
            status,
            has_conflict,
            code_position: position,
            path: path.to_string(),
            source: diff_text,
            children: Vec::new(),
        },
    );
    order.push(name.to_string());
}

/// Attach each definition node under its parent definition when one exists
/// in this file's set, otherwise directly under the file node.
fn attach_definitions(
    file_node: &mut TreeNode,
    mut nodes: BTreeMap<String, TreeNode>,
    order: &[String],
) {
    // Plan sibling lists first so nodes can be moved out of the flat map
    // without invalidating lookups.
    let mut children_of: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut file_children: Vec<String> = Vec::new();

    for name in order {
        match name.rsplit_once('.') {
            Some((parent, _)) if nodes.contains_key(parent) => {
                children_of
                    .entry(parent.to_string())
                    .or_default()
                    .push(name.clone());
            }
            _ => file_children.push(name.clone()),
        }
    }

    fn take(
        name: &str,
        nodes: &mut BTreeMap<String, TreeNode>,
        children_of: &BTreeMap<String, Vec<String>>,
    ) -> Option<TreeNode> {
        let mut node = nodes.remove(name)?;
        if let Some(child_names) = children_of.get(name) {
            for child in child_names {
                if let Some(child_node) = take(child, nodes, children_of) {
                    node.children.push(child_node);
                }
            }
        }
        Some(node)
    }

    for name in &file_children {
        if let Some(node) = take(name, &mut nodes, &children_of) {
            file_node.children.push(node);
        }
    }
}

// ---------------------------------------------------------------------------
// Conflict propagation
// ---------------------------------------------------------------------------

/// Post-order traversal marking each node conflicted when it already is or
/// any descendant is. Returns the node's final flag.
pub fn propagate_conflicts(node: &mut TreeNode) -> bool {
    let mut flagged = node.has_conflict;
    for child in &mut node.children {
        if propagate_conflicts(child) {
            flagged = true;
        }
    }
    node.has_conflict = flagged;
    flagged
}

// ---------------------------------------------------------------------------
// Folder grouping
// ---------------------------------------------------------------------------

fn folder_node(dir_path: &str) -> TreeNode {
    let label = dir_path.rsplit('/').next().unwrap_or(dir_path).to_string();
    TreeNode {
        id: dir_path.to_string(),
        label,
        kind: NodeKind::Folder,
        // Any folder that appears in the diff contains changes.
        status: ChangeStatus::Modified,
        has_conflict: false,
        code_position: CodePosition::default(),
        path: dir_path.to_string(),
        source: String::new(),
        children: Vec::new(),
    }
}

fn parent_dir(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(dir, _)| dir)
}

/// Group flat file nodes under one folder node per unique directory prefix,
/// then sort every level folders-first, case-insensitive by label.
pub fn group_into_tree(file_nodes: Vec<TreeNode>) -> Vec<TreeNode> {
    let mut folders: BTreeMap<String, TreeNode> = BTreeMap::new();

    // One folder node per unique directory prefix across all file paths;
    // the last path component is the file name itself.
    for file in &file_nodes {
        let parts: Vec<&str> = file.path.split('/').collect();
        let mut prefix = String::new();
        for part in &parts[..parts.len().saturating_sub(1)] {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(part);
            folders
                .entry(prefix.clone())
                .or_insert_with(|| folder_node(&prefix));
        }
    }

    let mut roots: Vec<TreeNode> = Vec::new();

    // Files attach to their deepest containing folder.
    for file in file_nodes {
        match parent_dir(&file.path) {
            Some(dir) => {
                if let Some(folder) = folders.get_mut(dir) {
                    folder.children.push(file);
                }
            }
            None => roots.push(file),
        }
    }

    // Folders attach to their parents, deepest first so every parent is
    // still in the map when its child moves.
    let mut dirs: Vec<String> = folders.keys().cloned().collect();
    dirs.sort_by_key(|d| std::cmp::Reverse(d.matches('/').count()));
    for dir in dirs {
        let Some(node) = folders.remove(&dir) else {
            continue;
        };
        match parent_dir(&dir) {
            Some(parent) => {
                if let Some(parent_node) = folders.get_mut(parent) {
                    parent_node.children.push(node);
                } else {
                    roots.push(node);
                }
            }
            None => roots.push(node),
        }
    }

    for root in &mut roots {
        propagate_conflicts(root);
    }
    sort_children(&mut roots);
    roots
}

/// Recursive sort: folders before everything else, then case-insensitive
/// alphabetical by label within each group.
fn sort_children(nodes: &mut [TreeNode]) {
    nodes.sort_by_key(|n| (n.kind != NodeKind::Folder, n.label.to_lowercase()));
    for node in nodes {
        sort_children(&mut node.children);
    }
}

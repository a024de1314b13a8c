//! Set difference between two structure maps.

use crate::models::StructureMap;

/// Names that changed between two versions of one file.
///
/// Each list is alphabetically sorted. Names present in both versions with
/// byte-identical source are not reported at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureDiff {
    /// Present only in the "after" version.
    pub added: Vec<String>,
    /// Present only in the "before" version.
    pub removed: Vec<String>,
    /// Present in both with differing source text.
    pub modified: Vec<String>,
}

impl StructureDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Compare two structure maps by qualified name and exact source text.
///
/// Any byte difference counts as a modification, whitespace included.
pub fn diff_structures(before: &StructureMap, after: &StructureMap) -> StructureDiff {
    let mut diff = StructureDiff::default();

    for name in after.keys() {
        if !before.contains_key(name) {
            diff.added.push(name.clone());
        }
    }

    for (name, def) in before {
        match after.get(name) {
            None => diff.removed.push(name.clone()),
            Some(after_def) if after_def.source != def.source => diff.modified.push(name.clone()),
            Some(_) => {}
        }
    }

    diff
}

//! Classifies definitions across merge-base, base-branch head, and
//! compare-branch head.
//!
//! Terminology follows the merge direction: "target" is the base branch the
//! compare branch would merge into, "source" is the compare branch itself.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::models::{ConflictClassification, StructureMap};

/// One version of a file: whole content plus its extracted structure.
#[derive(Debug, Clone, Copy)]
pub struct FileVersion<'a> {
    pub content: &'a str,
    pub structure: &'a StructureMap,
}

/// Classify every definition across the three versions of a file.
///
/// Definitions changed on neither side are absent from the result. A
/// definition missing from a version compares unequal to any present text,
/// so additions and removals on a single side flow through the same rules
/// as edits.
pub fn classify_conflicts(
    base: FileVersion<'_>,
    target: FileVersion<'_>,
    source: FileVersion<'_>,
) -> BTreeMap<String, ConflictClassification> {
    let mut classifications = BTreeMap::new();

    let union: BTreeSet<&String> = base
        .structure
        .keys()
        .chain(target.structure.keys())
        .chain(source.structure.keys())
        .collect();

    // The file is untouched on the target branch since divergence, so no
    // conflict is possible: everything in play came from the source branch.
    if base.content == target.content {
        debug!("target content equals base, all changes classify as source-only");
        for name in union {
            classifications.insert(name.clone(), ConflictClassification::ModifiedOnSource);
        }
        return classifications;
    }

    for name in union {
        let in_base = base.structure.get(name).map(|d| d.source.as_str());
        let in_target = target.structure.get(name).map(|d| d.source.as_str());
        let in_source = source.structure.get(name).map(|d| d.source.as_str());

        let changed_on_target = in_base != in_target;
        let changed_on_source = in_base != in_source;

        let classification = match (changed_on_target, changed_on_source) {
            (true, true) => {
                if in_target == in_source {
                    // Convergent edit: both branches arrived at the same text.
                    ConflictClassification::ModifiedOnBoth
                } else {
                    ConflictClassification::Conflict
                }
            }
            (true, false) => ConflictClassification::ModifiedOnTarget,
            (false, true) => ConflictClassification::ModifiedOnSource,
            (false, false) => continue,
        };

        classifications.insert(name.clone(), classification);
    }

    classifications
}

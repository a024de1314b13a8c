//! Branch diff orchestration.
//!
//! [`BranchDiffEngine`] resolves the two branches, finds their merge base,
//! and walks every changed path: language lookup, blob retrieval, structure
//! extraction, structural diff, three-way conflict analysis, and tree
//! assembly. The engine holds no mutable state; concurrent calls are
//! independent.
//!
//! The diff runs merge-base -> compare-head (the `git diff base...compare`
//! form), so only changes introduced on the compare branch since divergence
//! are surfaced; later edits on the base branch never appear.

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::conflict::{classify_conflicts, FileVersion};
use crate::diff::structure::diff_structures;
use crate::diff::text::build_file_diff;
use crate::errors::CoreError;
use crate::extract::{FallbackExtractor, RemoteExtractor, StructureExtractor};
use crate::language;
use crate::models::{TreeMode, TreeNode};
use crate::tree::{build_file_node, group_into_tree};
use crate::vcs::{BranchInfo, GitVcs, VcsProvider};

/// Orchestrates one branch-pair diff over a VCS provider and a structure
/// extractor.
///
/// The extractor is always composed through the fallback decorator, so a
/// failing parsing service degrades a single file version to an empty map
/// and never aborts the request.
pub struct BranchDiffEngine<V, E> {
    vcs: V,
    extractor: FallbackExtractor<E>,
}

impl BranchDiffEngine<GitVcs, RemoteExtractor> {
    /// Open a repository with the default remote-backed extractor stack.
    pub fn open<P: AsRef<std::path::Path>>(
        repo_path: P,
        config: &AppConfig,
    ) -> Result<Self, CoreError> {
        let vcs = GitVcs::new(repo_path)?;
        Ok(Self::new(vcs, RemoteExtractor::new(&config.service)))
    }
}

impl<V: VcsProvider, E: StructureExtractor> BranchDiffEngine<V, E> {
    pub fn new(vcs: V, extractor: E) -> Self {
        Self {
            vcs,
            extractor: FallbackExtractor::new(extractor),
        }
    }

    /// List local branches of the repository.
    pub fn list_branches(&self) -> Result<Vec<BranchInfo>, CoreError> {
        Ok(self.vcs.list_branches()?)
    }

    /// Compute the semantic diff tree between two branches.
    ///
    /// `base_branch` is the merge target, `compare_branch` the branch whose
    /// changes are being reviewed. An unresolvable name fails the whole
    /// request; everything below file level degrades instead of failing.
    pub async fn diff_branches(
        &self,
        base_branch: &str,
        compare_branch: &str,
        mode: TreeMode,
    ) -> Result<Vec<TreeNode>, CoreError> {
        info!(base_branch, compare_branch, %mode, "computing branch diff");

        let base_head = self.vcs.resolve(base_branch)?;
        let compare_head = self.vcs.resolve(compare_branch)?;

        // Diff from the common ancestor so only compare-branch changes are
        // captured. Without an ancestor the base head itself is the origin.
        let diff_origin = self
            .vcs
            .merge_base(&base_head, &compare_head)?
            .unwrap_or_else(|| base_head.clone());

        let deltas = self.vcs.diff(&diff_origin, &compare_head)?;
        let mut file_nodes = Vec::new();

        for delta in &deltas {
            let Some(path) = delta.path() else {
                continue;
            };
            let Some(service) = language::language_for_path(path) else {
                debug!(path, "unsupported extension, skipping");
                continue;
            };

            // Whole-file content on each side of the diff; empty stands in
            // for a missing blob on add/delete.
            let before = self
                .vcs
                .read_blob(&diff_origin, path)?
                .unwrap_or_default();
            let after = self
                .vcs
                .read_blob(&compare_head, path)?
                .unwrap_or_default();

            let file_diff = build_file_diff(path, &before, &after);

            let struct_before = self
                .extractor
                .extract_or_empty(&before, service.language)
                .await;
            let struct_after = self
                .extractor
                .extract_or_empty(&after, service.language)
                .await;

            // Three-way inputs: base = merge-base version (== before),
            // target = base-branch head, source = compare head (== after).
            let target = self
                .vcs
                .read_blob(&base_head, path)?
                .unwrap_or_default();
            let struct_target = if target == before {
                struct_before.clone()
            } else {
                self.extractor
                    .extract_or_empty(&target, service.language)
                    .await
            };

            let classifications = classify_conflicts(
                FileVersion {
                    content: &before,
                    structure: &struct_before,
                },
                FileVersion {
                    content: &target,
                    structure: &struct_target,
                },
                FileVersion {
                    content: &after,
                    structure: &struct_after,
                },
            );

            let structure_diff = diff_structures(&struct_before, &struct_after);

            if let Some(node) = build_file_node(
                path,
                delta.change_type,
                delta.has_blob_before,
                delta.has_blob_after,
                file_diff,
                &struct_before,
                &struct_after,
                &structure_diff,
                &classifications,
            ) {
                debug!(
                    path,
                    children = node.children.len(),
                    conflict = node.has_conflict,
                    "assembled file node"
                );
                file_nodes.push(node);
            }
        }

        info!(files = file_nodes.len(), "branch diff complete");

        Ok(match mode {
            TreeMode::Flat => file_nodes,
            TreeMode::Tree => group_into_tree(file_nodes),
        })
    }
}

//! Read-only access to repository data.
//!
//! The diff engine consumes the [`VcsProvider`] trait; [`git::GitVcs`] is
//! the authoritative `git2`-backed implementation. Providers never mutate
//! repository state.

pub mod git;

pub use git::GitVcs;

use serde::{Deserialize, Serialize};

use crate::errors::VcsError;

/// Identifier of a resolved commit (full hex object id).
pub type CommitId = String;

/// Kind of change a delta represents, as reported by the VCS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Deleted,
    Modified,
    Renamed,
    Copied,
    TypeChange,
}

/// One changed path between two commits.
#[derive(Debug, Clone)]
pub struct FileDelta {
    pub path_before: Option<String>,
    pub path_after: Option<String>,
    /// May be absent; callers fall back to blob-presence inference.
    pub change_type: Option<ChangeType>,
    pub has_blob_before: bool,
    pub has_blob_after: bool,
}

impl FileDelta {
    /// The path to report for this delta, preferring the post-change side.
    pub fn path(&self) -> Option<&str> {
        self.path_after.as_deref().or(self.path_before.as_deref())
    }
}

/// A local branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub is_current: bool,
}

/// Read-only view of a repository.
pub trait VcsProvider: Send + Sync {
    /// Resolve a branch name or revision string to a commit.
    fn resolve(&self, refname: &str) -> Result<CommitId, VcsError>;

    /// Nearest common ancestor of two commits, if any.
    fn merge_base(&self, a: &CommitId, b: &CommitId) -> Result<Option<CommitId>, VcsError>;

    /// Ordered list of paths that differ between two commits.
    fn diff(&self, from: &CommitId, to: &CommitId) -> Result<Vec<FileDelta>, VcsError>;

    /// Content of `path` at `commit`, or `None` when the path is absent.
    fn read_blob(&self, commit: &CommitId, path: &str) -> Result<Option<String>, VcsError>;

    /// All local branches.
    fn list_branches(&self) -> Result<Vec<BranchInfo>, VcsError>;
}

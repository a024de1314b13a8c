//! Local git repository access via `git2`.

use std::path::{Path, PathBuf};

use git2::{BranchType, Delta, ErrorCode, Oid, Repository};
use tracing::{debug, info};

use crate::errors::VcsError;

use super::{BranchInfo, ChangeType, CommitId, FileDelta, VcsProvider};

/// Read-only git provider.
///
/// Holds only the repository path; every operation opens its own
/// `git2::Repository` view, so concurrent diff requests never share state.
pub struct GitVcs {
    repo_path: PathBuf,
}

impl GitVcs {
    /// Validate that `repo_path` is a git repository and create a provider.
    pub fn new<P: AsRef<Path>>(repo_path: P) -> Result<Self, VcsError> {
        let path = repo_path.as_ref();
        // Open once up front so an invalid path fails here, as a
        // client-input error, rather than mid-request.
        Repository::open(path)
            .map_err(|_| VcsError::RepositoryNotFound(path.display().to_string()))?;
        info!(path = %path.display(), "opened git repository");
        Ok(Self {
            repo_path: path.to_path_buf(),
        })
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    fn open(&self) -> Result<Repository, VcsError> {
        Repository::open(&self.repo_path)
            .map_err(|_| VcsError::RepositoryNotFound(self.repo_path.display().to_string()))
    }
}

fn map_change_type(delta: Delta) -> Option<ChangeType> {
    match delta {
        Delta::Added => Some(ChangeType::Added),
        Delta::Deleted => Some(ChangeType::Deleted),
        Delta::Modified => Some(ChangeType::Modified),
        Delta::Renamed => Some(ChangeType::Renamed),
        Delta::Copied => Some(ChangeType::Copied),
        Delta::Typechange => Some(ChangeType::TypeChange),
        _ => None,
    }
}

impl VcsProvider for GitVcs {
    fn resolve(&self, refname: &str) -> Result<CommitId, VcsError> {
        let repo = self.open()?;
        let commit = repo
            .revparse_single(refname)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|_| VcsError::RefNotFound(refname.to_string()))?;
        debug!(refname, sha = %commit.id(), "resolved ref");
        Ok(commit.id().to_string())
    }

    fn merge_base(&self, a: &CommitId, b: &CommitId) -> Result<Option<CommitId>, VcsError> {
        let repo = self.open()?;
        let oid_a = Oid::from_str(a).map_err(VcsError::Git2Error)?;
        let oid_b = Oid::from_str(b).map_err(VcsError::Git2Error)?;
        match repo.merge_base(oid_a, oid_b) {
            Ok(oid) => Ok(Some(oid.to_string())),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(VcsError::Git2Error(e)),
        }
    }

    fn diff(&self, from: &CommitId, to: &CommitId) -> Result<Vec<FileDelta>, VcsError> {
        let repo = self.open()?;
        let tree_from = repo
            .find_commit(Oid::from_str(from).map_err(VcsError::Git2Error)?)?
            .tree()?;
        let tree_to = repo
            .find_commit(Oid::from_str(to).map_err(VcsError::Git2Error)?)?
            .tree()?;

        let diff = repo.diff_tree_to_tree(Some(&tree_from), Some(&tree_to), None)?;

        let mut deltas = Vec::new();
        for delta in diff.deltas() {
            deltas.push(FileDelta {
                path_before: delta
                    .old_file()
                    .path()
                    .map(|p| p.to_string_lossy().into_owned()),
                path_after: delta
                    .new_file()
                    .path()
                    .map(|p| p.to_string_lossy().into_owned()),
                change_type: map_change_type(delta.status()),
                has_blob_before: !delta.old_file().id().is_zero(),
                has_blob_after: !delta.new_file().id().is_zero(),
            });
        }

        debug!(%from, %to, count = deltas.len(), "enumerated changed paths");
        Ok(deltas)
    }

    fn read_blob(&self, commit: &CommitId, path: &str) -> Result<Option<String>, VcsError> {
        let repo = self.open()?;
        let tree = repo
            .find_commit(Oid::from_str(commit).map_err(VcsError::Git2Error)?)?
            .tree()?;

        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(VcsError::Git2Error(e)),
        };

        let object = entry.to_object(&repo)?;
        let content = object
            .as_blob()
            .map(|blob| String::from_utf8_lossy(blob.content()).into_owned());
        Ok(content)
    }

    fn list_branches(&self) -> Result<Vec<BranchInfo>, VcsError> {
        let repo = self.open()?;
        let mut branches = Vec::new();
        for branch_result in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch_result?;
            if let Some(name) = branch.name()? {
                branches.push(BranchInfo {
                    name: name.to_string(),
                    is_current: branch.is_head(),
                });
            }
        }
        Ok(branches)
    }
}

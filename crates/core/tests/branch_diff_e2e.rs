//! End-to-end tests for the branch diff engine.
//!
//! These tests exercise the real [`BranchDiffEngine`] against throwaway git
//! repositories built with `git2` in temporary directories. Structure
//! extraction is scripted per file content so results are deterministic;
//! one test points a real `RemoteExtractor` at an unroutable address to
//! exercise the degradation path.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

use semadiff_core::config::ServiceConfig;
use semadiff_core::engine::BranchDiffEngine;
use semadiff_core::errors::{CoreError, ExtractError, VcsError};
use semadiff_core::extract::{RemoteExtractor, StructureExtractor};
use semadiff_core::models::{
    ChangeStatus, CodePosition, Definition, NodeKind, StructureMap, TreeMode,
};
use semadiff_core::vcs::GitVcs;

// ===========================================================================
// Helpers
// ===========================================================================

fn commit_files(repo: &Repository, files: &[(&str, &str)], message: &str) -> Oid {
    let workdir = repo.workdir().unwrap();
    for (path, content) in files {
        let full = workdir.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full, content).unwrap();
    }

    let mut index = repo.index().unwrap();
    for (path, _) in files {
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();
    let tree_oid = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_oid).unwrap();
    let sig = Signature::now("Test", "test@test.com").unwrap();
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

fn checkout(repo: &Repository, branch: &str) {
    repo.set_head(&format!("refs/heads/{branch}")).unwrap();
    repo.checkout_head(Some(git2::build::CheckoutBuilder::new().force()))
        .unwrap();
}

/// Create a repo with one root commit holding `files`, and branches
/// `trunk` and `feature` both pointing at it. Leaves HEAD on `feature`.
fn repo_with_branches(files: &[(&str, &str)]) -> (TempDir, Repository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let root = commit_files(&repo, files, "root");
    let root_commit = repo.find_commit(root).unwrap();
    repo.branch("trunk", &root_commit, true).unwrap();
    repo.branch("feature", &root_commit, true).unwrap();
    drop(root_commit);
    checkout(&repo, "feature");
    (dir, repo)
}

/// Deterministic extractor: maps exact file content to a scripted
/// structure map; unknown content extracts to an empty map.
#[derive(Default)]
struct ScriptedExtractor {
    maps: HashMap<String, StructureMap>,
}

impl ScriptedExtractor {
    fn script(mut self, content: &str, entries: &[(&str, NodeKind, &str)]) -> Self {
        let map: StructureMap = entries
            .iter()
            .map(|(name, kind, source)| {
                (
                    name.to_string(),
                    Definition {
                        kind: *kind,
                        source: source.to_string(),
                        position: CodePosition {
                            start_line: 1,
                            end_line: 2,
                            start_column: 0,
                            end_column: 0,
                        },
                    },
                )
            })
            .collect();
        self.maps.insert(content.to_string(), map);
        self
    }
}

#[async_trait]
impl StructureExtractor for ScriptedExtractor {
    async fn extract(&self, source: &str, _language: &str) -> Result<StructureMap, ExtractError> {
        Ok(self.maps.get(source).cloned().unwrap_or_default())
    }
}

fn engine_with(
    dir: &TempDir,
    extractor: ScriptedExtractor,
) -> BranchDiffEngine<GitVcs, ScriptedExtractor> {
    BranchDiffEngine::new(GitVcs::new(dir.path()).unwrap(), extractor)
}

// ===========================================================================
// Scenarios
// ===========================================================================

const FOO_V1: &str = "def foo():\n    return 1\n";
const FOO_V2: &str = "def foo():\n    return 2\n";

#[tokio::test]
async fn scenario_change_only_on_compare_branch() {
    let (dir, repo) = repo_with_branches(&[("a.py", FOO_V1)]);
    commit_files(&repo, &[("a.py", FOO_V2)], "edit foo on feature");

    let extractor = ScriptedExtractor::default()
        .script(FOO_V1, &[("foo", NodeKind::Function, "def foo():\n    return 1")])
        .script(FOO_V2, &[("foo", NodeKind::Function, "def foo():\n    return 2")]);

    let result = engine_with(&dir, extractor)
        .diff_branches("trunk", "feature", TreeMode::Flat)
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    let file = &result[0];
    assert_eq!(file.path, "a.py");
    assert_eq!(file.status, ChangeStatus::Modified);
    assert!(!file.has_conflict);
    assert!(file.source.contains("--- a/a.py"));

    assert_eq!(file.children.len(), 1);
    let foo = &file.children[0];
    assert_eq!(foo.id, "a.py:foo");
    assert_eq!(foo.status, ChangeStatus::Modified);
    assert!(!foo.has_conflict);
    assert!(foo.source.contains("a.py:foo:old"));
    assert!(foo.source.contains("-    return 1"));
    assert!(foo.source.contains("+    return 2"));
}

#[tokio::test]
async fn scenario_divergent_edits_conflict() {
    const BAR_BASE: &str = "def bar():\n    return 0\n";
    const BAR_TRUNK: &str = "def bar():\n    return 'trunk'\n";
    const BAR_FEATURE: &str = "def bar():\n    return 'feature'\n";

    let (dir, repo) = repo_with_branches(&[("b.py", BAR_BASE)]);
    commit_files(&repo, &[("b.py", BAR_FEATURE)], "edit bar on feature");
    checkout(&repo, "trunk");
    commit_files(&repo, &[("b.py", BAR_TRUNK)], "edit bar on trunk");

    let extractor = ScriptedExtractor::default()
        .script(BAR_BASE, &[("bar", NodeKind::Function, "def bar():\n    return 0")])
        .script(BAR_TRUNK, &[("bar", NodeKind::Function, "def bar():\n    return 'trunk'")])
        .script(
            BAR_FEATURE,
            &[("bar", NodeKind::Function, "def bar():\n    return 'feature'")],
        );

    let result = engine_with(&dir, extractor)
        .diff_branches("trunk", "feature", TreeMode::Flat)
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    let file = &result[0];
    assert!(file.has_conflict);
    assert_eq!(file.children.len(), 1);
    let bar = &file.children[0];
    assert_eq!(bar.id, "b.py:bar");
    assert_eq!(bar.status, ChangeStatus::Modified);
    assert!(bar.has_conflict);
}

#[tokio::test]
async fn scenario_convergent_edits_do_not_conflict() {
    const BASE: &str = "def f():\n    return 0\n";
    const BOTH: &str = "def f():\n    return 9\n";

    let (dir, repo) = repo_with_branches(&[("c.py", BASE)]);
    commit_files(&repo, &[("c.py", BOTH)], "same edit on feature");
    checkout(&repo, "trunk");
    commit_files(&repo, &[("c.py", BOTH)], "same edit on trunk");

    let extractor = ScriptedExtractor::default()
        .script(BASE, &[("f", NodeKind::Function, "def f():\n    return 0")])
        .script(BOTH, &[("f", NodeKind::Function, "def f():\n    return 9")]);

    let result = engine_with(&dir, extractor)
        .diff_branches("trunk", "feature", TreeMode::Flat)
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert!(!result[0].has_conflict);
    assert!(!result[0].children[0].has_conflict);
}

#[tokio::test]
async fn scenario_added_file_kept_without_children() {
    let (dir, repo) = repo_with_branches(&[("existing.py", "x = 1\n")]);
    commit_files(&repo, &[("fresh.py", "y = 2\n")], "add fresh file");

    // Nothing scripted: extraction yields empty maps for every version.
    let result = engine_with(&dir, ScriptedExtractor::default())
        .diff_branches("trunk", "feature", TreeMode::Flat)
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    let file = &result[0];
    assert_eq!(file.path, "fresh.py");
    assert_eq!(file.status, ChangeStatus::Added);
    assert!(file.children.is_empty());
    assert!(file.source.contains("+++ b/fresh.py"));
}

#[tokio::test]
async fn scenario_base_branch_changes_do_not_appear() {
    let (dir, repo) = repo_with_branches(&[("a.py", FOO_V1), ("b.py", "z = 1\n")]);
    commit_files(&repo, &[("b.py", "z = 2\n")], "edit b on feature");
    checkout(&repo, "trunk");
    commit_files(&repo, &[("a.py", FOO_V2)], "edit a on trunk after divergence");

    let extractor = ScriptedExtractor::default()
        .script("z = 1\n", &[("z", NodeKind::Definition, "z = 1")])
        .script("z = 2\n", &[("z", NodeKind::Definition, "z = 2")]);

    let result = engine_with(&dir, extractor)
        .diff_branches("trunk", "feature", TreeMode::Flat)
        .await
        .unwrap();

    // Only the file changed on the compare branch shows up.
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].path, "b.py");
}

#[tokio::test]
async fn scenario_unsupported_extension_is_skipped() {
    let (dir, repo) = repo_with_branches(&[("a.py", FOO_V1)]);
    commit_files(&repo, &[("notes.txt", "remember\n")], "add notes");

    let result = engine_with(&dir, ScriptedExtractor::default())
        .diff_branches("trunk", "feature", TreeMode::Flat)
        .await
        .unwrap();

    assert!(result.is_empty());
}

#[tokio::test]
async fn scenario_modified_file_without_structural_change_dropped() {
    const WITH_COMMENT: &str = "# tweak\ndef foo():\n    return 1\n";

    let (dir, repo) = repo_with_branches(&[("a.py", FOO_V1)]);
    commit_files(&repo, &[("a.py", WITH_COMMENT)], "comment only");

    // Both versions extract to the same single definition.
    let extractor = ScriptedExtractor::default()
        .script(FOO_V1, &[("foo", NodeKind::Function, "def foo():\n    return 1")])
        .script(
            WITH_COMMENT,
            &[("foo", NodeKind::Function, "def foo():\n    return 1")],
        );

    let result = engine_with(&dir, extractor)
        .diff_branches("trunk", "feature", TreeMode::Flat)
        .await
        .unwrap();

    assert!(result.is_empty());
}

#[tokio::test]
async fn scenario_tree_mode_groups_by_directory() {
    let (dir, repo) = repo_with_branches(&[("seed.py", "s = 0\n")]);
    commit_files(
        &repo,
        &[
            ("src/app.py", "a = 1\n"),
            ("src/lib/util.py", "u = 1\n"),
            ("root.py", "r = 1\n"),
        ],
        "add files on feature",
    );

    let result = engine_with(&dir, ScriptedExtractor::default())
        .diff_branches("trunk", "feature", TreeMode::Tree)
        .await
        .unwrap();

    // Folders precede files at every level.
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].kind, NodeKind::Folder);
    assert_eq!(result[0].label, "src");
    assert_eq!(result[1].label, "root.py");

    let src = &result[0];
    assert_eq!(src.children[0].kind, NodeKind::Folder);
    assert_eq!(src.children[0].label, "lib");
    assert_eq!(src.children[1].label, "app.py");
    assert_eq!(src.children[0].children[0].path, "src/lib/util.py");
}

#[tokio::test]
async fn scenario_unknown_branch_is_fatal() {
    let (dir, _repo) = repo_with_branches(&[("a.py", FOO_V1)]);

    let err = engine_with(&dir, ScriptedExtractor::default())
        .diff_branches("trunk", "no-such-branch", TreeMode::Flat)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Vcs(VcsError::RefNotFound(_))));
}

#[tokio::test]
async fn scenario_unreachable_parsing_service_degrades() {
    let (dir, repo) = repo_with_branches(&[("seed.py", "s = 0\n")]);
    commit_files(&repo, &[("d.py", FOO_V1)], "add d.py on feature");

    // TEST-NET address: never routable, so every extraction times out and
    // degrades to an empty structure map.
    let config = ServiceConfig {
        host: "192.0.2.1".into(),
        timeout_ms: 200,
    };
    let engine = BranchDiffEngine::new(
        GitVcs::new(dir.path()).unwrap(),
        RemoteExtractor::new(&config),
    );

    let result = engine
        .diff_branches("trunk", "feature", TreeMode::Flat)
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    let file = &result[0];
    assert_eq!(file.path, "d.py");
    assert_eq!(file.status, ChangeStatus::Added);
    assert!(file.children.is_empty());
    assert!(file.source.contains("+++ b/d.py"));
}

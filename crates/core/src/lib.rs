//! Semadiff core library.
//!
//! This crate computes semantic, structure-level differences between two
//! git branches and classifies three-way merge conflicts at the granularity
//! of individual functions and classes, producing a renderable tree of
//! changed files and nested definitions for a conflict-resolution UI.

pub mod config;
pub mod conflict;
pub mod diff;
pub mod engine;
pub mod errors;
pub mod extract;
pub mod language;
pub mod models;
pub mod tree;
pub mod vcs;

// Re-exports for convenience.
pub use config::AppConfig;
pub use engine::BranchDiffEngine;
pub use errors::CoreError;
pub use models::{TreeMode, TreeNode};

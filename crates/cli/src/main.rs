//! Semadiff command-line inspection tool.
//!
//! Provides subcommands for listing the branches of a repository and for
//! computing the semantic diff tree between two branches, rendered either
//! as a styled tree or as JSON for UI consumption.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use console::Style;
use tracing_subscriber::EnvFilter;

use semadiff_core::config::AppConfig;
use semadiff_core::engine::BranchDiffEngine;
use semadiff_core::extract::RemoteExtractor;
use semadiff_core::models::{ChangeStatus, TreeMode, TreeNode};
use semadiff_core::vcs::GitVcs;

/// The default engine stack: git2 repository access with remote-backed
/// structure extraction.
type Engine = BranchDiffEngine<GitVcs, RemoteExtractor>;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Semantic branch diff inspection tool.
#[derive(Parser, Debug)]
#[command(
    name = "semadiff",
    version,
    about = "Inspect semantic differences and conflicts between git branches"
)]
struct Cli {
    /// Path to the git repository.
    #[arg(short, long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Optional TOML configuration file (parsing-service host/timeout).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List local branches.
    Branches,

    /// Compute the semantic diff tree between two branches.
    Diff {
        /// Base branch (the merge target).
        base: String,

        /// Compare branch (the branch under review).
        compare: String,

        /// Result shape: flat or tree.
        #[arg(short, long, default_value = "flat")]
        mode: String,

        /// Emit the result as JSON instead of a rendered tree.
        #[arg(long)]
        json: bool,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    // Minimal logging for CLI; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path).context("failed to load configuration")?,
        None => AppConfig::default(),
    };

    let engine = BranchDiffEngine::open(&cli.repo, &config)
        .with_context(|| format!("failed to open repository at {}", cli.repo.display()))?;

    match cli.command {
        Commands::Branches => cmd_branches(&engine),
        Commands::Diff {
            base,
            compare,
            mode,
            json,
        } => cmd_diff(&engine, &base, &compare, &mode, json).await,
    }
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_branches(engine: &Engine) -> Result<()> {
    let branches = engine.list_branches().context("failed to list branches")?;

    let mut table = Table::new();
    table.set_header(vec!["Branch", "Current"]);
    for branch in &branches {
        table.add_row(vec![
            branch.name.clone(),
            if branch.is_current { "*".into() } else { String::new() },
        ]);
    }
    println!("{table}");
    Ok(())
}

async fn cmd_diff(
    engine: &Engine,
    base: &str,
    compare: &str,
    mode: &str,
    json: bool,
) -> Result<()> {
    let mode = match mode {
        "flat" => TreeMode::Flat,
        "tree" => TreeMode::Tree,
        other => bail!("unknown tree mode '{other}' (expected 'flat' or 'tree')"),
    };

    let nodes = engine
        .diff_branches(base, compare, mode)
        .await
        .with_context(|| format!("failed to diff '{base}'..'{compare}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    if nodes.is_empty() {
        println!("No semantic changes between '{base}' and '{compare}'.");
        return Ok(());
    }

    for node in &nodes {
        print_node(node, 0);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn status_style(status: ChangeStatus) -> Style {
    match status {
        ChangeStatus::Added => Style::new().green(),
        ChangeStatus::Removed => Style::new().red(),
        ChangeStatus::Modified => Style::new().yellow(),
        ChangeStatus::Unchanged => Style::new().dim(),
    }
}

fn print_node(node: &TreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let style = status_style(node.status);
    let kind = Style::new().dim().apply_to(node.kind.to_string());
    let conflict = if node.has_conflict {
        format!(" {}", Style::new().red().bold().apply_to("⚠ conflict"))
    } else {
        String::new()
    };

    println!(
        "{indent}{} [{kind}] {}{conflict}",
        style.apply_to(&node.label),
        Style::new().dim().apply_to(node.status.to_string()),
    );

    for child in &node.children {
        print_node(child, depth + 1);
    }
}

//! Clap CLI definitions for `syncd`.
//!
//! Kept deliberately thin per SPEC_FULL §6.3: one variant per external
//! collaborator verb, plus an operator-only `serve` that hosts the HTTP API,
//! webhook ingress, and file watcher together.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// syncd -- reconciles `.todo/*.md`, the beads store, GitHub, and Linear.
#[derive(Parser, Debug)]
#[command(name = "syncd", about = "Reconciliation daemon for the beads system", version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Global flags available to every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to `server.yaml` (default: `./server.yaml`).
    #[arg(long, global = true, default_value = "server.yaml")]
    pub config: PathBuf,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug logging.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile `.todo/*.md` files into the canonical beads JSONL store.
    Compile(CompileArgs),

    /// Initialize a `.beads`/`.todo` layout in the current repo.
    Init(InitArgs),

    /// Generate `.todo/*.md` files from an existing source.
    Generate(GenerateArgs),

    /// Watch `.todo/*.md` for changes and push them through the orchestrator.
    Watch(WatchArgs),

    /// Run one reconciliation pass across every configured axis, then exit.
    Sync,

    /// Start the HTTP API, webhook ingress, and file watcher together.
    Serve,
}

#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    /// Directory containing `.todo/*.md` files.
    #[arg(long, default_value = ".todo")]
    pub todo_dir: PathBuf,

    /// Path to the beads JSONL store.
    #[arg(long, default_value = ".beads/issues.jsonl")]
    pub store: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory).
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(long, value_enum)]
    pub source: GenerateSource,

    /// Directory to write generated `.todo/*.md` files into.
    #[arg(long, default_value = ".todo")]
    pub todo_dir: PathBuf,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateSource {
    Beads,
    Github,
    Api,
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    #[arg(long, default_value = ".todo")]
    pub todo_dir: PathBuf,
}

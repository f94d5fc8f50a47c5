//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Ignis - generate the assets needed to bootstrap a cluster
#[derive(Parser)]
#[command(name = "ignis")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load or generate assets and write them to the asset directory
    Create(CreateArgs),

    /// Display the dependency graph of an asset
    Graph(GraphArgs),

    /// Destroy the cluster described by metadata.json
    Destroy(DestroyArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    /// Assets to create (defaults to metadata and the bootstrap config)
    pub targets: Vec<String>,

    /// Asset directory (defaults to the current directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Directory holding bootstrap file and unit templates
    /// (defaults to the data/ directory of the ignis source tree)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Release image rendered into the bootstrap config
    #[arg(long)]
    pub release_image: Option<String>,
}

#[derive(Args)]
pub struct GraphArgs {
    /// Root asset (defaults to the bootstrap config)
    pub root: Option<String>,

    /// List every registered asset instead of a tree
    #[arg(long)]
    pub list: bool,

    /// Maximum depth to display
    #[arg(long)]
    pub depth: Option<usize>,
}

#[derive(Args)]
pub struct DestroyArgs {
    /// Asset directory containing metadata.json (defaults to the current directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

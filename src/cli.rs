use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::names::FileNameReplacement;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "skelly")]
#[command(about = "Turn an indentation-based structure description into files and folders")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress spinners and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without touching the filesystem
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a structure and print the planned operations
    Plan(PlanArgs),

    /// Create the described structure on disk
    Apply(ApplyArgs),

    /// Initialize a skelly.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// How plans and logs are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tree,
    Table,
    Json,
}

/// Arguments shared by `plan` and `apply`
#[derive(Debug, Args)]
pub struct StructureArgs {
    /// Structure file to read, or `-` for stdin
    pub input: PathBuf,

    /// Destination root directory (default: config `root_dir`, else `.`)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output format (default: config `format`, else tree)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Do not enumerate the contents of copied or moved directories
    #[arg(long)]
    pub no_recursive: bool,

    /// Rename rule for every name (SEARCH=REPLACE, repeatable)
    #[arg(long, value_name = "SEARCH=REPLACE", value_parser = FileNameReplacement::parse_pair)]
    pub replace: Vec<FileNameReplacement>,

    /// Rename rule for file names only (SEARCH=REPLACE, repeatable)
    #[arg(long, value_name = "SEARCH=REPLACE", value_parser = FileNameReplacement::parse_pair)]
    pub replace_file: Vec<FileNameReplacement>,

    /// Rename rule for folder names only (SEARCH=REPLACE, repeatable)
    #[arg(long, value_name = "SEARCH=REPLACE", value_parser = FileNameReplacement::parse_pair)]
    pub replace_folder: Vec<FileNameReplacement>,
}

#[derive(Debug, Parser)]
pub struct PlanArgs {
    #[command(flatten)]
    pub structure: StructureArgs,
}

#[derive(Debug, Parser)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub structure: StructureArgs,

    /// Exit with status 2 when the run produced warnings
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}

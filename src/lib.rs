//! **skelly** - Turn indentation-based structure descriptions into files and folders
//!
//! Front matter, repeaters, copy/move from templates, and scoped rename rules.
//! Planning is pure; execution runs against any `FileSystem` backend and never
//! aborts on a single failed operation.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// CLI command handlers
pub mod cli_ext {
    /// `plan` and `apply` against the local disk
    pub mod structure_cmd;
    pub use structure_cmd::{run_apply, run_plan};
}

/// Core pipeline - text to plan to filesystem
pub mod core {
    /// YAML front matter with rename rules
    pub mod frontmatter;
    pub use frontmatter::{StructureFrontmatter, extract as extract_frontmatter};

    /// `$*N` repeater expansion
    pub mod repeater;
    pub use repeater::{MAX_REPEAT_COUNT, expand as expand_repeaters};

    /// Indentation measurement and line classification
    pub mod line;
    pub use line::{LineKind, ParsedLine};

    /// Name rules: escapes, extensions, rename tiers
    pub mod names;
    pub use names::{FileNameReplacement, Replacements};

    /// Tree builder producing the ordered operation list
    pub mod plan;
    pub use plan::{OperationType, Plan, PlanError, StructureOperation, StructureOptions, plan};

    /// Executor with fallback and warnings
    pub mod execute;
    pub use execute::{ExecutionReport, OperationLog, Outcome, Warning, execute, execute_plan};

    /// Tree, table and JSON output
    pub mod render;
}

/// Filesystem abstraction with local and in-memory backends
pub mod fs;

/// Infrastructure - configuration
pub mod infra {
    /// Configuration management with TOML/YAML/JSON files and SKELLY_ env
    pub mod config;
    pub use config::{Config, init as config_init, load_config};
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use crate::core::{ExecutionReport, Plan, StructureOperation, StructureOptions, execute, plan};
pub use fs::{FileSystem, FsError, LocalFs, MemoryFs};
pub use infra::{Config, load_config};

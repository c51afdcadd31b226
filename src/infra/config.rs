use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs, OutputFormat};
use crate::core::names::{FileNameReplacement, Replacements};

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Default destination root (current directory when unset)
    pub root_dir: Option<PathBuf>,

    /// Enumerate contents of copied/moved directories
    pub recursive: bool,

    /// Default output format for plans and logs
    pub format: OutputFormat,

    /// Rename rules applied before any front-matter rules
    pub replacements: Replacements,
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            root_dir: None,
            recursive: true,
            format: OutputFormat::Tree,
            replacements: Replacements::default(),
        }
    }
}

/// Config file names, first match wins
pub const CONFIG_FILES: [&str; 4] = ["skelly.toml", "skelly.yaml", "skelly.json", ".skelly.toml"];

pub fn load_config() -> Result<Config>
{
    load_config_from(Path::new("."))
}

pub fn load_config_from(dir: &Path) -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    for name in &CONFIG_FILES
    {
        let path = dir.join(name);
        if path.exists()
        {
            builder = builder.add_source(config::File::from(path));
            break;
        }
    }

    // Add environment variables with SKELLY_ prefix
    builder = builder.add_source(
        config::Environment::with_prefix("SKELLY")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

/// Commented example rules written by `init`
fn sample_config() -> Config
{
    Config {
        replacements: Replacements {
            all: vec![FileNameReplacement::new("__name__", "my-project")],
            ..Replacements::default()
        },
        ..Config::default()
    }
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join("skelly.toml");

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let toml_string =
        toml::to_string_pretty(&sample_config()).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

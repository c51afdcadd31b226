//! Shell completion scripts for `skelly`, rendered by clap_complete.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::Shell as CompletionShell;

use crate::cli::{AppContext, Cli, CompletionsArgs, Shell};

impl From<Shell> for CompletionShell
{
    fn from(shell: Shell) -> Self
    {
        match shell
        {
            Shell::Bash => CompletionShell::Bash,
            Shell::Zsh => CompletionShell::Zsh,
            Shell::Fish => CompletionShell::Fish,
            Shell::PowerShell => CompletionShell::PowerShell,
            Shell::Elvish => CompletionShell::Elvish,
        }
    }
}

/// Render the script for `shell` into `out`, named after the binary.
pub fn write_script(
    shell: Shell,
    out: &mut dyn Write,
) -> Result<()>
{
    let mut cmd = Cli::command();
    let bin = cmd
        .get_name()
        .to_string();
    let mut buf = Vec::new();
    clap_complete::generate(CompletionShell::from(shell), &mut cmd, bin, &mut buf);
    out.write_all(&buf)
        .context("write completion script")
}

/// Write the script into `dir`, creating it; returns the file written.
pub fn write_script_to(
    shell: Shell,
    dir: &Path,
) -> Result<PathBuf>
{
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create completion dir {}", dir.display()))?;
    let mut cmd = Cli::command();
    let bin = cmd
        .get_name()
        .to_string();
    clap_complete::generate_to(CompletionShell::from(shell), &mut cmd, bin, dir)
        .context("generate completion file")
}

pub fn run(
    args: CompletionsArgs,
    ctx: &AppContext,
) -> Result<()>
{
    if args.stdout
    {
        return write_script(args.shell, &mut std::io::stdout().lock());
    }

    let Some(dir) = args.out_dir
    else
    {
        anyhow::bail!("--out-dir is required unless --stdout is set");
    };
    let path = write_script_to(args.shell, &dir)?;

    if !ctx.quiet
    {
        eprintln!("Wrote completion to {}", path.display());
    }
    Ok(())
}

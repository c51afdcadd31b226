//! CLI command handlers for `plan` and `apply`.
//!
//! Resolves options from config + flags, reads the structure text, and hands
//! it to the planner or executor against the local disk.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tracing::{info, instrument};

use crate::cli::{AppContext, ApplyArgs, OutputFormat, PlanArgs, StructureArgs};
use crate::core::execute::{ExecutionReport, execute_plan};
use crate::core::names::Replacements;
use crate::core::plan::{StructureOptions, plan};
use crate::core::render::{render_plan, render_report};
use crate::infra::config::{Config, load_config};
use crate::fs::LocalFs;

/// Exit status for `apply --strict` runs that produced warnings
pub const EXIT_WARNINGS: i32 = 2;

/// Read the structure from a path or from stdin for `-`.
pub fn read_input(input: &Path) -> Result<String>
{
    if input == Path::new("-")
    {
        let mut s = String::new();
        std::io::stdin()
            .read_to_string(&mut s)
            .context("Failed to read structure from stdin")?;
        return Ok(s);
    }

    std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read structure file {}", input.display()))
}

/// Config rules first, then flag rules, per scope.
pub fn resolve_options(
    args: &StructureArgs,
    config: &Config,
) -> Result<StructureOptions>
{
    let root = args
        .root
        .clone()
        .or_else(|| config.root_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let root = absolutize(&root)?;

    let mut replacements = config
        .replacements
        .clone();
    replacements.extend(&Replacements {
        all: args.replace.clone(),
        files: args.replace_file.clone(),
        folders: args.replace_folder.clone(),
    });

    Ok(StructureOptions::new(root)
        .with_replacements(replacements)
        .with_recursive(config.recursive && !args.no_recursive))
}

fn absolutize(path: &Path) -> Result<PathBuf>
{
    if path.is_absolute()
    {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    Ok(cwd.join(path))
}

fn output_format(
    args: &StructureArgs,
    config: &Config,
) -> OutputFormat
{
    args.format
        .unwrap_or(config.format)
}

#[instrument(skip_all)]
pub fn run_plan(
    args: PlanArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config = load_config().unwrap_or_default();
    let options = resolve_options(&args.structure, &config)?;
    let input = read_input(&args.structure.input)?;

    let plan = plan(&input, &options, &LocalFs).context("Failed to plan structure")?;
    info!(operations = plan.len(), "planned");

    let format = output_format(&args.structure, &config);
    println!("{}", render_plan(&plan, format, !ctx.no_color)?);

    if !ctx.quiet && format != OutputFormat::Json
    {
        for (op, warning) in plan.warnings()
        {
            eprintln!("{} {}: {}", "warning:".yellow(), op.target_path.display(), warning);
        }
    }
    Ok(())
}

/// Execute the structure; returns the process exit code.
#[instrument(skip_all)]
pub fn run_apply(
    args: ApplyArgs,
    ctx: &AppContext,
) -> Result<i32>
{
    if ctx.dry_run
    {
        if !ctx.quiet
        {
            println!("{}", "DRY RUN: nothing will be written".yellow());
        }
        run_plan(PlanArgs { structure: args.structure }, ctx)?;
        return Ok(0);
    }

    let config = load_config().unwrap_or_default();
    let options = resolve_options(&args.structure, &config)?;
    let input = read_input(&args.structure.input)?;
    let format = output_format(&args.structure, &config);

    // Planning errors abort before anything is written
    let plan = plan(&input, &options, &LocalFs).context("Failed to plan structure")?;

    let spinner = if ctx.quiet
    {
        ProgressBar::hidden()
    }
    else
    {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("applying {} operations", plan.len()));
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    };

    let report = execute_plan(&plan, &LocalFs);
    spinner.finish_and_clear();

    print_report(&report, format, ctx)?;

    if args.strict && report.had_warnings
    {
        return Ok(EXIT_WARNINGS);
    }
    Ok(0)
}

fn print_report(
    report: &ExecutionReport,
    format: OutputFormat,
    ctx: &AppContext,
) -> Result<()>
{
    if format == OutputFormat::Json
    {
        println!("{}", render_report(report, format)?);
        return Ok(());
    }

    if ctx.quiet
    {
        return Ok(());
    }

    println!("{}", render_report(report, format)?);
    for warning in &report.warnings
    {
        eprintln!("{} {}", "warning:".yellow(), warning);
    }

    let summary = format!(
        "{} operations, {} warnings",
        report
            .operation_log
            .len(),
        report.warnings.len()
    );
    if report.had_warnings
    {
        println!("{}", summary.yellow());
    }
    else
    {
        println!("{}", summary.green());
    }
    Ok(())
}

//! Presentation of plans and execution reports: tree, table, or JSON.
//!
//! Tree labels follow the usual convention: directories end in `/`, files are
//! coloured by extension, and copy/move/included entries show their source.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use ptree::TreeBuilder;
use ptree::print_config::PrintConfig;
use tabled::{Table, Tabled};

use crate::cli::OutputFormat;
use crate::core::execute::ExecutionReport;
use crate::core::plan::{OperationType, Plan, StructureOperation};

pub fn render_plan(
    plan: &Plan,
    format: OutputFormat,
    color: bool,
) -> Result<String>
{
    match format
    {
        OutputFormat::Tree => render_tree(plan, color),
        OutputFormat::Table => Ok(render_table(plan)),
        OutputFormat::Json => serde_json::to_string_pretty(plan).context("serialize plan"),
    }
}

/// Tree rooted at the destination directory.
pub fn render_tree(
    plan: &Plan,
    color: bool,
) -> Result<String>
{
    let root = plan
        .options
        .root_dir
        .display()
        .to_string();
    let mut builder = TreeBuilder::new(if color { root.bold().to_string() } else { root });

    add_children_to_builder(&mut builder, plan, &plan.roots(), color);

    let tree = builder.build();
    let mut out = Vec::new();
    ptree::write_tree_with(&tree, &mut out, &PrintConfig::default()).context("render tree")?;

    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn add_children_to_builder(
    builder: &mut TreeBuilder,
    plan: &Plan,
    indices: &[usize],
    color: bool,
)
{
    for &i in indices
    {
        let op = &plan.operations[i];
        let children = plan.children(i);
        if children.is_empty()
        {
            builder.add_empty_child(format_node_label(op, color));
        }
        else
        {
            builder.begin_child(format_node_label(op, color));
            add_children_to_builder(builder, plan, &children, color);
            builder.end_child();
        }
    }
}

/// `name/` for directories, plus `<- source (kind)` and any warning.
fn format_node_label(
    op: &StructureOperation,
    color: bool,
) -> String
{
    let mut label = match (op.is_directory, color)
    {
        (true, true) => format!("{}/", op.name.blue()),
        (true, false) => format!("{}/", op.name),
        (false, true) => color_by_ext(&op.name),
        (false, false) => op.name.clone(),
    };

    if let Some(source) = &op.source_path
    {
        let note = format!("<- {} ({})", source.display(), op.kind);
        if color
        {
            label.push_str(&format!(" {}", note.dimmed()));
        }
        else
        {
            label.push(' ');
            label.push_str(&note);
        }
    }

    if let Some(warning) = &op.warning
    {
        let note = format!("! {warning}");
        if color
        {
            label.push_str(&format!(" {}", note.yellow()));
        }
        else
        {
            label.push(' ');
            label.push_str(&note);
        }
    }

    label
}

fn color_by_ext(name: &str) -> String
{
    if let Some(ext) = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
    {
        match ext
        {
            "rs" => name.yellow().to_string(),
            "py" => name.green().to_string(),
            "js" | "jsx" | "ts" | "tsx" => name.cyan().to_string(),
            "go" => name.magenta().to_string(),
            "c" | "cpp" | "cc" | "cxx" | "h" | "hpp" => name.red().to_string(),
            "md" | "txt" | "readme" => name.white().to_string(),
            "toml" | "yaml" | "yml" | "json" => name.bright_blue().to_string(),
            _ => name.to_string(),
        }
    }
    else
    {
        name.to_string()
    }
}

#[derive(Tabled)]
struct PlanRow
{
    #[tabled(rename = "Type")]
    kind: OperationType,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Dir")]
    dir: &'static str,
    #[tabled(rename = "Depth")]
    depth: usize,
    #[tabled(rename = "Warning")]
    warning: String,
}

pub fn render_table(plan: &Plan) -> String
{
    let rows = plan
        .operations
        .iter()
        .map(|op| PlanRow {
            kind: op.kind,
            target: format!("{}{}", "  ".repeat(op.depth), op.target_path.display()),
            source: op
                .source_path
                .as_ref()
                .map(|s| s.display().to_string())
                .unwrap_or_default(),
            dir: if op.is_directory { "yes" } else { "no" },
            depth: op.depth,
            warning: op
                .warning
                .clone()
                .unwrap_or_default(),
        });
    Table::new(rows).to_string()
}

#[derive(Tabled)]
struct LogRow
{
    #[tabled(rename = "Result")]
    outcome: &'static str,
    #[tabled(rename = "Type")]
    kind: OperationType,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Source")]
    source: String,
}

pub fn render_report(
    report: &ExecutionReport,
    format: OutputFormat,
) -> Result<String>
{
    if format == OutputFormat::Json
    {
        return serde_json::to_string_pretty(report).context("serialize report");
    }

    let rows = report
        .operation_log
        .entries()
        .iter()
        .map(|e| LogRow {
            outcome: e.outcome.label(),
            kind: e.kind,
            path: e
                .path
                .display()
                .to_string(),
            source: e
                .source
                .as_ref()
                .map(|s| s.display().to_string())
                .unwrap_or_default(),
        });
    Ok(Table::new(rows).to_string())
}

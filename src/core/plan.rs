//! Structure planning: text in, ordered operation list out.
//!
//! Pipeline: front matter split → repeater expansion → per-line
//! classification and name resolution → indentation-stack tree walk, with
//! existing source directories of copies/moves enumerated depth-first as
//! `included` operations.
//!
//! Parentage is positional. The stack holds the open directories
//! `(path, operation index)`, seeded with the root; before each line it is
//! truncated to `depth + 1` entries and its top is the parent. The parent's
//! index is stored on the operation so the tree can be inspected later
//! without replaying the stack.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::core::frontmatter::{self, StructureFrontmatter};
use crate::core::line::{Indent, LineKind, ParsedLine};
use crate::core::names::{self, Replacements};
use crate::core::repeater::{self, ExpansionLimit};
use crate::fs::FileSystem;

/// What an operation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType
{
    Create,
    Copy,
    Move,
    /// Found while enumerating a copied or moved directory.
    Included,
}

impl OperationType
{
    pub fn label(self) -> &'static str
    {
        match self
        {
            OperationType::Create => "create",
            OperationType::Copy => "copy",
            OperationType::Move => "move",
            OperationType::Included => "included",
        }
    }
}

impl std::fmt::Display for OperationType
{
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result
    {
        f.write_str(self.label())
    }
}

/// One planned filesystem action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureOperation
{
    #[serde(rename = "type")]
    pub kind: OperationType,
    pub target_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
    pub is_directory: bool,
    pub depth: usize,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Index of the parent directory operation; `None` at the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
}

/// Planning inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureOptions
{
    pub root_dir: PathBuf,
    pub replacements: Replacements,
    /// Enumerate existing contents of copied/moved directories.
    pub recursive: bool,
}

impl StructureOptions
{
    pub fn new(root_dir: impl Into<PathBuf>) -> Self
    {
        Self { root_dir: root_dir.into(), replacements: Replacements::default(), recursive: true }
    }

    pub fn with_replacements(
        mut self,
        replacements: Replacements,
    ) -> Self
    {
        self.replacements = replacements;
        self
    }

    pub fn with_recursive(
        mut self,
        recursive: bool,
    ) -> Self
    {
        self.recursive = recursive;
        self
    }
}

/// Planning errors. Everything else degrades to a warning on the operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError
{
    #[error(
        "line {line}: indentation mixes tabs and spaces (document uses {expected}); use one style throughout"
    )]
    MixedIndentation
    {
        line: usize, expected: &'static str
    },

    #[error("line {line}: indentation mixes tabs and spaces; use one style throughout")]
    MixedIndentLine
    {
        line: usize
    },

    #[error(transparent)]
    Expansion(#[from] ExpansionLimit),
}

/// Result of planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan
{
    pub operations: Vec<StructureOperation>,
    /// Options as used, with front-matter rules merged in.
    pub options: StructureOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<StructureFrontmatter>,
}

impl Plan
{
    pub fn len(&self) -> usize
    {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.operations.is_empty()
    }

    pub fn parent(
        &self,
        index: usize,
    ) -> Option<&StructureOperation>
    {
        self.operations
            .get(index)?
            .parent
            .and_then(|p| self.operations.get(p))
    }

    /// Indices of the direct children of `index`.
    pub fn children(
        &self,
        index: usize,
    ) -> Vec<usize>
    {
        self.operations
            .iter()
            .enumerate()
            .filter(|(_, op)| op.parent == Some(index))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of root-level operations.
    pub fn roots(&self) -> Vec<usize>
    {
        self.operations
            .iter()
            .enumerate()
            .filter(|(_, op)| op.parent.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Last index of the run of `included` operations directly following
    /// `index` that belong to its subtree, if any.
    pub fn included_end(
        &self,
        index: usize,
    ) -> Option<usize>
    {
        let depth = self
            .operations
            .get(index)?
            .depth;
        let run = self.operations[index + 1..]
            .iter()
            .take_while(|op| op.kind == OperationType::Included && op.depth > depth)
            .count();
        (run > 0).then_some(index + run)
    }

    pub fn warnings(&self) -> impl Iterator<Item = (&StructureOperation, &str)>
    {
        self.operations
            .iter()
            .filter_map(|op| op.warning.as_deref().map(|w| (op, w)))
    }
}

/// Merge caller rules with front-matter rules; caller rules run first.
pub fn merge_replacements(
    caller: &Replacements,
    frontmatter: Option<&StructureFrontmatter>,
) -> Replacements
{
    let mut merged = caller.clone();
    if let Some(fm) = frontmatter
    {
        merged.extend(&fm.as_replacements());
    }
    merged
}

/// Strip a BOM and normalise line endings.
fn normalize(input: &str) -> String
{
    input
        .trim_start_matches('\u{FEFF}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// Plan `input`. Reads the filesystem (existence checks and directory
/// listings of copy/move sources) but never mutates it.
#[instrument(skip_all, fields(root = %options.root_dir.display()))]
pub fn plan(
    input: &str,
    options: &StructureOptions,
    fs: &dyn FileSystem,
) -> Result<Plan, PlanError>
{
    let input = normalize(input);
    let extracted = frontmatter::extract(&input);
    let replacements = merge_replacements(&options.replacements, extracted.frontmatter.as_ref());
    let body = repeater::expand(extracted.content)?;

    let options = StructureOptions { replacements, ..options.clone() };
    let mut planner = Planner::new(&options, fs);
    for (i, raw) in body
        .lines()
        .enumerate()
    {
        if let Some(line) = ParsedLine::parse(i + 1, raw)
        {
            planner.push_line(&line)?;
        }
    }

    debug!(operations = planner.ops.len(), "planned structure");
    Ok(Plan { operations: planner.ops, options, frontmatter: extracted.frontmatter })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndentStyle
{
    Tabs,
    Spaces,
}

impl IndentStyle
{
    fn label(self) -> &'static str
    {
        match self
        {
            IndentStyle::Tabs => "tabs",
            IndentStyle::Spaces => "spaces",
        }
    }
}

struct Planner<'a>
{
    fs: &'a dyn FileSystem,
    replacements: &'a Replacements,
    root: &'a Path,
    recursive: bool,
    ops: Vec<StructureOperation>,
    stack: Vec<(PathBuf, Option<usize>)>,
    style: Option<IndentStyle>,
}

impl<'a> Planner<'a>
{
    fn new(
        options: &'a StructureOptions,
        fs: &'a dyn FileSystem,
    ) -> Self
    {
        Self {
            fs,
            replacements: &options.replacements,
            root: &options.root_dir,
            recursive: options.recursive,
            ops: Vec::new(),
            stack: vec![(options.root_dir.clone(), None)],
            style: None,
        }
    }

    /// First indented line fixes the document's style.
    fn check_indent(
        &mut self,
        line: &ParsedLine,
    ) -> Result<(), PlanError>
    {
        let seen = match line.indent
        {
            Indent::None => return Ok(()),
            Indent::Tabs(_) => IndentStyle::Tabs,
            Indent::Spaces(_) => IndentStyle::Spaces,
            Indent::Mixed { .. } =>
            {
                return Err(match self.style
                {
                    Some(style) => {
                        PlanError::MixedIndentation { line: line.number, expected: style.label() }
                    }
                    None => PlanError::MixedIndentLine { line: line.number },
                });
            }
        };

        match self.style
        {
            None =>
            {
                self.style = Some(seen);
                Ok(())
            }
            Some(style) if style == seen => Ok(()),
            Some(style) => {
                Err(PlanError::MixedIndentation { line: line.number, expected: style.label() })
            }
        }
    }

    fn push_line(
        &mut self,
        line: &ParsedLine,
    ) -> Result<(), PlanError>
    {
        self.check_indent(line)?;

        // Over-indented lines attach to the deepest open directory
        let depth = line
            .depth()
            .min(self.stack.len() - 1);
        self.stack
            .truncate(depth + 1);
        let (parent_path, parent) = self
            .stack
            .last()
            .cloned()
            .unwrap_or_else(|| (self.root.to_path_buf(), None));

        let index = self.ops.len();
        let op = match &line.kind
        {
            LineKind::Create { name } =>
            {
                let is_directory = names::is_directory_name(name);
                let name = self.resolve_name(name, is_directory);
                StructureOperation {
                    kind: OperationType::Create,
                    target_path: parent_path.join(&name),
                    source_path: None,
                    is_directory,
                    depth,
                    name,
                    warning: None,
                    parent,
                }
            }
            LineKind::Copy { source, target } | LineKind::Move { source, target } =>
            {
                let kind = if matches!(line.kind, LineKind::Copy { .. })
                {
                    OperationType::Copy
                }
                else
                {
                    OperationType::Move
                };
                let source_path = names::resolve_source(source, self.root);
                let raw_target = target
                    .as_deref()
                    .unwrap_or_else(|| names::source_basename(source));
                let is_directory = names::is_directory_name(raw_target);
                let name = self.resolve_name(raw_target, is_directory);
                StructureOperation {
                    kind,
                    target_path: parent_path.join(&name),
                    source_path: Some(source_path),
                    is_directory,
                    depth,
                    name,
                    warning: None,
                    parent,
                }
            }
        };

        trace!(line = line.number, kind = %op.kind, target = %op.target_path.display(), "planned");

        let is_directory = op.is_directory;
        let target_path = op
            .target_path
            .clone();
        let source_path = op
            .source_path
            .clone();
        self.ops
            .push(op);

        if let Some(source) = source_path
        {
            self.inspect_source(index, &source, &target_path, depth, is_directory);
        }

        if is_directory
        {
            self.stack
                .push((target_path, Some(index)));
        }
        Ok(())
    }

    fn resolve_name(
        &self,
        raw: &str,
        is_directory: bool,
    ) -> String
    {
        self.replacements
            .apply(&names::unescape(raw), is_directory)
    }

    /// Warn on a missing source; enumerate an existing source directory.
    fn inspect_source(
        &mut self,
        index: usize,
        source: &Path,
        target: &Path,
        depth: usize,
        is_directory: bool,
    )
    {
        if !self.fs.exists(source)
        {
            self.ops[index].warning =
                Some(format!("source path does not exist: {}", source.display()));
            return;
        }

        if !(is_directory && self.recursive)
        {
            return;
        }

        match self.fs.stat(source)
        {
            Ok(meta) if meta.is_directory() =>
            {
                self.enumerate(index, source, target, depth + 1);
            }
            Ok(_) =>
            {}
            Err(err) =>
            {
                self.ops[index].warning = Some(format!("could not inspect source ({}): {err}", err.code()));
            }
        }
    }

    /// Depth-first walk of `source`, emitting `included` operations.
    fn enumerate(
        &mut self,
        parent: usize,
        source: &Path,
        target: &Path,
        depth: usize,
    )
    {
        let entries = match self.fs.read_dir(source)
        {
            Ok(entries) => entries,
            Err(err) =>
            {
                self.ops[parent].warning =
                    Some(format!("could not list {} ({}): {err}", source.display(), err.code()));
                return;
            }
        };

        for entry in entries
        {
            let is_directory = entry.is_directory();
            let name = self
                .replacements
                .apply(&entry.name, is_directory);
            let from = source.join(&entry.name);
            let to = target.join(&name);
            let index = self.ops.len();

            self.ops
                .push(StructureOperation {
                    kind: OperationType::Included,
                    target_path: to.clone(),
                    source_path: Some(from.clone()),
                    is_directory,
                    depth,
                    name,
                    warning: None,
                    parent: Some(parent),
                });

            if is_directory
            {
                self.enumerate(index, &from, &to, depth + 1);
            }
        }
    }
}

//! Execution of a planned structure against a [`FileSystem`].
//!
//! Operations run strictly in plan order, one at a time. Each one is
//! attempted once and ends either succeeded or fallen back: a missing source
//! or a failed copy/move leaves an empty file or directory at the target and
//! a warning behind. Nothing aborts the run; warnings accumulate in the
//! returned [`ExecutionReport`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::core::plan::{OperationType, Plan, PlanError, StructureOperation, StructureOptions, plan};
use crate::fs::{EntryKind, FileSystem, FsError, FsResult};

/// Terminal state of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome
{
    Succeeded,
    /// An empty artifact was created in place of the real one.
    FellBack,
    /// Neither the operation nor its fallback could be completed.
    Failed,
    /// Entry of a directory copy/move that fell back; left out of the empty target.
    Skipped,
}

impl Outcome
{
    pub fn label(self) -> &'static str
    {
        match self
        {
            Outcome::Succeeded => "ok",
            Outcome::FellBack => "fallback",
            Outcome::Failed => "failed",
            Outcome::Skipped => "skipped",
        }
    }
}

/// One performed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry
{
    #[serde(rename = "type")]
    pub kind: OperationType,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    pub is_directory: bool,
    pub outcome: Outcome,
}

/// Ordered record of everything the executor did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OperationLog
{
    entries: Vec<LogEntry>,
}

impl OperationLog
{
    pub fn entries(&self) -> &[LogEntry]
    {
        &self.entries
    }

    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }

    fn record(
        &mut self,
        op: &StructureOperation,
        outcome: Outcome,
    )
    {
        self.entries
            .push(LogEntry {
                kind: op.kind,
                path: op.target_path.clone(),
                source: op.source_path.clone(),
                is_directory: op.is_directory,
                outcome,
            });
    }
}

/// A non-fatal problem attached to a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning
{
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for Warning
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport
{
    pub operations: Vec<StructureOperation>,
    pub operation_log: OperationLog,
    /// Planning warnings first, then execution warnings in order.
    pub warnings: Vec<Warning>,
    pub had_warnings: bool,
}

/// Plan and execute `input`. Only planning errors are returned.
#[instrument(skip_all, fields(root = %options.root_dir.display()))]
pub fn execute(
    input: &str,
    options: &StructureOptions,
    fs: &dyn FileSystem,
) -> Result<ExecutionReport, PlanError>
{
    let plan = plan(input, options, fs)?;
    Ok(execute_plan(&plan, fs))
}

/// Execute an existing plan.
pub fn execute_plan(
    plan: &Plan,
    fs: &dyn FileSystem,
) -> ExecutionReport
{
    let mut executor = Executor::new(fs);

    for (op, warning) in plan.warnings()
    {
        executor.warn(&op.target_path, warning.to_string());
    }

    for (index, op) in plan
        .operations
        .iter()
        .enumerate()
    {
        executor.step(plan, index, op);
        executor.settle_moves(index);
    }

    let had_warnings = !executor
        .warnings
        .is_empty();
    debug!(
        operations = executor.log.len(),
        warnings = executor.warnings.len(),
        "execution finished"
    );

    ExecutionReport {
        operations: plan
            .operations
            .clone(),
        operation_log: executor.log,
        warnings: executor.warnings,
        had_warnings,
    }
}

/// A directory move whose source is removed after its last included entry.
struct PendingMove
{
    last: usize,
    source: PathBuf,
    intact: bool,
}

struct Executor<'a>
{
    fs: &'a dyn FileSystem,
    log: OperationLog,
    warnings: Vec<Warning>,
    pending: Vec<PendingMove>,
    /// Included entries up to this index belong to a fallen-back transfer.
    skip_through: Option<usize>,
}

impl<'a> Executor<'a>
{
    fn new(fs: &'a dyn FileSystem) -> Self
    {
        Self {
            fs,
            log: OperationLog::default(),
            warnings: Vec::new(),
            pending: Vec::new(),
            skip_through: None,
        }
    }

    fn warn(
        &mut self,
        path: &Path,
        message: String,
    )
    {
        warn!(path = %path.display(), "{message}");
        self.warnings
            .push(Warning { path: path.to_path_buf(), message });
    }

    fn step(
        &mut self,
        plan: &Plan,
        index: usize,
        op: &StructureOperation,
    )
    {
        debug!(index, kind = %op.kind, target = %op.target_path.display(), "executing");

        if op.kind == OperationType::Included
            && self
                .skip_through
                .is_some_and(|last| index <= last)
        {
            self.log.record(op, Outcome::Skipped);
            return;
        }

        match (op.kind, op.source_path.as_deref())
        {
            (OperationType::Create, _) | (_, None) => self.create(op),
            (OperationType::Copy | OperationType::Move, Some(source)) =>
            {
                self.transfer(plan, index, op, source)
            }
            (OperationType::Included, Some(source)) => self.include(index, op, source),
        }
    }

    fn create(
        &mut self,
        op: &StructureOperation,
    )
    {
        match self.make_empty(op)
        {
            Ok(()) => self.log.record(op, Outcome::Succeeded),
            Err(err) =>
            {
                let kind = EntryKind::from_is_dir(op.is_directory).label();
                self.warn(&op.target_path, format!("failed to create {kind} ({}): {err}", err.code()));
                self.log.record(op, Outcome::Failed);
            }
        }
    }

    fn transfer(
        &mut self,
        plan: &Plan,
        index: usize,
        op: &StructureOperation,
        source: &Path,
    )
    {
        let is_move = op.kind == OperationType::Move;
        let reason = if !self.fs.exists(source)
        {
            format!("source not found: {}", source.display())
        }
        else
        {
            match self.try_transfer(plan, index, op, source, is_move)
            {
                Ok(()) =>
                {
                    self.log.record(op, Outcome::Succeeded);
                    return;
                }
                Err(err) => format!("{} failed ({}): {err}", op.kind, err.code()),
            }
        };

        // The fallback target stays empty: its planned entries are not copied in
        if let Some(last) = plan.included_end(index)
        {
            let skipped = last - index;
            self.skip_through = Some(
                self.skip_through
                    .map_or(last, |s| s.max(last)),
            );
            self.fall_back(op, format!("{reason}; skipped {skipped} included entries"));
            return;
        }
        self.fall_back(op, reason);
    }

    fn try_transfer(
        &mut self,
        plan: &Plan,
        index: usize,
        op: &StructureOperation,
        source: &Path,
        is_move: bool,
    ) -> FsResult<()>
    {
        let target = &op.target_path;

        if !self
            .fs
            .stat(source)?
            .is_directory()
        {
            self.ensure_parent(target)?;
            self.fs
                .copy_file(source, target)?;
            if is_move
            {
                self.fs
                    .unlink(source)?;
            }
            return Ok(());
        }

        if target.starts_with(source)
        {
            return Err(FsError::failed(target, "destination is inside the source directory"));
        }

        // Included entries that follow will carry the (renamed) contents
        if let Some(last) = plan.included_end(index)
        {
            self.fs
                .ensure_dir(target)?;
            if is_move
            {
                self.pending
                    .push(PendingMove { last, source: source.to_path_buf(), intact: true });
            }
            return Ok(());
        }

        if is_move
        {
            self.fs
                .move_folder(source, target)
        }
        else
        {
            self.fs
                .copy_folder(source, target)
        }
    }

    fn include(
        &mut self,
        index: usize,
        op: &StructureOperation,
        source: &Path,
    )
    {
        let result = if !self.fs.exists(source)
        {
            Err(FsError::NotFound(source.to_path_buf()))
        }
        else if op.is_directory
        {
            self.fs
                .ensure_dir(&op.target_path)
        }
        else
        {
            self.ensure_parent(&op.target_path)
                .and_then(|()| {
                    self.fs
                        .copy_file(source, &op.target_path)
                })
        };

        match result
        {
            Ok(()) => self.log.record(op, Outcome::Succeeded),
            Err(err) =>
            {
                for pending in self
                    .pending
                    .iter_mut()
                    .filter(|p| index <= p.last)
                {
                    pending.intact = false;
                }
                let reason = match &err
                {
                    FsError::NotFound(p) if p == source =>
                    {
                        format!("source not found: {}", source.display())
                    }
                    _ => format!("copy failed ({}): {err}", err.code()),
                };
                self.fall_back(op, reason);
            }
        }
    }

    /// Remove sources of directory moves whose last entry was `index`.
    fn settle_moves(
        &mut self,
        index: usize,
    )
    {
        let (done, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.last == index);
        self.pending = rest;

        for pending in done
        {
            if !pending.intact
            {
                self.warn(
                    &pending.source,
                    "source kept because some entries could not be moved".to_string(),
                );
                continue;
            }
            if let Err(err) = self.fs.rm(&pending.source, true)
            {
                self.warn(
                    &pending.source,
                    format!("failed to remove moved source ({}): {err}", err.code()),
                );
            }
        }
    }

    /// Leave an empty artifact of the planned kind; no second-level fallback.
    fn fall_back(
        &mut self,
        op: &StructureOperation,
        reason: String,
    )
    {
        let kind = EntryKind::from_is_dir(op.is_directory).label();
        match self.make_empty(op)
        {
            Ok(()) =>
            {
                self.warn(&op.target_path, format!("{reason}; created empty {kind}"));
                self.log.record(op, Outcome::FellBack);
            }
            Err(err) =>
            {
                self.warn(
                    &op.target_path,
                    format!("{reason}; failed to create fallback {kind} ({}): {err}", err.code()),
                );
                self.log.record(op, Outcome::Failed);
            }
        }
    }

    /// Directory: create if absent. File: (over)write empty.
    fn make_empty(
        &self,
        op: &StructureOperation,
    ) -> FsResult<()>
    {
        if op.is_directory
        {
            return self
                .fs
                .ensure_dir(&op.target_path);
        }
        self.ensure_parent(&op.target_path)?;
        self.fs
            .write_file(&op.target_path, &[])
    }

    fn ensure_parent(
        &self,
        path: &Path,
    ) -> FsResult<()>
    {
        match path.parent()
        {
            Some(parent) if !parent.as_os_str().is_empty() => self.fs.ensure_dir(parent),
            _ => Ok(()),
        }
    }
}

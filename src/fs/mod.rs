//! Filesystem capability consumed by the planner and the executor.
//!
//! One object-safe trait covers every backend. The required methods are the
//! primitives a backend must provide; the provided methods (`copy_folder`,
//! `move_folder`, `ensure_dir`, `empty_dir`, `copy`, `move_entry`,
//! `exists_as`) are built on top of them so every backend gets identical
//! semantics for the composite operations.

pub mod local;
pub mod memory;

pub use local::LocalFs;
pub use memory::MemoryFs;

use std::io;
use std::path::{Path, PathBuf};

/// Errors surfaced by a [`FileSystem`] backend, each carrying the offending path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FsError
{
    #[error("no such file or directory: {}", .0.display())]
    NotFound(PathBuf),

    #[error("already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("is a directory: {}", .0.display())]
    IsADirectory(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("operation failed on {}: {message}", path.display())]
    OperationFailed
    {
        path: PathBuf, message: String
    },
}

pub type FsResult<T> = Result<T, FsError>;

impl FsError
{
    /// POSIX-like code for this error.
    pub fn code(&self) -> &'static str
    {
        match self
        {
            FsError::NotFound(_) => "ENOENT",
            FsError::AlreadyExists(_) => "EEXIST",
            FsError::NotADirectory(_) => "ENOTDIR",
            FsError::IsADirectory(_) => "EISDIR",
            FsError::PermissionDenied(_) => "EACCES",
            FsError::OperationFailed { .. } => "EFAIL",
        }
    }

    pub fn path(&self) -> &Path
    {
        match self
        {
            FsError::NotFound(p)
            | FsError::AlreadyExists(p)
            | FsError::NotADirectory(p)
            | FsError::IsADirectory(p)
            | FsError::PermissionDenied(p) => p,
            FsError::OperationFailed { path, .. } => path,
        }
    }

    pub fn failed(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self
    {
        FsError::OperationFailed { path: path.into(), message: message.into() }
    }

    /// Map an `io::Error` into the taxonomy.
    pub fn from_io(
        path: &Path,
        err: io::Error,
    ) -> Self
    {
        let path = path.to_path_buf();
        match err.kind()
        {
            io::ErrorKind::NotFound => FsError::NotFound(path),
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists(path),
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path),
            io::ErrorKind::NotADirectory => FsError::NotADirectory(path),
            io::ErrorKind::IsADirectory => FsError::IsADirectory(path),
            _ => FsError::OperationFailed { path, message: err.to_string() },
        }
    }
}

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind
{
    File,
    Directory,
}

impl EntryKind
{
    pub fn from_is_dir(is_dir: bool) -> Self
    {
        if is_dir { EntryKind::Directory } else { EntryKind::File }
    }

    pub fn label(self) -> &'static str
    {
        match self
        {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
        }
    }
}

/// Result of [`FileSystem::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata
{
    pub kind: EntryKind,
    pub len: u64,
}

impl Metadata
{
    pub fn is_directory(&self) -> bool
    {
        self.kind == EntryKind::Directory
    }
}

/// One entry returned by [`FileSystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry
{
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry
{
    pub fn is_directory(&self) -> bool
    {
        self.kind == EntryKind::Directory
    }
}

/// Filesystem capability. Paths are absolute.
pub trait FileSystem
{
    /// Whether anything exists at `path`.
    fn exists(
        &self,
        path: &Path,
    ) -> bool;

    fn mkdir(
        &self,
        path: &Path,
        recursive: bool,
    ) -> FsResult<()>;

    /// Create or truncate a file. The parent directory must exist.
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> FsResult<()>;

    fn read_file(
        &self,
        path: &Path,
    ) -> FsResult<Vec<u8>>;

    fn stat(
        &self,
        path: &Path,
    ) -> FsResult<Metadata>;

    /// Directory listing, sorted by name.
    fn read_dir(
        &self,
        path: &Path,
    ) -> FsResult<Vec<DirEntry>>;

    fn rm(
        &self,
        path: &Path,
        recursive: bool,
    ) -> FsResult<()>;

    /// Remove a single file.
    fn unlink(
        &self,
        path: &Path,
    ) -> FsResult<()>;

    fn rename(
        &self,
        from: &Path,
        to: &Path,
    ) -> FsResult<()>;

    /// Copy one file's bytes. The destination's parent must exist.
    fn copy_file(
        &self,
        src: &Path,
        dest: &Path,
    ) -> FsResult<()>;

    /// Recursively copy a directory, creating destination directories as needed.
    fn copy_folder(
        &self,
        src: &Path,
        dest: &Path,
    ) -> FsResult<()>
    {
        self.ensure_dir(dest)?;
        for entry in self.read_dir(src)?
        {
            let from = src.join(&entry.name);
            let to = dest.join(&entry.name);
            match entry.kind
            {
                EntryKind::Directory => self.copy_folder(&from, &to)?,
                EntryKind::File => self.copy_file(&from, &to)?,
            }
        }
        Ok(())
    }

    /// Copy then remove, so content survives when rename cannot cross devices.
    fn move_folder(
        &self,
        src: &Path,
        dest: &Path,
    ) -> FsResult<()>
    {
        self.copy_folder(src, dest)?;
        self.rm(src, true)
    }

    /// Create a directory (and parents) unless it already exists.
    fn ensure_dir(
        &self,
        path: &Path,
    ) -> FsResult<()>
    {
        if self.exists_as(path, EntryKind::Directory)
        {
            return Ok(());
        }
        self.mkdir(path, true)
    }

    /// Ensure `path` is an existing, empty directory.
    fn empty_dir(
        &self,
        path: &Path,
    ) -> FsResult<()>
    {
        if !self.exists(path)
        {
            return self.mkdir(path, true);
        }
        for entry in self.read_dir(path)?
        {
            self.rm(&path.join(&entry.name), true)?;
        }
        Ok(())
    }

    /// Copy a file or a directory tree, picking by the source's kind.
    fn copy(
        &self,
        src: &Path,
        dest: &Path,
    ) -> FsResult<()>
    {
        if self.stat(src)?.is_directory()
        {
            self.copy_folder(src, dest)
        }
        else
        {
            if let Some(parent) = dest.parent()
            {
                self.ensure_dir(parent)?;
            }
            self.copy_file(src, dest)
        }
    }

    /// Move a file or a directory tree by copy-then-delete.
    fn move_entry(
        &self,
        src: &Path,
        dest: &Path,
    ) -> FsResult<()>
    {
        if self.stat(src)?.is_directory()
        {
            self.move_folder(src, dest)
        }
        else
        {
            self.copy(src, dest)?;
            self.unlink(src)
        }
    }

    fn exists_as(
        &self,
        path: &Path,
        kind: EntryKind,
    ) -> bool
    {
        self.stat(path)
            .map(|m| m.kind == kind)
            .unwrap_or(false)
    }
}

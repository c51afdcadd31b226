//! In-memory [`FileSystem`] used by previews and tests.
//!
//! Entries live in one `BTreeMap` keyed by absolute path, so listing a
//! directory is a range scan and iteration order is the sort order. Paths
//! without a parent (`/`) are always present as directories.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{DirEntry, EntryKind, FileSystem, FsError, FsResult, Metadata};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node
{
    Dir,
    File(Vec<u8>),
}

#[derive(Debug, Default)]
pub struct MemoryFs
{
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
}

impl MemoryFs
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Seed a file, creating its parent directories.
    pub fn with_file(
        self,
        path: impl AsRef<Path>,
        content: impl AsRef<[u8]>,
    ) -> Self
    {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
        {
            self.insert_dirs(parent);
        }
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), Node::File(content.as_ref().to_vec()));
        self
    }

    /// Seed a directory and its parents.
    pub fn with_dir(
        self,
        path: impl AsRef<Path>,
    ) -> Self
    {
        self.insert_dirs(path.as_ref());
        self
    }

    /// Read a file as UTF-8, mostly for assertions.
    pub fn read_to_string(
        &self,
        path: impl AsRef<Path>,
    ) -> Option<String>
    {
        match self
            .nodes
            .borrow()
            .get(path.as_ref())
        {
            Some(Node::File(bytes)) => String::from_utf8(bytes.clone()).ok(),
            _ => None,
        }
    }

    /// Every stored path, in order.
    pub fn paths(&self) -> Vec<PathBuf>
    {
        self.nodes
            .borrow()
            .keys()
            .cloned()
            .collect()
    }

    fn insert_dirs(
        &self,
        path: &Path,
    )
    {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in path.ancestors()
        {
            if is_root(ancestor) || ancestor.as_os_str().is_empty()
            {
                continue;
            }
            nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node::Dir);
        }
    }

    fn kind_of(
        &self,
        path: &Path,
    ) -> Option<EntryKind>
    {
        if is_root(path)
        {
            return Some(EntryKind::Directory);
        }
        self.nodes
            .borrow()
            .get(path)
            .map(|n| match n
            {
                Node::Dir => EntryKind::Directory,
                Node::File(_) => EntryKind::File,
            })
    }

    fn require_parent_dir(
        &self,
        path: &Path,
    ) -> FsResult<()>
    {
        let Some(parent) = path.parent()
        else
        {
            return Ok(());
        };
        match self.kind_of(parent)
        {
            Some(EntryKind::Directory) => Ok(()),
            Some(EntryKind::File) => Err(FsError::NotADirectory(parent.to_path_buf())),
            None => Err(FsError::NotFound(parent.to_path_buf())),
        }
    }

    /// Keys strictly below `path`.
    fn descendants(
        &self,
        path: &Path,
    ) -> Vec<PathBuf>
    {
        self.nodes
            .borrow()
            .range(path.to_path_buf()..)
            .map(|(k, _)| k)
            .filter(|k| k.as_path() != path)
            .take_while(|k| k.starts_with(path))
            .cloned()
            .collect()
    }
}

fn is_root(path: &Path) -> bool
{
    path.parent().is_none() && path.has_root()
}

impl FileSystem for MemoryFs
{
    fn exists(
        &self,
        path: &Path,
    ) -> bool
    {
        self.kind_of(path).is_some()
    }

    fn mkdir(
        &self,
        path: &Path,
        recursive: bool,
    ) -> FsResult<()>
    {
        match self.kind_of(path)
        {
            Some(EntryKind::Directory) if recursive => return Ok(()),
            Some(EntryKind::Directory) => return Err(FsError::AlreadyExists(path.to_path_buf())),
            Some(EntryKind::File) if recursive =>
            {
                return Err(FsError::NotADirectory(path.to_path_buf()));
            }
            Some(EntryKind::File) => return Err(FsError::AlreadyExists(path.to_path_buf())),
            None =>
            {}
        }

        if recursive
        {
            // A file anywhere on the way up blocks the whole chain
            for ancestor in path.ancestors().skip(1)
            {
                if self.kind_of(ancestor) == Some(EntryKind::File)
                {
                    return Err(FsError::NotADirectory(ancestor.to_path_buf()));
                }
            }
            self.insert_dirs(path);
            return Ok(());
        }

        self.require_parent_dir(path)?;
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), Node::Dir);
        Ok(())
    }

    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> FsResult<()>
    {
        if self.kind_of(path) == Some(EntryKind::Directory)
        {
            return Err(FsError::IsADirectory(path.to_path_buf()));
        }
        self.require_parent_dir(path)?;
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), Node::File(data.to_vec()));
        Ok(())
    }

    fn read_file(
        &self,
        path: &Path,
    ) -> FsResult<Vec<u8>>
    {
        match self
            .nodes
            .borrow()
            .get(path)
        {
            Some(Node::File(bytes)) => Ok(bytes.clone()),
            Some(Node::Dir) => Err(FsError::IsADirectory(path.to_path_buf())),
            None if is_root(path) => Err(FsError::IsADirectory(path.to_path_buf())),
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }

    fn stat(
        &self,
        path: &Path,
    ) -> FsResult<Metadata>
    {
        if is_root(path)
        {
            return Ok(Metadata { kind: EntryKind::Directory, len: 0 });
        }
        match self
            .nodes
            .borrow()
            .get(path)
        {
            Some(Node::Dir) => Ok(Metadata { kind: EntryKind::Directory, len: 0 }),
            Some(Node::File(bytes)) => {
                Ok(Metadata { kind: EntryKind::File, len: bytes.len() as u64 })
            }
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }

    fn read_dir(
        &self,
        path: &Path,
    ) -> FsResult<Vec<DirEntry>>
    {
        match self.kind_of(path)
        {
            Some(EntryKind::Directory) =>
            {}
            Some(EntryKind::File) => return Err(FsError::NotADirectory(path.to_path_buf())),
            None => return Err(FsError::NotFound(path.to_path_buf())),
        }

        let nodes = self.nodes.borrow();
        let mut out: Vec<DirEntry> = nodes
            .iter()
            .filter(|(k, _)| k.parent() == Some(path))
            .filter_map(|(k, n)| {
                let name = k
                    .file_name()?
                    .to_string_lossy()
                    .into_owned();
                let kind = match n
                {
                    Node::Dir => EntryKind::Directory,
                    Node::File(_) => EntryKind::File,
                };
                Some(DirEntry { name, kind })
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    fn rm(
        &self,
        path: &Path,
        recursive: bool,
    ) -> FsResult<()>
    {
        match self.kind_of(path)
        {
            None => Err(FsError::NotFound(path.to_path_buf())),
            Some(EntryKind::File) =>
            {
                self.nodes
                    .borrow_mut()
                    .remove(path);
                Ok(())
            }
            Some(EntryKind::Directory) =>
            {
                let below = self.descendants(path);
                if !below.is_empty() && !recursive
                {
                    return Err(FsError::failed(path, "directory not empty"));
                }
                let mut nodes = self.nodes.borrow_mut();
                for p in below
                {
                    nodes.remove(&p);
                }
                nodes.remove(path);
                Ok(())
            }
        }
    }

    fn unlink(
        &self,
        path: &Path,
    ) -> FsResult<()>
    {
        match self.kind_of(path)
        {
            Some(EntryKind::File) =>
            {
                self.nodes
                    .borrow_mut()
                    .remove(path);
                Ok(())
            }
            Some(EntryKind::Directory) => Err(FsError::IsADirectory(path.to_path_buf())),
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }

    fn rename(
        &self,
        from: &Path,
        to: &Path,
    ) -> FsResult<()>
    {
        if !self.exists(from)
        {
            return Err(FsError::NotFound(from.to_path_buf()));
        }
        if to.starts_with(from) && to != from
        {
            return Err(FsError::failed(to, "cannot move a directory into itself"));
        }
        self.require_parent_dir(to)?;

        let moved: Vec<(PathBuf, Node)> = {
            let nodes = self.nodes.borrow();
            std::iter::once(from.to_path_buf())
                .chain(self.descendants(from))
                .filter_map(|k| {
                    let node = nodes.get(&k)?.clone();
                    let rel = k.strip_prefix(from).ok()?;
                    let dest = if rel.as_os_str().is_empty() { to.to_path_buf() } else { to.join(rel) };
                    Some((dest, node))
                })
                .collect()
        };

        self.rm(from, true)?;
        if self.exists(to)
        {
            self.rm(to, true)?;
        }
        let mut nodes = self.nodes.borrow_mut();
        for (k, n) in moved
        {
            nodes.insert(k, n);
        }
        Ok(())
    }

    fn copy_file(
        &self,
        src: &Path,
        dest: &Path,
    ) -> FsResult<()>
    {
        let bytes = self.read_file(src)?;
        self.write_file(dest, &bytes)
    }
}

//! `std::fs` backed [`FileSystem`].

use std::fs;
use std::path::Path;

use super::{DirEntry, EntryKind, FileSystem, FsError, FsResult, Metadata};

/// The local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl LocalFs
{
    pub fn new() -> Self
    {
        Self
    }
}

impl FileSystem for LocalFs
{
    fn exists(
        &self,
        path: &Path,
    ) -> bool
    {
        fs::symlink_metadata(path).is_ok()
    }

    fn mkdir(
        &self,
        path: &Path,
        recursive: bool,
    ) -> FsResult<()>
    {
        if recursive && path.exists() && !path.is_dir()
        {
            return Err(FsError::NotADirectory(path.to_path_buf()));
        }

        let res = if recursive { fs::create_dir_all(path) } else { fs::create_dir(path) };
        res.map_err(|e| FsError::from_io(path, e))
    }

    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> FsResult<()>
    {
        if path.is_dir()
        {
            return Err(FsError::IsADirectory(path.to_path_buf()));
        }
        fs::write(path, data).map_err(|e| FsError::from_io(path, e))
    }

    fn read_file(
        &self,
        path: &Path,
    ) -> FsResult<Vec<u8>>
    {
        if path.is_dir()
        {
            return Err(FsError::IsADirectory(path.to_path_buf()));
        }
        fs::read(path).map_err(|e| FsError::from_io(path, e))
    }

    fn stat(
        &self,
        path: &Path,
    ) -> FsResult<Metadata>
    {
        let meta = fs::metadata(path).map_err(|e| FsError::from_io(path, e))?;
        Ok(Metadata { kind: EntryKind::from_is_dir(meta.is_dir()), len: meta.len() })
    }

    fn read_dir(
        &self,
        path: &Path,
    ) -> FsResult<Vec<DirEntry>>
    {
        if path.is_file()
        {
            return Err(FsError::NotADirectory(path.to_path_buf()));
        }

        let mut out = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| FsError::from_io(path, e))?
        {
            let entry = entry.map_err(|e| FsError::from_io(path, e))?;

            // Links are not followed; a link to a directory lists as a file
            let is_dir = entry
                .file_type()
                .map_err(|e| FsError::from_io(&entry.path(), e))?
                .is_dir();
            out.push(DirEntry {
                name: entry
                    .file_name()
                    .to_string_lossy()
                    .into_owned(),
                kind: EntryKind::from_is_dir(is_dir),
            });
        }

        // Deterministic ordering for stable plans
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    fn rm(
        &self,
        path: &Path,
        recursive: bool,
    ) -> FsResult<()>
    {
        let meta = fs::symlink_metadata(path).map_err(|e| FsError::from_io(path, e))?;
        if !meta.is_dir()
        {
            return fs::remove_file(path).map_err(|e| FsError::from_io(path, e));
        }

        if recursive
        {
            fs::remove_dir_all(path).map_err(|e| FsError::from_io(path, e))
        }
        else
        {
            fs::remove_dir(path).map_err(|e| match e.kind()
            {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied =>
                {
                    FsError::from_io(path, e)
                }
                _ => FsError::failed(path, "directory not empty"),
            })
        }
    }

    fn unlink(
        &self,
        path: &Path,
    ) -> FsResult<()>
    {
        if path.is_dir()
        {
            return Err(FsError::IsADirectory(path.to_path_buf()));
        }
        fs::remove_file(path).map_err(|e| FsError::from_io(path, e))
    }

    fn rename(
        &self,
        from: &Path,
        to: &Path,
    ) -> FsResult<()>
    {
        fs::rename(from, to).map_err(|e| FsError::from_io(from, e))
    }

    fn copy_file(
        &self,
        src: &Path,
        dest: &Path,
    ) -> FsResult<()>
    {
        if src.is_dir()
        {
            return Err(FsError::IsADirectory(src.to_path_buf()));
        }
        if !src.exists()
        {
            return Err(FsError::NotFound(src.to_path_buf()));
        }
        fs::copy(src, dest)
            .map(|_| ())
            .map_err(|e| FsError::from_io(dest, e))
    }
}

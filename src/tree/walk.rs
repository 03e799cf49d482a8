use std::fs::Metadata;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// One entry of the source tree, as captured before encryption.
#[derive(Debug)]
pub(crate) struct SourceEntry {
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub is_directory: bool,
    pub size: u64,
    pub permissions: Option<u32>,
}

/// Enumerates everything below `root` in canonical order: directories
/// first, then files, each sorted by relative path.
///
/// Symbolic links and special files are refused; only regular files and
/// directories are supported. Links are never followed.
pub(crate) fn collect_entries(root: &Path) -> Result<Vec<SourceEntry>> {
    let mut directories = Vec::new();
    let mut files = Vec::new();

    for item in WalkDir::new(root).follow_links(false).min_depth(1) {
        let item = item.map_err(|e| walk_error(root, e))?;

        let file_type = item.file_type();
        if !file_type.is_dir() && !file_type.is_file() {
            return Err(Error::io(
                item.path(),
                io::Error::new(ErrorKind::Unsupported, "only regular files and directories can be encrypted"),
            ));
        }

        let metadata = item.metadata().map_err(|e| walk_error(item.path(), e))?;
        let entry = SourceEntry {
            relative_path: relative_utf8(root, item.path())?,
            absolute_path: item.path().to_path_buf(),
            is_directory: file_type.is_dir(),
            size: if file_type.is_dir() { 0 } else { metadata.len() },
            permissions: mode_bits(&metadata),
        };

        if entry.is_directory {
            directories.push(entry);
        } else {
            files.push(entry);
        }
    }

    directories.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    directories.append(&mut files);
    Ok(directories)
}

fn walk_error(fallback: &Path, error: walkdir::Error) -> Error {
    let path = error.path().unwrap_or(fallback).to_path_buf();
    let source = error.into_io_error().unwrap_or_else(|| io::Error::other("directory walk failed"));
    Error::Io { path, source }
}

/// Converts a path below `root` to its forward-slash relative form.
///
/// The manifest stores UTF-8; paths that cannot be represented are refused
/// rather than stored lossily.
fn relative_utf8(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| Error::io(path, io::Error::other("path escapes the source root")))?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component.as_os_str().to_str() {
            Some(part) => parts.push(part),
            None => {
                return Err(Error::io(path, io::Error::new(ErrorKind::InvalidData, "path is not valid UTF-8")));
            }
        }
    }

    Ok(parts.join("/"))
}

#[cfg(unix)]
fn mode_bits(metadata: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;

    Some(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn mode_bits(_metadata: &Metadata) -> Option<u32> {
    None
}

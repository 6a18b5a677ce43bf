//! Filesystem operations for the dist tree

use log::debug;
use std::{fs, io, path::Path};
use walkdir::WalkDir;

use crate::error::BuildError;

/// Reads a UTF8 text file.
pub fn read_text(path: &Path) -> Result<String, BuildError> {
    fs::read_to_string(path).map_err(|e| BuildError::fs("read", path, e))
}

/// Writes text to a file, creating parent directories as needed.
pub fn write_text(path: &Path, text: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, text).map_err(|e| BuildError::fs("write", path, e))
}

/// Creates a directory and all missing ancestors.
pub fn ensure_dir(path: &Path) -> Result<(), BuildError> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| BuildError::fs("create directory", path, e))
}

/// Removes a directory tree if present, then recreates it empty.
pub fn clean_dir(path: &Path) -> Result<(), BuildError> {
    if path.exists() {
        debug!("removing {}", path.display());
        fs::remove_dir_all(path).map_err(|e| BuildError::fs("remove directory", path, e))?;
    }
    ensure_dir(path)
}

/// Copies a single file, overwriting the destination.
pub fn copy_file(src: &Path, dst: &Path) -> Result<(), BuildError> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src, dst)
        .map(|_| ())
        .map_err(|e| BuildError::fs("copy", src, e))
}

/// Copies a directory tree, preserving its relative layout.
///
/// Existing destination files are overwritten, so copying into an already
/// populated tree yields the same bytes as copying into an empty one. A
/// destination nested inside `src` is skipped by the walk.
///
/// # Arguments
///
/// * `src`: Source directory
/// * `dst`: Destination directory (created if missing)
///
/// # Returns
///
/// Number of files copied
///
/// # Errors
///
/// Returns error if walking the source fails or any file cannot be copied
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<usize, BuildError> {
    ensure_dir(dst)?;

    let mut copied = 0;
    let walker = WalkDir::new(src)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.path() != dst);
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            BuildError::fs("walk", path, e.into())
        })?;

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| BuildError::fs("walk", entry.path(), io::Error::other(e)))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Copies `src` into `dst` when it exists.
///
/// Returns `false` without touching `dst` when the source is absent.
pub fn copy_file_if_exists(src: &Path, dst: &Path) -> Result<bool, BuildError> {
    if !src.is_file() {
        debug!("skipping missing file {}", src.display());
        return Ok(false);
    }
    copy_file(src, dst)?;
    Ok(true)
}

/// Copies the directory tree at `src` into `dst` when it exists.
pub fn copy_dir_if_exists(src: &Path, dst: &Path) -> Result<Option<usize>, BuildError> {
    if !src.is_dir() {
        debug!("skipping missing directory {}", src.display());
        return Ok(None);
    }
    copy_dir_recursive(src, dst).map(Some)
}

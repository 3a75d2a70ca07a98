//! Filesystem helpers
//!
//! Thin wrappers over `tokio::fs` that attach the offending path to every
//! error, plus the workflow-tree walker shared by all batch operations.

use flowtidy_errors::{Error, StorageError, WorkflowError};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn storage_err(err: &std::io::Error, path: &Path) -> Error {
    StorageError::from_io_with_path(err, path).into()
}

/// Fail with `DirectoryNotFound` unless `dir` is an existing directory
///
/// # Errors
///
/// Returns `StorageError::DirectoryNotFound` when the path is missing or is
/// not a directory.
pub async fn ensure_dir(dir: &Path) -> Result<(), Error> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => Err(StorageError::DirectoryNotFound {
            path: dir.to_path_buf(),
        }
        .into()),
    }
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// List `*.json` files under `dir`, sorted by path
///
/// Unreadable entries are skipped with a debug log. With `recursive` unset
/// only the top level is listed.
///
/// # Errors
///
/// Returns `StorageError::DirectoryNotFound` when `dir` is not a directory.
pub fn collect_json_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, Error> {
    if !dir.is_dir() {
        return Err(StorageError::DirectoryNotFound {
            path: dir.to_path_buf(),
        }
        .into());
    }

    let mut walker = WalkDir::new(dir).min_depth(1).follow_links(false);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_json_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Read a file to a string
///
/// # Errors
///
/// Returns a storage error carrying `path` when the read fails.
pub async fn read_to_string(path: &Path) -> Result<String, Error> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| storage_err(&e, path))
}

/// Read and parse a JSON document
///
/// # Errors
///
/// Returns a storage error when the file cannot be read and
/// `WorkflowError::InvalidJson` when it does not parse.
pub async fn read_json(path: &Path) -> Result<Value, Error> {
    let text = read_to_string(path).await?;
    serde_json::from_str(&text).map_err(|e| {
        WorkflowError::InvalidJson {
            path: Some(path.display().to_string()),
            message: e.to_string(),
        }
        .into()
    })
}

/// Serialize `value` as 2-space indented JSON and write it to `path`
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub async fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), Error> {
    let mut text = serde_json::to_string_pretty(value).map_err(|e| WorkflowError::Malformed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    text.push('\n');
    write_string(path, &text).await
}

/// Write `contents` to `path`, replacing any existing file
///
/// # Errors
///
/// Returns a storage error carrying `path` when the write fails.
pub async fn write_string(path: &Path, contents: &str) -> Result<(), Error> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| storage_err(&e, path))
}

/// Create a directory and all of its parents
///
/// # Errors
///
/// Returns a storage error carrying `path` when creation fails.
pub async fn create_dir_all(path: &Path) -> Result<(), Error> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| storage_err(&e, path))
}

/// Remove a single file
///
/// # Errors
///
/// Returns a storage error carrying `path` when removal fails.
pub async fn remove_file(path: &Path) -> Result<(), Error> {
    tokio::fs::remove_file(path)
        .await
        .map_err(|e| storage_err(&e, path))
}

/// Check whether a path exists
pub async fn exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

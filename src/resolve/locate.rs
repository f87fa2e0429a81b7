use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Search `root` recursively for a file named `filename`.
///
/// Directory entries are visited in lexical order, files before
/// subdirectories, so duplicate filenames resolve deterministically to the
/// lexically first match rather than whatever order the filesystem yields.
pub fn locate_source(root: &Path, filename: &str) -> Result<Option<PathBuf>, ConfigError> {
    let read_dir = std::fs::read_dir(root).map_err(|e| ConfigError::SearchFailed {
        path: root.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    let mut dirs = Vec::new();

    for entry in read_dir {
        let entry = entry.map_err(|e| ConfigError::SearchFailed {
            path: root.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        } else {
            files.push(path);
        }
    }

    files.sort();
    dirs.sort();

    for file in files {
        if file.file_name().is_some_and(|n| n == filename) {
            return Ok(Some(file));
        }
    }

    for dir in dirs {
        if let Some(found) = locate_source(&dir, filename)? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

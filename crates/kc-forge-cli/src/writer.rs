//! Writes generated files to disk.

use std::path::{Component, Path, PathBuf};

use kc_forge::GeneratedFile;
use tracing::debug;

use crate::{CliError, CliResult};

/// Resolves a generated relative path under `root`.
///
/// Absolute paths and parent-directory components are rejected.
pub fn resolve(root: &Path, file_path: &str) -> CliResult<PathBuf> {
    let relative = Path::new(file_path);
    if file_path.is_empty()
        || !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(CliError::UnsafePath(file_path.to_string()));
    }
    Ok(root.join(relative))
}

/// Writes files under `root`, creating directories as needed.
///
/// Returns the paths written, in input order.
pub fn write_files(root: &Path, files: &[GeneratedFile]) -> CliResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = resolve(root, &file.file_path)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &file.content)?;
        debug!(path = %path.display(), bytes = file.content.len(), "wrote file");
        written.push(path);
    }
    Ok(written)
}

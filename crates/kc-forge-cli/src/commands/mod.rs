//! Command implementations.

pub mod analyze;
pub mod config;
pub mod convert;
pub mod validate;

pub use analyze::run_analyze;
pub use config::run_config;
pub use convert::run_convert;
pub use validate::run_validate;

use std::collections::BTreeSet;
use std::path::PathBuf;

/// One input file, read eagerly.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// File name as given on the command line.
    pub name: String,
    /// Contents, or the read error.
    pub text: Result<String, String>,
}

impl InputFile {
    /// Wraps in-memory contents.
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Ok(text.into()),
        }
    }
}

/// Reads every file; duplicates keep the first occurrence.
pub fn read_inputs(paths: &[PathBuf]) -> Vec<InputFile> {
    let mut seen = BTreeSet::new();
    paths
        .iter()
        .filter(|path| seen.insert((*path).clone()))
        .map(|path| InputFile {
            name: path.display().to_string(),
            text: std::fs::read_to_string(path).map_err(|e| format!("failed to read file: {e}")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, "{}").unwrap();
        let missing = dir.path().join("missing.json");
        let inputs = read_inputs(&[path.clone(), missing, path]);
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].text.as_deref(), Ok("{}"));
        assert!(inputs[1].text.as_ref().unwrap_err().starts_with("failed to read file"));
    }
}

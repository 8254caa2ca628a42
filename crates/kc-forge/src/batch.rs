//! Multi-document conversion.
//!
//! Each input is parsed, validated and converted independently. A failure
//! is recorded against its file and never aborts the rest of the batch.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::generator::{generate, Conversion};
use crate::validate::is_valid;

/// Result of one input file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// Original file name.
    pub file_name: String,
    /// Conversion, or the error to show for this file.
    pub result: Result<Conversion, String>,
}

impl FileOutcome {
    /// Whether the file converted.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Results of a batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One outcome per distinct file name.
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// Outcome for a file name.
    #[must_use]
    pub fn get(&self, file_name: &str) -> Option<&FileOutcome> {
        self.outcomes.iter().find(|o| o.file_name == file_name)
    }

    /// Successful conversions.
    pub fn succeeded(&self) -> impl Iterator<Item = (&str, &Conversion)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|c| (o.file_name.as_str(), c)))
    }

    /// Failed files with their error.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.file_name.as_str(), e.as_str())))
    }

    /// Whether every file converted.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(FileOutcome::is_ok)
    }
}

/// Parses raw file contents into a realm document.
///
/// # Errors
///
/// Returns the per-file error message for unparsable or non-realm input.
pub fn parse_document(file_name: &str, text: &str) -> Result<Value, String> {
    let doc: Value = serde_json::from_str(text).map_err(|e| format!("Invalid JSON: {e}"))?;
    if !is_valid(&doc) {
        return Err(format!("Not a Keycloak realm export: {file_name}"));
    }
    Ok(doc)
}

/// Converts a batch of `(file name, contents)` pairs.
///
/// Duplicate file names keep the first occurrence.
pub fn convert_batch<I, N, T>(inputs: I, config: &GeneratorConfig) -> BatchReport
where
    I: IntoIterator<Item = (N, T)>,
    N: Into<String>,
    T: AsRef<str>,
{
    let mut seen = BTreeSet::new();
    let mut report = BatchReport::default();

    for (name, text) in inputs {
        let file_name = name.into();
        if !seen.insert(file_name.clone()) {
            debug!(file = %file_name, "duplicate file name ignored");
            continue;
        }
        let result = parse_document(&file_name, text.as_ref())
            .and_then(|doc| generate(&doc, &file_name, config).map_err(|e| e.to_string()));
        if let Err(e) = &result {
            warn!(file = %file_name, error = %e, "conversion failed");
        }
        report.outcomes.push(FileOutcome { file_name, result });
    }

    info!(
        files = report.outcomes.len(),
        failed = report.failed().count(),
        "batch converted"
    );
    report
}

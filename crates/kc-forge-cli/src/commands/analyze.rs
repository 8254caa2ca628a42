//! Analyze command implementation.

use std::path::PathBuf;

use kc_forge::batch::parse_document;
use kc_forge::{analyze, RealmAnalysis};
use serde::Serialize;
use tabled::Tabled;

use crate::config::OutputFormat;
use crate::output::{error, output, output_single};
use crate::{CliError, CliResult};

use super::read_inputs;

/// Analysis summary row.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct AnalyzeRow {
    /// File name.
    #[tabled(rename = "File")]
    pub file: String,
    /// Realm name.
    #[tabled(rename = "Realm")]
    pub realm: String,
    /// Complexity score.
    #[tabled(rename = "Score")]
    pub score: u32,
    /// Complexity level.
    #[tabled(rename = "Level")]
    pub level: String,
    /// Users.
    #[tabled(rename = "Users")]
    pub users: usize,
    /// Groups.
    #[tabled(rename = "Groups")]
    pub groups: usize,
    /// Clients.
    #[tabled(rename = "Clients")]
    pub clients: usize,
    /// Realm and client roles.
    #[tabled(rename = "Roles")]
    pub roles: usize,
    /// Detected features.
    #[tabled(rename = "Features")]
    pub features: String,
}

impl AnalyzeRow {
    fn new(file: &str, analysis: &RealmAnalysis) -> Self {
        Self {
            file: file.to_string(),
            realm: analysis.realm.clone(),
            score: analysis.complexity_score,
            level: analysis.complexity_level.to_string(),
            users: analysis.counts.users,
            groups: analysis.counts.groups,
            clients: analysis.counts.clients,
            roles: analysis.counts.realm_roles + analysis.counts.client_roles,
            features: analysis.features.join(", "),
        }
    }
}

/// Runs the analyze command.
pub fn run_analyze(files: &[PathBuf], format: OutputFormat) -> CliResult<()> {
    let inputs = read_inputs(files);
    let total = inputs.len();
    let mut analyses = Vec::new();
    let mut failures = Vec::new();

    for input in &inputs {
        let result = input
            .text
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|text| parse_document(&input.name, text))
            .and_then(|doc| analyze(&doc, &input.name).map_err(|e| e.to_string()));
        match result {
            Ok(analysis) => analyses.push((input.name.clone(), analysis)),
            Err(e) => failures.push((input.name.clone(), e)),
        }
    }

    match format {
        OutputFormat::Table => {
            let rows: Vec<AnalyzeRow> = analyses.iter().map(|(f, a)| AnalyzeRow::new(f, a)).collect();
            output(&rows, format)?;
        }
        _ => {
            let analyses: Vec<&RealmAnalysis> = analyses.iter().map(|(_, a)| a).collect();
            output_single(&analyses, format)?;
        }
    }
    if format != OutputFormat::Quiet {
        for (file, e) in &failures {
            error(&format!("{file}: {e}"));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(CliError::FilesFailed {
            failed: failures.len(),
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_sums_roles() {
        let doc = json!({
            "realm": "demo",
            "clients": [{}, {}],
            "roles": {"realm": [{}], "client": {"web": [{}]}}
        });
        let analysis = analyze(&doc, "demo.json").unwrap();
        let row = AnalyzeRow::new("demo.json", &analysis);
        assert_eq!(row.roles, 2);
        assert_eq!(row.score, 22);
        assert_eq!(row.level, "LOW");
    }
}

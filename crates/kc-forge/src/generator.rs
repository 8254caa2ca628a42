//! Realm document to file set conversion.
//!
//! [`generate`] validates the document, plans the applicable modules and
//! asks each module for its wiring and definition files. The result is a
//! pure function of the document and the configuration: no clock, no
//! randomness, no filesystem access.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::emit::EmitContext;
use crate::error::{ForgeError, ForgeResult};
use crate::model::RealmSettings;
use crate::naming::{module_path, root_dir, root_wiring_path, FileKind};
use crate::plan::{plan, ModuleDescriptor, ModuleKind};
use crate::validate::{is_valid, realm_name};
use crate::wiring::{module_wiring, root_wiring};

/// A generated file: path relative to the output root, and its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFile {
    /// Relative path, `/`-separated.
    pub file_path: String,
    /// File contents.
    pub content: String,
}

impl GeneratedFile {
    fn new(file_path: String, content: String) -> Self {
        Self { file_path, content }
    }
}

/// Result of converting one realm document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    /// Resolved realm name.
    pub realm: String,
    /// Root directory every path starts with.
    pub root: String,
    /// Slugs of the emitted modules, in order.
    pub modules: Vec<String>,
    /// Generated files, in emission order.
    pub files: Vec<GeneratedFile>,
    /// Entities dropped, references left unresolved, constructs not expressible.
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    /// Looks up a file by relative path.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.file_path == path)
    }

    /// Diagnostics recorded by one module.
    pub fn diagnostics_for<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.module == module)
    }
}

/// Tuning knobs for a single conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    excluded: BTreeSet<ModuleKind>,
    wiring: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            excluded: BTreeSet::new(),
            wiring: true,
        }
    }
}

impl GenerateOptions {
    /// Creates options that emit everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Leaves a module out even when it applies. The realm module cannot be excluded.
    #[must_use]
    pub fn exclude(mut self, kind: ModuleKind) -> Self {
        if kind != ModuleKind::Realm {
            self.excluded.insert(kind);
        }
        self
    }

    /// Enables or disables Terragrunt wiring files.
    #[must_use]
    pub fn with_wiring(mut self, wiring: bool) -> Self {
        self.wiring = wiring;
        self
    }

    fn includes(&self, module: &ModuleDescriptor) -> bool {
        !self.excluded.contains(&module.kind)
    }
}

/// Converts a realm document into its file set.
///
/// # Errors
///
/// Returns [`ForgeError::InvalidDocument`] if `doc` is not an object with a
/// truthy `realm` field. No files are produced in that case.
pub fn generate(doc: &Value, file_name: &str, config: &GeneratorConfig) -> ForgeResult<Conversion> {
    generate_with(doc, file_name, config, &GenerateOptions::default())
}

/// Converts a realm document with explicit options.
///
/// # Errors
///
/// Returns [`ForgeError::InvalidDocument`] if `doc` is not a realm export,
/// and [`ForgeError::Render`] if a generated structure cannot be formatted.
pub fn generate_with(
    doc: &Value,
    file_name: &str,
    config: &GeneratorConfig,
    options: &GenerateOptions,
) -> ForgeResult<Conversion> {
    if !is_valid(doc) {
        return Err(ForgeError::InvalidDocument {
            file_name: file_name.to_string(),
        });
    }

    let realm = realm_name(doc, file_name);
    let root = root_dir(&realm);
    let mut diagnostics = Vec::new();

    let settings = match serde_json::from_value::<RealmSettings>(doc.clone()) {
        Ok(settings) => settings,
        Err(e) => {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MalformedSection,
                "realm",
                realm.clone(),
                format!("realm settings unreadable, using defaults: {e}"),
            ));
            RealmSettings::default()
        }
    };

    let modules: Vec<&'static ModuleDescriptor> =
        plan(doc).into_iter().filter(|m| options.includes(m)).collect();
    debug!(
        realm = %realm,
        modules = ?modules.iter().map(|m| m.slug()).collect::<Vec<_>>(),
        "planned modules"
    );

    let mut files = Vec::with_capacity(1 + modules.len() * 2);
    if options.wiring {
        files.push(GeneratedFile::new(
            root_wiring_path(&root),
            root_wiring(&realm, &modules, config)?,
        ));
    }

    for module in &modules {
        let slug = module.slug();
        if options.wiring {
            files.push(GeneratedFile::new(
                module_path(&root, slug, FileKind::Wiring),
                module_wiring(module, &realm, config)?,
            ));
        }
        let content = {
            let mut ctx = EmitContext::new(doc, &settings, &realm, config, slug, &mut diagnostics);
            (module.emit)(&mut ctx)?
        };
        files.push(GeneratedFile::new(module_path(&root, slug, FileKind::Definition), content));
    }

    info!(
        realm = %realm,
        modules = modules.len(),
        files = files.len(),
        diagnostics = diagnostics.len(),
        "realm converted"
    );

    Ok(Conversion {
        realm,
        root,
        modules: modules.iter().map(|m| m.slug().to_string()).collect(),
        files,
        diagnostics,
    })
}

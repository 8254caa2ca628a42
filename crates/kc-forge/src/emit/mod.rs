//! Per-module resource definition emitters.
//!
//! Each emitter reads its slice of the realm document through an
//! [`EmitContext`] and returns the text of the module's `main.tf`. The
//! context owns the diagnostic channel: skipped entries, unresolved
//! references and unsupported constructs are recorded there and logged.

pub mod auth_flows;
pub mod client_scopes;
pub mod clients;
pub mod events;
pub mod federation;
pub mod groups;
pub mod identity_providers;
pub mod mappers;
pub mod realm;
pub mod required_actions;
pub mod required_credentials;
pub mod roles;
pub mod scope_mappings;
pub mod security;
pub mod themes;
pub mod users;

use std::collections::BTreeMap;

use hcl::expr::Expression;
use hcl::Block;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::document::{self, object, reference, resource, Document};
use crate::model::{self, NestedList, RealmSettings};
use crate::naming::{fallback_name, LabelAllocator};

/// Shared state handed to every emitter.
pub struct EmitContext<'a> {
    doc: &'a Value,
    settings: &'a RealmSettings,
    realm_name: &'a str,
    config: &'a GeneratorConfig,
    module: &'static str,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> EmitContext<'a> {
    /// Creates a context for one module.
    pub fn new(
        doc: &'a Value,
        settings: &'a RealmSettings,
        realm_name: &'a str,
        config: &'a GeneratorConfig,
        module: &'static str,
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            doc,
            settings,
            realm_name,
            config,
            module,
            diagnostics,
        }
    }

    /// The raw document.
    #[must_use]
    pub fn doc(&self) -> &'a Value {
        self.doc
    }

    /// Parsed realm-level settings.
    #[must_use]
    pub fn settings(&self) -> &'a RealmSettings {
        self.settings
    }

    /// Resolved realm name.
    #[must_use]
    pub fn realm_name(&self) -> &'a str {
        self.realm_name
    }

    /// Generator configuration.
    #[must_use]
    pub fn config(&self) -> &'a GeneratorConfig {
        self.config
    }

    /// Slug of the module being emitted.
    #[must_use]
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Records a diagnostic.
    pub fn record(&mut self, kind: DiagnosticKind, subject: impl Into<String>, message: impl Into<String>) {
        let subject = subject.into();
        let message = message.into();
        match kind {
            DiagnosticKind::SkippedEntity | DiagnosticKind::MalformedSection => {
                warn!(module = self.module, subject = %subject, "{message}");
            }
            DiagnosticKind::UnresolvedReference | DiagnosticKind::UnsupportedConstruct => {
                debug!(module = self.module, subject = %subject, "{message}");
            }
        }
        self.diagnostics
            .push(Diagnostic::new(kind, self.module, subject, message));
    }

    /// Records a dropped entry.
    pub fn skip(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.record(DiagnosticKind::SkippedEntity, subject, message);
    }

    /// Records a placeholder reference.
    pub fn unresolved(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.record(DiagnosticKind::UnresolvedReference, subject, message);
    }

    /// Records a notice stub or commented-out block.
    pub fn unsupported(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.record(DiagnosticKind::UnsupportedConstruct, subject, message);
    }

    /// Records an ignored section.
    pub fn malformed(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.record(DiagnosticKind::MalformedSection, subject, message);
    }

    /// Parses every entry of a list, skipping unreadable ones.
    ///
    /// `section` names the list for diagnostics (`users`, `clients[2].protocolMappers`).
    pub fn entries<T: DeserializeOwned>(&mut self, section: &str, list: &[Value]) -> Vec<(usize, T)> {
        let mut parsed = Vec::with_capacity(list.len());
        for (index, value) in list.iter().enumerate() {
            match model::parse_entry(value) {
                Ok(entry) => parsed.push((index, entry)),
                Err(e) => self.skip(format!("{section}[{index}]"), e.to_string()),
            }
        }
        parsed
    }

    /// Entries of a nested list; a wrong-shaped value is reported and read as empty.
    pub fn nested<'v>(&mut self, section: &str, list: &'v NestedList) -> &'v [Value] {
        if *list == NestedList::Malformed {
            self.malformed(section, format!("`{section}` is not a list"));
        }
        list.items()
    }

    /// Parses a top-level list section; a non-list value is reported and ignored.
    pub fn section<T: DeserializeOwned>(&mut self, key: &str) -> Vec<(usize, T)> {
        match self.doc.get(key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(list)) => self.entries(key, list),
            Some(_) => {
                self.malformed(key, format!("`{key}` is not a list"));
                Vec::new()
            }
        }
    }

    /// Resolves a required identifier.
    ///
    /// A missing identifier skips the entry. An empty one falls back to
    /// `<kind>_<index>`.
    pub fn identifier(
        &mut self,
        subject: &str,
        field: &str,
        raw: Option<&str>,
        kind: &str,
        index: usize,
    ) -> Option<String> {
        match raw {
            None => {
                self.skip(subject, format!("missing `{field}`"));
                None
            }
            Some("") => Some(fallback_name(kind, index)),
            Some(name) => Some(name.to_string()),
        }
    }
}

/// Name of a nested entity, falling back to `<kind>_<index>`.
#[must_use]
pub fn name_or_fallback(raw: Option<&str>, kind: &str, index: usize) -> String {
    match raw {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => fallback_name(kind, index),
    }
}

/// Writes the file header, provider requirements and the `realm_id` variable.
pub(crate) fn preamble(doc: &mut Document, ctx: &EmitContext<'_>, title: &str) {
    header(doc, ctx, title);
    doc.blank();
    doc.block(variable("realm_id", "ID of the realm managed by the realm module", type_string()).build());
}

/// Writes the file header and provider requirements.
pub(crate) fn header(doc: &mut Document, ctx: &EmitContext<'_>, title: &str) {
    doc.comment(&format!(
        "{title}\nRealm: {}\nGenerated from a Keycloak realm export. Do not edit by hand.",
        ctx.realm_name()
    ));
    doc.blank();
    let config = ctx.config();
    let provider = object([
        ("source", Expression::String(config.provider_source.clone())),
        ("version", Expression::String(config.provider_version.clone())),
    ]);
    doc.block(
        Block::builder("terraform")
            .add_block(
                Block::builder("required_providers")
                    .add_attribute(("keycloak", provider))
                    .build(),
            )
            .build(),
    );
}

/// `string`, as a variable type.
pub(crate) fn type_string() -> Expression {
    reference("string")
}

/// `variable "<name>" { description, type }`, open for further attributes.
pub(crate) fn variable(name: &str, description: &str, kind: Expression) -> hcl::structure::BlockBuilder {
    Block::builder("variable")
        .add_label(name)
        .add_attribute(("description", description))
        .add_attribute(("type", kind))
}

pub(crate) fn sensitive_variable(doc: &mut Document, name: &str, description: &str) {
    doc.blank();
    doc.block(
        variable(name, description, type_string())
            .add_attribute(("sensitive", true))
            .build(),
    );
}

/// Writes an output whose value is a map of name to reference.
pub(crate) fn map_output(doc: &mut Document, name: &str, description: &str, entries: &BTreeMap<String, String>) {
    let value = document::map(entries.iter().map(|(k, path)| (k.clone(), reference(path))));
    output(doc, name, description, value);
}

/// Writes `output "<name>" { description, value }`.
pub(crate) fn output(doc: &mut Document, name: &str, description: &str, value: Expression) {
    doc.blank();
    doc.block(
        Block::builder("output")
            .add_label(name)
            .add_attribute(("description", description))
            .add_attribute(("value", value))
            .build(),
    );
}

/// Writes an informational stub that prints a notice and changes nothing.
pub(crate) fn notice(doc: &mut Document, labels: &mut LabelAllocator, raw_label: &str, message: &str) {
    let label = labels.claim(&format!("notice_{raw_label}"));
    let command = format!("echo {}", shell_quote(message));
    doc.blank();
    doc.block(
        resource("terraform_data", &label)
            .add_block(
                Block::builder("provisioner")
                    .add_label("local-exec")
                    .add_attribute(("command", command))
                    .build(),
            )
            .build(),
    );
}

/// Writes the comment that precedes a resource holding an empty placeholder list.
pub(crate) fn placeholder_note(doc: &mut Document, attr: &str, what: &str, refs: &[String]) {
    doc.comment(&format!(
        "Unresolved {what}: {}\nReplace the empty `{attr}` list with the IDs of these resources.",
        refs.join(", ")
    ));
}

/// Quotes a string for a POSIX shell.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// `<type>.<label>.id`.
pub(crate) fn id_ref(resource_type: &str, label: &str) -> String {
    format!("{resource_type}.{label}.id")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_context<R>(doc: &Value, f: impl FnOnce(&mut EmitContext<'_>) -> R) -> (R, Vec<Diagnostic>) {
        let settings = RealmSettings::default();
        let config = GeneratorConfig::default();
        let mut diagnostics = Vec::new();
        let result = {
            let mut ctx = EmitContext::new(doc, &settings, "demo", &config, "users", &mut diagnostics);
            f(&mut ctx)
        };
        (result, diagnostics)
    }

    #[test]
    fn section_reports_wrong_shape() {
        let doc = json!({"users": "alice"});
        let (entries, diagnostics) = with_context(&doc, |ctx| ctx.section::<model::User>("users"));
        assert!(entries.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MalformedSection);
    }

    #[test]
    fn section_skips_scalar_entries() {
        let doc = json!({"users": [{"username": "a"}, 7, {"username": "b"}]});
        let (entries, diagnostics) = with_context(&doc, |ctx| ctx.section::<model::User>("users"));
        let indexes: Vec<usize> = entries.iter().map(|(i, _)| *i).collect();
        assert_eq!(indexes, vec![0, 2]);
        assert_eq!(diagnostics[0].subject, "users[1]");
    }

    #[test]
    fn identifier_policy() {
        let doc = json!({});
        let (names, diagnostics) = with_context(&doc, |ctx| {
            (
                ctx.identifier("users[0]", "username", Some("alice"), "user", 0),
                ctx.identifier("users[1]", "username", Some(""), "user", 1),
                ctx.identifier("users[2]", "username", None, "user", 2),
            )
        });
        assert_eq!(names.0.as_deref(), Some("alice"));
        assert_eq!(names.1.as_deref(), Some("user_1"));
        assert!(names.2.is_none());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::SkippedEntity);
    }

    #[test]
    fn nested_lists_report_wrong_shapes() {
        let doc = json!({});
        let (lens, diagnostics) = with_context(&doc, |ctx| {
            let good = NestedList::Items(vec![json!({})]);
            (
                ctx.nested("clients[0].protocolMappers", &good).len(),
                ctx.nested("clients[1].protocolMappers", &NestedList::Malformed).len(),
                ctx.nested("clients[2].protocolMappers", &NestedList::Absent).len(),
            )
        });
        assert_eq!(lens, (1, 0, 0));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MalformedSection);
        assert_eq!(diagnostics[0].subject, "clients[1].protocolMappers");
    }

    #[test]
    fn notice_is_shell_safe() {
        let mut doc = Document::new();
        let mut labels = LabelAllocator::new();
        notice(&mut doc, &mut labels, "theme", "Theme 'acme' needs assets");
        let text = doc.render().unwrap();
        assert!(text.contains("resource \"terraform_data\" \"notice_theme\""));
        assert!(text.contains(r#"command = "echo 'Theme '\\''acme'\\'' needs assets'""#));
    }

    #[test]
    fn nested_names_fall_back() {
        assert_eq!(name_or_fallback(Some("email"), "mapper", 0), "email");
        assert_eq!(name_or_fallback(Some(""), "mapper", 4), "mapper_4");
        assert_eq!(name_or_fallback(None, "mapper", 5), "mapper_5");
    }
}

//! Structured record of everything the generator dropped or left unresolved.

use serde::{Deserialize, Serialize};

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A list entry was dropped from the output.
    SkippedEntity,
    /// A cross-resource reference was left as a placeholder.
    UnresolvedReference,
    /// A section had an unexpected shape and was ignored.
    MalformedSection,
    /// A construct was emitted as a notice stub or a commented block.
    UnsupportedConstruct,
}

impl DiagnosticKind {
    /// Short label for console output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SkippedEntity => "skipped",
            Self::UnresolvedReference => "unresolved",
            Self::MalformedSection => "malformed",
            Self::UnsupportedConstruct => "unsupported",
        }
    }
}

/// One diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Category.
    pub kind: DiagnosticKind,
    /// Module slug the diagnostic was raised in.
    pub module: String,
    /// Document location, e.g. `users[3]`.
    pub subject: String,
    /// Human-readable detail.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic.
    #[must_use]
    pub fn new(
        kind: DiagnosticKind,
        module: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            module: module.into(),
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.kind.label(),
            self.module,
            self.message,
            self.subject
        )
    }
}

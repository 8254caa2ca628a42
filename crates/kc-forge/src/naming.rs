//! File path and resource name derivation.
//!
//! Two character classes are used:
//!
//! - directory names keep `[A-Za-z0-9_-]`
//! - resource labels keep `[A-Za-z0-9_]`
//!
//! Every other character becomes `_`. Resource labels additionally get a
//! leading `_` when they would start with a digit, which Terraform rejects.

use std::collections::BTreeSet;

/// Name of the per-module wiring file.
pub const WIRING_FILE: &str = "terragrunt.hcl";

/// Name of the per-module resource definition file.
pub const DEFINITION_FILE: &str = "main.tf";

/// Kind of file produced for a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Terragrunt wiring: source, dependency on the realm module, inputs.
    Wiring,
    /// Terraform resource definitions: variables, resources, outputs.
    Definition,
}

impl FileKind {
    /// Returns the fixed file name for this kind.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Wiring => WIRING_FILE,
            Self::Definition => DEFINITION_FILE,
        }
    }
}

/// Replaces characters outside `[A-Za-z0-9_-]` with `_`.
#[must_use]
pub fn sanitize_dir(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Replaces characters outside `[A-Za-z0-9_]` with `_`.
///
/// The result is always a valid Terraform block label.
#[must_use]
pub fn sanitize_resource(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Derives the output root directory from a realm name.
#[must_use]
pub fn root_dir(realm_name: &str) -> String {
    let dir = sanitize_dir(realm_name);
    if dir.is_empty() {
        "realm".to_string()
    } else {
        dir
    }
}

/// Path of the root wiring file shared by every module.
#[must_use]
pub fn root_wiring_path(root: &str) -> String {
    format!("{root}/{WIRING_FILE}")
}

/// Path of one of a module's files.
#[must_use]
pub fn module_path(root: &str, slug: &str, kind: FileKind) -> String {
    format!("{root}/{slug}/{}", kind.file_name())
}

/// Fallback name for an entry without a usable identifier.
#[must_use]
pub fn fallback_name(kind: &str, index: usize) -> String {
    format!("{kind}_{index}")
}

/// Allocates unique resource labels within one generated file.
///
/// Two raw identifiers that sanitize to the same label (`a.b` and `a_b`)
/// would otherwise produce duplicate resource addresses. The second and
/// later claimants receive `_2`, `_3`, ... suffixes in document order.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    taken: BTreeSet<String>,
}

impl LabelAllocator {
    /// Creates an empty allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a label for a raw identifier and returns it.
    pub fn claim(&mut self, raw: &str) -> String {
        let base = sanitize_resource(raw);
        let mut candidate = base.clone();
        let mut n = 1;
        while self.taken.contains(&candidate) {
            n += 1;
            candidate = format!("{base}_{n}");
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    /// Returns whether a label has already been claimed.
    #[must_use]
    pub fn is_taken(&self, label: &str) -> bool {
        self.taken.contains(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_names_keep_dashes() {
        assert_eq!(sanitize_dir("my-realm.prod"), "my-realm_prod");
        assert_eq!(sanitize_dir("a b/c"), "a_b_c");
    }

    #[test]
    fn resource_names_drop_dashes() {
        assert_eq!(sanitize_resource("my-app"), "my_app");
        assert_eq!(sanitize_resource("alice@example.com"), "alice_example_com");
    }

    #[test]
    fn resource_names_never_start_with_digit() {
        assert_eq!(sanitize_resource("1st-client"), "_1st_client");
        assert_eq!(sanitize_resource(""), "_");
    }

    #[test]
    fn non_ascii_characters_are_replaced() {
        let label = sanitize_resource("josé");
        assert_eq!(label, "jos_");
        assert!(label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn root_dir_falls_back_when_empty() {
        assert_eq!(root_dir("demo"), "demo");
        assert_eq!(root_dir(""), "realm");
    }

    #[test]
    fn module_paths_use_fixed_file_names() {
        assert_eq!(module_path("demo", "users", FileKind::Wiring), "demo/users/terragrunt.hcl");
        assert_eq!(module_path("demo", "users", FileKind::Definition), "demo/users/main.tf");
        assert_eq!(root_wiring_path("demo"), "demo/terragrunt.hcl");
    }

    #[test]
    fn allocator_suffixes_collisions() {
        let mut labels = LabelAllocator::new();
        assert_eq!(labels.claim("a.b"), "a_b");
        assert_eq!(labels.claim("a_b"), "a_b_2");
        assert_eq!(labels.claim("a-b"), "a_b_3");
        assert_eq!(labels.claim("other"), "other");
        assert!(labels.is_taken("a_b_2"));
    }

    #[test]
    fn fallback_names_use_index() {
        assert_eq!(fallback_name("mapper", 3), "mapper_3");
    }
}

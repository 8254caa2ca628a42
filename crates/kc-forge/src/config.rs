//! Generator configuration.
//!
//! Controls the provider pin and the connection hints written into the
//! generated root wiring file. Every field has a default, so an empty TOML
//! table deserializes to [`GeneratorConfig::default`].

use serde::{Deserialize, Serialize};

/// Settings that shape generated files without affecting which resources are emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Terraform provider source address.
    #[serde(default = "default_provider_source")]
    pub provider_source: String,

    /// Terraform provider version constraint.
    #[serde(default = "default_provider_version")]
    pub provider_version: String,

    /// Fallback Keycloak URL used when `KEYCLOAK_URL` is unset at apply time.
    #[serde(default = "default_keycloak_url")]
    pub keycloak_url: String,

    /// Admin client used by the provider.
    #[serde(default = "default_admin_client_id")]
    pub admin_client_id: String,

    /// Remote module source prefix (e.g. `git::https://host/modules.git`).
    ///
    /// When unset, each module is sourced from its own directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_source_base: Option<String>,
}

fn default_provider_source() -> String {
    "keycloak/keycloak".to_string()
}

fn default_provider_version() -> String {
    "~> 5.0".to_string()
}

fn default_keycloak_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_admin_client_id() -> String {
    "admin-cli".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider_source: default_provider_source(),
            provider_version: default_provider_version(),
            keycloak_url: default_keycloak_url(),
            admin_client_id: default_admin_client_id(),
            module_source_base: None,
        }
    }
}

impl GeneratorConfig {
    /// Sets the remote module source prefix.
    #[must_use]
    pub fn with_module_source_base(mut self, base: impl Into<String>) -> Self {
        self.module_source_base = Some(base.into());
        self
    }

    /// Sets the provider version constraint.
    #[must_use]
    pub fn with_provider_version(mut self, version: impl Into<String>) -> Self {
        self.provider_version = version.into();
        self
    }

    /// Returns the `terraform.source` value for a module slug.
    #[must_use]
    pub fn module_source(&self, slug: &str) -> String {
        match &self.module_source_base {
            Some(base) => format!("{}//{}", base.trim_end_matches('/'), slug),
            None => ".".to_string(),
        }
    }
}

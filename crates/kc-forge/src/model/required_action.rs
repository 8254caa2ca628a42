//! Required actions and role scope mappings.

use serde::Deserialize;

use super::de;

/// A `requiredActions[]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequiredAction {
    /// Provider alias (`CONFIGURE_TOTP`); entries without one are skipped.
    #[serde(deserialize_with = "de::opt_string")]
    pub alias: Option<String>,
    /// Display name.
    #[serde(deserialize_with = "de::opt_string")]
    pub name: Option<String>,
    /// Enabled flag.
    #[serde(deserialize_with = "de::opt_bool")]
    pub enabled: Option<bool>,
    /// Whether new users get the action.
    #[serde(deserialize_with = "de::opt_bool")]
    pub default_action: Option<bool>,
    /// Ordering among required actions.
    #[serde(deserialize_with = "de::opt_i64")]
    pub priority: Option<i64>,
}

impl RequiredAction {
    /// Enabled unless explicitly `false`.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled != Some(false)
    }
}

/// A `scopeMappings[]` or `clientScopeMappings.<client>[]` entry.
///
/// Exactly one of `client` and `client_scope` names the target.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScopeMapping {
    /// Target client id.
    #[serde(deserialize_with = "de::opt_string")]
    pub client: Option<String>,
    /// Target client scope name.
    #[serde(deserialize_with = "de::opt_string")]
    pub client_scope: Option<String>,
    /// Role names.
    #[serde(deserialize_with = "de::string_list")]
    pub roles: Vec<String>,
}

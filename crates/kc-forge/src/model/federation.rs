//! Component entries used for user federation.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::de;

/// Component type key holding user storage providers.
pub const USER_STORAGE_PROVIDER: &str = "org.keycloak.storage.UserStorageProvider";

/// A component entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Component {
    /// Component id.
    #[serde(deserialize_with = "de::opt_string")]
    pub id: Option<String>,
    /// Display name.
    #[serde(deserialize_with = "de::opt_string")]
    pub name: Option<String>,
    /// Provider id (`ldap`, `kerberos`, custom).
    #[serde(deserialize_with = "de::opt_string")]
    pub provider_id: Option<String>,
    /// Config, every value a list.
    #[serde(deserialize_with = "de::multi_map")]
    pub config: BTreeMap<String, Vec<String>>,
}

impl Component {
    /// First value of a config key.
    #[must_use]
    pub fn config(&self, key: &str) -> Option<&str> {
        self.config
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Config value or a default.
    #[must_use]
    pub fn config_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.config(key).unwrap_or(default)
    }

    /// Config flag with a default for absent keys.
    #[must_use]
    pub fn config_flag(&self, key: &str, default: bool) -> bool {
        self.config(key).map_or(default, |v| v.eq_ignore_ascii_case("true"))
    }

    /// Config integer, ignoring unparsable values.
    #[must_use]
    pub fn config_i64(&self, key: &str) -> Option<i64> {
        self.config(key).and_then(|v| v.trim().parse().ok())
    }

    /// Whether this is an LDAP provider.
    #[must_use]
    pub fn is_ldap(&self) -> bool {
        self.provider_id.as_deref() == Some("ldap")
    }
}

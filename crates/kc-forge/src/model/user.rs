//! User entries.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::de;

/// A `users[]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    /// Username; entries without one are skipped.
    #[serde(deserialize_with = "de::opt_string")]
    pub username: Option<String>,
    /// Email address.
    #[serde(deserialize_with = "de::opt_string")]
    pub email: Option<String>,
    /// Given name.
    #[serde(deserialize_with = "de::opt_string")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(deserialize_with = "de::opt_string")]
    pub last_name: Option<String>,
    /// Enabled flag.
    #[serde(deserialize_with = "de::opt_bool")]
    pub enabled: Option<bool>,
    /// Email verified flag.
    #[serde(deserialize_with = "de::opt_bool")]
    pub email_verified: Option<bool>,
    /// Custom attributes.
    #[serde(deserialize_with = "de::multi_map")]
    pub attributes: BTreeMap<String, Vec<String>>,
    /// Group paths.
    #[serde(deserialize_with = "de::string_list")]
    pub groups: Vec<String>,
    /// Realm role names.
    #[serde(deserialize_with = "de::string_list")]
    pub realm_roles: Vec<String>,
    /// Client role names keyed by client id.
    #[serde(deserialize_with = "de::list_map")]
    pub client_roles: BTreeMap<String, Vec<String>>,
    /// Pending required actions.
    #[serde(deserialize_with = "de::string_list")]
    pub required_actions: Vec<String>,
    /// Federation provider id for federated users.
    #[serde(deserialize_with = "de::opt_string")]
    pub federation_link: Option<String>,
}

impl User {
    /// Enabled unless explicitly `false`.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled != Some(false)
    }

    /// Email is unverified unless stated.
    #[must_use]
    pub fn email_verified(&self) -> bool {
        self.email_verified == Some(true)
    }

    /// Attributes flattened the way the provider expects multi-valued attributes.
    #[must_use]
    pub fn flat_attributes(&self) -> BTreeMap<String, String> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.join("##")))
            .collect()
    }

    /// Every role reference as `client/role` or plain realm role name.
    #[must_use]
    pub fn role_references(&self) -> Vec<String> {
        let mut refs = self.realm_roles.clone();
        for (client, roles) in &self.client_roles {
            refs.extend(roles.iter().map(|r| format!("{client}/{r}")));
        }
        refs
    }
}

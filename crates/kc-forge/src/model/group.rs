//! Groups.

use std::collections::BTreeMap;

use serde::Deserialize;
use super::{de, NestedList};

/// A `groups[]` entry, possibly nested.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Group {
    /// Group name; entries without one are skipped along with their subgroups.
    #[serde(deserialize_with = "de::opt_string")]
    pub name: Option<String>,
    /// Full path.
    #[serde(deserialize_with = "de::opt_string")]
    pub path: Option<String>,
    /// Attributes.
    #[serde(deserialize_with = "de::multi_map")]
    pub attributes: BTreeMap<String, Vec<String>>,
    /// Realm role names.
    #[serde(deserialize_with = "de::string_list")]
    pub realm_roles: Vec<String>,
    /// Client role names keyed by client id.
    #[serde(deserialize_with = "de::list_map")]
    pub client_roles: BTreeMap<String, Vec<String>>,
    /// Raw subgroup entries.
    pub sub_groups: NestedList,
}

impl Group {
    /// Every role reference as `client/role` or plain realm role name.
    #[must_use]
    pub fn role_references(&self) -> Vec<String> {
        let mut refs = self.realm_roles.clone();
        for (client, roles) in &self.client_roles {
            refs.extend(roles.iter().map(|r| format!("{client}/{r}")));
        }
        refs
    }

    /// Attributes flattened with `##` between values.
    #[must_use]
    pub fn flat_attributes(&self) -> BTreeMap<String, String> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.join("##")))
            .collect()
    }
}

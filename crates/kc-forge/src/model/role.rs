//! Realm and client roles.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::{de, NestedList};

/// The `roles` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RolesSection {
    /// Raw realm role entries.
    pub realm: NestedList,
    /// Raw client role entries keyed by client id; `None` when `client` is not an object.
    #[serde(deserialize_with = "client_roles")]
    pub client: Option<BTreeMap<String, NestedList>>,
}

impl Default for RolesSection {
    fn default() -> Self {
        Self {
            realm: NestedList::Absent,
            client: Some(BTreeMap::new()),
        }
    }
}

impl RolesSection {
    /// Client role lists, empty when the section is absent or malformed.
    pub fn client_lists(&self) -> impl Iterator<Item = (&String, &NestedList)> {
        self.client.iter().flatten()
    }
}

fn client_roles<'de, D: serde::Deserializer<'de>>(
    d: D,
) -> Result<Option<BTreeMap<String, NestedList>>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Some(BTreeMap::new()),
        Some(Value::Object(map)) => Some(
            map.into_iter()
                .map(|(client, roles)| (client, NestedList::from(roles)))
                .collect(),
        ),
        Some(_) => None,
    })
}

fn composites<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<Composites>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// Composite role membership.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Composites {
    /// Realm role names.
    #[serde(deserialize_with = "de::string_list")]
    pub realm: Vec<String>,
    /// Client role names keyed by client id.
    #[serde(deserialize_with = "de::list_map")]
    pub client: BTreeMap<String, Vec<String>>,
}

/// A role entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Role {
    /// Role name; entries without one are skipped.
    #[serde(deserialize_with = "de::opt_string")]
    pub name: Option<String>,
    /// Description.
    #[serde(deserialize_with = "de::opt_string")]
    pub description: Option<String>,
    /// Composite flag.
    #[serde(deserialize_with = "de::opt_bool")]
    pub composite: Option<bool>,
    /// Composite members.
    #[serde(deserialize_with = "composites")]
    pub composites: Option<Composites>,
    /// Attributes.
    #[serde(deserialize_with = "de::multi_map")]
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl Role {
    /// Names of composite members as `client/role` or plain realm role name.
    #[must_use]
    pub fn composite_references(&self) -> Vec<String> {
        let Some(composites) = &self.composites else {
            return Vec::new();
        };
        let mut refs = composites.realm.clone();
        for (client, roles) in &composites.client {
            refs.extend(roles.iter().map(|r| format!("{client}/{r}")));
        }
        refs
    }
}

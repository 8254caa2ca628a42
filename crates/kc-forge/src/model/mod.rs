//! Typed view of a realm export.
//!
//! Each entity kind is a serde struct whose fields are all optional and
//! deserialized leniently (see [`de`]); the defaults Keycloak applies to
//! absent fields are expressed once, as accessor methods on the struct.
//! List sections stay as raw JSON values until an emitter parses them one
//! entry at a time, so a single malformed entry cannot poison its siblings.

pub mod de;
pub mod federation;
pub mod flow;
pub mod group;
pub mod identity_provider;
pub mod realm;
pub mod required_action;
pub mod role;
pub mod user;
pub mod client;

pub use client::{AccessType, Client, ClientScope, MapperKind, ProtocolMapper};
pub use federation::{Component, USER_STORAGE_PROVIDER};
pub use flow::{AuthenticationExecution, AuthenticationFlow};
pub use group::Group;
pub use identity_provider::{IdentityProvider, IdentityProviderMapper, IdpProtocol};
pub use realm::{security_header_attribute, BruteForce, OtpPolicy, RealmSettings, BUILT_IN_THEMES};
pub use required_action::{RequiredAction, ScopeMapping};
pub use role::{Composites, Role, RolesSection};
pub use user::User;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A list nested inside an entity (`protocolMappers`, `subGroups`, ...).
///
/// Unlike a leaf field, a wrong-shaped nested list is remembered so the
/// emitter can report it instead of dropping it silently.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum NestedList {
    /// Absent or `null`.
    #[default]
    Absent,
    /// A JSON array.
    Items(Vec<Value>),
    /// Present but not an array.
    Malformed,
}

impl NestedList {
    /// The entries; empty unless the value was an array.
    #[must_use]
    pub fn items(&self) -> &[Value] {
        match self {
            Self::Items(items) => items,
            Self::Absent | Self::Malformed => &[],
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// True when there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl From<Value> for NestedList {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Array(items) => Self::Items(items),
            _ => Self::Malformed,
        }
    }
}

impl<'de> Deserialize<'de> for NestedList {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(Option::<Value>::deserialize(d)?.map_or(Self::Absent, Self::from))
    }
}

/// Why a list entry could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// The entry is not a JSON object.
    NotAnObject,
    /// The entry is an object serde could not map.
    Invalid(String),
}

impl std::fmt::Display for EntryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => f.write_str("entry is not an object"),
            Self::Invalid(reason) => write!(f, "entry could not be read: {reason}"),
        }
    }
}

/// Parses a single list entry.
pub fn parse_entry<T: DeserializeOwned>(value: &Value) -> Result<T, EntryError> {
    if !value.is_object() {
        return Err(EntryError::NotAnObject);
    }
    serde_json::from_value(value.clone()).map_err(|e| EntryError::Invalid(e.to_string()))
}

/// Returns `doc[key]` when it is a non-empty array.
#[must_use]
pub fn non_empty_list<'a>(doc: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    doc.get(key).and_then(Value::as_array).filter(|a| !a.is_empty())
}

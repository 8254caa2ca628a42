//! Authentication flows and executions.

use serde::Deserialize;
use super::{de, NestedList};

/// An `authenticationFlows[]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthenticationFlow {
    /// Alias; entries without one are skipped.
    #[serde(deserialize_with = "de::opt_string")]
    pub alias: Option<String>,
    /// Description.
    #[serde(deserialize_with = "de::opt_string")]
    pub description: Option<String>,
    /// `basic-flow` or `client-flow`.
    #[serde(deserialize_with = "de::opt_string")]
    pub provider_id: Option<String>,
    /// Top-level flag; sub-flows are reached through executions.
    #[serde(deserialize_with = "de::opt_bool")]
    pub top_level: Option<bool>,
    /// Built-in flag.
    #[serde(deserialize_with = "de::opt_bool")]
    pub built_in: Option<bool>,
    /// Raw execution entries.
    pub authentication_executions: NestedList,
}

impl AuthenticationFlow {
    /// Provider id, `basic-flow` by default.
    #[must_use]
    pub fn provider_id(&self) -> &str {
        self.provider_id.as_deref().unwrap_or("basic-flow")
    }

    /// Top-level unless explicitly `false`.
    #[must_use]
    pub fn top_level(&self) -> bool {
        self.top_level != Some(false)
    }

    /// Built-in flows ship with Keycloak and are not recreated.
    #[must_use]
    pub fn built_in(&self) -> bool {
        self.built_in == Some(true)
    }
}

/// An execution inside a flow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthenticationExecution {
    /// Authenticator provider id.
    #[serde(deserialize_with = "de::opt_string")]
    pub authenticator: Option<String>,
    /// Set when the execution is a sub-flow.
    #[serde(deserialize_with = "de::opt_bool")]
    pub authenticator_flow: Option<bool>,
    /// Sub-flow alias.
    #[serde(deserialize_with = "de::opt_string")]
    pub flow_alias: Option<String>,
    /// Requirement.
    #[serde(deserialize_with = "de::opt_string")]
    pub requirement: Option<String>,
    /// Ordering priority.
    #[serde(deserialize_with = "de::opt_i64")]
    pub priority: Option<i64>,
}

impl AuthenticationExecution {
    /// Sub-flow executions reference another flow by alias.
    #[must_use]
    pub fn is_subflow(&self) -> bool {
        self.authenticator_flow == Some(true)
    }

    /// Requirement, `DISABLED` by default.
    #[must_use]
    pub fn requirement(&self) -> &str {
        self.requirement.as_deref().unwrap_or("DISABLED")
    }
}

//! Realm complexity analysis.
//!
//! A quick summary of a realm export used to size a migration before
//! generating anything: entity counts, detected features and a weighted
//! complexity score.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ForgeError, ForgeResult};
use crate::model::de::truthy;
use crate::model::{RealmSettings, BUILT_IN_THEMES, USER_STORAGE_PROVIDER};
use crate::plan::plan;
use crate::validate::{is_valid, realm_name};

const BASE_SCORE: u32 = 10;
const MAX_SCORE: u32 = 100;

/// Coarse complexity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplexityLevel {
    /// Score up to 25.
    Low,
    /// Score up to 50.
    Medium,
    /// Score up to 75.
    High,
    /// Anything above.
    VeryHigh,
}

impl ComplexityLevel {
    /// Buckets a score.
    #[must_use]
    pub const fn from_score(score: u32) -> Self {
        match score {
            0..=25 => Self::Low,
            26..=50 => Self::Medium,
            51..=75 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::VeryHigh => "VERY_HIGH",
        }
    }
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity counts of a realm export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCounts {
    /// Users.
    pub users: usize,
    /// Top-level groups.
    pub groups: usize,
    /// Clients.
    pub clients: usize,
    /// Client scopes.
    pub client_scopes: usize,
    /// Realm roles.
    pub realm_roles: usize,
    /// Client roles across all clients.
    pub client_roles: usize,
    /// Identity providers.
    pub identity_providers: usize,
    /// Authentication flows that are not built in.
    pub custom_flows: usize,
    /// User storage providers.
    pub user_federation: usize,
}

/// Analysis of one realm export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmAnalysis {
    /// Resolved realm name.
    pub realm: String,
    /// Weighted score, capped at 100.
    pub complexity_score: u32,
    /// Bucket of the score.
    pub complexity_level: ComplexityLevel,
    /// Entity counts.
    pub counts: ResourceCounts,
    /// Detected features.
    pub features: Vec<String>,
    /// Modules a conversion would emit.
    pub modules: Vec<String>,
}

fn list_len(value: Option<&Value>) -> usize {
    value.and_then(Value::as_array).map_or(0, Vec::len)
}

fn weighted(count: usize, weight: u32, cap: u32) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX).saturating_mul(weight).min(cap)
}

/// Counts the entities of a document.
#[must_use]
pub fn count_resources(doc: &Value) -> ResourceCounts {
    let roles = doc.get("roles");
    let client_roles = roles
        .and_then(|r| r.get("client"))
        .and_then(Value::as_object)
        .map_or(0, |clients| clients.values().map(|v| list_len(Some(v))).sum());
    let custom_flows = doc
        .get("authenticationFlows")
        .and_then(Value::as_array)
        .map_or(0, |flows| {
            flows
                .iter()
                .filter(|f| !f.get("builtIn").is_some_and(truthy))
                .count()
        });
    let user_federation = doc
        .get("components")
        .and_then(|c| c.get(USER_STORAGE_PROVIDER))
        .map_or(0, |v| list_len(Some(v)));

    ResourceCounts {
        users: list_len(doc.get("users")),
        groups: list_len(doc.get("groups")),
        clients: list_len(doc.get("clients")),
        client_scopes: list_len(doc.get("clientScopes")),
        realm_roles: list_len(roles.and_then(|r| r.get("realm"))),
        client_roles,
        identity_providers: list_len(doc.get("identityProviders")),
        custom_flows,
        user_federation,
    }
}

/// Weighted complexity score.
#[must_use]
pub fn complexity_score(counts: &ResourceCounts) -> u32 {
    let score = BASE_SCORE
        + weighted(counts.users, 2, 20)
        + weighted(counts.groups, 3, 15)
        + weighted(counts.clients, 5, 25)
        + weighted(counts.realm_roles, 2, 15);
    score.min(MAX_SCORE)
}

fn features(counts: &ResourceCounts, settings: &RealmSettings) -> Vec<String> {
    let mut features = Vec::new();
    let mut add = |cond: bool, name: &str| {
        if cond {
            features.push(name.to_string());
        }
    };
    add(counts.identity_providers > 0, "identity-brokering");
    add(counts.user_federation > 0, "user-federation");
    add(counts.custom_flows > 0, "custom-auth-flows");
    add(
        settings
            .themes()
            .iter()
            .any(|(_, theme)| !BUILT_IN_THEMES.contains(theme)),
        "custom-themes",
    );
    add(settings.smtp_host().is_some(), "smtp");
    add(settings.brute_force_protected == Some(true), "brute-force-protection");
    add(settings.password_policy.as_deref().is_some_and(|p| !p.is_empty()), "password-policy");
    add(settings.internationalization_enabled == Some(true), "internationalization");
    add(
        settings.events_enabled == Some(true) || settings.admin_events_enabled == Some(true),
        "events",
    );
    features
}

/// Analyzes a realm document.
///
/// # Errors
///
/// Returns [`ForgeError::InvalidDocument`] if `doc` is not a realm export.
pub fn analyze(doc: &Value, file_name: &str) -> ForgeResult<RealmAnalysis> {
    if !is_valid(doc) {
        return Err(ForgeError::InvalidDocument {
            file_name: file_name.to_string(),
        });
    }
    let settings = serde_json::from_value::<RealmSettings>(doc.clone()).unwrap_or_default();
    let counts = count_resources(doc);
    let score = complexity_score(&counts);
    Ok(RealmAnalysis {
        realm: realm_name(doc, file_name),
        complexity_score: score,
        complexity_level: ComplexityLevel::from_score(score),
        features: features(&counts, &settings),
        modules: plan(doc).iter().map(|m| m.slug().to_string()).collect(),
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_realm_is_low() {
        let analysis = analyze(&json!({"realm": "demo"}), "demo.json").unwrap();
        assert_eq!(analysis.complexity_score, 10);
        assert_eq!(analysis.complexity_level, ComplexityLevel::Low);
        assert!(analysis.features.is_empty());
        assert_eq!(analysis.modules, vec!["realm", "security_policies", "events"]);
    }

    #[test]
    fn weights_are_capped_per_category() {
        let counts = ResourceCounts {
            users: 100,
            groups: 100,
            clients: 100,
            realm_roles: 100,
            ..ResourceCounts::default()
        };
        assert_eq!(complexity_score(&counts), 85);
        assert_eq!(ComplexityLevel::from_score(85), ComplexityLevel::VeryHigh);

        let counts = ResourceCounts {
            users: 3,
            clients: 2,
            ..ResourceCounts::default()
        };
        assert_eq!(complexity_score(&counts), 26);
        assert_eq!(ComplexityLevel::from_score(26), ComplexityLevel::Medium);
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(ComplexityLevel::from_score(25), ComplexityLevel::Low);
        assert_eq!(ComplexityLevel::from_score(50), ComplexityLevel::Medium);
        assert_eq!(ComplexityLevel::from_score(75), ComplexityLevel::High);
        assert_eq!(ComplexityLevel::from_score(76), ComplexityLevel::VeryHigh);
        assert_eq!(ComplexityLevel::VeryHigh.to_string(), "VERY_HIGH");
    }

    #[test]
    fn counts_and_features() {
        let doc = json!({
            "realm": "demo",
            "users": [{}, {}],
            "roles": {"realm": [{}], "client": {"web": [{}, {}], "api": [{}]}},
            "authenticationFlows": [{"alias": "browser", "builtIn": true}, {"alias": "mine"}],
            "identityProviders": [{"alias": "google"}],
            "components": {"org.keycloak.storage.UserStorageProvider": [{"providerId": "ldap"}]},
            "loginTheme": "acme",
            "smtpServer": {"host": "mail"},
            "bruteForceProtected": true
        });
        let analysis = analyze(&doc, "demo.json").unwrap();
        assert_eq!(analysis.counts.users, 2);
        assert_eq!(analysis.counts.client_roles, 3);
        assert_eq!(analysis.counts.custom_flows, 1);
        assert_eq!(analysis.counts.user_federation, 1);
        assert_eq!(
            analysis.features,
            vec![
                "identity-brokering",
                "user-federation",
                "custom-auth-flows",
                "custom-themes",
                "smtp",
                "brute-force-protection"
            ]
        );
    }

    #[test]
    fn rejects_non_realm() {
        assert!(analyze(&json!({"users": []}), "x.json").is_err());
    }
}

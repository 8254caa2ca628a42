//! Identity providers and their mappers.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::de;

/// Config keys that map to dedicated provider attributes rather than `extra_config`.
pub const DEDICATED_CONFIG_KEYS: &[&str] = &[
    "authorizationUrl",
    "tokenUrl",
    "clientId",
    "clientSecret",
    "userInfoUrl",
    "logoutUrl",
    "issuer",
    "jwksUrl",
    "defaultScope",
    "validateSignature",
    "useJwksUrl",
    "singleSignOnServiceUrl",
    "singleLogoutServiceUrl",
    "entityId",
    "nameIDPolicyFormat",
    "principalType",
    "postBindingResponse",
    "postBindingAuthnRequest",
    "wantAuthnRequestsSigned",
    "signingCertificate",
];

/// Protocol family of an identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdpProtocol {
    /// OpenID Connect (including `keycloak-oidc` and social providers).
    Oidc,
    /// SAML 2.0.
    Saml,
}

/// An `identityProviders[]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentityProvider {
    /// Alias; entries without one are skipped.
    #[serde(deserialize_with = "de::opt_string")]
    pub alias: Option<String>,
    /// Display name.
    #[serde(deserialize_with = "de::opt_string")]
    pub display_name: Option<String>,
    /// Provider type id.
    #[serde(deserialize_with = "de::opt_string")]
    pub provider_id: Option<String>,
    /// Enabled flag.
    #[serde(deserialize_with = "de::opt_bool")]
    pub enabled: Option<bool>,
    /// Trust email.
    #[serde(deserialize_with = "de::opt_bool")]
    pub trust_email: Option<bool>,
    /// Store tokens.
    #[serde(deserialize_with = "de::opt_bool")]
    pub store_token: Option<bool>,
    /// Add read-token role on create.
    #[serde(deserialize_with = "de::opt_bool")]
    pub add_read_token_role_on_create: Option<bool>,
    /// Link only.
    #[serde(deserialize_with = "de::opt_bool")]
    pub link_only: Option<bool>,
    /// First login flow.
    #[serde(deserialize_with = "de::opt_string")]
    pub first_broker_login_flow_alias: Option<String>,
    /// Post login flow.
    #[serde(deserialize_with = "de::opt_string")]
    pub post_broker_login_flow_alias: Option<String>,
    /// Provider config.
    #[serde(deserialize_with = "de::string_map")]
    pub config: BTreeMap<String, String>,
}

impl IdentityProvider {
    /// Provider type id, `oidc` when absent.
    #[must_use]
    pub fn provider_id(&self) -> &str {
        self.provider_id.as_deref().unwrap_or("oidc")
    }

    /// Protocol family.
    #[must_use]
    pub fn protocol(&self) -> IdpProtocol {
        if self.provider_id() == "saml" {
            IdpProtocol::Saml
        } else {
            IdpProtocol::Oidc
        }
    }

    /// Enabled unless explicitly `false`.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled != Some(false)
    }

    /// First broker login flow alias.
    #[must_use]
    pub fn first_broker_login_flow_alias(&self) -> &str {
        self.first_broker_login_flow_alias
            .as_deref()
            .unwrap_or("first broker login")
    }

    /// Config value.
    #[must_use]
    pub fn config(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Config flag with a default for absent keys.
    #[must_use]
    pub fn config_flag(&self, key: &str, default: bool) -> bool {
        self.config(key).map_or(default, |v| v.eq_ignore_ascii_case("true"))
    }

    /// Config entries without a dedicated attribute.
    #[must_use]
    pub fn extra_config(&self) -> BTreeMap<String, String> {
        self.config
            .iter()
            .filter(|(k, _)| !DEDICATED_CONFIG_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// An `identityProviderMappers[]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentityProviderMapper {
    /// Mapper name.
    #[serde(deserialize_with = "de::opt_string")]
    pub name: Option<String>,
    /// Alias of the owning provider.
    #[serde(deserialize_with = "de::opt_string")]
    pub identity_provider_alias: Option<String>,
    /// Mapper type id.
    #[serde(deserialize_with = "de::opt_string")]
    pub identity_provider_mapper: Option<String>,
    /// Mapper config.
    #[serde(deserialize_with = "de::string_map")]
    pub config: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_and_extra_config() {
        let idp: IdentityProvider = serde_json::from_value(json!({
            "alias": "corp",
            "config": {
                "clientId": "kc",
                "authorizationUrl": "https://idp/auth",
                "prompt": "login",
                "syncMode": "IMPORT"
            }
        }))
        .unwrap();
        assert_eq!(idp.provider_id(), "oidc");
        assert_eq!(idp.protocol(), IdpProtocol::Oidc);
        assert!(idp.enabled());
        assert_eq!(idp.first_broker_login_flow_alias(), "first broker login");
        let extra = idp.extra_config();
        assert_eq!(extra.len(), 2);
        assert_eq!(extra["prompt"], "login");
        assert!(!extra.contains_key("clientId"));
    }

    #[test]
    fn saml_detection() {
        let idp: IdentityProvider =
            serde_json::from_value(json!({"alias": "adfs", "providerId": "saml"})).unwrap();
        assert_eq!(idp.protocol(), IdpProtocol::Saml);
    }
}

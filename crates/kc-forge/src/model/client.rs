//! Clients, client scopes and protocol mappers.

use std::collections::BTreeMap;

use serde::Deserialize;
use super::{de, NestedList};

/// OpenID Connect client access type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    /// No client secret.
    Public,
    /// Token verification only.
    BearerOnly,
    /// Authenticated with a secret.
    Confidential,
}

impl AccessType {
    /// Provider attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::BearerOnly => "BEARER-ONLY",
            Self::Confidential => "CONFIDENTIAL",
        }
    }
}

/// A `clients[]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Client {
    /// Client id; entries without one are skipped.
    #[serde(deserialize_with = "de::opt_string")]
    pub client_id: Option<String>,
    /// Display name.
    #[serde(deserialize_with = "de::opt_string")]
    pub name: Option<String>,
    /// Description.
    #[serde(deserialize_with = "de::opt_string")]
    pub description: Option<String>,
    /// Enabled flag.
    #[serde(deserialize_with = "de::opt_bool")]
    pub enabled: Option<bool>,
    /// `openid-connect` or `saml`.
    #[serde(deserialize_with = "de::opt_string")]
    pub protocol: Option<String>,
    /// Public client flag.
    #[serde(deserialize_with = "de::opt_bool")]
    pub public_client: Option<bool>,
    /// Bearer-only flag.
    #[serde(deserialize_with = "de::opt_bool")]
    pub bearer_only: Option<bool>,
    /// Authorization code flow.
    #[serde(deserialize_with = "de::opt_bool")]
    pub standard_flow_enabled: Option<bool>,
    /// Implicit flow.
    #[serde(deserialize_with = "de::opt_bool")]
    pub implicit_flow_enabled: Option<bool>,
    /// Resource owner password grant.
    #[serde(deserialize_with = "de::opt_bool")]
    pub direct_access_grants_enabled: Option<bool>,
    /// Client credentials grant.
    #[serde(deserialize_with = "de::opt_bool")]
    pub service_accounts_enabled: Option<bool>,
    /// Consent screen.
    #[serde(deserialize_with = "de::opt_bool")]
    pub consent_required: Option<bool>,
    /// Full scope.
    #[serde(deserialize_with = "de::opt_bool")]
    pub full_scope_allowed: Option<bool>,
    /// Front channel logout.
    #[serde(deserialize_with = "de::opt_bool")]
    pub frontchannel_logout: Option<bool>,
    /// Root URL.
    #[serde(deserialize_with = "de::opt_string")]
    pub root_url: Option<String>,
    /// Base URL.
    #[serde(deserialize_with = "de::opt_string")]
    pub base_url: Option<String>,
    /// Admin URL.
    #[serde(deserialize_with = "de::opt_string")]
    pub admin_url: Option<String>,
    /// Redirect URIs.
    #[serde(deserialize_with = "de::string_list")]
    pub redirect_uris: Vec<String>,
    /// Web origins.
    #[serde(deserialize_with = "de::string_list")]
    pub web_origins: Vec<String>,
    /// Client secret; only its presence is used.
    #[serde(deserialize_with = "de::opt_string")]
    pub secret: Option<String>,
    /// Default client scopes.
    #[serde(deserialize_with = "de::string_list")]
    pub default_client_scopes: Vec<String>,
    /// Optional client scopes.
    #[serde(deserialize_with = "de::string_list")]
    pub optional_client_scopes: Vec<String>,
    /// Free-form attributes.
    #[serde(deserialize_with = "de::string_map")]
    pub attributes: BTreeMap<String, String>,
    /// Raw protocol mapper entries.
    pub protocol_mappers: NestedList,
}

impl Client {
    /// Enabled unless explicitly `false`.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled != Some(false)
    }

    /// SAML clients use a separate resource type.
    #[must_use]
    pub fn is_saml(&self) -> bool {
        self.protocol.as_deref() == Some("saml")
    }

    /// Access type derived from the public and bearer-only flags.
    #[must_use]
    pub fn access_type(&self) -> AccessType {
        if self.public_client == Some(true) {
            AccessType::Public
        } else if self.bearer_only == Some(true) {
            AccessType::BearerOnly
        } else {
            AccessType::Confidential
        }
    }

    /// Authorization code flow, on by default.
    #[must_use]
    pub fn standard_flow_enabled(&self) -> bool {
        self.standard_flow_enabled != Some(false)
    }

    /// Implicit flow, off by default.
    #[must_use]
    pub fn implicit_flow_enabled(&self) -> bool {
        self.implicit_flow_enabled == Some(true)
    }

    /// Direct access grants, on by default.
    #[must_use]
    pub fn direct_access_grants_enabled(&self) -> bool {
        self.direct_access_grants_enabled != Some(false)
    }

    /// Service accounts, off by default.
    #[must_use]
    pub fn service_accounts_enabled(&self) -> bool {
        self.service_accounts_enabled == Some(true)
    }

    /// Consent screen, off by default.
    #[must_use]
    pub fn consent_required(&self) -> bool {
        self.consent_required == Some(true)
    }

    /// Full scope, on by default.
    #[must_use]
    pub fn full_scope_allowed(&self) -> bool {
        self.full_scope_allowed != Some(false)
    }

    /// Reads a `"true"`/`"false"` attribute.
    #[must_use]
    pub fn attribute_flag(&self, key: &str) -> Option<bool> {
        self.attributes.get(key).map(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// A `clientScopes[]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientScope {
    /// Scope name; entries without one are skipped.
    #[serde(deserialize_with = "de::opt_string")]
    pub name: Option<String>,
    /// Description.
    #[serde(deserialize_with = "de::opt_string")]
    pub description: Option<String>,
    /// Protocol.
    #[serde(deserialize_with = "de::opt_string")]
    pub protocol: Option<String>,
    /// Attributes such as `consent.screen.text`.
    #[serde(deserialize_with = "de::string_map")]
    pub attributes: BTreeMap<String, String>,
    /// Raw protocol mapper entries.
    pub protocol_mappers: NestedList,
}

impl ClientScope {
    /// SAML scopes have no dedicated resource in the emitted set.
    #[must_use]
    pub fn is_saml(&self) -> bool {
        self.protocol.as_deref() == Some("saml")
    }

    /// Consent screen text, if any.
    #[must_use]
    pub fn consent_screen_text(&self) -> Option<&str> {
        self.attributes.get("consent.screen.text").map(String::as_str)
    }

    /// Scope is listed in the token `scope` claim unless disabled.
    #[must_use]
    pub fn include_in_token_scope(&self) -> bool {
        self.attributes
            .get("include.in.token.scope")
            .is_none_or(|v| !v.eq_ignore_ascii_case("false"))
    }

    /// Display order in the consent screen.
    #[must_use]
    pub fn gui_order(&self) -> Option<i64> {
        self.attributes.get("gui.order").and_then(|v| v.parse().ok())
    }
}

/// Protocol mapper kinds with a dedicated provider resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperKind {
    /// `oidc-usermodel-attribute-mapper`.
    UserAttribute,
    /// `oidc-usermodel-property-mapper`.
    UserProperty,
    /// `oidc-group-membership-mapper`.
    GroupMembership,
    /// `oidc-audience-mapper`.
    Audience,
    /// `oidc-hardcoded-claim-mapper`.
    HardcodedClaim,
    /// `oidc-full-name-mapper`.
    FullName,
    /// `oidc-usermodel-realm-role-mapper`.
    RealmRole,
    /// `oidc-usermodel-client-role-mapper`.
    ClientRole,
}

impl MapperKind {
    /// Resolves a mapper type id; unrecognized ids yield `None`.
    #[must_use]
    pub fn from_type(mapper_type: &str) -> Option<Self> {
        Some(match mapper_type {
            "oidc-usermodel-attribute-mapper" => Self::UserAttribute,
            "oidc-usermodel-property-mapper" => Self::UserProperty,
            "oidc-group-membership-mapper" => Self::GroupMembership,
            "oidc-audience-mapper" => Self::Audience,
            "oidc-hardcoded-claim-mapper" => Self::HardcodedClaim,
            "oidc-full-name-mapper" => Self::FullName,
            "oidc-usermodel-realm-role-mapper" => Self::RealmRole,
            "oidc-usermodel-client-role-mapper" => Self::ClientRole,
            _ => return None,
        })
    }

    /// Provider resource type.
    #[must_use]
    pub const fn resource_type(self) -> &'static str {
        match self {
            Self::UserAttribute => "keycloak_openid_user_attribute_protocol_mapper",
            Self::UserProperty => "keycloak_openid_user_property_protocol_mapper",
            Self::GroupMembership => "keycloak_openid_group_membership_protocol_mapper",
            Self::Audience => "keycloak_openid_audience_protocol_mapper",
            Self::HardcodedClaim => "keycloak_openid_hardcoded_claim_protocol_mapper",
            Self::FullName => "keycloak_openid_full_name_protocol_mapper",
            Self::RealmRole => "keycloak_openid_user_realm_role_protocol_mapper",
            Self::ClientRole => "keycloak_openid_user_client_role_protocol_mapper",
        }
    }
}

/// A protocol mapper attached to a client or client scope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProtocolMapper {
    /// Mapper name.
    #[serde(deserialize_with = "de::opt_string")]
    pub name: Option<String>,
    /// Protocol.
    #[serde(deserialize_with = "de::opt_string")]
    pub protocol: Option<String>,
    /// Mapper type id.
    #[serde(deserialize_with = "de::opt_string")]
    pub protocol_mapper: Option<String>,
    /// Mapper configuration.
    #[serde(deserialize_with = "de::string_map")]
    pub config: BTreeMap<String, String>,
}

impl ProtocolMapper {
    /// Recognized kind, if any.
    #[must_use]
    pub fn kind(&self) -> Option<MapperKind> {
        self.protocol_mapper.as_deref().and_then(MapperKind::from_type)
    }

    /// Config string value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Config flag with a default for absent keys.
    #[must_use]
    pub fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key).map_or(default, |v| v.eq_ignore_ascii_case("true"))
    }
}

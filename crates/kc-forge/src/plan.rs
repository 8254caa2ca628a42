//! Module planning.
//!
//! A single table describes every module: its slug, the condition on the
//! raw document that makes it applicable, the outputs its definition file
//! exposes, and the emitter that writes it. Planning is a filter over that
//! table, so output order is the table order.

use serde_json::Value;

use crate::emit::{self, EmitContext};
use crate::error::ForgeResult;
use crate::model::de::truthy;
use crate::model::non_empty_list;

/// Emits a module's resource definition file.
pub type EmitFn = fn(&mut EmitContext<'_>) -> ForgeResult<String>;

/// Module kinds, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModuleKind {
    /// Realm core.
    Realm,
    /// Users.
    Users,
    /// Clients.
    Clients,
    /// Client scopes.
    ClientScopes,
    /// Realm and client roles.
    Roles,
    /// Groups.
    Groups,
    /// Role scope mappings of clients and client scopes.
    ScopeMappings,
    /// Identity providers.
    IdentityProviders,
    /// Authentication flows.
    AuthFlows,
    /// User federation.
    UserFederation,
    /// Themes.
    Themes,
    /// Security policies.
    SecurityPolicies,
    /// Events.
    Events,
    /// Required actions.
    RequiredActions,
    /// Required credentials.
    RequiredCredentials,
}

impl ModuleKind {
    /// Directory name of the module.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Realm => "realm",
            Self::Users => "users",
            Self::Clients => "clients",
            Self::ClientScopes => "client_scopes",
            Self::Roles => "roles",
            Self::Groups => "groups",
            Self::ScopeMappings => "scope_mappings",
            Self::IdentityProviders => "identity_providers",
            Self::AuthFlows => "auth_flows",
            Self::UserFederation => "user_federation",
            Self::Themes => "themes",
            Self::SecurityPolicies => "security_policies",
            Self::Events => "events",
            Self::RequiredActions => "required_actions",
            Self::RequiredCredentials => "required_credentials",
        }
    }

    /// Resolves a slug.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        MODULES.iter().map(|m| m.kind).find(|k| k.slug() == slug)
    }
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Condition under which a module is planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Always planned.
    Always,
    /// The key holds a non-empty list.
    NonEmptyList(&'static str),
    /// The key holds a non-empty object.
    NonEmptyMap(&'static str),
    /// `roles.realm` or `roles.client` is truthy.
    Roles,
    /// Any of the keys is present and not null.
    AnyPresent(&'static [&'static str]),
    /// `scopeMappings` is a non-empty list or `clientScopeMappings` a non-empty object.
    ScopeMappings,
}

impl Trigger {
    /// Evaluates the trigger against a document.
    #[must_use]
    pub fn holds(self, doc: &Value) -> bool {
        match self {
            Self::Always => true,
            Self::NonEmptyList(key) => non_empty_list(doc, key).is_some(),
            Self::NonEmptyMap(key) => doc
                .get(key)
                .and_then(Value::as_object)
                .is_some_and(|m| !m.is_empty()),
            Self::Roles => doc.get("roles").is_some_and(|roles| {
                roles.get("realm").is_some_and(truthy) || roles.get("client").is_some_and(truthy)
            }),
            Self::AnyPresent(keys) => keys
                .iter()
                .any(|key| doc.get(key).is_some_and(|v| !v.is_null())),
            Self::ScopeMappings => {
                Self::NonEmptyList("scopeMappings").holds(doc)
                    || Self::NonEmptyMap("clientScopeMappings").holds(doc)
            }
        }
    }
}

/// One row of the module table.
pub struct ModuleDescriptor {
    /// Kind.
    pub kind: ModuleKind,
    /// Planning condition.
    pub trigger: Trigger,
    /// Outputs exposed by the definition file.
    pub outputs: &'static [&'static str],
    /// Definition emitter.
    pub emit: EmitFn,
}

impl std::fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("kind", &self.kind)
            .field("trigger", &self.trigger)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

impl ModuleDescriptor {
    /// Directory name of the module.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        self.kind.slug()
    }
}

/// Every module, in emission order.
pub static MODULES: [ModuleDescriptor; 15] = [
    ModuleDescriptor {
        kind: ModuleKind::Realm,
        trigger: Trigger::Always,
        outputs: &["realm_id", "realm_name"],
        emit: emit::realm::emit,
    },
    ModuleDescriptor {
        kind: ModuleKind::Users,
        trigger: Trigger::NonEmptyList("users"),
        outputs: &["user_ids"],
        emit: emit::users::emit,
    },
    ModuleDescriptor {
        kind: ModuleKind::Clients,
        trigger: Trigger::NonEmptyList("clients"),
        outputs: &["client_ids"],
        emit: emit::clients::emit,
    },
    ModuleDescriptor {
        kind: ModuleKind::ClientScopes,
        trigger: Trigger::NonEmptyList("clientScopes"),
        outputs: &["client_scope_ids"],
        emit: emit::client_scopes::emit,
    },
    ModuleDescriptor {
        kind: ModuleKind::Roles,
        trigger: Trigger::Roles,
        outputs: &["role_ids"],
        emit: emit::roles::emit,
    },
    ModuleDescriptor {
        kind: ModuleKind::Groups,
        trigger: Trigger::NonEmptyList("groups"),
        outputs: &["group_ids"],
        emit: emit::groups::emit,
    },
    ModuleDescriptor {
        kind: ModuleKind::ScopeMappings,
        trigger: Trigger::ScopeMappings,
        outputs: &["scope_mapping_ids"],
        emit: emit::scope_mappings::emit,
    },
    ModuleDescriptor {
        kind: ModuleKind::IdentityProviders,
        trigger: Trigger::NonEmptyList("identityProviders"),
        outputs: &["identity_provider_aliases"],
        emit: emit::identity_providers::emit,
    },
    ModuleDescriptor {
        kind: ModuleKind::AuthFlows,
        trigger: Trigger::NonEmptyList("authenticationFlows"),
        outputs: &["flow_ids"],
        emit: emit::auth_flows::emit,
    },
    ModuleDescriptor {
        kind: ModuleKind::UserFederation,
        trigger: Trigger::NonEmptyMap("components"),
        outputs: &["federation_ids"],
        emit: emit::federation::emit,
    },
    ModuleDescriptor {
        kind: ModuleKind::Themes,
        trigger: Trigger::AnyPresent(&["loginTheme", "accountTheme", "adminTheme", "emailTheme"]),
        outputs: &["themes"],
        emit: emit::themes::emit,
    },
    ModuleDescriptor {
        kind: ModuleKind::SecurityPolicies,
        trigger: Trigger::Always,
        outputs: &["brute_force", "password_policy", "otp_policy", "security_headers"],
        emit: emit::security::emit,
    },
    ModuleDescriptor {
        kind: ModuleKind::Events,
        trigger: Trigger::Always,
        outputs: &["events_enabled"],
        emit: emit::events::emit,
    },
    ModuleDescriptor {
        kind: ModuleKind::RequiredActions,
        trigger: Trigger::NonEmptyList("requiredActions"),
        outputs: &["required_action_aliases"],
        emit: emit::required_actions::emit,
    },
    ModuleDescriptor {
        kind: ModuleKind::RequiredCredentials,
        trigger: Trigger::NonEmptyList("requiredCredentials"),
        outputs: &["required_actions"],
        emit: emit::required_credentials::emit,
    },
];

/// Returns the modules applicable to a document, in emission order.
#[must_use]
pub fn plan(doc: &Value) -> Vec<&'static ModuleDescriptor> {
    MODULES.iter().filter(|m| m.trigger.holds(doc)).collect()
}

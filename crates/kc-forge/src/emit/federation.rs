//! User federation module.
//!
//! LDAP providers always get the same four attribute mappers (username,
//! first name, last name, email); mapper sub-components in the export are
//! not read. Other user storage providers become custom federations.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{id_ref, map_output, name_or_fallback, preamble, sensitive_variable, EmitContext};
use crate::document::{reference, resource, string_map, strings, var, BlockBuilderExt, Document};
use crate::error::ForgeResult;
use crate::model::{Component, USER_STORAGE_PROVIDER};
use crate::naming::LabelAllocator;

const LDAP: &str = "keycloak_ldap_user_federation";
const CUSTOM: &str = "keycloak_custom_user_federation";

/// Config keys an LDAP provider cannot be declared without.
const LDAP_REQUIRED: [&str; 2] = ["connectionUrl", "usersDn"];

/// The fixed LDAP attribute mappers as `(name, user model attribute, default LDAP attribute)`.
///
/// The username mapper's LDAP attribute follows the provider's `usernameLDAPAttribute`.
pub const LDAP_MAPPERS: [(&str, &str, &str); 4] = [
    ("username", "username", "uid"),
    ("first name", "firstName", "cn"),
    ("last name", "lastName", "sn"),
    ("email", "email", "mail"),
];

/// Emits federation providers found under the user storage component type.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let mut doc = Document::new();
    preamble(&mut doc, ctx, "Module: user_federation");

    let section = format!("components.{USER_STORAGE_PROVIDER}");
    let providers: &[Value] = match ctx.doc().get("components").and_then(|c| c.get(USER_STORAGE_PROVIDER)) {
        Some(Value::Array(list)) => list,
        Some(_) => {
            ctx.malformed(&section, "user storage providers are not a list");
            &[]
        }
        None => &[],
    };
    if providers.is_empty() {
        doc.blank();
        doc.comment("The export defines components but no user storage providers.");
    }

    let mut labels = LabelAllocator::new();
    let mut ids = BTreeMap::new();
    for (index, component) in ctx.entries::<Component>(&section, providers) {
        let subject = format!("{section}[{index}]");
        let Some(provider_id) = component.provider_id.as_deref() else {
            ctx.skip(&subject, "missing `providerId`");
            continue;
        };
        let name = name_or_fallback(component.name.as_deref(), "federation", index);
        let resource_type = if component.is_ldap() {
            if let Some(key) = LDAP_REQUIRED
                .iter()
                .find(|key| component.config(key).map_or(true, str::is_empty))
            {
                ctx.skip(&subject, format!("missing `{key}`"));
                continue;
            }
            LDAP
        } else {
            CUSTOM
        };
        let label = labels.claim(&name);
        if resource_type == LDAP {
            ldap(&mut doc, &mut labels, &component, &name, &label);
        } else {
            ctx.unsupported(&subject, format!("provider `{provider_id}` emitted as a custom federation"));
            custom(&mut doc, &component, provider_id, &name, &label);
        }
        ids.entry(name).or_insert_with(|| id_ref(resource_type, &label));
    }

    map_output(&mut doc, "federation_ids", "User federation IDs keyed by name", &ids);
    doc.render()
}

fn search_scope(raw: Option<&str>) -> &'static str {
    match raw {
        Some("2") => "SUBTREE",
        _ => "ONE_LEVEL",
    }
}

fn ldap(doc: &mut Document, labels: &mut LabelAllocator, component: &Component, name: &str, label: &str) {
    let username_attr = component.config_or("usernameLDAPAttribute", "uid");
    let bind_dn = component.config("bindDn").filter(|dn| !dn.is_empty());
    let credential_var = format!("ldap_{label}_bind_credential");
    if bind_dn.is_some() {
        sensitive_variable(doc, &credential_var, &format!("Bind credential for LDAP provider {name}"));
    }
    let object_classes = component
        .config_or("userObjectClasses", "inetOrgPerson, organizationalPerson")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let edit_mode = component.config_or("editMode", "READ_ONLY");

    doc.blank();
    doc.block(
        resource(LDAP, label)
            .add_attribute(("realm_id", var("realm_id")))
            .add_attribute(("name", name))
            .add_attribute(("enabled", component.config_flag("enabled", true)))
            .add_attribute(("vendor", component.config_or("vendor", "other").to_uppercase()))
            .add_attribute(("connection_url", component.config_or("connectionUrl", "")))
            .add_attribute(("users_dn", component.config_or("usersDn", "")))
            .opt_attribute("bind_dn", bind_dn)
            .opt_attribute("bind_credential", bind_dn.map(|_| var(&credential_var)))
            .add_attribute(("search_scope", search_scope(component.config("searchScope"))))
            .opt_attribute("custom_user_search_filter", component.config("customUserSearchFilter"))
            .add_attribute(("username_ldap_attribute", username_attr))
            .add_attribute(("rdn_ldap_attribute", component.config_or("rdnLDAPAttribute", username_attr)))
            .add_attribute(("uuid_ldap_attribute", component.config_or("uuidLDAPAttribute", "entryUUID")))
            .add_attribute(("user_object_classes", strings(object_classes)))
            .add_attribute(("edit_mode", edit_mode))
            .add_attribute(("import_enabled", component.config_flag("importEnabled", true)))
            .add_attribute(("sync_registrations", component.config_flag("syncRegistrations", false)))
            .add_attribute(("trust_email", component.config_flag("trustEmail", false)))
            .add_attribute(("pagination", component.config_flag("pagination", true)))
            .opt_attribute("batch_size_for_sync", component.config_i64("batchSizeForSync"))
            .opt_attribute("full_sync_period", component.config_i64("fullSyncPeriod"))
            .opt_attribute("changed_sync_period", component.config_i64("changedSyncPeriod"))
            .build(),
    );

    let federation_id = id_ref(LDAP, label);
    for (mapper_name, model_attr, ldap_attr) in LDAP_MAPPERS {
        let ldap_attr = if model_attr == "username" { username_attr } else { ldap_attr };
        let mapper_label = labels.claim(&format!("{label}_{mapper_name}"));
        doc.blank();
        doc.block(
            resource("keycloak_ldap_user_attribute_mapper", &mapper_label)
                .add_attribute(("realm_id", var("realm_id")))
                .add_attribute(("ldap_user_federation_id", reference(&federation_id)))
                .add_attribute(("name", mapper_name))
                .add_attribute(("user_model_attribute", model_attr))
                .add_attribute(("ldap_attribute", ldap_attr))
                .add_attribute(("read_only", edit_mode != "WRITABLE"))
                .add_attribute(("always_read_value_from_ldap", model_attr != "username"))
                .build(),
        );
    }
}

fn custom(doc: &mut Document, component: &Component, provider_id: &str, name: &str, label: &str) {
    let config: BTreeMap<String, String> = component
        .config
        .iter()
        .filter(|(k, _)| k.as_str() != "enabled")
        .filter_map(|(k, v)| v.first().map(|first| (k.clone(), first.clone())))
        .collect();
    doc.blank();
    doc.block(
        resource(CUSTOM, label)
            .add_attribute(("realm_id", var("realm_id")))
            .add_attribute(("name", name))
            .add_attribute(("provider_id", provider_id))
            .add_attribute(("enabled", component.config_flag("enabled", true)))
            .opt_attribute("config", (!config.is_empty()).then(|| string_map(config)))
            .build(),
    );
}

//! Clients module: OpenID Connect and SAML clients with their protocol mappers.

use std::collections::BTreeMap;

use super::mappers::{emit_mappers, MapperOwner};
use super::{id_ref, map_output, preamble, sensitive_variable, EmitContext};
use crate::document::{reference, resource, strings, var, BlockBuilderExt, Document};
use crate::error::ForgeResult;
use crate::model::{AccessType, Client};
use crate::naming::LabelAllocator;

const OPENID_CLIENT: &str = "keycloak_openid_client";
const SAML_CLIENT: &str = "keycloak_saml_client";

/// Emits one client resource per entry with its mappers and scope assignments.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let mut doc = Document::new();
    preamble(&mut doc, ctx, "Module: clients");

    let mut labels = LabelAllocator::new();
    let mut ids = BTreeMap::new();
    for (index, client) in ctx.section::<Client>("clients") {
        let subject = format!("clients[{index}]");
        let Some(client_id) =
            ctx.identifier(&subject, "clientId", client.client_id.as_deref(), "client", index)
        else {
            continue;
        };
        let label = labels.claim(&client_id);

        let resource_type = if client.is_saml() {
            saml_client(&mut doc, &client, &client_id, &label);
            SAML_CLIENT
        } else {
            openid_client(&mut doc, &client, &client_id, &label);
            OPENID_CLIENT
        };
        let owner = MapperOwner {
            attr: "client_id",
            id_expr: id_ref(resource_type, &label),
            label: &label,
        };
        emit_mappers(
            &mut doc,
            ctx,
            &mut labels,
            &owner,
            &format!("{subject}.protocolMappers"),
            &client.protocol_mappers,
        );
        if !client.is_saml() {
            scope_assignments(&mut doc, &mut labels, &client, &label);
        }
        ids.entry(client_id).or_insert_with(|| id_ref(resource_type, &label));
    }

    map_output(&mut doc, "client_ids", "Client IDs keyed by client_id", &ids);
    doc.render()
}

fn openid_client(doc: &mut Document, client: &Client, client_id: &str, label: &str) {
    let access_type = client.access_type();
    let secret_var = (access_type == AccessType::Confidential && client.secret.is_some())
        .then(|| format!("client_secret_{label}"));
    if let Some(name) = &secret_var {
        sensitive_variable(doc, name, &format!("Secret of client {client_id}"));
    }

    let post_logout = client
        .attributes
        .get("post.logout.redirect.uris")
        .map(|uris| strings(uris.split("##").filter(|s| !s.is_empty())));

    doc.blank();
    doc.block(
        resource(OPENID_CLIENT, label)
            .add_attribute(("realm_id", var("realm_id")))
            .add_attribute(("client_id", client_id))
            .opt_attribute("name", client.name.as_deref())
            .opt_attribute("description", client.description.as_deref())
            .add_attribute(("enabled", client.enabled()))
            .add_attribute(("access_type", access_type.as_str()))
            .add_attribute(("standard_flow_enabled", client.standard_flow_enabled()))
            .add_attribute(("implicit_flow_enabled", client.implicit_flow_enabled()))
            .add_attribute(("direct_access_grants_enabled", client.direct_access_grants_enabled()))
            .add_attribute(("service_accounts_enabled", client.service_accounts_enabled()))
            .add_attribute(("consent_required", client.consent_required()))
            .add_attribute(("full_scope_allowed", client.full_scope_allowed()))
            .opt_attribute("client_secret", secret_var.as_deref().map(var))
            .opt_attribute("root_url", client.root_url.as_deref())
            .opt_attribute("base_url", client.base_url.as_deref())
            .opt_attribute("admin_url", client.admin_url.as_deref())
            .add_attribute(("valid_redirect_uris", strings(client.redirect_uris.clone())))
            .add_attribute(("web_origins", strings(client.web_origins.clone())))
            .opt_attribute("valid_post_logout_redirect_uris", post_logout)
            .opt_attribute(
                "pkce_code_challenge_method",
                client.attributes.get("pkce.code.challenge.method").map(String::as_str),
            )
            .opt_attribute("frontchannel_logout_enabled", client.frontchannel_logout)
            .build(),
    );
}

fn saml_client(doc: &mut Document, client: &Client, client_id: &str, label: &str) {
    doc.blank();
    doc.block(
        resource(SAML_CLIENT, label)
            .add_attribute(("realm_id", var("realm_id")))
            .add_attribute(("client_id", client_id))
            .opt_attribute("name", client.name.as_deref())
            .opt_attribute("description", client.description.as_deref())
            .add_attribute(("enabled", client.enabled()))
            .add_attribute((
                "sign_documents",
                client.attribute_flag("saml.server.signature").unwrap_or(true),
            ))
            .add_attribute((
                "sign_assertions",
                client.attribute_flag("saml.assertion.signature").unwrap_or(false),
            ))
            .add_attribute((
                "include_authn_statement",
                client.attribute_flag("saml.authnstatement").unwrap_or(true),
            ))
            .add_attribute((
                "force_post_binding",
                client.attribute_flag("saml.force.post.binding").unwrap_or(true),
            ))
            .add_attribute((
                "client_signature_required",
                client.attribute_flag("saml.client.signature").unwrap_or(true),
            ))
            .add_attribute((
                "name_id_format",
                client.attributes.get("saml_name_id_format").map_or("username", String::as_str),
            ))
            .opt_attribute("root_url", client.root_url.as_deref())
            .opt_attribute("base_url", client.base_url.as_deref())
            .opt_attribute("master_saml_processing_url", client.admin_url.as_deref())
            .add_attribute(("valid_redirect_uris", strings(client.redirect_uris.clone())))
            .build(),
    );
}

fn scope_assignments(doc: &mut Document, labels: &mut LabelAllocator, client: &Client, label: &str) {
    let client_ref = id_ref(OPENID_CLIENT, label);
    for (kind, scopes) in [
        ("default", &client.default_client_scopes),
        ("optional", &client.optional_client_scopes),
    ] {
        if scopes.is_empty() {
            continue;
        }
        let scopes_label = labels.claim(&format!("{label}_{kind}_scopes"));
        doc.blank();
        doc.block(
            resource(&format!("keycloak_openid_client_{kind}_scopes"), &scopes_label)
                .add_attribute(("realm_id", var("realm_id")))
                .add_attribute(("client_id", reference(&client_ref)))
                .add_attribute((format!("{kind}_scopes"), strings(scopes.clone())))
                .build(),
        );
    }
}

//! Identity providers module, including provider mappers.

use std::collections::BTreeMap;

use hcl::structure::BlockBuilder;
use hcl::expr::Expression;

use super::{map_output, name_or_fallback, preamble, sensitive_variable, EmitContext};
use crate::document::{reference, resource, string_map, var, BlockBuilderExt, Document};
use crate::error::ForgeResult;
use crate::model::{IdentityProvider, IdentityProviderMapper, IdpProtocol};
use crate::naming::LabelAllocator;

const OIDC_REQUIRED: [&str; 3] = ["authorizationUrl", "tokenUrl", "clientId"];
const SAML_REQUIRED: [&str; 2] = ["entityId", "singleSignOnServiceUrl"];

/// Emits one identity provider resource per entry, then the provider mappers.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let mut doc = Document::new();
    preamble(&mut doc, ctx, "Module: identity_providers");

    let mut labels = LabelAllocator::new();
    // alias -> (resource type, label)
    let mut declared: BTreeMap<String, (&'static str, String)> = BTreeMap::new();

    for (index, idp) in ctx.section::<IdentityProvider>("identityProviders") {
        let subject = format!("identityProviders[{index}]");
        let Some(alias) = ctx.identifier(&subject, "alias", idp.alias.as_deref(), "identity_provider", index)
        else {
            continue;
        };
        let protocol = idp.protocol();
        let required: &[&str] = match protocol {
            IdpProtocol::Oidc => &OIDC_REQUIRED,
            IdpProtocol::Saml => &SAML_REQUIRED,
        };
        if let Some(key) = required.iter().find(|key| idp.config(key).map_or(true, str::is_empty)) {
            ctx.skip(&subject, format!("missing `{key}`"));
            continue;
        }
        let label = labels.claim(&alias);
        let resource_type = match protocol {
            IdpProtocol::Oidc => {
                oidc_provider(&mut doc, &idp, &alias, &label);
                "keycloak_oidc_identity_provider"
            }
            IdpProtocol::Saml => {
                saml_provider(&mut doc, &idp, &alias, &label);
                "keycloak_saml_identity_provider"
            }
        };
        declared.entry(alias).or_insert((resource_type, label));
    }

    for (index, mapper) in ctx.section::<IdentityProviderMapper>("identityProviderMappers") {
        let subject = format!("identityProviderMappers[{index}]");
        let Some(idp_alias) = mapper.identity_provider_alias.as_deref() else {
            ctx.skip(&subject, "missing `identityProviderAlias`");
            continue;
        };
        let Some(mapper_type) = mapper.identity_provider_mapper.as_deref() else {
            ctx.skip(&subject, "missing `identityProviderMapper`");
            continue;
        };
        let name = name_or_fallback(mapper.name.as_deref(), "mapper", index);
        let label = labels.claim(&format!("{idp_alias}_{name}"));
        let alias_expr = match declared.get(idp_alias) {
            Some((resource_type, idp_label)) => reference(&format!("{resource_type}.{idp_label}.alias")),
            None => {
                ctx.unresolved(&subject, format!("mapper `{name}` targets undeclared provider `{idp_alias}`"));
                Expression::String(idp_alias.to_string())
            }
        };
        doc.blank();
        doc.block(
            resource("keycloak_custom_identity_provider_mapper", &label)
                .add_attribute(("realm", var("realm_id")))
                .add_attribute(("name", name.as_str()))
                .add_attribute(("identity_provider_alias", alias_expr))
                .add_attribute(("identity_provider_mapper", mapper_type))
                .opt_attribute(
                    "extra_config",
                    (!mapper.config.is_empty()).then(|| string_map(mapper.config.clone())),
                )
                .build(),
        );
    }

    let aliases = declared
        .iter()
        .map(|(alias, (resource_type, label))| (alias.clone(), format!("{resource_type}.{label}.alias")))
        .collect();
    map_output(&mut doc, "identity_provider_aliases", "Identity provider aliases", &aliases);
    doc.render()
}

fn common_attrs(block: BlockBuilder, idp: &IdentityProvider, alias: &str) -> BlockBuilder {
    block
        .add_attribute(("realm", var("realm_id")))
        .add_attribute(("alias", alias))
        .opt_attribute("display_name", idp.display_name.as_deref())
        .add_attribute(("enabled", idp.enabled()))
        .add_attribute(("trust_email", idp.trust_email == Some(true)))
        .add_attribute(("store_token", idp.store_token == Some(true)))
        .add_attribute(("link_only", idp.link_only == Some(true)))
        .add_attribute(("first_broker_login_flow_alias", idp.first_broker_login_flow_alias()))
        .opt_attribute("post_broker_login_flow_alias", idp.post_broker_login_flow_alias.as_deref())
}

fn extra_config(block: BlockBuilder, idp: &IdentityProvider) -> BlockBuilder {
    let extra = idp.extra_config();
    block.opt_attribute("extra_config", (!extra.is_empty()).then(|| string_map(extra)))
}

fn oidc_provider(doc: &mut Document, idp: &IdentityProvider, alias: &str, label: &str) {
    let secret_var = format!("idp_{label}_client_secret");
    sensitive_variable(doc, &secret_var, &format!("Client secret for identity provider {alias}"));
    let provider_id = Some(idp.provider_id()).filter(|id| *id != "oidc");
    let block = common_attrs(resource("keycloak_oidc_identity_provider", label), idp, alias)
        .opt_attribute("provider_id", provider_id)
        .add_attribute(("add_read_token_role_on_create", idp.add_read_token_role_on_create == Some(true)))
        .add_attribute(("authorization_url", idp.config("authorizationUrl").unwrap_or_default()))
        .add_attribute(("token_url", idp.config("tokenUrl").unwrap_or_default()))
        .add_attribute(("client_id", idp.config("clientId").unwrap_or_default()))
        .add_attribute(("client_secret", var(&secret_var)))
        .opt_attribute("user_info_url", idp.config("userInfoUrl"))
        .opt_attribute("logout_url", idp.config("logoutUrl"))
        .opt_attribute("issuer", idp.config("issuer"))
        .opt_attribute("jwks_url", idp.config("jwksUrl"))
        .opt_attribute("default_scopes", idp.config("defaultScope"))
        .add_attribute(("validate_signature", idp.config_flag("validateSignature", false)));
    doc.blank();
    doc.block(extra_config(block, idp).build());
}

fn saml_provider(doc: &mut Document, idp: &IdentityProvider, alias: &str, label: &str) {
    let block = common_attrs(resource("keycloak_saml_identity_provider", label), idp, alias)
        .add_attribute(("entity_id", idp.config("entityId").unwrap_or_default()))
        .add_attribute((
            "single_sign_on_service_url",
            idp.config("singleSignOnServiceUrl").unwrap_or_default(),
        ))
        .opt_attribute("single_logout_service_url", idp.config("singleLogoutServiceUrl"))
        .opt_attribute("name_id_policy_format", idp.config("nameIDPolicyFormat"))
        .opt_attribute("principal_type", idp.config("principalType"))
        .add_attribute(("post_binding_response", idp.config_flag("postBindingResponse", false)))
        .add_attribute(("post_binding_authn_request", idp.config_flag("postBindingAuthnRequest", false)))
        .add_attribute(("want_authn_requests_signed", idp.config_flag("wantAuthnRequestsSigned", false)))
        .add_attribute(("validate_signature", idp.config_flag("validateSignature", false)))
        .opt_attribute("signing_certificate", idp.config("signingCertificate"));
    doc.blank();
    doc.block(extra_config(block, idp).build());
}

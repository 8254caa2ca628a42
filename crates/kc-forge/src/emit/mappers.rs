//! Protocol mapper blocks shared by clients and client scopes.
//!
//! Recognized mapper kinds get their dedicated resource. Anything else is
//! written as a fully commented-out `keycloak_generic_protocol_mapper` so the
//! configuration is preserved for review without declaring a resource.

use hcl::structure::BlockBuilder;

use super::{name_or_fallback, EmitContext};
use crate::document::{reference, resource, string_map, var, BlockBuilderExt, Document};
use crate::model::{MapperKind, NestedList, ProtocolMapper};
use crate::naming::LabelAllocator;

/// The resource a set of mappers attaches to.
pub(crate) struct MapperOwner<'a> {
    /// `client_id` or `client_scope_id`.
    pub attr: &'static str,
    /// Reference resolving to the owner's ID.
    pub id_expr: String,
    /// Owner's resource label, used to prefix mapper labels.
    pub label: &'a str,
}

/// Emits every mapper in `raw`; returns how many resources were declared.
pub(crate) fn emit_mappers(
    doc: &mut Document,
    ctx: &mut EmitContext<'_>,
    labels: &mut LabelAllocator,
    owner: &MapperOwner<'_>,
    section: &str,
    raw: &NestedList,
) -> usize {
    let mut declared = 0;
    let raw = ctx.nested(section, raw);
    for (index, mapper) in ctx.entries::<ProtocolMapper>(section, raw) {
        let name = name_or_fallback(mapper.name.as_deref(), "mapper", index);
        let label = labels.claim(&format!("{}_{name}", owner.label));
        doc.blank();
        match supported(&mapper) {
            Some(kind) => {
                let block = resource(kind.resource_type(), &label)
                    .add_attribute(("realm_id", var("realm_id")))
                    .add_attribute((owner.attr, reference(&owner.id_expr)))
                    .add_attribute(("name", name.as_str()));
                doc.block(mapper_fields(block, kind, &mapper, &name).build());
                declared += 1;
            }
            None => {
                let mapper_type = mapper.protocol_mapper.clone().unwrap_or_default();
                ctx.unsupported(
                    format!("{section}[{index}]"),
                    format!("protocol mapper `{name}` of type `{mapper_type}` has no dedicated resource"),
                );
                doc.comment(&format!(
                    "Protocol mapper type \"{mapper_type}\" is not mapped to a dedicated resource.\nReview and enable manually."
                ));
                doc.commented_out(
                    resource("keycloak_generic_protocol_mapper", &label)
                        .add_attribute(("realm_id", var("realm_id")))
                        .add_attribute((owner.attr, reference(&owner.id_expr)))
                        .add_attribute(("name", name.as_str()))
                        .add_attribute(("protocol", mapper.protocol.as_deref().unwrap_or("openid-connect")))
                        .add_attribute(("protocol_mapper", mapper_type.as_str()))
                        .add_attribute(("config", string_map(mapper.config.clone())))
                        .build(),
                );
            }
        }
    }
    declared
}

/// Kind with a dedicated resource, provided the mapper carries what that resource needs.
fn supported(mapper: &ProtocolMapper) -> Option<MapperKind> {
    let kind = mapper.kind()?;
    match kind {
        MapperKind::Audience
            if mapper.get("included.client.audience").is_none()
                && mapper.get("included.custom.audience").is_none() =>
        {
            None
        }
        _ => Some(kind),
    }
}

fn token_flags(block: BlockBuilder, mapper: &ProtocolMapper, id_default: bool) -> BlockBuilder {
    block
        .add_attribute(("add_to_id_token", mapper.flag("id.token.claim", id_default)))
        .add_attribute(("add_to_access_token", mapper.flag("access.token.claim", true)))
        .add_attribute(("add_to_userinfo", mapper.flag("userinfo.token.claim", true)))
}

fn claim_value_type(mapper: &ProtocolMapper) -> &str {
    mapper.get("jsonType.label").unwrap_or("String")
}

fn mapper_fields(block: BlockBuilder, kind: MapperKind, mapper: &ProtocolMapper, name: &str) -> BlockBuilder {
    match kind {
        MapperKind::UserAttribute => {
            let attribute = mapper.get("user.attribute").unwrap_or(name);
            let block = block
                .add_attribute(("user_attribute", attribute))
                .add_attribute(("claim_name", mapper.get("claim.name").unwrap_or(attribute)))
                .add_attribute(("claim_value_type", claim_value_type(mapper)))
                .add_attribute(("multivalued", mapper.flag("multivalued", false)));
            token_flags(block, mapper, true)
        }
        MapperKind::UserProperty => {
            let property = mapper.get("user.attribute").unwrap_or(name);
            let block = block
                .add_attribute(("user_property", property))
                .add_attribute(("claim_name", mapper.get("claim.name").unwrap_or(property)))
                .add_attribute(("claim_value_type", claim_value_type(mapper)));
            token_flags(block, mapper, true)
        }
        MapperKind::GroupMembership => {
            let block = block
                .add_attribute(("claim_name", mapper.get("claim.name").unwrap_or("groups")))
                .add_attribute(("full_path", mapper.flag("full.path", true)));
            token_flags(block, mapper, true)
        }
        MapperKind::Audience => block
            .opt_attribute("included_client_audience", mapper.get("included.client.audience"))
            .opt_attribute("included_custom_audience", mapper.get("included.custom.audience"))
            .add_attribute(("add_to_id_token", mapper.flag("id.token.claim", false)))
            .add_attribute(("add_to_access_token", mapper.flag("access.token.claim", true))),
        MapperKind::HardcodedClaim => {
            let block = block
                .add_attribute(("claim_name", mapper.get("claim.name").unwrap_or(name)))
                .add_attribute(("claim_value", mapper.get("claim.value").unwrap_or_default()))
                .add_attribute(("claim_value_type", claim_value_type(mapper)));
            token_flags(block, mapper, true)
        }
        MapperKind::FullName => token_flags(block, mapper, true),
        MapperKind::RealmRole => {
            let block = block
                .add_attribute(("claim_name", mapper.get("claim.name").unwrap_or("realm_access.roles")))
                .add_attribute(("claim_value_type", claim_value_type(mapper)))
                .add_attribute(("multivalued", mapper.flag("multivalued", true)))
                .opt_attribute("realm_role_prefix", mapper.get("usermodel.realmRoleMapping.rolePrefix"));
            token_flags(block, mapper, true)
        }
        MapperKind::ClientRole => {
            let block = block
                .add_attribute((
                    "claim_name",
                    mapper.get("claim.name").unwrap_or("resource_access.${client_id}.roles"),
                ))
                .add_attribute(("claim_value_type", claim_value_type(mapper)))
                .add_attribute(("multivalued", mapper.flag("multivalued", true)))
                .opt_attribute(
                    "client_id_for_role_mappings",
                    mapper.get("usermodel.clientRoleMapping.clientId"),
                )
                .opt_attribute("client_role_prefix", mapper.get("usermodel.clientRoleMapping.rolePrefix"));
            token_flags(block, mapper, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::diagnostics::DiagnosticKind;
    use crate::model::RealmSettings;
    use serde_json::{json, Value};

    fn render(raw: Value) -> (String, usize, Vec<crate::Diagnostic>) {
        let export = json!({"realm": "demo"});
        let settings = RealmSettings::default();
        let config = GeneratorConfig::default();
        let mut diagnostics = Vec::new();
        let mut doc = Document::new();
        let declared = {
            let mut ctx = EmitContext::new(&export, &settings, "demo", &config, "clients", &mut diagnostics);
            let owner = MapperOwner {
                attr: "client_id",
                id_expr: "keycloak_openid_client.app.id".to_string(),
                label: "app",
            };
            let list = NestedList::from(raw);
            emit_mappers(&mut doc, &mut ctx, &mut LabelAllocator::new(), &owner, "clients[0].protocolMappers", &list)
        };
        (doc.render().unwrap(), declared, diagnostics)
    }

    #[test]
    fn recognized_mapper_gets_dedicated_resource() {
        let (text, declared, diagnostics) = render(json!([{
            "name": "department",
            "protocolMapper": "oidc-usermodel-attribute-mapper",
            "config": {"user.attribute": "dept", "claim.name": "department", "id.token.claim": "false"}
        }]));
        assert_eq!(declared, 1);
        assert!(diagnostics.is_empty());
        assert!(text.contains("resource \"keycloak_openid_user_attribute_protocol_mapper\" \"app_department\" {"));
        assert!(text.contains("  client_id = keycloak_openid_client.app.id\n"));
        assert!(text.contains("  user_attribute = \"dept\"\n"));
        assert!(text.contains("  add_to_id_token = false\n"));
    }

    #[test]
    fn unknown_mapper_is_commented_out() {
        let (text, declared, diagnostics) = render(json!([{
            "name": "script",
            "protocolMapper": "oidc-script-based-protocol-mapper",
            "config": {"script": "exports = 1"}
        }]));
        assert_eq!(declared, 0);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnsupportedConstruct);
        assert!(text.contains("# resource \"keycloak_generic_protocol_mapper\" \"app_script\" {"));
        assert!(!text.lines().any(|l| l.starts_with("resource ")));
    }

    #[test]
    fn audience_without_target_is_commented_out() {
        let (_, declared, _) = render(json!([{"name": "aud", "protocolMapper": "oidc-audience-mapper"}]));
        assert_eq!(declared, 0);
    }

    #[test]
    fn unnamed_mappers_fall_back_to_index() {
        let (text, declared, _) = render(json!([{"protocolMapper": "oidc-full-name-mapper"}]));
        assert_eq!(declared, 1);
        assert!(text.contains("\"app_mapper_0\""));
        assert!(text.contains("name = \"mapper_0\""));
    }

    #[test]
    fn wrong_shaped_mapper_list_is_reported() {
        let (text, declared, diagnostics) = render(json!({"name": "groups"}));
        assert_eq!(declared, 0);
        assert!(text.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MalformedSection);
        assert_eq!(diagnostics[0].subject, "clients[0].protocolMappers");
    }
}

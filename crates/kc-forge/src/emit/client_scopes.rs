//! Client scopes module.

use std::collections::BTreeMap;

use super::mappers::{emit_mappers, MapperOwner};
use super::{id_ref, map_output, preamble, EmitContext};
use crate::document::{resource, var, BlockBuilderExt, Document};
use crate::error::ForgeResult;
use crate::model::ClientScope;
use crate::naming::LabelAllocator;

/// Emits one client scope resource per entry with its protocol mappers.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let mut doc = Document::new();
    preamble(&mut doc, ctx, "Module: client_scopes");

    let mut labels = LabelAllocator::new();
    let mut ids = BTreeMap::new();
    for (index, scope) in ctx.section::<ClientScope>("clientScopes") {
        let subject = format!("clientScopes[{index}]");
        let Some(name) = ctx.identifier(&subject, "name", scope.name.as_deref(), "client_scope", index)
        else {
            continue;
        };
        let label = labels.claim(&name);
        let saml = scope.is_saml();
        let resource_type = if saml {
            "keycloak_saml_client_scope"
        } else {
            "keycloak_openid_client_scope"
        };

        doc.blank();
        doc.block(
            resource(resource_type, &label)
                .add_attribute(("realm_id", var("realm_id")))
                .add_attribute(("name", name.as_str()))
                .opt_attribute("description", scope.description.as_deref())
                .opt_attribute("consent_screen_text", scope.consent_screen_text().filter(|_| !saml))
                .opt_attribute("include_in_token_scope", (!saml).then(|| scope.include_in_token_scope()))
                .opt_attribute("gui_order", scope.gui_order())
                .build(),
        );

        let owner = MapperOwner {
            attr: "client_scope_id",
            id_expr: id_ref(resource_type, &label),
            label: &label,
        };
        emit_mappers(
            &mut doc,
            ctx,
            &mut labels,
            &owner,
            &format!("{subject}.protocolMappers"),
            &scope.protocol_mappers,
        );
        ids.entry(name).or_insert_with(|| id_ref(resource_type, &label));
    }

    map_output(&mut doc, "client_scope_ids", "Client scope IDs keyed by name", &ids);
    doc.render()
}

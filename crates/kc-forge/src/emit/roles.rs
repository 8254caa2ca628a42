//! Roles module: realm roles and client roles.
//!
//! Client roles need the owning client's ID, which lives in the clients
//! module. Modules only depend on the realm module, so the ID is read from
//! a `client_ids` map variable the caller wires in.

use std::collections::BTreeMap;

use hcl::expr::Expression;
use serde_json::Value;

use super::{id_ref, map_output, placeholder_note, preamble, variable, EmitContext};
use crate::document::{call, empty_list, map, reference, resource, string_map, var, BlockBuilderExt, Document};
use crate::error::ForgeResult;
use crate::model::{NestedList, Role, RolesSection};
use crate::naming::LabelAllocator;

/// Emits one `keycloak_role` per realm and client role.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let mut doc = Document::new();
    preamble(&mut doc, ctx, "Module: roles");

    let section = match ctx.doc().get("roles") {
        None | Some(Value::Null) => RolesSection::default(),
        Some(value @ Value::Object(_)) => {
            serde_json::from_value::<RolesSection>(value.clone()).unwrap_or_default()
        }
        Some(_) => {
            ctx.malformed("roles", "`roles` is not an object");
            RolesSection::default()
        }
    };
    if section.client.is_none() {
        ctx.malformed("roles.client", "`roles.client` is not an object");
    }

    let has_client_roles = section.client_lists().any(|(_, list)| *list != NestedList::Absent);
    if has_client_roles {
        doc.blank();
        doc.block(
            variable(
                "client_ids",
                "Client IDs keyed by client_id, from the clients module",
                call("map", [reference("string")]),
            )
            .add_attribute(("default", map(Vec::<(String, Expression)>::new())))
            .build(),
        );
    }

    let mut labels = LabelAllocator::new();
    let mut ids = BTreeMap::new();

    let realm_roles = ctx.nested("roles.realm", &section.realm);
    for (index, role) in ctx.entries::<Role>("roles.realm", realm_roles) {
        let subject = format!("roles.realm[{index}]");
        let Some(name) = ctx.identifier(&subject, "name", role.name.as_deref(), "role", index) else {
            continue;
        };
        let label = labels.claim(&name);
        role_block(&mut doc, ctx, &subject, &label, &name, None, &role);
        ids.entry(name).or_insert_with(|| id_ref("keycloak_role", &label));
    }

    for (client, raw_roles) in section.client_lists() {
        let list = format!("roles.client.{client}");
        let raw_roles = ctx.nested(&list, raw_roles);
        let roles = ctx.entries::<Role>(&list, raw_roles);
        if !roles.is_empty() {
            ctx.unresolved(&list, format!("client roles of `{client}` read the client ID from var.client_ids"));
        }
        for (index, role) in roles {
            let subject = format!("{list}[{index}]");
            let Some(name) = ctx.identifier(&subject, "name", role.name.as_deref(), "role", index) else {
                continue;
            };
            let label = labels.claim(&format!("{client}_{name}"));
            role_block(&mut doc, ctx, &subject, &label, &name, Some(client), &role);
            ids.entry(format!("{client}/{name}"))
                .or_insert_with(|| id_ref("keycloak_role", &label));
        }
    }

    map_output(&mut doc, "role_ids", "Role IDs keyed by name, client roles as client/role", &ids);
    doc.render()
}

fn role_block(
    doc: &mut Document,
    ctx: &mut EmitContext<'_>,
    subject: &str,
    label: &str,
    name: &str,
    client: Option<&String>,
    role: &Role,
) {
    let composites = role.composite_references();
    doc.blank();
    if !composites.is_empty() {
        placeholder_note(doc, "composite_roles", "composite roles", &composites);
    }
    let client_id = client.map(|client| {
        call(
            "lookup",
            [
                var("client_ids"),
                Expression::String(client.clone()),
                Expression::String(String::new()),
            ],
        )
    });
    doc.block(
        resource("keycloak_role", label)
            .add_attribute(("realm_id", var("realm_id")))
            .opt_attribute("client_id", client_id)
            .add_attribute(("name", name))
            .opt_attribute("description", role.description.as_deref())
            .opt_attribute(
                "attributes",
                (!role.attributes.is_empty())
                    .then(|| string_map(role.attributes.iter().map(|(k, v)| (k.clone(), v.join("##"))))),
            )
            .opt_attribute("composite_roles", (!composites.is_empty()).then(empty_list))
            .build(),
    );
    if !composites.is_empty() {
        ctx.unresolved(subject, format!("composite roles of `{name}`: {}", composites.join(", ")));
    }
}

//! Scope mappings module: roles granted to clients and client scopes.
//!
//! Client, client scope and role IDs live in other modules. Each mapping
//! looks them up in map variables the caller wires from those modules'
//! `client_ids`, `client_scope_ids` and `role_ids` outputs.

use std::collections::BTreeMap;

use hcl::expr::Expression;
use serde_json::Value;

use super::{map_output, preamble, variable, EmitContext};
use crate::document::{call, map, reference, resource, var, Document};
use crate::error::ForgeResult;
use crate::model::{NestedList, ScopeMapping};
use crate::naming::LabelAllocator;

const MAPS: [(&str, &str); 3] = [
    ("client_ids", "Client IDs keyed by client_id, from the clients module"),
    ("client_scope_ids", "Client scope IDs keyed by name, from the client_scopes module"),
    ("role_ids", "Role IDs keyed by name, client roles as client/role, from the roles module"),
];

fn lookup(map_var: &str, key: &str) -> Expression {
    call(
        "lookup",
        [var(map_var), Expression::String(key.to_string()), Expression::String(String::new())],
    )
}

struct MappingEmitter {
    doc: Document,
    labels: LabelAllocator,
    ids: BTreeMap<String, String>,
}

impl MappingEmitter {
    /// Emits one role mapper per role of `mapping`.
    ///
    /// `role_owner` is the client whose roles are granted; `None` means realm roles.
    fn mapping(
        &mut self,
        ctx: &mut EmitContext<'_>,
        subject: &str,
        mapping: &ScopeMapping,
        role_owner: Option<&str>,
    ) {
        let (target_attr, target_map, target) = match (&mapping.client, &mapping.client_scope) {
            (Some(client), None) => ("client_id", "client_ids", client.as_str()),
            (None, Some(scope)) => ("client_scope_id", "client_scope_ids", scope.as_str()),
            (Some(_), Some(_)) => {
                ctx.skip(subject, "both `client` and `clientScope` are set");
                return;
            }
            (None, None) => {
                ctx.skip(subject, "missing `client` or `clientScope`");
                return;
            }
        };
        if mapping.roles.is_empty() {
            ctx.skip(subject, format!("no roles mapped to `{target}`"));
            return;
        }

        let role_keys: Vec<String> = mapping
            .roles
            .iter()
            .map(|role| match role_owner {
                Some(owner) => format!("{owner}/{role}"),
                None => role.clone(),
            })
            .collect();
        for role_key in &role_keys {
            let label = self.labels.claim(&format!("{target}_{role_key}"));
            self.doc.blank();
            self.doc.block(
                resource("keycloak_generic_role_mapper", &label)
                    .add_attribute(("realm_id", var("realm_id")))
                    .add_attribute((target_attr, lookup(target_map, target)))
                    .add_attribute(("role_id", lookup("role_ids", role_key)))
                    .build(),
            );
            self.ids
                .entry(format!("{target}:{role_key}"))
                .or_insert_with(|| format!("keycloak_generic_role_mapper.{label}.id"));
        }
        ctx.unresolved(
            subject,
            format!("`{target}` and roles {} are read from var.{target_map} and var.role_ids", role_keys.join(", ")),
        );
    }
}

/// Emits a `keycloak_generic_role_mapper` per mapped role.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let mut doc = Document::new();
    preamble(&mut doc, ctx, "Module: scope_mappings");
    for (name, description) in MAPS {
        doc.blank();
        doc.block(
            variable(name, description, call("map", [reference("string")]))
                .add_attribute(("default", map(Vec::<(String, Expression)>::new())))
                .build(),
        );
    }

    let mut state = MappingEmitter {
        doc,
        labels: LabelAllocator::new(),
        ids: BTreeMap::new(),
    };

    for (index, mapping) in ctx.section::<ScopeMapping>("scopeMappings") {
        state.mapping(ctx, &format!("scopeMappings[{index}]"), &mapping, None);
    }

    let client_mappings: BTreeMap<String, NestedList> = match ctx.doc().get("clientScopeMappings") {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Object(owners)) => owners
            .iter()
            .map(|(owner, list)| (owner.clone(), NestedList::from(list.clone())))
            .collect(),
        Some(_) => {
            ctx.malformed("clientScopeMappings", "`clientScopeMappings` is not an object");
            BTreeMap::new()
        }
    };
    for (owner, list) in &client_mappings {
        let section = format!("clientScopeMappings.{owner}");
        let raw = ctx.nested(&section, list);
        for (index, mapping) in ctx.entries::<ScopeMapping>(&section, raw) {
            state.mapping(ctx, &format!("{section}[{index}]"), &mapping, Some(owner.as_str()));
        }
    }

    let MappingEmitter { mut doc, ids, .. } = state;
    map_output(&mut doc, "scope_mapping_ids", "Role mapper IDs keyed by target:role", &ids);
    doc.render()
}

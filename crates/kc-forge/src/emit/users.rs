//! Users module.

use std::collections::BTreeMap;

use super::{id_ref, map_output, placeholder_note, preamble, EmitContext};
use crate::document::{empty_list, reference, resource, string_map, strings, var, BlockBuilderExt, Document};
use crate::error::ForgeResult;
use crate::model::User;
use crate::naming::LabelAllocator;

/// Emits one `keycloak_user` per entry, plus group and role placeholders.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let mut doc = Document::new();
    preamble(&mut doc, ctx, "Module: users");

    let mut labels = LabelAllocator::new();
    let mut ids = BTreeMap::new();
    for (index, user) in ctx.section::<User>("users") {
        let subject = format!("users[{index}]");
        let Some(username) =
            ctx.identifier(&subject, "username", user.username.as_deref(), "user", index)
        else {
            continue;
        };
        let label = labels.claim(&username);

        doc.blank();
        doc.block(
            resource("keycloak_user", &label)
                .add_attribute(("realm_id", var("realm_id")))
                .add_attribute(("username", username.as_str()))
                .add_attribute(("enabled", user.enabled()))
                .opt_attribute("email", user.email.as_deref())
                .add_attribute(("email_verified", user.email_verified()))
                .opt_attribute("first_name", user.first_name.as_deref())
                .opt_attribute("last_name", user.last_name.as_deref())
                .opt_attribute(
                    "attributes",
                    (!user.attributes.is_empty()).then(|| string_map(user.flat_attributes())),
                )
                .opt_attribute(
                    "required_actions",
                    (!user.required_actions.is_empty()).then(|| strings(user.required_actions.clone())),
                )
                .build(),
        );
        let user_id = id_ref("keycloak_user", &label);

        if !user.groups.is_empty() {
            let groups_label = labels.claim(&format!("{label}_groups"));
            doc.blank();
            placeholder_note(&mut doc, "group_ids", "group memberships", &user.groups);
            doc.block(
                resource("keycloak_user_groups", &groups_label)
                    .add_attribute(("realm_id", var("realm_id")))
                    .add_attribute(("user_id", reference(&user_id)))
                    .add_attribute(("group_ids", empty_list()))
                    .build(),
            );
            ctx.unresolved(&subject, format!("group memberships of `{username}`: {}", user.groups.join(", ")));
        }

        let roles = user.role_references();
        if !roles.is_empty() {
            let roles_label = labels.claim(&format!("{label}_roles"));
            doc.blank();
            placeholder_note(&mut doc, "role_ids", "role mappings", &roles);
            doc.block(
                resource("keycloak_user_roles", &roles_label)
                    .add_attribute(("realm_id", var("realm_id")))
                    .add_attribute(("user_id", reference(&user_id)))
                    .add_attribute(("role_ids", empty_list()))
                    .build(),
            );
            ctx.unresolved(&subject, format!("role mappings of `{username}`: {}", roles.join(", ")));
        }

        ids.entry(username).or_insert(user_id);
    }

    map_output(&mut doc, "user_ids", "User IDs keyed by username", &ids);
    doc.render()
}

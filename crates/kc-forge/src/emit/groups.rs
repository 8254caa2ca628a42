//! Groups module; nested groups become child groups with `parent_id`.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{id_ref, map_output, placeholder_note, preamble, EmitContext};
use crate::document::{empty_list, reference, resource, string_map, var, BlockBuilderExt, Document};
use crate::error::ForgeResult;
use crate::model::Group;
use crate::naming::LabelAllocator;

struct GroupEmitter {
    doc: Document,
    labels: LabelAllocator,
    ids: BTreeMap<String, String>,
}

/// Emits one `keycloak_group` per group at any depth.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let mut doc = Document::new();
    preamble(&mut doc, ctx, "Module: groups");

    let mut state = GroupEmitter {
        doc,
        labels: LabelAllocator::new(),
        ids: BTreeMap::new(),
    };
    let top_level: &[Value] = match ctx.doc().get("groups") {
        Some(Value::Array(list)) => list,
        Some(Value::Null) | None => &[],
        Some(_) => {
            ctx.malformed("groups", "`groups` is not a list");
            &[]
        }
    };
    state.walk(ctx, "groups", top_level, None, "");

    let GroupEmitter { mut doc, ids, .. } = state;
    map_output(&mut doc, "group_ids", "Group IDs keyed by path", &ids);
    doc.render()
}

impl GroupEmitter {
    fn walk(
        &mut self,
        ctx: &mut EmitContext<'_>,
        section: &str,
        list: &[Value],
        parent_label: Option<&str>,
        parent_path: &str,
    ) {
        for (index, group) in ctx.entries::<Group>(section, list) {
            let subject = format!("{section}[{index}]");
            let sub_section = format!("{subject}.subGroups");
            let sub_groups = ctx.nested(&sub_section, &group.sub_groups);
            let Some(name) = ctx.identifier(&subject, "name", group.name.as_deref(), "group", index)
            else {
                if !sub_groups.is_empty() {
                    ctx.skip(&subject, format!("{} subgroup(s) dropped with their parent", sub_groups.len()));
                }
                continue;
            };
            let label = self.labels.claim(&name);
            let path = group
                .path
                .clone()
                .unwrap_or_else(|| format!("{parent_path}/{name}"));

            self.doc.blank();
            self.doc.block(
                resource("keycloak_group", &label)
                    .add_attribute(("realm_id", var("realm_id")))
                    .opt_attribute(
                        "parent_id",
                        parent_label.map(|parent| reference(&id_ref("keycloak_group", parent))),
                    )
                    .add_attribute(("name", name.as_str()))
                    .opt_attribute(
                        "attributes",
                        (!group.attributes.is_empty()).then(|| string_map(group.flat_attributes())),
                    )
                    .build(),
            );

            let roles = group.role_references();
            if !roles.is_empty() {
                let roles_label = self.labels.claim(&format!("{label}_roles"));
                self.doc.blank();
                placeholder_note(&mut self.doc, "role_ids", "role mappings", &roles);
                self.doc.block(
                    resource("keycloak_group_roles", &roles_label)
                        .add_attribute(("realm_id", var("realm_id")))
                        .add_attribute(("group_id", reference(&id_ref("keycloak_group", &label))))
                        .add_attribute(("role_ids", empty_list()))
                        .build(),
                );
                ctx.unresolved(&subject, format!("role mappings of group `{path}`: {}", roles.join(", ")));
            }

            self.ids
                .entry(path.clone())
                .or_insert_with(|| id_ref("keycloak_group", &label));

            if !sub_groups.is_empty() {
                self.walk(ctx, &sub_section, sub_groups, Some(&label), &path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::model::RealmSettings;
    use serde_json::json;

    fn render(doc: &Value) -> (String, Vec<crate::Diagnostic>) {
        let settings = RealmSettings::default();
        let config = GeneratorConfig::default();
        let mut diagnostics = Vec::new();
        let text = {
            let mut ctx = EmitContext::new(doc, &settings, "demo", &config, "groups", &mut diagnostics);
            emit(&mut ctx).unwrap()
        };
        (text, diagnostics)
    }

    #[test]
    fn subgroups_reference_parent() {
        let (text, _) = render(&json!({"groups": [{
            "name": "eng",
            "subGroups": [{"name": "backend", "subGroups": [{"name": "db"}]}]
        }]}));
        assert!(text.contains("resource \"keycloak_group\" \"eng\" {"));
        assert!(text.contains("resource \"keycloak_group\" \"backend\" {\n  realm_id = var.realm_id\n  parent_id = keycloak_group.eng.id\n"));
        assert!(text.contains("parent_id = keycloak_group.backend.id"));
        assert!(text.contains("\"/eng/backend/db\" = keycloak_group.db.id"));
    }

    #[test]
    fn nameless_group_drops_subtree() {
        let (text, diagnostics) = render(&json!({"groups": [
            {"subGroups": [{"name": "orphan"}]},
            {"name": "ok", "realmRoles": ["viewer"]}
        ]}));
        assert!(!text.contains("orphan"));
        assert!(text.contains("resource \"keycloak_group_roles\" \"ok_roles\" {"));
        assert!(text.contains("  role_ids = []\n"));
        assert_eq!(diagnostics.len(), 3);
    }

    #[test]
    fn wrong_shaped_subgroups_are_reported() {
        let (text, diagnostics) = render(&json!({"groups": [{"name": "eng", "subGroups": {"name": "x"}}]}));
        assert!(text.contains("resource \"keycloak_group\" \"eng\" {"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, crate::DiagnosticKind::MalformedSection);
        assert_eq!(diagnostics[0].subject, "groups[0].subGroups");
    }
}

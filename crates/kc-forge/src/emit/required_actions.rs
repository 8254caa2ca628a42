//! Required actions module.

use std::collections::BTreeMap;

use super::{map_output, preamble, EmitContext};
use crate::document::{resource, var, BlockBuilderExt, Document};
use crate::error::ForgeResult;
use crate::model::RequiredAction;
use crate::naming::LabelAllocator;

/// Aliases declared by `requiredActions[]`.
///
/// The required credentials module leaves these to this module.
#[must_use]
pub fn declared_aliases(doc: &serde_json::Value) -> Vec<String> {
    doc.get("requiredActions")
        .and_then(serde_json::Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|entry| entry.get("alias").and_then(serde_json::Value::as_str))
                .filter(|alias| !alias.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Emits one `keycloak_required_action` per entry.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let mut doc = Document::new();
    preamble(&mut doc, ctx, "Module: required_actions");

    let mut labels = LabelAllocator::new();
    let mut aliases = BTreeMap::new();
    for (index, action) in ctx.section::<RequiredAction>("requiredActions") {
        let subject = format!("requiredActions[{index}]");
        let Some(alias) = action.alias.as_deref().filter(|alias| !alias.is_empty()) else {
            ctx.skip(&subject, "missing `alias`");
            continue;
        };
        if aliases.contains_key(alias) {
            ctx.skip(&subject, format!("duplicate required action `{alias}`"));
            continue;
        }
        let label = labels.claim(alias);
        doc.blank();
        doc.block(
            resource("keycloak_required_action", &label)
                .add_attribute(("realm_id", var("realm_id")))
                .add_attribute(("alias", alias))
                .add_attribute(("name", action.name.as_deref().unwrap_or(alias)))
                .add_attribute(("enabled", action.enabled()))
                .add_attribute(("default_action", action.default_action == Some(true)))
                .opt_attribute("priority", action.priority)
                .build(),
        );
        aliases.insert(alias.to_string(), format!("keycloak_required_action.{label}.alias"));
    }

    map_output(&mut doc, "required_action_aliases", "Required action aliases keyed by alias", &aliases);
    doc.render()
}

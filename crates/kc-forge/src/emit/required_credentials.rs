//! Required credentials module.

use std::collections::BTreeMap;

use serde_json::Value;

use super::required_actions::declared_aliases;
use super::{map_output, notice, preamble, EmitContext};
use crate::document::{resource, var, Document};
use crate::error::ForgeResult;
use crate::naming::{fallback_name, LabelAllocator};

/// Required action `(alias, name)` that enrolls a credential type.
#[must_use]
pub fn required_action(credential: &str) -> Option<(&'static str, &'static str)> {
    match credential {
        "password" => Some(("UPDATE_PASSWORD", "Update Password")),
        "otp" => Some(("CONFIGURE_TOTP", "Configure OTP")),
        "webauthn" => Some(("webauthn-register", "Webauthn Register")),
        _ => None,
    }
}

/// Emits a required action per credential type.
///
/// Actions already listed in `requiredActions[]` are left to the required
/// actions module so no alias is declared twice.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let mut doc = Document::new();
    preamble(&mut doc, ctx, "Module: required_credentials");

    let credentials: &[Value] = match ctx.doc().get("requiredCredentials") {
        Some(Value::Array(list)) => list,
        None | Some(Value::Null) => &[],
        Some(_) => {
            ctx.malformed("requiredCredentials", "`requiredCredentials` is not a list");
            &[]
        }
    };
    let managed = declared_aliases(ctx.doc());

    let mut labels = LabelAllocator::new();
    let mut actions = BTreeMap::new();
    for (index, entry) in credentials.iter().enumerate() {
        let subject = format!("requiredCredentials[{index}]");
        let Some(credential) = entry.as_str() else {
            ctx.skip(&subject, "credential type is not a string");
            continue;
        };
        let credential = if credential.is_empty() {
            fallback_name("credential", index)
        } else {
            credential.to_string()
        };
        let Some((alias, name)) = required_action(&credential) else {
            let message = format!("Credential type '{credential}' has no matching required action; configure it manually");
            notice(&mut doc, &mut labels, &credential, &message);
            ctx.unsupported(&subject, message);
            continue;
        };
        if managed.iter().any(|m| m == alias) {
            doc.blank();
            doc.comment(&format!("{alias} ({credential}) is declared by the required_actions module."));
            continue;
        }
        let label = labels.claim(&credential);
        doc.blank();
        doc.block(
            resource("keycloak_required_action", &label)
                .add_attribute(("realm_id", var("realm_id")))
                .add_attribute(("alias", alias))
                .add_attribute(("name", name))
                .add_attribute(("enabled", true))
                .add_attribute(("default_action", false))
                .build(),
        );
        actions
            .entry(credential)
            .or_insert_with(|| format!("keycloak_required_action.{label}.alias"));
    }

    map_output(&mut doc, "required_actions", "Required action aliases keyed by credential type", &actions);
    doc.render()
}

//! Events module.

use super::{notice, output, preamble, EmitContext};
use crate::document::{reference, resource, strings, var, BlockBuilderExt, Document};
use crate::error::ForgeResult;
use crate::naming::LabelAllocator;

/// Event listeners every Keycloak distribution ships.
pub const BUILT_IN_LISTENERS: &[&str] = &["jboss-logging", "email"];

/// Emits the realm event configuration.
///
/// Listener plugins outside [`BUILT_IN_LISTENERS`] are left out of the
/// listener list and announced with a notice stub.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let settings = ctx.settings();
    let (listeners, plugins): (Vec<String>, Vec<String>) = settings
        .events_listeners()
        .into_iter()
        .partition(|l| BUILT_IN_LISTENERS.contains(&l.as_str()));

    let mut doc = Document::new();
    preamble(&mut doc, ctx, "Module: events");
    doc.blank();
    doc.block(
        resource("keycloak_realm_events", "events")
            .add_attribute(("realm_id", var("realm_id")))
            .add_attribute(("events_enabled", settings.events_enabled == Some(true)))
            .opt_attribute("events_expiration", settings.events_expiration)
            .add_attribute(("admin_events_enabled", settings.admin_events_enabled == Some(true)))
            .add_attribute((
                "admin_events_details_enabled",
                settings.admin_events_details_enabled == Some(true),
            ))
            .opt_attribute(
                "enabled_event_types",
                (!settings.enabled_event_types.is_empty()).then(|| strings(settings.enabled_event_types.clone())),
            )
            .add_attribute(("events_listeners", strings(listeners)))
            .build(),
    );

    let mut labels = LabelAllocator::new();
    for plugin in plugins {
        let message = format!(
            "Event listener '{plugin}' is a server plugin; install it and add it to events_listeners manually"
        );
        notice(&mut doc, &mut labels, &format!("listener_{plugin}"), &message);
        ctx.unsupported(format!("eventsListeners.{plugin}"), message);
    }

    output(
        &mut doc,
        "events_enabled",
        "Whether login events are recorded",
        reference("keycloak_realm_events.events.events_enabled"),
    );
    doc.render()
}

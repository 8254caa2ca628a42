//! Themes module.
//!
//! Theme names are applied on the realm resource; custom theme assets have
//! no declarative equivalent and get a notice stub each.

use hcl::Block;

use super::{notice, output, preamble, EmitContext};
use crate::document::{reference, string_map, Document};
use crate::error::ForgeResult;
use crate::model::BUILT_IN_THEMES;
use crate::naming::LabelAllocator;

/// Emits theme locals and notices for custom themes.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let settings = ctx.settings();
    let themes = settings.themes();

    let mut doc = Document::new();
    preamble(&mut doc, ctx, "Module: themes");
    doc.blank();
    doc.comment("Theme names are set on keycloak_realm in the realm module.");
    doc.block(
        Block::builder("locals")
            .add_attribute(("themes", string_map(themes.iter().map(|(attr, theme)| (*attr, *theme)))))
            .build(),
    );

    let mut labels = LabelAllocator::new();
    for (attr, theme) in &themes {
        if BUILT_IN_THEMES.contains(theme) {
            continue;
        }
        let message = format!(
            "Custom theme '{theme}' ({attr}) must be deployed to the Keycloak themes directory before apply"
        );
        notice(&mut doc, &mut labels, &format!("{attr}_{theme}"), &message);
        ctx.unsupported(*attr, message);
    }

    output(&mut doc, "themes", "Theme names keyed by realm attribute", reference("local.themes"));
    doc.render()
}

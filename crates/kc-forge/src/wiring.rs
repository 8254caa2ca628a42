//! Terragrunt wiring files.
//!
//! One generator serves every module: the root file configures the provider
//! once, the realm module receives the realm name as an input, and every
//! other module declares a dependency on the realm module and receives its
//! `realm_id` output.

use hcl::expr::{Expression, Heredoc, HeredocStripMode, TemplateExpr};
use hcl::{Block, Identifier};

use crate::config::GeneratorConfig;
use crate::document::{call, object, reference, strings, Document};
use crate::error::ForgeResult;
use crate::plan::{ModuleDescriptor, ModuleKind};

/// Placeholder realm ID used while the realm module has not been applied.
pub const MOCK_REALM_ID: &str = "mock-realm-id";

fn get_env(name: &str, default: Option<&str>) -> Expression {
    let mut args = vec![Expression::String(name.to_string())];
    args.extend(default.map(|d| Expression::String(d.to_string())));
    call("get_env", args)
}

/// `"${local.<name>}"`, interpolated by Terragrunt when it writes `provider.tf`.
fn local_interpolation(name: &str) -> Expression {
    Expression::from(TemplateExpr::QuotedString(format!("${{local.{name}}}")))
}

fn provider_block(config: &GeneratorConfig) -> Block {
    Block::builder("provider")
        .add_label("keycloak")
        .add_attribute(("client_id", config.admin_client_id.as_str()))
        .add_attribute(("url", local_interpolation("keycloak_url")))
        .add_attribute(("realm", "master"))
        .add_attribute(("username", local_interpolation("keycloak_user")))
        .add_attribute(("password", local_interpolation("keycloak_password")))
        .build()
}

/// Writes the root `terragrunt.hcl`.
///
/// # Errors
///
/// Returns [`crate::ForgeError::Render`] if the provider block cannot be formatted.
pub fn root_wiring(realm_name: &str, modules: &[&ModuleDescriptor], config: &GeneratorConfig) -> ForgeResult<String> {
    let mut provider = Document::new();
    provider.block(provider_block(config));
    let contents = Heredoc::new(Identifier::unchecked("EOF"), provider.render()?)
        .with_strip_mode(HeredocStripMode::Indent);

    let mut doc = Document::new();
    doc.comment(&format!(
        "Root Terragrunt configuration for realm {realm_name}\nGenerated from a Keycloak realm export. Do not edit by hand.\n\nModules: {}\nApply everything with `terragrunt run-all apply` from this directory.",
        modules.iter().map(|m| m.slug()).collect::<Vec<_>>().join(", ")
    ));
    doc.blank();
    doc.comment("Admin credentials are read from KEYCLOAK_URL, KEYCLOAK_USER and KEYCLOAK_PASSWORD.");
    doc.block(
        Block::builder("locals")
            .add_attribute(("keycloak_url", get_env("KEYCLOAK_URL", Some(&config.keycloak_url))))
            .add_attribute(("keycloak_user", get_env("KEYCLOAK_USER", Some("admin"))))
            .add_attribute(("keycloak_password", get_env("KEYCLOAK_PASSWORD", None)))
            .build(),
    );
    doc.blank();
    doc.block(
        Block::builder("generate")
            .add_label("provider")
            .add_attribute(("path", "provider.tf"))
            .add_attribute(("if_exists", "overwrite_terragrunt"))
            .add_attribute(("contents", Expression::from(TemplateExpr::Heredoc(contents))))
            .build(),
    );
    doc.render()
}

/// Writes a module's `terragrunt.hcl`.
///
/// # Errors
///
/// Returns [`crate::ForgeError::Render`] if a structure cannot be formatted.
pub fn module_wiring(module: &ModuleDescriptor, realm_name: &str, config: &GeneratorConfig) -> ForgeResult<String> {
    let mut doc = Document::new();
    doc.comment(&format!("Module: {}\nRealm: {realm_name}", module.slug()));
    doc.blank();
    doc.block(
        Block::builder("include")
            .add_label("root")
            .add_attribute(("path", call("find_in_parent_folders", [])))
            .build(),
    );
    doc.blank();
    doc.block(
        Block::builder("terraform")
            .add_attribute(("source", config.module_source(module.slug())))
            .build(),
    );
    doc.blank();

    if module.kind == ModuleKind::Realm {
        doc.attribute("inputs", object([("realm_name", Expression::String(realm_name.to_string()))]));
    } else {
        doc.block(
            Block::builder("dependency")
                .add_label("realm")
                .add_attribute(("config_path", "../realm"))
                .add_attribute((
                    "mock_outputs",
                    object([("realm_id", Expression::String(MOCK_REALM_ID.to_string()))]),
                ))
                .add_attribute(("mock_outputs_allowed_terraform_commands", strings(["validate", "plan"])))
                .build(),
        );
        doc.blank();
        doc.attribute(
            "inputs",
            object([("realm_id", reference("dependency.realm.outputs.realm_id"))]),
        );
    }

    doc.blank();
    doc.comment(&format!("Outputs: {}", module.outputs.join(", ")));
    doc.render()
}

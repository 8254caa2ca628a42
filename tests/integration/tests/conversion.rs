//! Whole-document conversion tests.

use std::collections::BTreeSet;

use kc_forge::plan::MODULES;
use kc_forge::{convert_batch, generate, Conversion, DiagnosticKind, GeneratorConfig};
use serde_json::json;

use crate::common::{acme_realm, init_tracing, SECRETS};

fn convert_acme() -> anyhow::Result<Conversion> {
    init_tracing();
    Ok(generate(&acme_realm(), "acme-realm.json", &GeneratorConfig::default())?)
}

fn definition<'a>(conversion: &'a Conversion, slug: &str) -> &'a str {
    conversion
        .file(&format!("acme/{slug}/main.tf"))
        .map_or("", |f| f.content.as_str())
}

/// Tests that a realm touching every section plans every module in order.
#[test]
fn test_full_realm_plans_every_module() -> anyhow::Result<()> {
    let conversion = convert_acme()?;
    let expected: Vec<&str> = MODULES.iter().map(|m| m.slug()).collect();
    assert_eq!(conversion.modules, expected);
    assert_eq!(conversion.files.len(), 1 + 2 * expected.len());
    assert_eq!(conversion.files[0].file_path, "acme/terragrunt.hcl");
    Ok(())
}

/// Tests that every declared module output is defined in its main.tf.
#[test]
fn test_declared_outputs_are_defined() -> anyhow::Result<()> {
    let conversion = convert_acme()?;
    for module in &MODULES {
        let text = definition(&conversion, module.slug());
        for output in module.outputs {
            assert!(
                text.contains(&format!("output \"{output}\" {{")),
                "{} is missing output {output}",
                module.slug()
            );
        }
    }
    Ok(())
}

/// Tests that every non-realm definition takes the realm ID as a variable.
#[test]
fn test_definitions_take_realm_id() -> anyhow::Result<()> {
    let conversion = convert_acme()?;
    for slug in conversion.modules.iter().filter(|s| *s != "realm") {
        assert!(definition(&conversion, slug).contains("variable \"realm_id\" {"), "{slug}");
    }
    assert!(definition(&conversion, "realm").contains("variable \"realm_name\" {"));
    Ok(())
}

/// Tests that no secret from the export reaches any generated file.
#[test]
fn test_secrets_are_never_written() -> anyhow::Result<()> {
    let conversion = convert_acme()?;
    for file in &conversion.files {
        for secret in SECRETS {
            assert!(!file.content.contains(secret), "{} leaks {secret}", file.file_path);
        }
    }
    assert!(definition(&conversion, "clients").contains("client_secret = var.client_secret_api"));
    assert!(definition(&conversion, "user_federation").contains("bind_credential = var.ldap_corp_ldap_bind_credential"));
    assert!(definition(&conversion, "identity_providers").contains("var.idp_google_client_secret"));
    Ok(())
}

/// Tests that resource addresses are unique within each file.
#[test]
fn test_resource_labels_are_unique_per_file() -> anyhow::Result<()> {
    let conversion = convert_acme()?;
    for file in &conversion.files {
        let mut seen = BTreeSet::new();
        for line in file.content.lines().filter(|l| l.starts_with("resource \"")) {
            assert!(seen.insert(line.to_string()), "{} repeats {line}", file.file_path);
        }
    }
    Ok(())
}

/// Tests that skipped entries and placeholders are reported.
#[test]
fn test_diagnostics_cover_dropped_and_unresolved_data() -> anyhow::Result<()> {
    let conversion = convert_acme()?;

    let skipped: Vec<_> = conversion
        .diagnostics_for("users")
        .filter(|d| d.kind == DiagnosticKind::SkippedEntity)
        .collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].subject, "users[2]");

    let users = definition(&conversion, "users");
    assert!(users.contains("resource \"keycloak_user_groups\""));
    assert!(users.contains("/staff/engineering"));
    assert!(conversion
        .diagnostics_for("users")
        .any(|d| d.kind == DiagnosticKind::UnresolvedReference));

    assert!(conversion
        .diagnostics_for("clients")
        .any(|d| d.kind == DiagnosticKind::UnsupportedConstruct));
    assert!(definition(&conversion, "clients").contains("# resource \"keycloak_generic_protocol_mapper\""));

    assert!(conversion
        .diagnostics_for("required_credentials")
        .any(|d| d.message.contains("kerberos")));
    assert!(conversion
        .diagnostics_for("scope_mappings")
        .all(|d| d.kind == DiagnosticKind::UnresolvedReference));
    Ok(())
}

/// Tests required actions and scope mappings.
#[test]
fn test_required_actions_and_scope_mappings() -> anyhow::Result<()> {
    let conversion = convert_acme()?;

    let actions = definition(&conversion, "required_actions");
    assert!(actions.contains("resource \"keycloak_required_action\" \"CONFIGURE_TOTP\""));
    assert!(actions.contains("resource \"keycloak_required_action\" \"TERMS_AND_CONDITIONS\""));
    assert!(actions.contains("priority = 20"));

    let credentials = definition(&conversion, "required_credentials");
    assert!(credentials.contains("alias = \"UPDATE_PASSWORD\""));
    assert!(!credentials.contains("alias = \"CONFIGURE_TOTP\""));

    let mappings = definition(&conversion, "scope_mappings");
    assert_eq!(mappings.matches("resource \"keycloak_generic_role_mapper\"").count(), 3);
    assert!(mappings.contains("client_scope_id = lookup(var.client_scope_ids, \"acme-profile\", \"\")"));
    assert!(mappings.contains("role_id = lookup(var.role_ids, \"api/read\", \"\")"));
    Ok(())
}

/// Tests that providers missing required endpoints are skipped, not emitted empty.
#[test]
fn test_incomplete_providers_are_skipped() -> anyhow::Result<()> {
    init_tracing();
    let doc = json!({
        "realm": "partial",
        "identityProviders": [{"alias": "github", "providerId": "github", "config": {"clientId": "gh"}}],
        "components": {
            "org.keycloak.storage.UserStorageProvider": [{"name": "ldap", "providerId": "ldap", "config": {}}]
        }
    });
    let conversion = generate(&doc, "partial.json", &GeneratorConfig::default())?;
    for file in &conversion.files {
        assert!(!file.content.contains("= \"\"\n"), "{} has an empty required value", file.file_path);
    }
    let skipped: Vec<_> = conversion
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::SkippedEntity)
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(skipped, vec!["missing `authorizationUrl`", "missing `connectionUrl`"]);
    Ok(())
}

/// Tests the minimal realm with one user and one public client end to end.
#[test]
fn test_minimal_realm_with_user_and_public_client() -> anyhow::Result<()> {
    init_tracing();
    let doc = json!({
        "realm": "demo",
        "users": [{"username": "alice", "email": "a@x.com"}],
        "clients": [{"clientId": "app1", "publicClient": true}]
    });
    let conversion = generate(&doc, "demo.json", &GeneratorConfig::default())?;

    assert_eq!(conversion.realm, "demo");
    assert_eq!(conversion.modules, vec!["realm", "users", "clients", "security_policies", "events"]);
    assert_eq!(conversion.files[0].file_path, "demo/terragrunt.hcl");
    let root = &conversion.files[0].content;
    assert!(root.contains("generate \"provider\" {"));
    assert!(root.contains("provider \"keycloak\" {"));

    let realm = conversion.file("demo/realm/main.tf").map_or("", |f| f.content.as_str());
    assert!(realm.contains("resource \"keycloak_realm\" \"demo\" {"));
    assert!(realm.contains("default = \"demo\""));

    let users = conversion.file("demo/users/main.tf").map_or("", |f| f.content.as_str());
    assert!(users.contains("resource \"keycloak_user\" \"alice\" {"));
    assert!(users.contains("email = \"a@x.com\""));

    let clients = conversion.file("demo/clients/main.tf").map_or("", |f| f.content.as_str());
    assert!(clients.contains("resource \"keycloak_openid_client\" \"app1\" {"));
    assert!(clients.contains("access_type = \"PUBLIC\""));

    for slug in ["users", "clients"] {
        let wiring = conversion
            .file(&format!("demo/{slug}/terragrunt.hcl"))
            .map_or("", |f| f.content.as_str());
        assert!(wiring.contains("dependency \"realm\" {"), "{slug}");
        assert!(wiring.contains("realm_id = dependency.realm.outputs.realm_id"), "{slug}");
    }
    assert!(conversion.diagnostics.is_empty());
    Ok(())
}

/// Tests the client, client scope, SAML client and identity provider mapper resources.
#[test]
fn test_protocol_specific_resources() -> anyhow::Result<()> {
    let conversion = convert_acme()?;

    let clients = definition(&conversion, "clients");
    assert!(clients.contains("resource \"keycloak_openid_client\" \"web\""));
    assert!(clients.contains("resource \"keycloak_saml_client\" \"https___sp_acme_test_saml\""));
    assert!(clients.contains("resource \"keycloak_openid_audience_protocol_mapper\""));
    assert!(clients.contains("resource \"keycloak_openid_client_default_scopes\""));

    let scopes = definition(&conversion, "client_scopes");
    assert!(scopes.contains("resource \"keycloak_openid_client_scope\" \"acme_profile\""));
    assert!(scopes.contains("client_scope_id = keycloak_openid_client_scope.acme_profile.id"));

    let idps = definition(&conversion, "identity_providers");
    assert!(idps.contains("resource \"keycloak_custom_identity_provider_mapper\" \"google_email\""));
    assert!(idps.contains("identity_provider_alias = keycloak_oidc_identity_provider.google.alias"));

    let federation = definition(&conversion, "user_federation");
    assert!(federation.contains("vendor = \"AD\""));
    assert!(federation.contains("search_scope = \"SUBTREE\""));
    assert_eq!(federation.matches("resource \"keycloak_ldap_user_attribute_mapper\"").count(), 4);
    assert!(federation.contains("ldap_attribute = \"sAMAccountName\""));
    Ok(())
}

/// Tests that flow executions follow priority order and are chained.
#[test]
fn test_flow_executions_are_ordered() -> anyhow::Result<()> {
    let conversion = convert_acme()?;
    let flows = definition(&conversion, "auth_flows");

    assert!(flows.contains("Built-in flows are managed by Keycloak and not recreated: browser"));
    assert!(flows.contains("resource \"keycloak_authentication_flow\" \"acme_browser\""));
    assert!(!flows.contains("resource \"keycloak_authentication_flow\" \"acme_forms\""));

    let cookie = flows.find("\"acme_browser_auth_cookie\"").unwrap_or(usize::MAX);
    let forms = flows.find("\"acme_browser_acme_forms\"").unwrap_or(usize::MAX);
    assert!(cookie < forms, "cookie execution must precede the forms sub-flow");
    assert!(flows.contains("depends_on = [\n"));
    assert!(flows.contains("    keycloak_authentication_execution.acme_browser_auth_cookie"));
    assert!(flows.contains("parent_flow_alias = keycloak_authentication_subflow.acme_browser_acme_forms.alias"));
    Ok(())
}

/// Tests that conversion is a pure function of its input.
#[test]
fn test_conversion_is_deterministic() -> anyhow::Result<()> {
    let first = convert_acme()?;
    let second = convert_acme()?;
    assert_eq!(first.files, second.files);
    assert_eq!(first.diagnostics, second.diagnostics);
    Ok(())
}

/// Tests a batch mixing valid, broken and foreign documents.
#[test]
fn test_batch_tolerates_failures() -> anyhow::Result<()> {
    init_tracing();
    let acme = serde_json::to_string(&acme_realm())?;
    let minimal = json!({"realm": "minimal"}).to_string();
    let report = convert_batch(
        [
            ("acme.json", acme.as_str()),
            ("broken.json", "{\"realm\": "),
            ("minimal.json", minimal.as_str()),
            ("acme.json", minimal.as_str()),
        ],
        &GeneratorConfig::default(),
    );

    assert_eq!(report.outcomes.len(), 3);
    let realms: Vec<&str> = report.succeeded().map(|(_, c)| c.realm.as_str()).collect();
    assert_eq!(realms, vec!["acme", "minimal"]);
    let failed: Vec<&str> = report.failed().map(|(name, _)| name).collect();
    assert_eq!(failed, vec!["broken.json"]);
    Ok(())
}

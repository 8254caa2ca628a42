//! Realm-core module: the `keycloak_realm` resource every other module depends on.

use hcl::Block;

use super::{header, output, sensitive_variable, type_string, variable, EmitContext};
use crate::document::{reference, resource, strings, var, BlockBuilderExt, Document};
use crate::error::ForgeResult;
use crate::model::{security_header_attribute, RealmSettings};
use crate::naming::sanitize_resource;

/// Resource label of the realm.
#[must_use]
pub fn realm_label(realm_name: &str) -> String {
    sanitize_resource(realm_name)
}

/// Emits the realm-core definition file.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let settings = ctx.settings();
    let realm_name = ctx.realm_name();
    let label = realm_label(realm_name);
    let smtp_auth = settings.smtp_host().is_some() && settings.smtp_flag("auth");

    let mut doc = Document::new();
    header(&mut doc, ctx, "Module: realm");
    doc.blank();
    doc.block(
        variable("realm_name", "Name of the realm", type_string())
            .add_attribute(("default", realm_name))
            .build(),
    );
    if smtp_auth {
        sensitive_variable(&mut doc, "smtp_password", "Password for the realm SMTP server");
    }

    let mut realm = resource("keycloak_realm", &label)
        .add_attribute(("realm", var("realm_name")))
        .add_attribute(("enabled", settings.enabled()))
        .opt_attribute("display_name", settings.display_name.as_deref())
        .opt_attribute("display_name_html", settings.display_name_html.as_deref())
        .add_attribute(("ssl_required", settings.ssl_required()))
        .add_attribute(("registration_allowed", settings.registration_allowed == Some(true)))
        .add_attribute((
            "registration_email_as_username",
            settings.registration_email_as_username == Some(true),
        ))
        .add_attribute(("remember_me", settings.remember_me == Some(true)))
        .add_attribute(("verify_email", settings.verify_email == Some(true)))
        .add_attribute(("login_with_email_allowed", settings.login_with_email_allowed()))
        .add_attribute(("duplicate_emails_allowed", settings.duplicate_emails_allowed == Some(true)))
        .add_attribute(("reset_password_allowed", settings.reset_password_allowed == Some(true)))
        .add_attribute(("edit_username_allowed", settings.edit_username_allowed == Some(true)));
    for (attr, theme) in settings.themes() {
        realm = realm.add_attribute((attr, theme));
    }
    for (attr, seconds) in settings.lifespans() {
        realm = realm.add_attribute((attr, format!("{seconds}s")));
    }
    realm = realm
        .opt_attribute("password_policy", settings.password_policy.as_deref())
        .opt_block((settings.internationalization_enabled == Some(true)).then(|| {
            Block::builder("internationalization")
                .add_attribute(("supported_locales", strings(settings.supported_locales.clone())))
                .add_attribute(("default_locale", settings.default_locale.as_deref().unwrap_or("en")))
                .build()
        }))
        .opt_block(smtp_server(settings, smtp_auth))
        .add_block(otp_policy(settings));

    let mut unknown_headers = Vec::new();
    let headers: Vec<(&str, &str)> = settings
        .browser_security_headers
        .iter()
        .filter_map(|(key, value)| match security_header_attribute(key) {
            Some(attr) => Some((attr, value.as_str())),
            None => {
                unknown_headers.push(key.clone());
                None
            }
        })
        .collect();
    realm = realm.opt_block(security_defenses(settings, &headers));

    doc.blank();
    doc.block(realm.build());
    for key in unknown_headers {
        ctx.unsupported(
            format!("browserSecurityHeaders.{key}"),
            format!("security header `{key}` has no provider attribute"),
        );
    }

    output(&mut doc, "realm_id", "ID of the realm", reference(&format!("keycloak_realm.{label}.id")));
    output(&mut doc, "realm_name", "Name of the realm", reference(&format!("keycloak_realm.{label}.realm")));
    doc.render()
}

fn smtp_server(settings: &RealmSettings, auth: bool) -> Option<Block> {
    let host = settings.smtp_host()?;
    let smtp = &settings.smtp_server;
    let field = |key: &str| smtp.get(key).map(String::as_str);
    let auth = auth.then(|| {
        Block::builder("auth")
            .add_attribute(("username", field("user").unwrap_or_default()))
            .add_attribute(("password", var("smtp_password")))
            .build()
    });
    Some(
        Block::builder("smtp_server")
            .add_attribute(("host", host))
            .opt_attribute("port", field("port"))
            .opt_attribute("from", field("from"))
            .opt_attribute("from_display_name", field("fromDisplayName"))
            .opt_attribute("reply_to", field("replyTo"))
            .opt_attribute("envelope_from", field("envelopeFrom"))
            .add_attribute(("ssl", settings.smtp_flag("ssl")))
            .add_attribute(("starttls", settings.smtp_flag("starttls")))
            .opt_block(auth)
            .build(),
    )
}

fn otp_policy(settings: &RealmSettings) -> Block {
    let otp = settings.otp_policy();
    Block::builder("otp_policy")
        .add_attribute(("type", otp.kind))
        .add_attribute(("algorithm", otp.algorithm))
        .add_attribute(("digits", otp.digits))
        .add_attribute(("initial_counter", otp.initial_counter))
        .add_attribute(("look_ahead_window", otp.look_ahead_window))
        .add_attribute(("period", otp.period))
        .build()
}

fn security_defenses(settings: &RealmSettings, headers: &[(&str, &str)]) -> Option<Block> {
    let bf = settings.brute_force();
    if !bf.enabled && headers.is_empty() {
        return None;
    }
    let headers_block = (!headers.is_empty()).then(|| {
        headers
            .iter()
            .fold(Block::builder("headers"), |block, (attr, value)| block.add_attribute((*attr, *value)))
            .build()
    });
    let brute_force = bf.enabled.then(|| {
        Block::builder("brute_force_detection")
            .add_attribute(("permanent_lockout", bf.permanent_lockout))
            .add_attribute(("max_login_failures", bf.failure_factor))
            .add_attribute(("wait_increment_seconds", bf.wait_increment_seconds))
            .add_attribute(("quick_login_check_milli_seconds", bf.quick_login_check_milli_seconds))
            .add_attribute(("minimum_quick_login_wait_seconds", bf.minimum_quick_login_wait_seconds))
            .add_attribute(("max_failure_wait_seconds", bf.max_failure_wait_seconds))
            .add_attribute(("failure_reset_time_seconds", bf.max_delta_time_seconds))
            .build()
    });
    Some(
        Block::builder("security_defenses")
            .opt_block(headers_block)
            .opt_block(brute_force)
            .build(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::model::RealmSettings;
    use serde_json::{json, Value};

    fn render(doc: &Value) -> (String, Vec<crate::Diagnostic>) {
        let settings: RealmSettings = serde_json::from_value(doc.clone()).unwrap();
        let config = GeneratorConfig::default();
        let name = doc["realm"].as_str().unwrap_or("realm").to_string();
        let mut diagnostics = Vec::new();
        let text = {
            let mut ctx = EmitContext::new(doc, &settings, &name, &config, "realm", &mut diagnostics);
            emit(&mut ctx).unwrap()
        };
        (text, diagnostics)
    }

    #[test]
    fn bare_realm_defaults() {
        let (text, diagnostics) = render(&json!({"realm": "demo"}));
        assert!(diagnostics.is_empty());
        assert!(text.contains("resource \"keycloak_realm\" \"demo\" {"));
        assert!(text.contains("  enabled = true\n"));
        assert!(text.contains("  ssl_required = \"external\"\n"));
        assert!(text.contains("  access_token_lifespan = \"300s\"\n"));
        assert!(text.contains("  offline_session_max_lifespan = \"5184000s\"\n"));
        assert!(text.contains("    algorithm = \"HmacSHA1\"\n"));
        assert!(text.contains("value = keycloak_realm.demo.id"));
        assert!(!text.contains("smtp_server"));
        assert!(!text.contains("security_defenses"));
    }

    #[test]
    fn realm_label_is_sanitized() {
        let (text, _) = render(&json!({"realm": "acme.prod-1"}));
        assert!(text.contains("resource \"keycloak_realm\" \"acme_prod_1\" {"));
        assert!(text.contains("default = \"acme.prod-1\""));
        assert!(text.contains("keycloak_realm.acme_prod_1.id"));
    }

    #[test]
    fn smtp_password_becomes_variable() {
        let (text, _) = render(&json!({
            "realm": "demo",
            "smtpServer": {"host": "smtp.example.com", "port": "587", "auth": "true", "user": "mailer", "password": "hunter2"}
        }));
        assert!(text.contains("variable \"smtp_password\""));
        assert!(text.contains("password = var.smtp_password"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn security_defenses_and_themes() {
        let (text, diagnostics) = render(&json!({
            "realm": "demo",
            "enabled": false,
            "loginTheme": "acme",
            "bruteForceProtected": true,
            "browserSecurityHeaders": {"xFrameOptions": "SAMEORIGIN", "xCustom": "1"}
        }));
        assert!(text.contains("  enabled = false\n"));
        assert!(text.contains("  login_theme = \"acme\"\n"));
        assert!(text.contains("x_frame_options = \"SAMEORIGIN\""));
        assert!(text.contains("max_login_failures = 30"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].subject, "browserSecurityHeaders.xCustom");
    }
}

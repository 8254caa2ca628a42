//! Security policies module.
//!
//! Brute force detection, browser security headers, the password policy and
//! the OTP policy are enforced on the realm resource. This module exposes
//! the effective values as locals and outputs so they can be reviewed and
//! consumed by policy checks.

use std::collections::BTreeMap;

use hcl::expr::Expression;
use hcl::Block;

use super::{output, preamble, EmitContext};
use crate::document::{object, reference, string_map, Document};
use crate::error::ForgeResult;
use crate::model::security_header_attribute;

/// Splits a password policy such as `length(12) and notUsername(undefined)` into rules.
#[must_use]
pub fn password_policy_rules(policy: &str) -> BTreeMap<String, String> {
    policy
        .split(" and ")
        .map(str::trim)
        .filter(|rule| !rule.is_empty())
        .map(|rule| match rule.split_once('(') {
            Some((name, arg)) => (name.trim().to_string(), arg.trim_end_matches(')').to_string()),
            None => (rule.to_string(), String::new()),
        })
        .collect()
}

/// Emits the security policy locals and outputs.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let settings = ctx.settings();
    let bf = settings.brute_force();
    let otp = settings.otp_policy();
    let headers: BTreeMap<String, String> = settings
        .browser_security_headers
        .iter()
        .map(|(key, value)| {
            let attr = security_header_attribute(key).map_or_else(|| key.clone(), str::to_string);
            (attr, value.clone())
        })
        .collect();

    let brute_force = object([
        ("enabled", Expression::from(bf.enabled)),
        ("permanent_lockout", Expression::from(bf.permanent_lockout)),
        ("max_login_failures", Expression::from(bf.failure_factor)),
        ("wait_increment_seconds", Expression::from(bf.wait_increment_seconds)),
        ("quick_login_check_milli_seconds", Expression::from(bf.quick_login_check_milli_seconds)),
        ("minimum_quick_login_wait_seconds", Expression::from(bf.minimum_quick_login_wait_seconds)),
        ("max_failure_wait_seconds", Expression::from(bf.max_failure_wait_seconds)),
        ("failure_reset_time_seconds", Expression::from(bf.max_delta_time_seconds)),
    ]);
    let (policy, rules) = match settings.password_policy.as_deref() {
        Some(policy) => (Expression::from(policy), string_map(password_policy_rules(policy))),
        None => (Expression::Null, string_map(BTreeMap::<String, String>::new())),
    };
    let otp_policy = object([
        ("type", Expression::from(otp.kind)),
        ("algorithm", Expression::from(otp.algorithm)),
        ("digits", Expression::from(otp.digits)),
        ("initial_counter", Expression::from(otp.initial_counter)),
        ("look_ahead_window", Expression::from(otp.look_ahead_window)),
        ("period", Expression::from(otp.period)),
    ]);

    let mut doc = Document::new();
    preamble(&mut doc, ctx, "Module: security_policies");
    doc.blank();
    doc.block(
        Block::builder("locals")
            .add_attribute(("brute_force", brute_force))
            .add_attribute(("password_policy", policy))
            .add_attribute(("password_policy_rules", rules))
            .add_attribute(("otp_policy", otp_policy))
            .add_attribute(("security_headers", string_map(headers)))
            .build(),
    );

    for (name, description) in [
        ("brute_force", "Brute force detection settings"),
        ("password_policy", "Password policy expression"),
        ("otp_policy", "One-time password policy"),
        ("security_headers", "Browser security headers"),
    ] {
        output(&mut doc, name, description, reference(&format!("local.{name}")));
    }
    doc.render()
}

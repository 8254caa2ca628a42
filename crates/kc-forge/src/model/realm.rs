//! Realm-level settings.
//!
//! Every scalar the realm, theme, security and event modules read lives
//! here, together with the value Keycloak itself would assume when the
//! export omits it.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::de;

/// Token and session lifespans in seconds, as emitted when the export omits them.
pub mod lifespan {
    /// `accessTokenLifespan`.
    pub const ACCESS_TOKEN: i64 = 300;
    /// `ssoSessionIdleTimeout`.
    pub const SSO_SESSION_IDLE: i64 = 1800;
    /// `ssoSessionMaxLifespan`.
    pub const SSO_SESSION_MAX: i64 = 36_000;
    /// `offlineSessionIdleTimeout`.
    pub const OFFLINE_SESSION_IDLE: i64 = 2_592_000;
    /// `offlineSessionMaxLifespan`.
    pub const OFFLINE_SESSION_MAX: i64 = 5_184_000;
    /// `accessCodeLifespan`.
    pub const ACCESS_CODE: i64 = 60;
    /// `accessCodeLifespanUserAction`.
    pub const ACCESS_CODE_USER_ACTION: i64 = 300;
    /// `accessCodeLifespanLogin`.
    pub const ACCESS_CODE_LOGIN: i64 = 1800;
}

/// Theme names shipped with Keycloak; anything else needs custom assets.
pub const BUILT_IN_THEMES: &[&str] = &["base", "keycloak", "keycloak.v2"];

/// Top-level realm attributes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RealmSettings {
    /// Realm name.
    #[serde(deserialize_with = "de::opt_string")]
    pub realm: Option<String>,
    /// Display name.
    #[serde(deserialize_with = "de::opt_string")]
    pub display_name: Option<String>,
    /// HTML display name.
    #[serde(deserialize_with = "de::opt_string")]
    pub display_name_html: Option<String>,
    /// Enabled flag.
    #[serde(deserialize_with = "de::opt_bool")]
    pub enabled: Option<bool>,
    /// SSL requirement.
    #[serde(deserialize_with = "de::opt_string")]
    pub ssl_required: Option<String>,

    /// Self-registration.
    #[serde(deserialize_with = "de::opt_bool")]
    pub registration_allowed: Option<bool>,
    /// Email as username.
    #[serde(deserialize_with = "de::opt_bool")]
    pub registration_email_as_username: Option<bool>,
    /// Remember-me checkbox.
    #[serde(deserialize_with = "de::opt_bool")]
    pub remember_me: Option<bool>,
    /// Email verification.
    #[serde(deserialize_with = "de::opt_bool")]
    pub verify_email: Option<bool>,
    /// Login with email.
    #[serde(deserialize_with = "de::opt_bool")]
    pub login_with_email_allowed: Option<bool>,
    /// Duplicate emails.
    #[serde(deserialize_with = "de::opt_bool")]
    pub duplicate_emails_allowed: Option<bool>,
    /// Forgot-password link.
    #[serde(deserialize_with = "de::opt_bool")]
    pub reset_password_allowed: Option<bool>,
    /// Username editing.
    #[serde(deserialize_with = "de::opt_bool")]
    pub edit_username_allowed: Option<bool>,

    /// Access token lifespan.
    #[serde(deserialize_with = "de::opt_i64")]
    pub access_token_lifespan: Option<i64>,
    /// SSO idle timeout.
    #[serde(deserialize_with = "de::opt_i64")]
    pub sso_session_idle_timeout: Option<i64>,
    /// SSO max lifespan.
    #[serde(deserialize_with = "de::opt_i64")]
    pub sso_session_max_lifespan: Option<i64>,
    /// Offline idle timeout.
    #[serde(deserialize_with = "de::opt_i64")]
    pub offline_session_idle_timeout: Option<i64>,
    /// Offline max lifespan.
    #[serde(deserialize_with = "de::opt_i64")]
    pub offline_session_max_lifespan: Option<i64>,
    /// Access code lifespan.
    #[serde(deserialize_with = "de::opt_i64")]
    pub access_code_lifespan: Option<i64>,
    /// User action lifespan.
    #[serde(deserialize_with = "de::opt_i64")]
    pub access_code_lifespan_user_action: Option<i64>,
    /// Login lifespan.
    #[serde(deserialize_with = "de::opt_i64")]
    pub access_code_lifespan_login: Option<i64>,

    /// Internationalization.
    #[serde(deserialize_with = "de::opt_bool")]
    pub internationalization_enabled: Option<bool>,
    /// Supported locales.
    #[serde(deserialize_with = "de::string_list")]
    pub supported_locales: Vec<String>,
    /// Default locale.
    #[serde(deserialize_with = "de::opt_string")]
    pub default_locale: Option<String>,

    /// Login theme.
    #[serde(deserialize_with = "de::opt_string")]
    pub login_theme: Option<String>,
    /// Account theme.
    #[serde(deserialize_with = "de::opt_string")]
    pub account_theme: Option<String>,
    /// Admin console theme.
    #[serde(deserialize_with = "de::opt_string")]
    pub admin_theme: Option<String>,
    /// Email theme.
    #[serde(deserialize_with = "de::opt_string")]
    pub email_theme: Option<String>,

    /// SMTP settings.
    #[serde(deserialize_with = "de::string_map")]
    pub smtp_server: BTreeMap<String, String>,

    /// Password policy expression.
    #[serde(deserialize_with = "de::opt_string")]
    pub password_policy: Option<String>,

    /// Brute force detection.
    #[serde(deserialize_with = "de::opt_bool")]
    pub brute_force_protected: Option<bool>,
    /// Permanent lockout.
    #[serde(deserialize_with = "de::opt_bool")]
    pub permanent_lockout: Option<bool>,
    /// Max failure wait.
    #[serde(deserialize_with = "de::opt_i64")]
    pub max_failure_wait_seconds: Option<i64>,
    /// Minimum quick login wait.
    #[serde(deserialize_with = "de::opt_i64")]
    pub minimum_quick_login_wait_seconds: Option<i64>,
    /// Wait increment.
    #[serde(deserialize_with = "de::opt_i64")]
    pub wait_increment_seconds: Option<i64>,
    /// Quick login check.
    #[serde(deserialize_with = "de::opt_i64")]
    pub quick_login_check_milli_seconds: Option<i64>,
    /// Failure reset time.
    #[serde(deserialize_with = "de::opt_i64")]
    pub max_delta_time_seconds: Option<i64>,
    /// Failures before lockout.
    #[serde(deserialize_with = "de::opt_i64")]
    pub failure_factor: Option<i64>,

    /// Browser security headers, camelCase keys.
    #[serde(deserialize_with = "de::string_map")]
    pub browser_security_headers: BTreeMap<String, String>,

    /// OTP type (`totp` or `hotp`).
    #[serde(deserialize_with = "de::opt_string")]
    pub otp_policy_type: Option<String>,
    /// OTP hash algorithm.
    #[serde(deserialize_with = "de::opt_string")]
    pub otp_policy_algorithm: Option<String>,
    /// OTP digits.
    #[serde(deserialize_with = "de::opt_i64")]
    pub otp_policy_digits: Option<i64>,
    /// HOTP initial counter.
    #[serde(deserialize_with = "de::opt_i64")]
    pub otp_policy_initial_counter: Option<i64>,
    /// OTP look-ahead window.
    #[serde(deserialize_with = "de::opt_i64")]
    pub otp_policy_look_ahead_window: Option<i64>,
    /// TOTP period.
    #[serde(deserialize_with = "de::opt_i64")]
    pub otp_policy_period: Option<i64>,

    /// Login events.
    #[serde(deserialize_with = "de::opt_bool")]
    pub events_enabled: Option<bool>,
    /// Login event retention.
    #[serde(deserialize_with = "de::opt_i64")]
    pub events_expiration: Option<i64>,
    /// Recorded login event types.
    #[serde(deserialize_with = "de::string_list")]
    pub enabled_event_types: Vec<String>,
    /// Admin events.
    #[serde(deserialize_with = "de::opt_bool")]
    pub admin_events_enabled: Option<bool>,
    /// Admin event representation details.
    #[serde(deserialize_with = "de::opt_bool")]
    pub admin_events_details_enabled: Option<bool>,
    /// Event listener SPI ids.
    #[serde(deserialize_with = "de::opt_string_list")]
    pub events_listeners: Option<Vec<String>>,
}

impl RealmSettings {
    /// Enabled unless explicitly `false`.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled != Some(false)
    }

    /// SSL requirement, `external` by default.
    #[must_use]
    pub fn ssl_required(&self) -> &str {
        self.ssl_required.as_deref().unwrap_or("external")
    }

    /// Login with email is allowed by default.
    #[must_use]
    pub fn login_with_email_allowed(&self) -> bool {
        self.login_with_email_allowed != Some(false)
    }

    /// Lifespans as `(attribute, seconds)` pairs, defaults applied.
    #[must_use]
    pub fn lifespans(&self) -> [(&'static str, i64); 8] {
        [
            ("access_token_lifespan", self.access_token_lifespan.unwrap_or(lifespan::ACCESS_TOKEN)),
            ("sso_session_idle_timeout", self.sso_session_idle_timeout.unwrap_or(lifespan::SSO_SESSION_IDLE)),
            ("sso_session_max_lifespan", self.sso_session_max_lifespan.unwrap_or(lifespan::SSO_SESSION_MAX)),
            ("offline_session_idle_timeout", self.offline_session_idle_timeout.unwrap_or(lifespan::OFFLINE_SESSION_IDLE)),
            ("offline_session_max_lifespan", self.offline_session_max_lifespan.unwrap_or(lifespan::OFFLINE_SESSION_MAX)),
            ("access_code_lifespan", self.access_code_lifespan.unwrap_or(lifespan::ACCESS_CODE)),
            ("access_code_lifespan_user_action", self.access_code_lifespan_user_action.unwrap_or(lifespan::ACCESS_CODE_USER_ACTION)),
            ("access_code_lifespan_login", self.access_code_lifespan_login.unwrap_or(lifespan::ACCESS_CODE_LOGIN)),
        ]
    }

    /// Configured themes as `(attribute, theme)` pairs.
    #[must_use]
    pub fn themes(&self) -> Vec<(&'static str, &str)> {
        [
            ("login_theme", &self.login_theme),
            ("account_theme", &self.account_theme),
            ("admin_theme", &self.admin_theme),
            ("email_theme", &self.email_theme),
        ]
        .into_iter()
        .filter_map(|(attr, theme)| theme.as_deref().map(|t| (attr, t)))
        .collect()
    }

    /// SMTP settings are only emitted when a host is configured.
    #[must_use]
    pub fn smtp_host(&self) -> Option<&str> {
        self.smtp_server.get("host").map(String::as_str).filter(|h| !h.is_empty())
    }

    /// Reads an SMTP flag stored as a `"true"`/`"false"` string.
    #[must_use]
    pub fn smtp_flag(&self, key: &str) -> bool {
        self.smtp_server
            .get(key)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Brute force parameters, Keycloak defaults applied.
    #[must_use]
    pub fn brute_force(&self) -> BruteForce {
        BruteForce {
            enabled: self.brute_force_protected == Some(true),
            permanent_lockout: self.permanent_lockout == Some(true),
            max_failure_wait_seconds: self.max_failure_wait_seconds.unwrap_or(900),
            minimum_quick_login_wait_seconds: self.minimum_quick_login_wait_seconds.unwrap_or(60),
            wait_increment_seconds: self.wait_increment_seconds.unwrap_or(60),
            quick_login_check_milli_seconds: self.quick_login_check_milli_seconds.unwrap_or(1000),
            max_delta_time_seconds: self.max_delta_time_seconds.unwrap_or(43_200),
            failure_factor: self.failure_factor.unwrap_or(30),
        }
    }

    /// OTP policy, Keycloak defaults applied.
    #[must_use]
    pub fn otp_policy(&self) -> OtpPolicy {
        OtpPolicy {
            kind: self.otp_policy_type.clone().unwrap_or_else(|| "totp".to_string()),
            algorithm: self
                .otp_policy_algorithm
                .clone()
                .unwrap_or_else(|| "HmacSHA1".to_string()),
            digits: self.otp_policy_digits.unwrap_or(6),
            initial_counter: self.otp_policy_initial_counter.unwrap_or(0),
            look_ahead_window: self.otp_policy_look_ahead_window.unwrap_or(1),
            period: self.otp_policy_period.unwrap_or(30),
        }
    }

    /// Event listeners; Keycloak enables `jboss-logging` when none are listed.
    #[must_use]
    pub fn events_listeners(&self) -> Vec<String> {
        self.events_listeners
            .clone()
            .unwrap_or_else(|| vec!["jboss-logging".to_string()])
    }
}

/// Provider attribute for a `browserSecurityHeaders` key.
#[must_use]
pub fn security_header_attribute(key: &str) -> Option<&'static str> {
    Some(match key {
        "xFrameOptions" => "x_frame_options",
        "contentSecurityPolicy" => "content_security_policy",
        "contentSecurityPolicyReportOnly" => "content_security_policy_report_only",
        "xContentTypeOptions" => "x_content_type_options",
        "xRobotsTag" => "x_robots_tag",
        "xXSSProtection" => "x_xss_protection",
        "strictTransportSecurity" => "strict_transport_security",
        "referrerPolicy" => "referrer_policy",
        _ => return None,
    })
}

/// Brute force detection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BruteForce {
    /// Detection enabled.
    pub enabled: bool,
    /// Lock permanently instead of temporarily.
    pub permanent_lockout: bool,
    /// Maximum temporary lockout.
    pub max_failure_wait_seconds: i64,
    /// Lockout after too-fast retries.
    pub minimum_quick_login_wait_seconds: i64,
    /// Lockout increment per failure.
    pub wait_increment_seconds: i64,
    /// Quick retry window.
    pub quick_login_check_milli_seconds: i64,
    /// Failure counter reset.
    pub max_delta_time_seconds: i64,
    /// Failures before lockout.
    pub failure_factor: i64,
}

/// One-time password policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpPolicy {
    /// `totp` or `hotp`.
    pub kind: String,
    /// Hash algorithm.
    pub algorithm: String,
    /// Code length.
    pub digits: i64,
    /// HOTP initial counter.
    pub initial_counter: i64,
    /// Accepted look-ahead codes.
    pub look_ahead_window: i64,
    /// TOTP period in seconds.
    pub period: i64,
}

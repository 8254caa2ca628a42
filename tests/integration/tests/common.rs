//! Common test utilities and fixtures.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use kc_forge::api::{respond, ConversionRequest, ConversionResponse};
use kc_forge::GeneratorConfig;
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Secrets embedded in [`acme_realm`]; none may appear in generated files.
pub const SECRETS: [&str; 4] = ["api-secret-value", "google-secret-value", "ldap-secret-value", "smtp-secret-value"];

/// Initializes tracing for tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("kc_forge=debug")
        .with_test_writer()
        .try_init();
}

/// A realm export touching every module.
pub fn acme_realm() -> Value {
    json!({
        "realm": "acme",
        "displayName": "ACME Corp",
        "enabled": true,
        "sslRequired": "external",
        "loginTheme": "acme",
        "accountTheme": "keycloak.v2",
        "passwordPolicy": "length(12) and digits(1)",
        "bruteForceProtected": true,
        "browserSecurityHeaders": {
            "xFrameOptions": "SAMEORIGIN",
            "contentSecurityPolicy": "frame-src 'self'"
        },
        "smtpServer": {
            "host": "smtp.acme.test",
            "port": "587",
            "from": "noreply@acme.test",
            "auth": "true",
            "user": "mailer",
            "password": "smtp-secret-value"
        },
        "eventsEnabled": true,
        "eventsListeners": ["jboss-logging", "acme-audit"],
        "requiredCredentials": ["password", "otp", "kerberos"],
        "requiredActions": [
            {"alias": "CONFIGURE_TOTP", "name": "Configure OTP", "enabled": true, "defaultAction": true, "priority": 10},
            {"alias": "TERMS_AND_CONDITIONS", "name": "Terms and Conditions", "enabled": false, "priority": 20}
        ],
        "scopeMappings": [
            {"client": "web", "roles": ["user"]},
            {"clientScope": "acme-profile", "roles": ["user"]}
        ],
        "clientScopeMappings": {
            "api": [{"client": "web", "roles": ["read"]}]
        },
        "users": [
            {
                "username": "alice",
                "email": "alice@acme.test",
                "enabled": true,
                "groups": ["/staff/engineering"],
                "realmRoles": ["admin"]
            },
            {"username": "bob", "attributes": {"dept": ["sales"]}},
            {"email": "nameless@acme.test"}
        ],
        "clients": [
            {
                "clientId": "web",
                "publicClient": true,
                "redirectUris": ["https://app.acme.test/*"],
                "webOrigins": ["+"],
                "defaultClientScopes": ["profile", "email"]
            },
            {
                "clientId": "api",
                "secret": "api-secret-value",
                "serviceAccountsEnabled": true,
                "protocolMappers": [
                    {
                        "name": "audience",
                        "protocol": "openid-connect",
                        "protocolMapper": "oidc-audience-mapper",
                        "config": {"included.client.audience": "api", "access.token.claim": "true"}
                    },
                    {
                        "name": "legacy",
                        "protocol": "openid-connect",
                        "protocolMapper": "oidc-script-based-protocol-mapper",
                        "config": {}
                    }
                ]
            },
            {"clientId": "https://sp.acme.test/saml", "protocol": "saml"}
        ],
        "clientScopes": [
            {
                "name": "acme-profile",
                "protocol": "openid-connect",
                "protocolMappers": [
                    {
                        "name": "department",
                        "protocol": "openid-connect",
                        "protocolMapper": "oidc-usermodel-attribute-mapper",
                        "config": {"user.attribute": "dept", "claim.name": "department"}
                    }
                ]
            }
        ],
        "roles": {
            "realm": [
                {"name": "admin", "composite": true, "composites": {"realm": ["user"]}},
                {"name": "user"}
            ],
            "client": {"api": [{"name": "read"}]}
        },
        "groups": [
            {
                "name": "staff",
                "path": "/staff",
                "realmRoles": ["user"],
                "subGroups": [{"name": "engineering", "path": "/staff/engineering"}]
            }
        ],
        "identityProviders": [
            {
                "alias": "google",
                "providerId": "google",
                "enabled": true,
                "config": {
                    "clientId": "google-client",
                    "clientSecret": "google-secret-value",
                    "authorizationUrl": "https://accounts.google.com/o/oauth2/auth",
                    "tokenUrl": "https://oauth2.googleapis.com/token"
                }
            }
        ],
        "identityProviderMappers": [
            {
                "name": "email",
                "identityProviderAlias": "google",
                "identityProviderMapper": "oidc-user-attribute-idp-mapper",
                "config": {"claim": "email", "user.attribute": "email"}
            }
        ],
        "authenticationFlows": [
            {"alias": "browser", "providerId": "basic-flow", "topLevel": true, "builtIn": true},
            {
                "alias": "acme browser",
                "providerId": "basic-flow",
                "topLevel": true,
                "builtIn": false,
                "authenticationExecutions": [
                    {"authenticatorFlow": true, "flowAlias": "acme forms", "requirement": "ALTERNATIVE", "priority": 20},
                    {"authenticator": "auth-cookie", "requirement": "ALTERNATIVE", "priority": 10}
                ]
            },
            {
                "alias": "acme forms",
                "providerId": "basic-flow",
                "topLevel": false,
                "builtIn": false,
                "authenticationExecutions": [
                    {"authenticator": "auth-username-password-form", "requirement": "REQUIRED", "priority": 10},
                    {"authenticator": "auth-otp-form", "requirement": "CONDITIONAL", "priority": 20}
                ]
            }
        ],
        "components": {
            "org.keycloak.storage.UserStorageProvider": [
                {
                    "name": "corp-ldap",
                    "providerId": "ldap",
                    "config": {
                        "vendor": ["ad"],
                        "connectionUrl": ["ldaps://ldap.acme.test"],
                        "usersDn": ["ou=people,dc=acme,dc=test"],
                        "bindDn": ["cn=svc,dc=acme,dc=test"],
                        "bindCredential": ["ldap-secret-value"],
                        "usernameLDAPAttribute": ["sAMAccountName"],
                        "searchScope": ["2"],
                        "editMode": ["READ_ONLY"]
                    }
                }
            ]
        }
    })
}

/// Behavior of the mock backend.
#[derive(Debug, Clone, Copy)]
pub enum BackendMode {
    /// Runs the local generator.
    Convert,
    /// Answers 503 to everything.
    Unavailable,
    /// Answers 200 with a failed conversion.
    Rejecting,
}

async fn convert(State(mode): State<BackendMode>, Json(request): Json<ConversionRequest>) -> Response {
    match mode {
        BackendMode::Convert => Json(respond(&request, &GeneratorConfig::default())).into_response(),
        BackendMode::Unavailable => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        BackendMode::Rejecting => {
            Json(ConversionResponse::failed("Conversion failed: realm rejected by policy")).into_response()
        }
    }
}

/// A conversion backend on an ephemeral local port.
pub struct MockBackend {
    /// Base URL of the running backend.
    pub base_url: String,
    /// Server shutdown signal.
    _shutdown_tx: oneshot::Sender<()>,
}

impl MockBackend {
    /// Starts a backend in the given mode.
    pub async fn start(mode: BackendMode) -> anyhow::Result<Self> {
        let app = Router::new()
            .route("/api/v1/convert", post(convert))
            .with_state(mode);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            _shutdown_tx: shutdown_tx,
        })
    }
}

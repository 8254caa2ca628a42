//! Delegated backend client tests against a local mock service.

use kc_forge::{generate, GeneratorConfig};
use kc_forge_cli::backend::BackendClient;
use kc_forge_cli::commands::convert::convert_remote;
use kc_forge_cli::commands::InputFile;

use crate::common::{acme_realm, init_tracing, BackendMode, MockBackend};

fn acme_input() -> anyhow::Result<InputFile> {
    Ok(InputFile::from_text("acme-realm.json", serde_json::to_string(&acme_realm())?))
}

/// Tests that the backend returns the same files as the local generator.
#[tokio::test]
async fn test_backend_conversion_matches_local() -> anyhow::Result<()> {
    init_tracing();
    let backend = MockBackend::start(BackendMode::Convert).await?;
    let client = BackendClient::new(&format!("{}/", backend.base_url))?;

    let outcomes = convert_remote(&client, vec![acme_input()?]).await;
    let remote = outcomes[0].result.as_ref().map_err(|e| anyhow::anyhow!("{e}"))?;
    assert_eq!(remote.realm, "acme");

    let local = generate(&acme_realm(), "acme-realm.json", &GeneratorConfig::default())?;
    let remote_paths: Vec<&str> = remote.files.iter().map(|f| f.file_path.as_str()).collect();
    let local_paths: Vec<&str> = local.files.iter().map(|f| f.file_path.as_str()).collect();
    assert_eq!(remote_paths, local_paths);
    Ok(())
}

/// Tests that a non-success status surfaces as the status line.
#[tokio::test]
async fn test_backend_status_is_surfaced() -> anyhow::Result<()> {
    let backend = MockBackend::start(BackendMode::Unavailable).await?;
    let client = BackendClient::new(&backend.base_url)?;

    let outcomes = convert_remote(&client, vec![acme_input()?]).await;
    assert_eq!(outcomes[0].result.as_ref().unwrap_err(), "503 Service Unavailable");
    Ok(())
}

/// Tests that a failed conversion response surfaces its error.
#[tokio::test]
async fn test_backend_failure_message_is_surfaced() -> anyhow::Result<()> {
    let backend = MockBackend::start(BackendMode::Rejecting).await?;
    let client = BackendClient::new(&backend.base_url)?;

    let outcomes = convert_remote(&client, vec![acme_input()?]).await;
    assert_eq!(
        outcomes[0].result.as_ref().unwrap_err(),
        "Conversion failed: realm rejected by policy"
    );
    Ok(())
}

/// Tests that invalid documents fail locally and do not stop the batch.
#[tokio::test]
async fn test_invalid_documents_fail_per_file() -> anyhow::Result<()> {
    let backend = MockBackend::start(BackendMode::Convert).await?;
    let client = BackendClient::new(&backend.base_url)?;

    let outcomes = convert_remote(
        &client,
        vec![
            InputFile::from_text("broken.json", "{"),
            InputFile::from_text("foreign.json", r#"{"id": 1}"#),
            InputFile::from_text("ok.json", r#"{"realm": "ok"}"#),
        ],
    )
    .await;
    assert!(outcomes[0].result.as_ref().unwrap_err().starts_with("Invalid JSON"));
    assert_eq!(outcomes[1].result.as_ref().unwrap_err(), "Not a Keycloak realm export: foreign.json");
    assert!(outcomes[2].result.is_ok());
    Ok(())
}

/// Tests that an unreachable backend is reported, not retried.
#[tokio::test]
async fn test_unreachable_backend() -> anyhow::Result<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);

    let client = BackendClient::new(&format!("http://{addr}"))?;
    let outcomes = convert_remote(&client, vec![acme_input()?]).await;
    assert!(outcomes[0].result.as_ref().unwrap_err().starts_with("HTTP error"));
    Ok(())
}

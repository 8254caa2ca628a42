//! CLI layer tests: reading exports from disk and writing module trees.

use std::path::PathBuf;

use kc_forge::GeneratorConfig;
use kc_forge_cli::commands::convert::{convert_local, finish};
use kc_forge_cli::commands::read_inputs;
use kc_forge_cli::commands::validate::validate_input;

use crate::common::{acme_realm, init_tracing};

fn write_exports(dir: &std::path::Path) -> anyhow::Result<Vec<PathBuf>> {
    let acme = dir.join("acme-realm.json");
    std::fs::write(&acme, serde_json::to_string_pretty(&acme_realm())?)?;
    let numbered = dir.join("numbered.json");
    std::fs::write(&numbered, r#"{"realm": 7}"#)?;
    let foreign = dir.join("package.json");
    std::fs::write(&foreign, r#"{"name": "not-a-realm"}"#)?;
    Ok(vec![acme, numbered, foreign])
}

/// Tests converting exports from disk into a module tree.
#[test]
fn test_convert_writes_module_tree() -> anyhow::Result<()> {
    init_tracing();
    let input_dir = tempfile::tempdir()?;
    let output_dir = tempfile::tempdir()?;
    let paths = write_exports(input_dir.path())?;

    let outcomes = convert_local(read_inputs(&paths), &GeneratorConfig::default());
    let reports = finish(outcomes, output_dir.path(), false);
    assert_eq!(reports.len(), 3);

    let acme = &reports[0];
    assert!(acme.success);
    assert_eq!(acme.realm.as_deref(), Some("acme"));
    for relative in &acme.files {
        assert!(output_dir.path().join(relative).is_file(), "{relative} not written");
    }
    let root = std::fs::read_to_string(output_dir.path().join("acme/terragrunt.hcl"))?;
    assert!(root.contains("generate \"provider\""));

    let numbered = &reports[1];
    assert!(numbered.success);
    assert_eq!(numbered.realm.as_deref(), Some("numbered"));
    assert!(output_dir.path().join("numbered/realm/main.tf").is_file());

    let foreign = &reports[2];
    assert!(!foreign.success);
    assert!(foreign.error.as_deref().unwrap_or_default().starts_with("Not a Keycloak realm export"));
    Ok(())
}

/// Tests that a dry run writes nothing.
#[test]
fn test_dry_run_writes_nothing() -> anyhow::Result<()> {
    let input_dir = tempfile::tempdir()?;
    let output_dir = tempfile::tempdir()?;
    let paths = write_exports(input_dir.path())?;

    let reports = finish(
        convert_local(read_inputs(&paths[..1]), &GeneratorConfig::default()),
        output_dir.path(),
        true,
    );
    assert!(reports[0].success);
    assert!(!reports[0].files.is_empty());
    assert_eq!(std::fs::read_dir(output_dir.path())?.count(), 0);
    Ok(())
}

/// Tests the validate command rows.
#[test]
fn test_validate_reports_each_file() -> anyhow::Result<()> {
    let input_dir = tempfile::tempdir()?;
    let mut paths = write_exports(input_dir.path())?;
    paths.push(input_dir.path().join("missing.json"));

    let rows: Vec<_> = read_inputs(&paths).iter().map(validate_input).collect();
    assert_eq!(rows.iter().map(|r| r.valid).collect::<Vec<_>>(), vec![true, true, false, false]);
    assert!(rows[0].modules.starts_with("realm, users, clients, client_scopes"));
    assert!(rows[3].error.starts_with("failed to read file"));
    Ok(())
}

/// Tests that generator settings from configuration reach the wiring files.
#[test]
fn test_generator_config_shapes_wiring() -> anyhow::Result<()> {
    let output_dir = tempfile::tempdir()?;
    let config = GeneratorConfig::default()
        .with_module_source_base("git::https://git.acme.test/modules.git")
        .with_provider_version(">= 4.4.0");
    let inputs = vec![kc_forge_cli::commands::InputFile::from_text("demo.json", r#"{"realm": "demo"}"#)];
    let reports = finish(convert_local(inputs, &config), output_dir.path(), false);
    assert!(reports[0].success);

    let wiring = std::fs::read_to_string(output_dir.path().join("demo/events/terragrunt.hcl"))?;
    assert!(wiring.contains("source = \"git::https://git.acme.test/modules.git//events\""));
    let definition = std::fs::read_to_string(output_dir.path().join("demo/events/main.tf"))?;
    assert!(definition.contains("version = \">= 4.4.0\""));
    Ok(())
}

// tests/config_loading.rs

use std::error::Error;

use assetpipe::config::{load_and_validate, load_or_default};
use assetpipe::errors::AssetpipeError;
use assetpipe_test_utils::ProjectFixture;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn missing_default_config_falls_back_to_defaults() -> TestResult {
    let project = ProjectFixture::new();
    let cfg = load_or_default(project.path("Assetpipe.toml"), false)?;

    assert_eq!(cfg.server().host, "0.0.0.0");
    assert_eq!(cfg.server().dev_port, 3000);
    assert_eq!(cfg.server().deploy_port, 5000);
    assert_eq!(cfg.styles().load_paths, vec!["node_modules".to_string()]);
    assert_eq!(cfg.watch().delay_ms, 200);
    assert!(cfg.project().root.is_none());
    Ok(())
}

#[test]
fn missing_explicit_config_is_an_error() {
    let project = ProjectFixture::new();
    let result = load_or_default(project.path("custom.toml"), true);
    assert!(matches!(result, Err(AssetpipeError::IoError(_))));
}

#[test]
fn partial_file_keeps_other_defaults() -> TestResult {
    let project = ProjectFixture::new().file(
        "Assetpipe.toml",
        "[server]\ndev_port = 8000\n\n[watch]\ndelay_ms = 50\n",
    );
    let cfg = load_and_validate(project.path("Assetpipe.toml"))?;

    assert_eq!(cfg.server().dev_port, 8000);
    assert_eq!(cfg.server().deploy_port, 5000);
    assert_eq!(cfg.watch().delay_ms, 50);
    Ok(())
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let project = ProjectFixture::new().file("Assetpipe.toml", "[server\nhost = ");
    assert!(matches!(
        load_and_validate(project.path("Assetpipe.toml")),
        Err(AssetpipeError::TomlError(_))
    ));
}

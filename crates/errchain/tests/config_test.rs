//! Tests for the configuration system.

use errchain::{AllocatorConfig, ErrchainConfig, ErrchainErrorKind, ErrorValue, RenderConfig};
use std::io::Write;
use tempfile::Builder;

#[test]
fn test_bundled_defaults() {
    let config = ErrchainConfig::bundled().unwrap();

    assert_eq!(config.render().header(), &None);
    assert_eq!(config.render().trailer().as_deref(), Some("\n"));
    assert!(!*config.allocator().tracking());
    assert_eq!(config.allocator().limit_bytes(), &None);
}

#[test]
fn test_load_succeeds() {
    assert!(ErrchainConfig::load().is_ok());
}

#[test]
fn test_config_from_file() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        temp_file,
        r#"
[render]
header = "error: "
trailer = "!\n"

[allocator]
tracking = true
limit_bytes = 4096
"#
    )
    .unwrap();
    temp_file.flush().unwrap();

    let config = ErrchainConfig::from_file(temp_file.path()).unwrap();

    assert_eq!(config.render().header().as_deref(), Some("error: "));
    assert_eq!(config.render().trailer().as_deref(), Some("!\n"));
    assert!(*config.allocator().tracking());
    assert_eq!(config.allocator().limit_bytes(), &Some(4096));
}

#[test]
fn test_config_from_partial_file_uses_defaults() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(temp_file, "[render]\nheader = \"warning: \"").unwrap();
    temp_file.flush().unwrap();

    let config = ErrchainConfig::from_file(temp_file.path()).unwrap();

    assert_eq!(config.render().header().as_deref(), Some("warning: "));
    assert_eq!(config.render().trailer(), &None);
    assert_eq!(config.allocator(), &AllocatorConfig::default());
}

#[test]
fn test_config_from_missing_file() {
    let result = ErrchainConfig::from_file("/nonexistent/errchain-config.toml");

    let err = result.unwrap_err();
    assert!(matches!(err.kind(), ErrchainErrorKind::Config(_)));
    assert!(err.to_string().contains("Cannot open errchain settings"));
    assert!(err.to_string().contains("errchain-config.toml"));
}

#[test]
fn test_config_with_bad_types() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(temp_file, "[allocator]\ntracking = \"sometimes\"").unwrap();
    temp_file.flush().unwrap();

    let err = ErrchainConfig::from_file(temp_file.path()).unwrap_err();
    assert!(matches!(err.kind(), ErrchainErrorKind::Config(_)));
    assert!(err.to_string().contains("Invalid errchain settings"));
}

#[test]
fn test_render_config_applies_header_and_trailer() {
    let render = RenderConfig::default()
        .with_header(Some("fatal: ".to_string()))
        .with_trailer(Some("\n".to_string()));
    let err = ErrorValue::wrap(Some(ErrorValue::new("no space left")), "writing cache");
    let mut out = Vec::new();

    render.render_to_writer(Some(err.node()), &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "fatal: writing cache: no space left\n"
    );
}

#[test]
fn test_config_round_trips_through_parts() {
    let render = RenderConfig::default().with_trailer(Some("\n".to_string()));
    let allocator = AllocatorConfig::default().with_tracking(true);
    let config = ErrchainConfig::new(render.clone(), allocator.clone());

    assert_eq!(config.render(), &render);
    assert_eq!(config.allocator(), &allocator);
}

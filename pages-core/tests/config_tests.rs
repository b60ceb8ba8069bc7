//! Config loading error-message and resolution integration tests.

use std::fs;

use pages_core::{config, ConfigError, PageId, PagesConfig};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_config_returns_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let err = config::load(&dir.path().join("pages.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("config not found"));
    assert!(err.to_string().contains("pages.yaml"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("pages.yaml");
    fs::write(&path, b": : corrupt : yaml : !!!\n  - broken: [unclosed").expect("write");

    let err = config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains("pages.yaml"), "must contain file path, got: {msg}");
}

#[test]
fn load_wrong_type_yaml_returns_parse_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("pages.yaml");
    fs::write(&path, b"- this is a list, not a mapping\n").expect("write");

    let err = config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[test]
fn load_directory_path_returns_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = config::load(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Full document
// ---------------------------------------------------------------------------

#[test]
fn load_full_document() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("pages.yaml");
    fs::write(
        &path,
        r#"
extension: ".html"
embed_prefix: include_page
autoescape: true
max_embed_depth: 4
directories:
  - site
pages:
  - id: home
    path: extra/home.html
"#,
    )
    .expect("write");

    let cfg: PagesConfig = config::load(&path).expect("load");
    assert_eq!(cfg.extension(), "html");
    assert_eq!(cfg.embed_prefix, "include_page");
    assert!(cfg.autoescape);
    assert_eq!(cfg.max_embed_depth, 4);
    assert_eq!(cfg.directories, vec![dir.path().join("site")]);
    assert_eq!(cfg.pages.len(), 1);
    assert_eq!(cfg.pages[0].id, PageId::from("home"));
}

#[test]
fn unknown_keys_are_ignored() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("pages.yaml");
    fs::write(&path, b"extensoin: html\n").expect("write");

    let cfg = config::load(&path).expect("load");
    assert_eq!(cfg.extension(), "tpl");
}

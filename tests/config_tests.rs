//! Integration tests for the configuration object
//!
//! Tests for structured and textual construction, file loading, and the
//! file -> env -> CLI override chain.

use req_capture::config::{CliArgs, Config, ConfigError, ConfigSource};
use serde_json::{json, Value};
use std::fs;

fn subsets() -> Vec<Value> {
    vec![
        json!({}),
        json!({"URL": "http://x"}),
        json!({"Debug": false}),
        json!({"BrowserPath": "C:\\Program Files\\Chrome\\chrome.exe"}),
        json!({"URL": "http://x", "Debug": true}),
        json!({"URL": "", "Debug": true, "BrowserPath": "/usr/bin/chromium"}),
        json!({"URL": "https://a.example/?q=1", "BrowserPath": "", "Extra": [1, 2]}),
    ]
}

#[test]
fn test_fields_equal_input_values() {
    for bag in subsets() {
        let config = Config::create_from(bag.clone()).unwrap();

        assert_eq!(config.url.as_deref(), bag.get("URL").and_then(Value::as_str));
        assert_eq!(config.debug, bag.get("Debug").and_then(Value::as_bool));
        assert_eq!(
            config.browser_path.as_deref(),
            bag.get("BrowserPath").and_then(Value::as_str)
        );
    }
}

#[test]
fn test_text_round_trip_matches_structured() {
    for bag in subsets() {
        let structured = Config::create_from(bag.clone()).unwrap();
        let textual = Config::create_from(serde_json::to_string(&bag).unwrap()).unwrap();
        assert_eq!(structured, textual, "input: {}", bag);
    }
}

#[test]
fn test_no_argument_yields_all_unset() {
    let config = Config::create_from(ConfigSource::default()).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_not_json_fails() {
    assert!(matches!(
        Config::create_from("not json"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        Config::from_json(r#"{"URL": "http://x""#),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_unknown_keys_only() {
    let config = Config::create_from(r#"{"Foo": 1}"#).unwrap();
    assert!(config.url.is_none());
    assert!(config.debug.is_none());
    assert!(config.browser_path.is_none());
}

#[test]
fn test_example_input() {
    let config = Config::create_from(r#"{"URL":"http://x","Debug":true}"#).unwrap();
    assert_eq!(config.url, Some("http://x".to_string()));
    assert_eq!(config.debug, Some(true));
    assert_eq!(config.browser_path, None);
}

#[test]
fn test_to_json_feeds_back_into_factory() {
    let config = Config::new()
        .with_url("https://example.com")
        .with_browser_path("/opt/chrome");
    let text = config.to_json().unwrap();

    assert_eq!(Config::create_from(text).unwrap(), config);
    assert_eq!(Config::create_from(config.to_value()).unwrap(), config);
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new().with_url("https://example.com").with_debug(true);

    for name in ["capture.toml", "capture.json"] {
        let path = dir.path().join(name);
        config.to_file(&path).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), config, "{}", name);
    }
}

#[test]
fn test_wrong_types_in_files_leave_fields_unset() {
    let dir = tempfile::tempdir().unwrap();

    let toml_path = dir.path().join("capture.toml");
    fs::write(&toml_path, "URL = \"http://x\"\nDebug = \"yes\"\nBrowserPath = 7\n").unwrap();

    let json_path = dir.path().join("capture.json");
    fs::write(&json_path, r#"{"URL": "http://x", "Debug": "yes", "BrowserPath": 7}"#).unwrap();

    let from_toml = Config::from_file(&toml_path).unwrap();
    let from_json = Config::from_file(&json_path).unwrap();

    assert_eq!(from_toml, from_json);
    assert_eq!(from_toml.url.as_deref(), Some("http://x"));
    assert_eq!(from_toml.debug, None);
    assert_eq!(from_toml.browser_path, None);
}

#[test]
fn test_invalid_toml_syntax_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.toml");
    fs::write(&path, "URL = ").unwrap();

    assert!(matches!(
        Config::from_file(&path),
        Err(ConfigError::TomlParse(_))
    ));
}

#[test]
fn test_unsupported_file_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.yaml");
    fs::write(&path, "URL: http://x").unwrap();

    assert!(matches!(
        Config::from_file(&path),
        Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
    ));
    assert!(matches!(
        Config::default().to_file(&path),
        Err(ConfigError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::from_file(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_load_settings_cli_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.json");
    fs::write(
        &path,
        r#"{"URL": "https://file.example", "BrowserPath": "/from/file"}"#,
    )
    .unwrap();

    let args = CliArgs {
        config_file: Some(path),
        browser_path: Some("/from/cli".to_string()),
        ..Default::default()
    };

    let config = args.load_settings().unwrap();
    assert_eq!(config.url.as_deref(), Some("https://file.example"));
    assert_eq!(config.browser_path.as_deref(), Some("/from/cli"));
}

#[test]
fn test_load_settings_rejects_bad_url() {
    let args = CliArgs {
        url: Some("file:///etc/passwd".to_string()),
        ..Default::default()
    };

    assert!(matches!(
        args.load_settings(),
        Err(ConfigError::Validation(_))
    ));
}

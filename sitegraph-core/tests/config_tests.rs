// Tests for configuration loading

use sitegraph_core::config::{expand_path, load_config, parse_config, to_json, validate};
use sitegraph_scanner::{CrawlerConfig, LinkDenylist};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_parse_empty_object_gives_defaults() {
    let config = parse_config("{}").unwrap();
    assert_eq!(config, CrawlerConfig::default());
    assert_eq!(config.max_depth, 3);
    assert_eq!(config.timeout_secs, 8);
}

#[test]
fn test_parse_partial_config() {
    let config = parse_config(
        r#"{
            "max_depth": 5,
            "workers": 4,
            "denylist": { "keywords": ["archive"] }
        }"#,
    )
    .unwrap();

    assert_eq!(config.max_depth, 5);
    assert_eq!(config.workers, 4);
    assert_eq!(config.denylist.keywords, vec!["archive".to_string()]);
    assert_eq!(config.denylist.extensions, LinkDenylist::default().extensions);
}

#[test]
fn test_parse_invalid_json() {
    let result = parse_config("{ not json");
    assert!(result.is_err());
}

#[test]
fn test_zero_workers_rejected() {
    let result = parse_config(r#"{"workers": 0}"#);
    let err = result.unwrap_err().to_string();
    assert!(err.contains("workers"));
}

#[test]
fn test_validate_empty_user_agent() {
    let config = CrawlerConfig {
        user_agent: "  ".to_string(),
        ..CrawlerConfig::default()
    };
    assert!(validate(&config).is_err());
}

#[test]
fn test_load_config_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, r#"{{"max_depth": 1, "deadline_secs": 30}}"#)?;

    let config = load_config(Some(temp_file.path()))?;
    assert_eq!(config.max_depth, 1);
    assert_eq!(config.deadline_secs, Some(30));
    Ok(())
}

#[test]
fn test_load_config_missing_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let err = load_config(Some(&missing)).unwrap_err().to_string();
    assert!(err.contains("Failed to read"));
}

#[test]
fn test_config_json_round_trip() {
    let config = CrawlerConfig {
        max_depth: 7,
        ..CrawlerConfig::default()
    };
    let json = to_json(&config).unwrap();
    assert!(json.contains("\"max_depth\": 7"));
    assert_eq!(parse_config(&json).unwrap(), config);
}

#[test]
fn test_expand_path_tilde() {
    let expanded = expand_path("~/sitegraph.json");
    assert!(expanded.ends_with("sitegraph.json"));
    assert_eq!(expand_path("/etc/sitegraph.json").to_string_lossy(), "/etc/sitegraph.json");
}

// Configuration file handling

use sitegraph_scanner::CrawlerConfig;
use sitegraph_scanner::error::{Result, ScanError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/sitegraph/config.json";

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Load the crawler configuration.
///
/// With an explicit `path` the file must exist. Without one the default
/// location is tried and built-in defaults are used when it is absent.
pub fn load_config(path: Option<&Path>) -> Result<CrawlerConfig> {
    match path {
        Some(path) => read_config(path),
        None => {
            let default_path = expand_path(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                read_config(&default_path)
            } else {
                debug!("No config at {}, using defaults", default_path.display());
                Ok(CrawlerConfig::default())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<CrawlerConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        ScanError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    debug!("Loaded config from {}", path.display());
    parse_config(&content)
}

/// Parse and validate a JSON configuration. Missing fields take their defaults.
pub fn parse_config(json: &str) -> Result<CrawlerConfig> {
    let config: CrawlerConfig = serde_json::from_str(json)?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &CrawlerConfig) -> Result<()> {
    if config.workers == 0 {
        return Err(ScanError::ConfigError(
            "workers must be at least 1".to_string(),
        ));
    }
    if config.timeout_secs == 0 {
        return Err(ScanError::ConfigError(
            "timeout_secs must be at least 1".to_string(),
        ));
    }
    if config.user_agent.trim().is_empty() {
        return Err(ScanError::ConfigError(
            "user_agent must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Effective configuration rendered as pretty JSON.
pub fn to_json(config: &CrawlerConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

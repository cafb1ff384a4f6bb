//! Minimal configuration loading for the Slate client.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins, field by field):
//! 1. `/etc/slate/config.toml` (system)
//! 2. `~/.config/slate/config.toml` (user)
//! 3. `./slate.toml` (local override)
//! 4. Environment variables (`SLATE_*`)
//!
//! # Example Config
//!
//! ```toml
//! base_url = "http://tracker.example.com/slate/"
//! login_name = "pipeline_bot"
//! password = "hunter2"
//! timeout_secs = 30
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Connection settings for one Slate session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlateConfig {
    /// Service root; `/api/...` paths are resolved against it.
    pub base_url: String,
    pub login_name: String,
    pub password: String,
    /// Per-request timeout applied to every HTTP call.
    pub timeout_secs: u64,
}

impl Default for SlateConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1/".to_string(),
            login_name: String::new(),
            password: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Same fields, all optional - what one TOML file may set.
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialConfig {
    base_url: Option<String>,
    login_name: Option<String>,
    password: Option<String>,
    timeout_secs: Option<u64>,
}

impl SlateConfig {
    pub fn new(
        base_url: impl Into<String>,
        login_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            login_name: login_name.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Load configuration from all standard sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration, with an optional explicit file that replaces the
    /// local `./slate.toml` override.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and report where each layer came from.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = Self::default();

        for path in discover_config_files(config_path) {
            let partial = load_partial(&path)?;
            apply_partial(&mut config, partial);
            sources.files.push(path);
        }

        apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }
}

/// Discover config files in standard locations, in load order.
/// Only returns files that exist.
fn discover_config_files(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/slate/config.toml");
    if system.exists() {
        files.push(system);
    }

    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("slate/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    // CLI override takes precedence over local
    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("slate.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

fn load_partial(path: &Path) -> Result<PartialConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn apply_partial(config: &mut SlateConfig, partial: PartialConfig) {
    if let Some(v) = partial.base_url {
        config.base_url = v;
    }
    if let Some(v) = partial.login_name {
        config.login_name = v;
    }
    if let Some(v) = partial.password {
        config.password = v;
    }
    if let Some(v) = partial.timeout_secs {
        config.timeout_secs = v;
    }
}

fn apply_env_overrides(config: &mut SlateConfig, sources: &mut ConfigSources) {
    if let Ok(v) = env::var("SLATE_BASE_URL") {
        config.base_url = v;
        sources.env_overrides.push("SLATE_BASE_URL".to_string());
    }
    if let Ok(v) = env::var("SLATE_LOGIN_NAME") {
        config.login_name = v;
        sources.env_overrides.push("SLATE_LOGIN_NAME".to_string());
    }
    if let Ok(v) = env::var("SLATE_PASSWORD") {
        config.password = v;
        sources.env_overrides.push("SLATE_PASSWORD".to_string());
    }
    if let Ok(v) = env::var("SLATE_TIMEOUT_SECS") {
        if let Ok(secs) = v.parse() {
            config.timeout_secs = secs;
            sources.env_overrides.push("SLATE_TIMEOUT_SECS".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = SlateConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.login_name.is_empty());
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slate.toml");
        std::fs::write(
            &path,
            "base_url = \"http://tracker.example/\"\nlogin_name = \"bot\"\n",
        )
        .unwrap();

        let config = SlateConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.base_url, "http://tracker.example/");
        assert_eq!(config.login_name, "bot");
        // untouched fields keep their defaults
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slate.toml");
        std::fs::write(&path, "base_url = [not toml").unwrap();

        let err = SlateConfig::load_from(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

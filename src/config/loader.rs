// src/config/loader.rs
//! Layered configuration loader: defaults, TOML files, environment overrides

use crate::config::{constants::paths, CoachConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Prefix for environment overrides, e.g. `SWING_SCHEDULER__MIN_GAP_MS=2500`
const ENV_PREFIX: &str = "SWING_";
/// Separator between section and key in override variable names
const ENV_SEPARATOR: &str = "__";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration validation errors: {}", .0.join("; "))]
    ValidationError(Vec<String>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Configuration loader merging every discovered file over the defaults
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    apply_env: bool,
}

impl ConfigLoader {
    /// Create a loader over the standard search paths
    pub fn new() -> Self {
        Self {
            config_paths: Self::discover_config_paths(),
            apply_env: true,
        }
    }

    /// Create loader with custom paths
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            apply_env: true,
        }
    }

    /// Disable `SWING_*` environment overrides
    pub fn without_env(mut self) -> Self {
        self.apply_env = false;
        self
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Load, merge and validate the configuration
    pub fn load(&self) -> Result<CoachConfig, ConfigError> {
        let mut merged = toml::Value::try_from(CoachConfig::default())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        for path in &self.config_paths {
            if !path.exists() {
                continue;
            }
            debug!(path = %path.display(), "Merging configuration file");
            let overlay = Self::load_config_file(path)?;
            merge_toml_values(&mut merged, overlay);
        }

        if self.apply_env {
            apply_environment_overrides(&mut merged, std::env::vars());
        }

        let config: CoachConfig = merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError(e.to_string()))?;
        config.validate().map_err(ConfigError::ValidationError)?;

        info!(summary = ?config.get_summary(), "Configuration loaded");
        Ok(config)
    }

    /// Load a single file, failing if it is missing
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<CoachConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        Self::with_paths(vec![path.to_path_buf()]).without_env().load()
    }

    /// Write a configuration as pretty TOML
    pub fn export_config<P: AsRef<Path>>(config: &CoachConfig, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(config).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn load_config_file(path: &Path) -> Result<toml::Value, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let value: toml::Value = toml::from_str(&content)?;
        Ok(value)
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(paths::DEFAULT_CONFIG_DIR).join(paths::DEFAULT_CONFIG_FILE),
            PathBuf::from(paths::DEFAULT_CONFIG_FILE),
        ];

        // Explicit file has the highest precedence
        if let Some(explicit) = std::env::var_os(paths::CONFIG_ENV_VAR) {
            paths.push(PathBuf::from(explicit));
        }

        paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(&key) {
                    merge_toml_values(base_value, value);
                } else {
                    base_table.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

fn apply_environment_overrides(config: &mut toml::Value, vars: impl Iterator<Item = (String, String)>) {
    for (key, value) in vars {
        let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let Some((section, field)) = stripped.split_once(ENV_SEPARATOR) else {
            continue;
        };

        let section = section.to_lowercase();
        let field = field.to_lowercase();
        if let toml::Value::Table(root) = config {
            if let Some(toml::Value::Table(table)) = root.get_mut(&section) {
                debug!(section = %section, field = %field, "Applying environment override");
                table.insert(field, parse_env_value(&value));
            }
        }
    }
}

fn parse_env_value(value: &str) -> toml::Value {
    if let Ok(int_val) = value.parse::<i64>() {
        toml::Value::Integer(int_val)
    } else if let Ok(float_val) = value.parse::<f64>() {
        toml::Value::Float(float_val)
    } else if let Ok(bool_val) = value.parse::<bool>() {
        toml::Value::Boolean(bool_val)
    } else {
        toml::Value::String(value.to_string())
    }
}

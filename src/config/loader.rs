// src/config/loader.rs
//! Layered configuration loader: defaults, TOML files, then environment overrides

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::{constants::paths, BlinkConfig};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required file does not exist
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
    /// TOML that does not parse or does not fit the schema
    #[error("Configuration parse error: {0}")]
    ParseError(String),
    /// Every rule the merged configuration violates
    #[error("Configuration validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
    /// Reading or writing a file failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Configuration loader merging files in order of precedence.
///
/// Later paths override keys of earlier ones; missing files are skipped.
/// Environment variables named `BLINK__<SECTION>__<KEY>` override last.
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader over the conventional locations
    pub fn new() -> Self {
        Self::with_paths(vec![
            PathBuf::from(paths::DEFAULT_CONFIG_FILE),
            PathBuf::from(paths::LOCAL_CONFIG_FILE),
        ])
    }

    /// Create loader with custom paths
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: paths::ENV_PREFIX.to_string(),
        }
    }

    /// Use a different environment prefix (e.g. to isolate tests)
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Load, merge and validate the configuration
    pub fn load(&self) -> Result<BlinkConfig, ConfigError> {
        let mut merged = toml::Value::try_from(BlinkConfig::default())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        for config_path in &self.config_paths {
            match Self::load_config_file(config_path) {
                Ok(file_config) => {
                    debug!(path = %config_path.display(), "merging configuration file");
                    merge_toml_values(&mut merged, file_config);
                }
                Err(ConfigError::FileNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        self.apply_environment_overrides(&mut merged);

        let config: BlinkConfig = merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a single file strictly: it must exist and validate on its own
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<BlinkConfig, ConfigError> {
        let value = Self::load_config_file(path.as_ref())?;
        let config: BlinkConfig = value.try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Write `config` as pretty TOML
    pub fn export_config<P: AsRef<Path>>(config: &BlinkConfig, path: P) -> Result<(), ConfigError> {
        let toml_content =
            toml::to_string_pretty(config).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Files consulted, in merge order
    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    fn load_config_file(path: &Path) -> Result<toml::Value, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: toml::Value = toml::from_str(&content)?;
        Ok(config)
    }

    fn apply_environment_overrides(&self, config: &mut toml::Value) {
        for (key, value) in std::env::vars() {
            let Some(path) = key.strip_prefix(&self.env_prefix) else {
                continue;
            };
            let parts: Vec<String> = path.split("__").map(str::to_lowercase).collect();
            if parts.iter().any(String::is_empty) {
                continue;
            }
            debug!(variable = %key, "applying environment override");
            set_nested_value(config, &parts, parse_env_value(&value));
        }
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

fn set_nested_value(config: &mut toml::Value, parts: &[String], value: toml::Value) {
    let Some((last, parents)) = parts.split_last() else {
        return;
    };

    let mut current = config;
    for part in parents {
        let toml::Value::Table(table) = current else {
            return;
        };
        current = table
            .entry(part.clone())
            .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
    }

    if let toml::Value::Table(table) = current {
        // Float fields given as integers ("300") must stay floats
        let value = match (table.get(last), value) {
            (Some(toml::Value::Float(_)), toml::Value::Integer(i)) => toml::Value::Float(i as f64),
            (_, value) => value,
        };
        table.insert(last.clone(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let loader = ConfigLoader::with_paths(vec![PathBuf::from("/nonexistent/blink.toml")])
            .with_env_prefix("BLINK_TEST_DEFAULTS__");
        let config = loader.load().unwrap();
        assert_eq!(config, BlinkConfig::default());
    }

    #[test]
    fn test_later_files_override_earlier() {
        let base = write_config(
            r#"
[detection]
threshold_uv = 250.0
warmup_sec = 2.0
"#,
        );
        let local = write_config(
            r#"
[detection]
threshold_uv = 400.0
"#,
        );

        let loader = ConfigLoader::with_paths(vec![
            base.path().to_path_buf(),
            local.path().to_path_buf(),
        ])
        .with_env_prefix("BLINK_TEST_LAYERS__");
        let config = loader.load().unwrap();

        assert_eq!(config.detection.threshold_uv, 400.0);
        assert_eq!(config.detection.warmup_sec, 2.0);
        assert_eq!(config.detection.block_sec, BlinkConfig::default().detection.block_sec);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let file = write_config(
            r#"
[filter]
low_cutoff_hz = 20.0
high_cutoff_hz = 10.0
"#,
        );

        let loader = ConfigLoader::with_paths(vec![file.path().to_path_buf()])
            .with_env_prefix("BLINK_TEST_INVALID__");
        assert!(matches!(loader.load(), Err(ConfigError::Validation(_))));
        assert!(ConfigLoader::load_file(file.path()).is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let file = write_config("[detection\nthreshold_uv = ");
        assert!(matches!(
            ConfigLoader::load_file(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_environment_override() {
        std::env::set_var("BLINK_TEST_ENV__DETECTION__THRESHOLD_UV", "450");
        std::env::set_var("BLINK_TEST_ENV__DEVICE__SERIAL_PORT", "COM6");

        let loader = ConfigLoader::with_paths(Vec::new()).with_env_prefix("BLINK_TEST_ENV__");
        let config = loader.load().unwrap();

        assert_eq!(config.detection.threshold_uv, 450.0);
        assert_eq!(config.device.serial_port, "COM6");

        std::env::remove_var("BLINK_TEST_ENV__DETECTION__THRESHOLD_UV");
        std::env::remove_var("BLINK_TEST_ENV__DEVICE__SERIAL_PORT");
    }

    #[test]
    fn test_config_export_roundtrip() {
        let mut config = BlinkConfig::default();
        config.device.channel_index = 1;
        let temp_file = NamedTempFile::new().unwrap();

        ConfigLoader::export_config(&config, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("[detection]"));
        assert_eq!(ConfigLoader::load_file(temp_file.path()).unwrap(), config);
    }

    #[test]
    fn test_default_paths() {
        let loader = ConfigLoader::new();
        assert_eq!(loader.config_paths().len(), 2);
    }
}

//! Repository configuration file support.
//!
//! This module provides utilities for reading repository selection and
//! default forecast settings from TOML configuration files. All forecast
//! settings remain overridable per call; the file only supplies defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::factory::RepositoryType;
use super::repository::RepositoryError;

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub forecast: ForecastSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// Default forecast parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSettings {
    #[serde(default = "default_lookback_years")]
    pub lookback_years: u32,
    #[serde(default = "default_min_records")]
    pub min_records: usize,
    #[serde(default = "default_lookahead_months")]
    pub lookahead_months: u32,
    #[serde(default = "default_cache_staleness_hours")]
    pub cache_staleness_hours: i64,
    #[serde(default = "default_seasonal_min_records")]
    pub seasonal_min_records: usize,
}

fn default_lookback_years() -> u32 {
    3
}

fn default_min_records() -> usize {
    2
}

fn default_lookahead_months() -> u32 {
    6
}

fn default_cache_staleness_hours() -> i64 {
    24
}

fn default_seasonal_min_records() -> usize {
    4
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            lookback_years: default_lookback_years(),
            min_records: default_min_records(),
            lookahead_months: default_lookahead_months(),
            cache_staleness_hours: default_cache_staleness_hours(),
            seasonal_min_records: default_seasonal_min_records(),
        }
    }
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: RepositoryConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load repository configuration from the default location.
    ///
    /// Searches for `forecast.toml` in:
    /// 1. Current directory
    /// 2. Parent directory
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if found and parsed successfully
    /// * `Err(RepositoryError)` if no config file found or parse error
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = vec![
            PathBuf::from("forecast.toml"),
            PathBuf::from("../forecast.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(
            "No forecast.toml found in standard locations",
        ))
    }

    /// Parse the configured repository type.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        self.repository.repo_type.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [repository]
            type = "local"

            [forecast]
            lookback_years = 5
            lookahead_months = 12
        "#;
        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.repository.repo_type, "local");
        assert_eq!(config.forecast.lookback_years, 5);
        assert_eq!(config.forecast.lookahead_months, 12);
        // Unspecified keys fall back to documented defaults
        assert_eq!(config.forecast.min_records, 2);
        assert_eq!(config.forecast.cache_staleness_hours, 24);
        assert_eq!(config.forecast.seasonal_min_records, 4);
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [repository]
            type = "local"
        "#;
        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.forecast.lookback_years, 3);
        assert_eq!(config.forecast.lookahead_months, 6);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[repository]\ntype = \"local\"").unwrap();

        let config = RepositoryConfig::from_file(file.path()).unwrap();
        assert_eq!(config.repository.repo_type, "local");
    }

    #[test]
    fn test_from_file_missing() {
        let result = RepositoryConfig::from_file("/nonexistent/forecast.toml");
        assert!(result.is_err());
    }
}

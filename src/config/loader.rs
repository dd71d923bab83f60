//! Configuration Loader
//!
//! Environment-aware loading: built-in defaults, then `matcher.yaml`, then
//! `matcher.<environment>.yaml`, then `MATCHER__`-prefixed environment
//! variables. Every file is optional.

use super::error::{ConfigResult, ConfigurationError};
use super::MatcherConfig;
use config::{Config, Environment, File, FileFormat, Map};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Prefix of environment variables that override configuration values
pub const ENV_PREFIX: &str = "MATCHER";
/// Separator between the prefix and nested keys (`MATCHER__RETRY__MAX_ATTEMPTS`)
pub const ENV_SEPARATOR: &str = "__";
pub const BASE_FILE_NAME: &str = "matcher";

/// Loaded, validated configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: MatcherConfig,
    environment: String,
    config_directory: PathBuf,
    loaded_files: Vec<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_with_overrides(config_dir, environment, None)
    }

    /// Load configuration with an explicit set of override variables
    ///
    /// `overrides` replaces the process environment as the source of
    /// `MATCHER__*` variables; `None` reads the real environment. Useful for
    /// testing without modifying global environment variables.
    pub fn load_with_overrides(
        config_dir: Option<PathBuf>,
        environment: &str,
        overrides: Option<Map<String, String>>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let defaults = Config::try_from(&MatcherConfig::default())
            .map_err(|e| ConfigurationError::parse_error("built-in defaults", e))?;
        let mut builder = Config::builder().add_source(defaults);

        let mut loaded_files = Vec::new();
        for path in Self::candidate_files(&config_directory, environment) {
            if !path.is_file() {
                continue;
            }
            debug!("Applying configuration file: {}", path.display());
            builder = builder.add_source(
                File::new(&path.to_string_lossy(), FileFormat::Yaml).required(true),
            );
            loaded_files.push(path);
        }

        let mut environment_source = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("discovery.eligible_statuses");
        if let Some(vars) = overrides {
            environment_source = environment_source.source(Some(vars));
        }
        builder = builder.add_source(environment_source);

        let merged = builder.build().map_err(|e| {
            ConfigurationError::parse_error(Self::describe_sources(&loaded_files), e)
        })?;
        let config: MatcherConfig = merged.try_deserialize().map_err(|e| {
            ConfigurationError::parse_error(
                Self::describe_sources(&loaded_files),
                format!("failed to deserialize merged configuration: {e}"),
            )
        })?;

        config.validate()?;

        info!(
            environment = %environment,
            files = loaded_files.len(),
            max_candidates = config.pipeline.max_candidates,
            extraction_concurrency = config.pipeline.extraction_concurrency,
            matching_concurrency = config.pipeline.matching_concurrency,
            "⚙️ CONFIG: Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
            loaded_files,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Get the current environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Get the configuration directory
    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Files that contributed to the configuration, lowest precedence first
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded_files
    }

    /// Detect current environment: MATCHER_ENV || APP_ENV || 'development'
    pub fn detect_environment() -> String {
        env::var("MATCHER_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn default_config_directory() -> PathBuf {
        PathBuf::from("config")
    }

    fn candidate_files(config_directory: &Path, environment: &str) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for stem in [
            BASE_FILE_NAME.to_string(),
            format!("{BASE_FILE_NAME}.{environment}"),
        ] {
            let yaml = config_directory.join(format!("{stem}.yaml"));
            let path = if yaml.exists() {
                yaml
            } else {
                config_directory.join(format!("{stem}.yml"))
            };
            files.push(path);
        }
        files
    }

    fn describe_sources(files: &[PathBuf]) -> String {
        if files.is_empty() {
            "defaults and environment".to_string()
        } else {
            files
                .iter()
                .map(|f| f.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn isolated() -> Option<Map<String, String>> {
        Some(Map::new())
    }

    fn write(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).expect("write config file");
    }

    #[test]
    fn test_missing_directory_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::load_with_overrides(
            Some(dir.path().join("absent")),
            "test",
            isolated(),
        )
        .unwrap();

        assert_eq!(manager.config(), &MatcherConfig::default());
        assert!(manager.loaded_files().is_empty());
        assert_eq!(manager.environment(), "test");
    }

    #[test]
    fn test_environment_file_overrides_base() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "matcher.yaml",
            "pipeline:\n  max_candidates: 10\n  extraction_concurrency: 2\nretry:\n  base_delay_ms: 250\n",
        );
        write(&dir, "matcher.test.yaml", "pipeline:\n  max_candidates: 4\n");

        let manager =
            ConfigManager::load_with_overrides(Some(dir.path().to_path_buf()), "test", isolated())
                .unwrap();
        let config = manager.config();

        assert_eq!(config.pipeline.max_candidates, 4);
        assert_eq!(config.pipeline.extraction_concurrency, 2);
        assert_eq!(config.pipeline.matching_concurrency, 5);
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(manager.loaded_files().len(), 2);
    }

    #[test]
    fn test_other_environment_file_ignored() {
        let dir = TempDir::new().unwrap();
        write(&dir, "matcher.production.yaml", "pipeline:\n  max_candidates: 50\n");

        let manager =
            ConfigManager::load_with_overrides(Some(dir.path().to_path_buf()), "test", isolated())
                .unwrap();
        assert_eq!(manager.config().pipeline.max_candidates, 20);
    }

    #[test]
    fn test_environment_variables_take_precedence() {
        let dir = TempDir::new().unwrap();
        write(&dir, "matcher.yaml", "pipeline:\n  max_candidates: 10\n");

        let mut vars = Map::new();
        vars.insert(
            "MATCHER__PIPELINE__MAX_CANDIDATES".to_string(),
            "7".to_string(),
        );
        vars.insert(
            "MATCHER__DISCOVERY__ELIGIBLE_STATUSES".to_string(),
            "RECRUITING,ACTIVE_NOT_RECRUITING".to_string(),
        );
        vars.insert("UNRELATED__PIPELINE__MAX_CANDIDATES".to_string(), "1".to_string());

        let manager =
            ConfigManager::load_with_overrides(Some(dir.path().to_path_buf()), "test", Some(vars))
                .unwrap();
        let config = manager.config();

        assert_eq!(config.pipeline.max_candidates, 7);
        assert_eq!(
            config.discovery.eligible_statuses,
            vec!["RECRUITING".to_string(), "ACTIVE_NOT_RECRUITING".to_string()]
        );
    }

    #[test]
    fn test_invalid_value_rejected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "matcher.yaml", "pipeline:\n  matching_concurrency: 0\n");

        let result =
            ConfigManager::load_with_overrides(Some(dir.path().to_path_buf()), "test", isolated());
        match result {
            Err(ConfigurationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "pipeline.matching_concurrency");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "matcher.yaml", "pipeline: [unterminated\n");

        let result =
            ConfigManager::load_with_overrides(Some(dir.path().to_path_buf()), "test", isolated());
        assert!(matches!(result, Err(ConfigurationError::ParseError { .. })));
    }

    #[test]
    fn test_yml_extension_supported() {
        let dir = TempDir::new().unwrap();
        write(&dir, "matcher.yml", "retry:\n  max_attempts: 6\n");

        let manager =
            ConfigManager::load_with_overrides(Some(dir.path().to_path_buf()), "test", isolated())
                .unwrap();
        assert_eq!(manager.config().retry.max_attempts, 6);
    }
}

//! Configuration loader using figment.
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: `relay.toml` and `relay.{profile}.toml`
//! - `yaml-config`: `relay.yaml` / `relay.yml` and their profile variants
//!
//! Both can be enabled; every enabled format is searched.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Programmatic values passed to [`ConfigLoader::merge`]
//! 3. Main config file (`relay.toml`)
//! 4. Profile-specific config file (`relay.{profile}.toml`)
//! 5. Environment variables (`RELAY_*`)
//!
//! # Environment Variable Mapping
//!
//! The `RELAY_` prefix is stripped and `__` separates nesting levels:
//!
//! - `RELAY_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `RELAY_HUB__GLOBAL=false` → `hub.global = false`
//! - `RELAY_HUB__CALL_DELEGATE_ID=Calls` → `hub.call_delegate_id = "Calls"`
//!
//! `RELAY_PROFILE` selects the profile.
//!
//! # Example
//!
//! ```rust,ignore
//! use relay_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .with_current_dir()
//!     .load()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::RelayConfig;
use super::validation::validate_config;

const ENV_PREFIX: &str = "RELAY_";
const PROFILE_VAR: &str = "RELAY_PROFILE";
const FILE_STEM: &str = "relay";

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name, accepting `dev` and `prod` as short forms.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads `RELAY_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Programmatic values, layered over the defaults.
    figment: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a search path for configuration files.
    ///
    /// Without any, the current directory and the user config directory are
    /// searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    /// Adds `<config dir>/relay` to the search paths.
    pub fn with_user_config_dir(self) -> Self {
        match dirs::config_dir() {
            Some(dir) => self.search_path(dir.join(FILE_STEM)),
            None => self,
        }
    }

    /// Loads exactly this file instead of searching.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges configuration values programmatically.
    pub fn merge(mut self, config: RelayConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads, validates and returns the configuration.
    pub fn load(self) -> ConfigResult<RelayConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: RelayConfig = figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        validate_config(&config)?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            global = config.hub.global,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(RelayConfig::default()));
        figment = figment.merge(std::mem::take(&mut self.figment));

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = merge_config_file(figment, path)?;
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!(prefix = ENV_PREFIX, "Loading environment variables");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment)
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(FILE_STEM));
        }
        paths
    }

    /// Merges the first directory's main file and its profile variant.
    ///
    /// Returns whether a main file was found.
    #[cfg(any(feature = "toml-config", feature = "yaml-config"))]
    fn load_format_files(
        &self,
        figment: &mut Figment,
        search_paths: &[PathBuf],
        extensions: &[&str],
    ) -> ConfigResult<bool> {
        for dir in search_paths {
            for ext in extensions {
                let main = dir.join(format!("{FILE_STEM}.{ext}"));
                if !main.exists() {
                    continue;
                }
                info!(path = %main.display(), "Loading configuration file");
                *figment = merge_config_file(std::mem::take(figment), &main)?;

                let profiled = dir.join(format!("{FILE_STEM}.{}.{ext}", self.profile));
                if profiled.exists() {
                    debug!(path = %profiled.display(), "Loading profile-specific config");
                    *figment = merge_config_file(std::mem::take(figment), &profiled)?;
                }
                return Ok(true);
            }
        }
        Ok(false)
    }

    #[allow(unused_mut)]
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        let search_paths = self.resolve_search_paths();
        let mut found = false;

        #[cfg(feature = "toml-config")]
        {
            match self.load_format_files(&mut figment, &search_paths, &["toml"]) {
                Ok(ok) => found |= ok,
                Err(e) => warn!(error = %e, "Skipping TOML configuration"),
            }
        }

        #[cfg(feature = "yaml-config")]
        {
            match self.load_format_files(&mut figment, &search_paths, &["yaml", "yml"]) {
                Ok(ok) => found |= ok,
                Err(e) => warn!(error = %e, "Skipping YAML configuration"),
            }
        }

        if !found {
            warn!(
                search_paths = ?search_paths,
                "No configuration file found, using defaults"
            );
        }
        figment
    }
}

/// Merges a single config file, dispatching on its extension.
///
/// Only extensions enabled via feature flags are accepted.
fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        _ => Err(ConfigError::ParseError(format!(
            "Unsupported or disabled configuration file format: .{ext}"
        ))),
    }
}

/// Loads configuration from the current directory and the environment.
pub fn load_config() -> ConfigResult<RelayConfig> {
    ConfigLoader::new().with_current_dir().load()
}

/// Loads configuration from `path` and the environment.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<RelayConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogLevel, LogOutput};
    use figment::Jail;

    #[test]
    fn test_default_config() {
        Jail::expect_with(|_| {
            let config = ConfigLoader::new()
                .with_current_dir()
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config, RelayConfig::default());
            assert_eq!(config.logging.level.as_str(), "info");
            Ok(())
        });
    }

    #[test]
    fn test_profile_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env(PROFILE_VAR, "prod");
            assert_eq!(Profile::from_env(), Profile::Production);

            jail.set_env(PROFILE_VAR, "Staging");
            assert_eq!(Profile::from_env(), Profile::Custom("staging".to_string()));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("RELAY_LOGGING__LEVEL", "trace");
            jail.set_env("RELAY_HUB__GLOBAL", "false");
            jail.set_env("RELAY_HUB__CALL_DELEGATE_ID", "Calls");

            let config = ConfigLoader::new()
                .with_current_dir()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.logging.level, LogLevel::Trace);
            assert!(!config.hub.global);
            assert_eq!(config.hub.call_delegate_id, "Calls");
            assert_eq!(config.hub.channel_delegate_id, "SendbirdDelegateProxy");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_env_value_fails_validation() {
        Jail::expect_with(|jail| {
            jail.set_env("RELAY_HUB__USER_DELEGATE_ID", "two words");

            let result = ConfigLoader::new().with_current_dir().load();
            assert!(matches!(result, Err(ConfigError::InvalidIdentifier { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::new()
            .file("/nonexistent/relay.toml")
            .without_env()
            .load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_file_then_profile_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "relay.toml",
                r#"
                    [logging]
                    level = "debug"
                    output = "stderr"

                    [hub]
                    channel_delegate_id = "FromFile"
                    user_delegate_id = "FromFile"
                "#,
            )?;
            jail.create_file(
                "relay.staging.toml",
                r#"
                    [hub]
                    user_delegate_id = "FromProfile"
                    global = false
                "#,
            )?;
            jail.set_env(PROFILE_VAR, "staging");
            jail.set_env("RELAY_HUB__CHANNEL_DELEGATE_ID", "FromEnv");

            let config = ConfigLoader::new()
                .with_current_dir()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.logging.level, LogLevel::Debug);
            assert_eq!(config.logging.output, LogOutput::Stderr);
            assert_eq!(config.hub.channel_delegate_id, "FromEnv");
            assert_eq!(config.hub.user_delegate_id, "FromProfile");
            assert!(!config.hub.global);
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_explicit_file_and_merge() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[logging]\nthread_ids = true\n")?;

            let mut base = RelayConfig::default();
            base.hub.global = false;

            let config = ConfigLoader::new()
                .merge(base)
                .file("custom.toml")
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert!(config.logging.thread_ids);
            assert!(!config.hub.global);
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_file_output_without_path_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("relay.toml", "[logging]\noutput = \"file\"\n")?;

            let result = ConfigLoader::new().with_current_dir().without_env().load();
            assert!(matches!(result, Err(ConfigError::MissingField { .. })));
            Ok(())
        });
    }
}

//! Configuration module for the Relay runtime.
//!
//! Layered loading (files, environment, programmatic overrides) and
//! validation of logging and delegate proxy settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    HubConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, RelayConfig, SpanEventConfig,
};
pub use validation::validate_config;

//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{HubConfig, LogOutput, LoggingConfig, RelayConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &RelayConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_hub_config(&config.hub)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if let Some(target) = logging.filters.keys().find(|t| t.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Log filter target cannot be empty: {target:?}"
        )));
    }

    Ok(())
}

/// Delegate identifiers must be non-empty and free of whitespace.
fn validate_hub_config(hub: &HubConfig) -> ConfigResult<()> {
    for (field, id) in hub.identifiers() {
        if id.is_empty() {
            return Err(ConfigError::missing_field(field));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(ConfigError::invalid_identifier(field, id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_empty_identifier() {
        let mut config = RelayConfig::default();
        config.hub.user_delegate_id = String::new();

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(ConfigError::MissingField { field }) if field == "hub.user_delegate_id"
        ));
    }

    #[test]
    fn test_validate_identifier_with_whitespace() {
        let mut config = RelayConfig::default();
        config.hub.call_delegate_id = "call delegate".to_string();

        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::InvalidIdentifier { .. })));
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = RelayConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some(PathBuf::from("logs/relay.log"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_blank_filter_target() {
        let mut config = RelayConfig::default();
        config.logging.filters.insert(" ".to_string(), LogLevel::Debug);
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}

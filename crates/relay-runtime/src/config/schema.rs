//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use relay_adapter_sendbird::{CALL_DELEGATE_ID, CHAT_DELEGATE_ID, ProxyOptions};
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Delegate proxy settings.
    #[serde(default)]
    pub hub: HubConfig,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to `Full` without it.
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Append to `logging.file_path`.
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level for every target without a filter.
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Log file, required when `output` is `file`.
    pub file_path: Option<PathBuf>,
    pub thread_ids: bool,
    /// Include source file and line.
    pub file_location: bool,
    pub span_events: SpanEventConfig,
    /// Per-target levels, e.g. `relay_core = "trace"`.
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            file_path: None,
            thread_ids: false,
            file_location: false,
            span_events: SpanEventConfig::default(),
            filters: HashMap::new(),
        }
    }
}

// =============================================================================
// Hub
// =============================================================================

/// Delegate proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub channel_delegate_id: String,
    pub user_delegate_id: String,
    pub connection_delegate_id: String,
    pub call_delegate_id: String,

    /// Install the proxy in the process-wide slot.
    pub global: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            channel_delegate_id: CHAT_DELEGATE_ID.to_string(),
            user_delegate_id: CHAT_DELEGATE_ID.to_string(),
            connection_delegate_id: CHAT_DELEGATE_ID.to_string(),
            call_delegate_id: CALL_DELEGATE_ID.to_string(),
            global: true,
        }
    }
}

impl HubConfig {
    /// The registration identifiers as proxy options.
    pub fn to_proxy_options(&self) -> ProxyOptions {
        ProxyOptions {
            channel_delegate_id: self.channel_delegate_id.clone(),
            user_delegate_id: self.user_delegate_id.clone(),
            connection_delegate_id: self.connection_delegate_id.clone(),
            call_delegate_id: self.call_delegate_id.clone(),
        }
    }

    /// `(field, identifier)` pairs, for validation and logging.
    pub(crate) fn identifiers(&self) -> [(&'static str, &str); 4] {
        [
            ("hub.channel_delegate_id", &self.channel_delegate_id),
            ("hub.user_delegate_id", &self.user_delegate_id),
            ("hub.connection_delegate_id", &self.connection_delegate_id),
            ("hub.call_delegate_id", &self.call_delegate_id),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_defaults_match_proxy_defaults() {
        assert_eq!(HubConfig::default().to_proxy_options(), ProxyOptions::default());
        assert!(HubConfig::default().global);
    }

    #[test]
    fn test_log_level_names() {
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
    }
}

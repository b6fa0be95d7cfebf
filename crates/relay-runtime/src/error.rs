//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while building a [`Runtime`](crate::Runtime).
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Neither a chat nor a calls SDK was supplied.
    #[error("No SDK configured: supply a chat SDK, a calls SDK, or both")]
    NoSdk,

    /// `hub.global` is set but the process-wide proxy already exists.
    #[error("A process-wide delegate proxy is already installed")]
    ProxyAlreadyInstalled,
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

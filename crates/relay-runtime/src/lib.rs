//! Relay Runtime - configuration, logging and lifecycle for the event hub.
//!
//! This crate provides:
//! - Layered configuration (`relay.toml`, profiles, `RELAY_*` variables)
//! - Logging setup on `tracing-subscriber`
//! - [`Runtime`], which registers a [`DelegateProxy`] from configuration and
//!   tears it down on shutdown
//!
//! ```ignore
//! use relay_runtime::Runtime;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), relay_runtime::RuntimeError> {
//!     let runtime = Runtime::builder().chat(chat_sdk).build()?;
//!
//!     let proxy = runtime.proxy().clone();
//!     tokio::spawn(async move {
//!         let mut events = proxy.connection_events();
//!         while let Some(event) = events.recv().await {
//!             tracing::info!(event = event.name(), "Connection");
//!         }
//!     });
//!
//!     runtime.run().await;
//!     Ok(())
//! }
//! ```
//!
//! [`DelegateProxy`]: relay_adapter_sendbird::DelegateProxy

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, HubConfig, LoggingConfig, RelayConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{Runtime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros and span helpers.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}

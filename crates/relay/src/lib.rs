//! # Relay
//!
//! Streams and futures over the callback-based Sendbird chat and calls SDKs.
//!
//! ## Overview
//!
//! The SDKs report events to registered delegates and results to completion
//! handlers. Relay registers a single delegate per category and fans events
//! out to any number of per-entity views, and turns every completion-handler
//! operation into a future or a stream:
//!
//! ```text
//! ┌───────────┐      ┌───────────────┐     ┌───────────────────────┐
//! │ Chat SDK  │─────▶│               │────▶│ view_for("channel-42")│
//! └───────────┘      │ DelegateProxy │────▶│ user_events()         │
//! ┌───────────┐      │               │────▶│ direct_call_events(c) │
//! │ Calls SDK │─────▶│               │────▶│ ...                   │
//! └───────────┘      └───────────────┘     └───────────────────────┘
//!
//! ChatClient / CallsClient ── CallbackFuture | ProgressStream | PendingSend
//! ```
//!
//! - **Core**: broadcasts, filtered views and the request shapes
//! - **Adapter**: the SDK contract, the delegate proxy and the clients
//! - **Runtime**: configuration, logging and proxy lifecycle
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use relay::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), RuntimeError> {
//!     let runtime = Runtime::builder().chat(chat_sdk).build()?;
//!     let chat = runtime.chat().unwrap();
//!
//!     chat.connect("alice", None).await.ok();
//!
//!     let mut send = chat.send_user_message("channel-42", &UserMessageParams::text("hi"));
//!     while let Some(event) = send.next().await {
//!         match event {
//!             Ok(SendEvent::Pending(m)) => info!(request_id = ?m.request_id, "Pending"),
//!             Ok(SendEvent::Sent(m)) => info!(message_id = m.message_id, "Sent"),
//!             Ok(SendEvent::Progress(_)) => {}
//!             Err(e) => warn!(error = %e, "Send failed"),
//!         }
//!     }
//!
//!     runtime.run().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output
//! - `mock`: in-process SDK doubles for tests

pub use relay_adapter_sendbird as sendbird;
pub use relay_core as core;
pub use relay_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use relay::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use relay_runtime::{RelayConfig, Runtime, RuntimeError};

    // Hub and clients
    pub use relay_adapter_sendbird::{
        CallsClient, ChatClient, DelegateProxy, PagedQuery, PagedQueryExt,
    };

    // Events
    pub use relay_adapter_sendbird::{
        CallEvent, ChannelEvent, ConnectionEvent, DirectCallEvent, UserEvent,
    };

    // Parameters and models most operations take
    pub use relay_adapter_sendbird::{
        Channel, DirectCall, FileMessageParams, Message, SdkError, User, UserMessageParams,
    };

    // Request shapes and their errors
    pub use relay_core::prelude::*;

    // Logging macros
    pub use relay_runtime::prelude::*;
}

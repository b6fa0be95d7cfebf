//! Runtime lifecycle: configuration in, a registered delegate proxy out.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use relay_runtime::Runtime;
//!
//! let runtime = Runtime::builder()
//!     .chat(chat_sdk)
//!     .calls(calls_sdk)
//!     .profile("production")
//!     .build()?;
//!
//! let mut events = runtime.proxy().view_for("channel-42");
//! runtime.run().await;
//! ```
//!
//! Building loads and validates the configuration, installs logging and
//! registers the proxy with the supplied SDKs. [`Runtime::shutdown`] (or
//! [`Runtime::run`] returning) deregisters it and ends every view.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use relay_adapter_sendbird::{CallsClient, CallsSdk, ChatClient, ChatSdk, DelegateProxy};
use tokio::signal;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigLoader, RelayConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// A configured delegate proxy and the clients for its SDKs.
pub struct Runtime {
    config: RelayConfig,
    proxy: Arc<DelegateProxy>,
    chat: Option<ChatClient>,
    calls: Option<CallsClient>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn proxy(&self) -> &Arc<DelegateProxy> {
        &self.proxy
    }

    pub fn chat(&self) -> Option<&ChatClient> {
        self.chat.as_ref()
    }

    pub fn calls(&self) -> Option<&CallsClient> {
        self.calls.as_ref()
    }

    /// Whether the proxy lives in the process-wide slot.
    pub fn is_global(&self) -> bool {
        self.config.hub.global
    }

    /// Deregisters the proxy and ends its views. Idempotent.
    ///
    /// A global proxy is also removed from the process-wide slot, so a later
    /// runtime can install its own.
    pub fn shutdown(&self) {
        if self.is_global()
            && DelegateProxy::current().is_some_and(|current| Arc::ptr_eq(&current, &self.proxy))
        {
            DelegateProxy::shutdown_instance();
        }
        self.proxy.shutdown();
        info!("Relay runtime stopped");
    }

    /// Runs until Ctrl+C (or SIGTERM on Unix), then shuts down.
    pub async fn run(&self) {
        info!("Relay runtime is now running. Press Ctrl+C to stop.");
        wait_for_shutdown().await;
        self.shutdown();
    }

    /// Runs until `shutdown` completes, then shuts down.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        shutdown.await;
        self.shutdown();
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("proxy", &self.proxy)
            .field("chat", &self.chat.is_some())
            .field("calls", &self.calls.is_some())
            .finish()
    }
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    config: Option<RelayConfig>,
    chat: Option<Arc<dyn ChatSdk>>,
    calls: Option<Arc<dyn CallsSdk>>,
    init_logging: bool,
}

impl RuntimeBuilder {
    /// Loads configuration from the current directory and the environment
    /// unless [`config`](Self::config) is given.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            config: None,
            chat: None,
            calls: None,
            init_logging: true,
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Uses `config` as is, skipping files and environment.
    pub fn config(mut self, config: RelayConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn chat(mut self, sdk: Arc<dyn ChatSdk>) -> Self {
        self.chat = Some(sdk);
        self
    }

    pub fn calls(mut self, sdk: Arc<dyn CallsSdk>) -> Self {
        self.calls = Some(sdk);
        self
    }

    /// Whether to install the global subscriber (default: true).
    pub fn init_logging(mut self, enabled: bool) -> Self {
        self.init_logging = enabled;
        self
    }

    /// Loads configuration and registers the proxy.
    pub fn build(self) -> RuntimeResult<Runtime> {
        let config = match self.config {
            Some(config) => {
                validate_config(&config)?;
                config
            }
            None => self.config_loader.load()?,
        };

        if self.init_logging && !logging::init_from_config(&config.logging) {
            debug!("A global subscriber is already installed, keeping it");
        }

        if self.chat.is_none() && self.calls.is_none() {
            return Err(RuntimeError::NoSdk);
        }

        let mut proxy_builder = DelegateProxy::builder().options(config.hub.to_proxy_options());
        if let Some(sdk) = &self.chat {
            proxy_builder = proxy_builder.chat(sdk.clone());
        }
        if let Some(sdk) = &self.calls {
            proxy_builder = proxy_builder.calls(sdk.clone());
        }

        let proxy = if config.hub.global {
            DelegateProxy::try_instance(proxy_builder).ok_or(RuntimeError::ProxyAlreadyInstalled)?
        } else {
            Arc::new(proxy_builder.build())
        };

        info!(
            global = config.hub.global,
            chat = self.chat.is_some(),
            calls = self.calls.is_some(),
            "Relay runtime initialized"
        );

        Ok(Runtime {
            config,
            proxy,
            chat: self.chat.map(ChatClient::new),
            calls: self.calls.map(CallsClient::new),
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, HubConfig};
    use relay_adapter_sendbird::mock::{MockCallsSdk, MockChatSdk};
    use relay_adapter_sendbird::{
        Channel, ChannelDelegate, ChannelEvent, ConnectionDelegate, ConnectionEvent, HubState,
    };

    fn local_config() -> RelayConfig {
        RelayConfig {
            hub: HubConfig {
                global: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn local_runtime(chat: &Arc<MockChatSdk>, calls: &Arc<MockCallsSdk>) -> Runtime {
        Runtime::builder()
            .config(local_config())
            .init_logging(false)
            .chat(chat.clone())
            .calls(calls.clone())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_registers_once_and_relays() {
        let chat = Arc::new(MockChatSdk::default());
        let calls = Arc::new(MockCallsSdk::default());
        let runtime = local_runtime(&chat, &calls);

        assert_eq!(runtime.proxy().state(), HubState::Registered);
        assert_eq!(chat.channel_registrations(), 1);
        assert_eq!(chat.connection_registrations(), 1);
        assert_eq!(calls.registrations(), 1);
        assert!(runtime.chat().is_some() && runtime.calls().is_some());

        let mut channel = runtime.proxy().view_for("c1");
        let mut connection = runtime.proxy().connection_events();
        chat.emit_channel(|d| d.channel_changed(&Channel::group("c1")));
        chat.emit_connection(|d| d.reconnection_started());

        assert!(matches!(channel.recv().await, Some(ChannelEvent::Changed)));
        assert_eq!(
            connection.recv().await,
            Some(ConnectionEvent::ReconnectionStarted)
        );
    }

    #[test]
    fn test_identifiers_from_config() {
        let chat = Arc::new(MockChatSdk::default());
        let mut config = local_config();
        config.hub.channel_delegate_id = "ChannelHub".to_string();

        let runtime = Runtime::builder()
            .config(config)
            .init_logging(false)
            .chat(chat.clone())
            .build()
            .unwrap();

        assert_eq!(chat.channel_identifiers(), vec!["ChannelHub".to_string()]);
        assert_eq!(runtime.proxy().options().channel_delegate_id, "ChannelHub");
        assert!(runtime.calls().is_none());
    }

    #[test]
    fn test_requires_an_sdk() {
        let result = Runtime::builder()
            .config(local_config())
            .init_logging(false)
            .build();
        assert!(matches!(result, Err(RuntimeError::NoSdk)));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = local_config();
        config.hub.connection_delegate_id = String::new();

        let result = Runtime::builder()
            .config(config)
            .init_logging(false)
            .chat(Arc::new(MockChatSdk::default()))
            .build();
        assert!(matches!(
            result,
            Err(RuntimeError::Config(ConfigError::MissingField { .. }))
        ));
    }

    #[test]
    fn test_run_until_shuts_down() {
        let chat = Arc::new(MockChatSdk::default());
        let calls = Arc::new(MockCallsSdk::default());
        let runtime = local_runtime(&chat, &calls);
        let mut view = runtime.proxy().user_events();

        tokio_test::block_on(runtime.run_until(async {}));

        assert_eq!(runtime.proxy().state(), HubState::Unregistered);
        assert_eq!(chat.channel_delegate_count(), 0);
        assert_eq!(calls.delegate_count(), 0);
        assert_eq!(tokio_test::block_on(view.recv()), None);
    }

    // The only test that touches the process-wide slot.
    #[test]
    fn test_global_proxy_lifecycle() {
        let chat = Arc::new(MockChatSdk::default());
        let build = || {
            Runtime::builder()
                .config(RelayConfig::default())
                .init_logging(false)
                .chat(chat.clone())
                .build()
        };

        let runtime = build().unwrap();
        assert!(runtime.is_global());
        let current = DelegateProxy::current().unwrap();
        assert!(Arc::ptr_eq(&current, runtime.proxy()));
        drop(current);

        assert!(matches!(build(), Err(RuntimeError::ProxyAlreadyInstalled)));
        assert_eq!(chat.channel_registrations(), 1);

        // Concurrent builds against an occupied slot register nothing.
        let racers: Vec<_> = (0..4)
            .map(|_| {
                let chat = chat.clone();
                std::thread::spawn(move || {
                    Runtime::builder()
                        .config(RelayConfig::default())
                        .init_logging(false)
                        .chat(chat)
                        .build()
                        .map(|_| ())
                })
            })
            .collect();
        for racer in racers {
            assert!(matches!(
                racer.join().unwrap(),
                Err(RuntimeError::ProxyAlreadyInstalled)
            ));
        }
        assert_eq!(chat.channel_registrations(), 1);

        runtime.shutdown();
        assert!(DelegateProxy::current().is_none());
        assert_eq!(runtime.proxy().state(), HubState::Unregistered);

        let again = build().unwrap();
        assert_eq!(chat.channel_registrations(), 2);
        again.shutdown();
    }
}

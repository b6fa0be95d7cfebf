//! The delegate proxy: one SDK registration, many subscribers.
//!
//! The Sendbird SDKs deliver events to delegates registered per category.
//! [`DelegateProxy`] registers once per category, republishes every callback
//! on an internal [`Broadcast`], and hands out [`FilteredView`]s so that any
//! number of consumers can follow one channel, one call, or a global category
//! without registering anything themselves.
//!
//! # Lifecycle
//!
//! ```text
//! Unregistered ──build()/instance()──▶ Registered ──shutdown()──▶ Unregistered
//! ```
//!
//! Registration happens when the proxy is built. It is undone only by
//! [`DelegateProxy::shutdown`] (or by dropping the last handle), which also ends
//! every outstanding view. Shutdown removes only the delegates registered under
//! this proxy's own identifiers, so several proxies with distinct identifiers
//! can share one SDK.
//!
//! # Example
//!
//! ```rust,ignore
//! use relay_adapter_sendbird::DelegateProxy;
//!
//! let proxy = DelegateProxy::instance(DelegateProxy::builder().chat(sdk));
//! let mut events = proxy.view_for("channel-42");
//! while let Some(event) = events.next().await {
//!     println!("{}", event.name());
//! }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use relay_core::{Broadcast, Entity, EntityId, EventEnvelope, FilteredView, Scope, Singleton};
use tracing::{debug, trace};

use crate::event::{CallEvent, ChannelEvent, ConnectionEvent, DirectCallEvent, UserEvent};
use crate::model::{Channel, DirectCall};
use crate::sdk::{
    CallDelegate, CallsSdk, ChannelDelegate, ChatSdk, ConnectionDelegate, DirectCallDelegate,
    UserDelegate,
};

/// Delegate identifier used for the chat categories by default.
pub const CHAT_DELEGATE_ID: &str = "SendbirdDelegateProxy";

/// Delegate identifier used for the calls category by default.
pub const CALL_DELEGATE_ID: &str = "SendBirdCallDelegate";

static INSTANCE: Singleton<DelegateProxy> = Singleton::new();

// =============================================================================
// Options
// =============================================================================

/// Identifiers the proxy registers its delegates under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyOptions {
    pub channel_delegate_id: String,
    pub user_delegate_id: String,
    pub connection_delegate_id: String,
    pub call_delegate_id: String,
}

impl Default for ProxyOptions {
    fn default() -> Self {
        Self {
            channel_delegate_id: CHAT_DELEGATE_ID.to_string(),
            user_delegate_id: CHAT_DELEGATE_ID.to_string(),
            connection_delegate_id: CHAT_DELEGATE_ID.to_string(),
            call_delegate_id: CALL_DELEGATE_ID.to_string(),
        }
    }
}

/// Registration state of a [`DelegateProxy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubState {
    /// Not registered with the SDKs.
    Unregistered,
    /// Registered; events are being republished.
    Registered,
}

// =============================================================================
// Relay
// =============================================================================

/// The object the SDKs actually hold as their delegate.
///
/// Kept separate from [`DelegateProxy`] so that the SDK's reference does not
/// keep the proxy alive.
struct Relay {
    channels: Broadcast<EventEnvelope<ChannelEvent>>,
    users: Broadcast<EventEnvelope<UserEvent>>,
    connection: Broadcast<EventEnvelope<ConnectionEvent>>,
    calls: Broadcast<EventEnvelope<CallEvent>>,
    direct_calls: Broadcast<EventEnvelope<DirectCallEvent>>,
    /// Calls this relay has been set as the delegate of.
    attached_calls: Mutex<HashSet<EntityId>>,
}

impl Relay {
    fn new() -> Self {
        Self {
            channels: Broadcast::new(),
            users: Broadcast::new(),
            connection: Broadcast::new(),
            calls: Broadcast::new(),
            direct_calls: Broadcast::new(),
            attached_calls: Mutex::new(HashSet::new()),
        }
    }

    fn close(&self) {
        self.channels.close();
        self.users.close();
        self.connection.close();
        self.calls.close();
        self.direct_calls.close();
        self.attached_calls.lock().clear();
    }
}

impl ChannelDelegate for Relay {
    fn channel_event(&self, channel: &Channel, event: ChannelEvent) {
        trace!(channel = %channel.url, event = event.name(), "Republishing channel event");
        self.channels.publish(EventEnvelope::for_entity(channel, event));
    }
}

impl UserDelegate for Relay {
    fn user_event(&self, event: UserEvent) {
        trace!(event = event.name(), "Republishing user event");
        self.users.publish(EventEnvelope::global(event));
    }
}

impl ConnectionDelegate for Relay {
    fn connection_event(&self, event: ConnectionEvent) {
        trace!(event = event.name(), "Republishing connection event");
        self.connection.publish(EventEnvelope::global(event));
    }
}

impl CallDelegate for Relay {
    fn call_event(&self, event: CallEvent) {
        trace!(event = event.name(), "Republishing call event");
        self.calls.publish(EventEnvelope::global(event));
    }
}

impl DirectCallDelegate for Relay {
    fn direct_call_event(&self, call: &DirectCall, event: DirectCallEvent) {
        trace!(call_id = %call.call_id, event = event.name(), "Republishing direct call event");
        let ended = event == DirectCallEvent::Ended;
        self.direct_calls.publish(EventEnvelope::for_entity(call, event));
        if ended {
            self.attached_calls.lock().remove(call.call_id.as_str());
        }
    }
}

// =============================================================================
// DelegateProxy
// =============================================================================

/// Single SDK delegate fanned out to any number of filtered views.
pub struct DelegateProxy {
    relay: Arc<Relay>,
    chat: Option<Arc<dyn ChatSdk>>,
    calls: Option<Arc<dyn CallsSdk>>,
    options: ProxyOptions,
    state: Mutex<HubState>,
}

impl DelegateProxy {
    /// Creates a builder.
    pub fn builder() -> DelegateProxyBuilder {
        DelegateProxyBuilder::default()
    }

    /// Returns the process-wide proxy, building and registering it from
    /// `builder` on first access.
    ///
    /// Later calls return the existing proxy and ignore `builder`.
    pub fn instance(builder: DelegateProxyBuilder) -> Arc<Self> {
        Self::instance_in(&INSTANCE, builder)
    }

    /// Like [`instance`](Self::instance), but uses `slot` instead of the
    /// process-wide slot.
    pub fn instance_in(slot: &Singleton<Self>, builder: DelegateProxyBuilder) -> Arc<Self> {
        slot.get_or_init(|| builder.build())
    }

    /// Builds, registers and installs the process-wide proxy from `builder`
    /// unless one already exists.
    ///
    /// Returns `None` when the slot is occupied; nothing is registered then.
    pub fn try_instance(builder: DelegateProxyBuilder) -> Option<Arc<Self>> {
        Self::try_instance_in(&INSTANCE, builder)
    }

    /// Like [`try_instance`](Self::try_instance), for `slot`.
    pub fn try_instance_in(
        slot: &Singleton<Self>,
        builder: DelegateProxyBuilder,
    ) -> Option<Arc<Self>> {
        slot.try_init(|| builder.build())
    }

    /// Returns the process-wide proxy if one exists.
    pub fn current() -> Option<Arc<Self>> {
        INSTANCE.get()
    }

    /// Removes the process-wide proxy and shuts it down.
    ///
    /// Returns `false` if there was none.
    pub fn shutdown_instance() -> bool {
        Self::shutdown_in(&INSTANCE)
    }

    /// Like [`shutdown_instance`](Self::shutdown_instance), for `slot`.
    pub fn shutdown_in(slot: &Singleton<Self>) -> bool {
        match slot.take() {
            Some(proxy) => {
                proxy.shutdown();
                true
            }
            None => false,
        }
    }

    fn register(&self) {
        let mut state = self.state.lock();
        if *state == HubState::Registered {
            return;
        }

        if let Some(chat) = &self.chat {
            chat.add_channel_delegate(self.relay.clone(), &self.options.channel_delegate_id);
            chat.add_user_delegate(self.relay.clone(), &self.options.user_delegate_id);
            chat.add_connection_delegate(self.relay.clone(), &self.options.connection_delegate_id);
            debug!(
                identifier = %self.options.channel_delegate_id,
                "Registered chat delegates"
            );
        }
        if let Some(calls) = &self.calls {
            calls.add_delegate(self.relay.clone(), &self.options.call_delegate_id);
            debug!(
                identifier = %self.options.call_delegate_id,
                "Registered call delegate"
            );
        }

        *state = HubState::Registered;
    }

    /// Removes this proxy's delegates from the SDKs and ends every
    /// outstanding view.
    ///
    /// Delegates registered under other identifiers stay in place. Idempotent.
    /// Views requested afterwards end immediately.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        if *state == HubState::Unregistered {
            return;
        }

        let options = &self.options;
        if let Some(chat) = &self.chat {
            chat.remove_channel_delegate(&options.channel_delegate_id);
            chat.remove_user_delegate(&options.user_delegate_id);
            chat.remove_connection_delegate(&options.connection_delegate_id);
        }
        if let Some(calls) = &self.calls {
            calls.remove_delegate(&options.call_delegate_id);
        }
        self.relay.close();

        *state = HubState::Unregistered;
        debug!("Delegate proxy deregistered");
    }

    /// Current registration state.
    pub fn state(&self) -> HubState {
        *self.state.lock()
    }

    /// The identifiers this proxy registers under.
    pub fn options(&self) -> &ProxyOptions {
        &self.options
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Events for the channel identified by `channel_url`.
    pub fn view_for(&self, channel_url: impl Into<EntityId>) -> FilteredView<ChannelEvent> {
        FilteredView::new(&self.relay.channels, Scope::Entity(channel_url.into()))
    }

    /// Events for `channel`, or any other snapshot of the same channel.
    pub fn channel_events(&self, channel: &impl Entity) -> FilteredView<ChannelEvent> {
        FilteredView::new(&self.relay.channels, Scope::of(channel))
    }

    /// Events about the current user.
    pub fn user_events(&self) -> FilteredView<UserEvent> {
        FilteredView::new(&self.relay.users, Scope::Global)
    }

    /// Reconnection events.
    pub fn connection_events(&self) -> FilteredView<ConnectionEvent> {
        FilteredView::new(&self.relay.connection, Scope::Global)
    }

    /// Calls-service events such as incoming calls.
    pub fn call_events(&self) -> FilteredView<CallEvent> {
        FilteredView::new(&self.relay.calls, Scope::Global)
    }

    /// Events for `call`.
    ///
    /// The first view of a given call makes the proxy that call's delegate;
    /// further views of the same call only subscribe. The association is
    /// dropped when the call ends or the proxy shuts down.
    pub fn direct_call_events(&self, call: &DirectCall) -> FilteredView<DirectCallEvent> {
        let view = FilteredView::new(&self.relay.direct_calls, Scope::of(call));

        // Held across the attach; shutdown clears the set under the same lock.
        let state = self.state.lock();
        if *state == HubState::Registered
            && let Some(calls) = &self.calls
        {
            let newly_attached = self.relay.attached_calls.lock().insert(call.entity_id());
            if newly_attached {
                calls.set_direct_call_delegate(&call.call_id, self.relay.clone());
                debug!(call_id = %call.call_id, "Attached direct call delegate");
            }
        }

        view
    }
}

impl Drop for DelegateProxy {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for DelegateProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateProxy")
            .field("state", &self.state())
            .field("chat", &self.chat.is_some())
            .field("calls", &self.calls.is_some())
            .field("options", &self.options)
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`DelegateProxy`].
#[derive(Default)]
pub struct DelegateProxyBuilder {
    chat: Option<Arc<dyn ChatSdk>>,
    calls: Option<Arc<dyn CallsSdk>>,
    options: ProxyOptions,
}

impl DelegateProxyBuilder {
    /// Registers with the chat SDK (channel, user and connection categories).
    pub fn chat(mut self, sdk: Arc<dyn ChatSdk>) -> Self {
        self.chat = Some(sdk);
        self
    }

    /// Registers with the calls SDK.
    pub fn calls(mut self, sdk: Arc<dyn CallsSdk>) -> Self {
        self.calls = Some(sdk);
        self
    }

    pub fn options(mut self, options: ProxyOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the proxy and registers it with the configured SDKs.
    pub fn build(self) -> DelegateProxy {
        let proxy = DelegateProxy {
            relay: Arc::new(Relay::new()),
            chat: self.chat,
            calls: self.calls,
            options: self.options,
            state: Mutex::new(HubState::Unregistered),
        };
        proxy.register();
        proxy
    }
}

impl fmt::Debug for DelegateProxyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateProxyBuilder")
            .field("chat", &self.chat.is_some())
            .field("calls", &self.calls.is_some())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCallsSdk, MockChatSdk};
    use crate::model::{Message, User};
    use futures::StreamExt;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    fn proxy_with(chat: &Arc<MockChatSdk>) -> DelegateProxy {
        DelegateProxy::builder().chat(chat.clone()).build()
    }

    #[tokio::test]
    async fn test_view_receives_only_its_channel() {
        let sdk = Arc::new(MockChatSdk::default());
        let proxy = proxy_with(&sdk);
        let mut forty_two = proxy.view_for("channel-42");
        let mut seven = proxy.view_for("channel-7");

        let message = Message::user("channel-42", "hello");
        sdk.emit_channel(|d| d.message_received(&Channel::group("channel-42"), message.clone()));

        assert_eq!(forty_two.next().await, Some(ChannelEvent::Received(message)));
        assert_eq!(seven.try_recv(), None);
    }

    #[test]
    fn test_registration_happens_once() {
        let sdk = Arc::new(MockChatSdk::default());
        let slot = Singleton::new();

        let first = DelegateProxy::instance_in(&slot, DelegateProxy::builder().chat(sdk.clone()));
        let views: Vec<_> = (0..50).map(|i| first.view_for(format!("channel-{i}"))).collect();
        let second = DelegateProxy::instance_in(&slot, DelegateProxy::builder().chat(sdk.clone()));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(sdk.channel_registrations(), 1);
        assert_eq!(sdk.user_registrations(), 1);
        assert_eq!(sdk.connection_registrations(), 1);
        assert_eq!(first.state(), HubState::Registered);
        drop(views);
    }

    #[test]
    fn test_snapshots_of_same_channel_route_together() {
        let sdk = Arc::new(MockChatSdk::default());
        let proxy = proxy_with(&sdk);

        let mut snapshot = Channel::group("channel-42");
        snapshot.member_count = 2;
        let mut view = proxy.channel_events(&snapshot);

        let mut later = Channel::group("channel-42");
        later.member_count = 3;
        later.name = Some("renamed".into());
        sdk.emit_channel(|d| d.channel_changed(&later));

        assert_eq!(view.try_recv(), Some(ChannelEvent::Changed));
    }

    #[test]
    fn test_open_channel_enter_maps_to_join() {
        let sdk = Arc::new(MockChatSdk::default());
        let proxy = proxy_with(&sdk);
        let mut view = proxy.view_for("lobby");

        sdk.emit_channel(|d| d.user_entered(&Channel::open("lobby"), User::new("alice")));
        sdk.emit_channel(|d| d.user_exited(&Channel::open("lobby"), User::new("alice")));

        assert_eq!(view.try_recv(), Some(ChannelEvent::UserJoined(User::new("alice"))));
        assert_eq!(view.try_recv(), Some(ChannelEvent::UserLeft(User::new("alice"))));
    }

    #[test]
    fn test_global_views() {
        let sdk = Arc::new(MockChatSdk::default());
        let proxy = proxy_with(&sdk);
        let mut users = proxy.user_events();
        let mut connection = proxy.connection_events();

        sdk.emit_user(|d| d.total_unread_message_count_updated(4, None));
        sdk.emit_connection(|d| d.reconnection_started());
        sdk.emit_connection(|d| d.reconnection_succeeded());

        assert_eq!(
            users.try_recv(),
            Some(UserEvent::UpdatedTotalUnreadMessageCount {
                total: 4,
                by_custom_type: None
            })
        );
        assert_eq!(connection.try_recv(), Some(ConnectionEvent::ReconnectionStarted));
        assert_eq!(connection.try_recv(), Some(ConnectionEvent::ReconnectionSucceeded));
    }

    #[tokio::test]
    async fn test_shutdown_deregisters_and_ends_views() {
        let sdk = Arc::new(MockChatSdk::default());
        let proxy = proxy_with(&sdk);
        let view = proxy.view_for("channel-42");

        proxy.shutdown();
        proxy.shutdown();

        assert_eq!(proxy.state(), HubState::Unregistered);
        assert_eq!(sdk.removals(), 1);
        assert_eq!(sdk.channel_delegate_count(), 0);
        assert_eq!(sdk.user_delegate_count(), 0);
        assert_eq!(sdk.connection_delegate_count(), 0);
        assert_eq!(view.collect::<Vec<_>>().await, vec![]);
        assert_eq!(proxy.view_for("channel-42").next().await, None);
    }

    #[test]
    fn test_drop_deregisters() {
        let sdk = Arc::new(MockChatSdk::default());
        drop(proxy_with(&sdk));
        assert_eq!(sdk.removals(), 1);
    }

    #[test]
    fn test_shutdown_leaves_other_registrants_in_place() {
        let sdk = Arc::new(MockChatSdk::default());
        let calls = Arc::new(MockCallsSdk::default());
        let hub = DelegateProxy::builder()
            .chat(sdk.clone())
            .calls(calls.clone())
            .build();
        let mut view = hub.view_for("c");
        let mut ringing = hub.call_events();

        let other = DelegateProxy::builder()
            .chat(sdk.clone())
            .calls(calls.clone())
            .options(ProxyOptions {
                channel_delegate_id: "other".into(),
                user_delegate_id: "other".into(),
                connection_delegate_id: "other".into(),
                call_delegate_id: "other".into(),
            })
            .build();
        assert_eq!(sdk.channel_delegate_count(), 2);
        drop(other);

        assert_eq!(sdk.channel_identifiers(), vec![CHAT_DELEGATE_ID.to_string()]);
        assert_eq!(sdk.user_delegate_count(), 1);
        assert_eq!(sdk.connection_delegate_count(), 1);
        assert_eq!(calls.delegate_count(), 1);
        assert_eq!(hub.state(), HubState::Registered);

        sdk.emit_channel(|d| d.channel_changed(&Channel::group("c")));
        calls.emit_call(|d| d.started_ringing(DirectCall::new("call-3")));
        assert_eq!(view.try_recv(), Some(ChannelEvent::Changed));
        assert_eq!(
            ringing.try_recv(),
            Some(CallEvent::StartedRinging(DirectCall::new("call-3")))
        );
    }

    #[test]
    fn test_view_wakes_only_for_its_channel() {
        let sdk = Arc::new(MockChatSdk::default());
        let proxy = proxy_with(&sdk);
        let mut view = task::spawn(proxy.view_for("channel-42"));
        assert_pending!(view.poll_next());

        sdk.emit_channel(|d| d.channel_frozen(&Channel::group("channel-7")));
        assert!(!view.is_woken());
        assert_pending!(view.poll_next());

        sdk.emit_channel(|d| d.channel_frozen(&Channel::group("channel-42")));
        assert!(view.is_woken());
        assert_ready_eq!(view.poll_next(), Some(ChannelEvent::Frozen));
    }

    #[test]
    fn test_try_instance_in_keeps_first_proxy() {
        let first_sdk = Arc::new(MockChatSdk::default());
        let second_sdk = Arc::new(MockChatSdk::default());
        let slot = Singleton::new();

        let first =
            DelegateProxy::try_instance_in(&slot, DelegateProxy::builder().chat(first_sdk.clone()));
        let second =
            DelegateProxy::try_instance_in(&slot, DelegateProxy::builder().chat(second_sdk.clone()));

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(first_sdk.channel_registrations(), 1);
        assert_eq!(second_sdk.channel_registrations(), 0);
        DelegateProxy::shutdown_in(&slot);
    }

    #[test]
    fn test_shutdown_racing_direct_call_views_leaves_nothing_attached() {
        let calls = Arc::new(MockCallsSdk::default());
        let proxy = Arc::new(DelegateProxy::builder().calls(calls.clone()).build());

        let viewers: Vec<_> = (0..4)
            .map(|t| {
                let proxy = Arc::clone(&proxy);
                std::thread::spawn(move || {
                    for n in 0..100 {
                        drop(proxy.direct_call_events(&DirectCall::new(format!("call-{t}-{n}"))));
                    }
                })
            })
            .collect();
        proxy.shutdown();
        for viewer in viewers {
            viewer.join().unwrap();
        }

        assert!(proxy.relay.attached_calls.lock().is_empty());
        let attached = calls.attached_calls().len();
        drop(proxy.direct_call_events(&DirectCall::new("late")));
        assert_eq!(calls.attached_calls().len(), attached);
    }

    #[test]
    fn test_shutdown_in_empties_slot() {
        let sdk = Arc::new(MockChatSdk::default());
        let slot = Singleton::new();

        DelegateProxy::instance_in(&slot, DelegateProxy::builder().chat(sdk.clone()));
        assert!(DelegateProxy::shutdown_in(&slot));
        assert!(!DelegateProxy::shutdown_in(&slot));

        DelegateProxy::instance_in(&slot, DelegateProxy::builder().chat(sdk.clone()));
        assert_eq!(sdk.channel_registrations(), 2);
    }

    #[test]
    fn test_custom_identifiers() {
        let sdk = Arc::new(MockChatSdk::default());
        let options = ProxyOptions {
            channel_delegate_id: "channels".into(),
            ..Default::default()
        };
        let _proxy = DelegateProxy::builder()
            .chat(sdk.clone())
            .options(options)
            .build();

        assert_eq!(sdk.channel_identifiers(), vec!["channels".to_string()]);
    }

    #[test]
    fn test_direct_call_views() {
        let calls = Arc::new(MockCallsSdk::default());
        let proxy = DelegateProxy::builder().calls(calls.clone()).build();
        assert_eq!(calls.registrations(), 1);

        let call = DirectCall::new("call-1");
        let mut first = proxy.direct_call_events(&call);
        let mut second = proxy.direct_call_events(&DirectCall::new("call-1"));
        let mut other = proxy.direct_call_events(&DirectCall::new("call-2"));
        assert_eq!(calls.attached_calls(), vec!["call-1", "call-2"]);

        calls.emit_direct_call("call-1", |d| d.connected(&call));
        calls.emit_direct_call("call-1", |d| d.ended(&call));

        for view in [&mut first, &mut second] {
            assert_eq!(view.try_recv(), Some(DirectCallEvent::Connected));
            assert_eq!(view.try_recv(), Some(DirectCallEvent::Ended));
        }
        assert_eq!(other.try_recv(), None);

        // Ended calls are re-attached on the next view.
        let _again = proxy.direct_call_events(&call);
        assert_eq!(calls.attached_calls(), vec!["call-1", "call-2", "call-1"]);
    }

    #[test]
    fn test_incoming_call_is_global() {
        let calls = Arc::new(MockCallsSdk::default());
        let proxy = DelegateProxy::builder().calls(calls.clone()).build();
        let mut ringing = proxy.call_events();

        calls.emit_call(|d| d.started_ringing(DirectCall::new("call-9")));

        assert_eq!(
            ringing.try_recv(),
            Some(CallEvent::StartedRinging(DirectCall::new("call-9")))
        );
    }
}

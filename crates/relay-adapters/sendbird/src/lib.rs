//! # Relay Adapter for Sendbird
//!
//! Streams and futures over the Sendbird chat and calls SDKs.
//!
//! ## Overview
//!
//! The SDKs are callback-based: operations take completion handlers and events
//! arrive through registered delegates. This crate provides:
//!
//! - [`DelegateProxy`]: registers once per delegate category and fans events
//!   out to per-channel, per-call and global views
//! - [`ChatClient`] and [`CallsClient`]: SDK operations as futures, progress
//!   streams and two-phase send streams
//! - [`PagedQueryExt`]: paged list queries as futures or page streams
//!
//! A binding implements [`ChatSdk`] / [`CallsSdk`] by forwarding to the native
//! SDK.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use relay_adapter_sendbird::{ChatClient, DelegateProxy, UserMessageParams};
//!
//! let proxy = DelegateProxy::instance(DelegateProxy::builder().chat(sdk.clone()));
//! let chat = ChatClient::new(sdk);
//!
//! chat.connect("alice", None).await?;
//! let mut events = proxy.view_for("channel-42");
//!
//! let mut send = chat.send_user_message("channel-42", &UserMessageParams::text("hi"));
//! while let Some(item) = send.next().await {
//!     println!("{item:?}");
//! }
//! ```
//!
//! ## Event Categories
//!
//! ```text
//! ChannelEvent      proxy.view_for(url) / proxy.channel_events(&channel)
//! UserEvent         proxy.user_events()
//! ConnectionEvent   proxy.connection_events()
//! CallEvent         proxy.call_events()
//! DirectCallEvent   proxy.direct_call_events(&call)
//! ```

pub mod calls;
pub mod chat;
pub mod event;
pub mod model;
pub mod proxy;
pub mod query;
pub mod sdk;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use calls::CallsClient;
pub use chat::{ChatClient, MessageFuture, MessageSend, SdkFuture, SdkProgress};
pub use event::{CallEvent, ChannelEvent, ConnectionEvent, DirectCallEvent, UserEvent};
pub use model::*;
pub use proxy::{
    CALL_DELEGATE_ID, CHAT_DELEGATE_ID, DelegateProxy, DelegateProxyBuilder, HubState,
    ProxyOptions,
};
pub use query::{
    DirectCallLogQuery, FriendListQuery, GroupChannelListQuery, MemberListQuery,
    MessageSearchQuery, OpenChannelListQuery, PagedQuery, PagedQueryExt, UserListQuery,
};
pub use sdk::{
    CallDelegate, CallsSdk, ChannelDelegate, ChatSdk, ConnectionDelegate, DirectCallDelegate,
    UserDelegate,
};

//! The SDK surface this crate wraps.
//!
//! [`ChatSdk`] and [`CallsSdk`] mirror the callback-style entry points of the
//! Sendbird chat and calls SDKs. A binding implements them by forwarding to the
//! native SDK; nothing in this crate talks to the network.
//!
//! The delegate traits mirror the SDK's delegate protocols, one method per
//! callback. Every method has a default that builds the matching event and
//! forwards it to a single routing method, so an implementor usually only
//! provides that one.

use std::collections::HashMap;
use std::sync::Arc;

use relay_core::{Completion, ErrorCompletion, ProgressHandler, SignalCompletion};

use crate::event::{CallEvent, ChannelEvent, ConnectionEvent, DirectCallEvent, UserEvent};
use crate::model::{
    AudioDeviceChange, AuthenticateParams, Channel, ChannelCreation, CoverImage, CustomItems,
    CustomItemsChange, DialParams, DirectCall, FileMessageParams, GroupChannelParams,
    MemberStateFilter, Message, MetaCounters, MetaData, PushTokenKind, ReactionEvent, SdkError,
    User, UserMessageParams,
};

// =============================================================================
// Chat delegates
// =============================================================================

/// Receives channel callbacks.
pub trait ChannelDelegate: Send + Sync {
    /// Routing method every other callback forwards to.
    fn channel_event(&self, channel: &Channel, event: ChannelEvent);

    fn message_received(&self, channel: &Channel, message: Message) {
        self.channel_event(channel, ChannelEvent::Received(message));
    }

    fn message_updated(&self, channel: &Channel, message: Message) {
        self.channel_event(channel, ChannelEvent::Updated(message));
    }

    fn message_deleted(&self, channel: &Channel, message_id: i64) {
        self.channel_event(channel, ChannelEvent::MessageDeleted(message_id));
    }

    fn mention_received(&self, channel: &Channel, message: Message) {
        self.channel_event(channel, ChannelEvent::ReceivedMention(message));
    }

    fn read_receipt_updated(&self, channel: &Channel) {
        self.channel_event(channel, ChannelEvent::ReadReceiptUpdated);
    }

    fn delivery_receipt_updated(&self, channel: &Channel) {
        self.channel_event(channel, ChannelEvent::DeliveryReceiptUpdated);
    }

    fn typing_status_updated(&self, channel: &Channel) {
        self.channel_event(channel, ChannelEvent::TypingStatusUpdated);
    }

    fn invitation_received(
        &self,
        channel: &Channel,
        invitees: Option<Vec<User>>,
        inviter: Option<User>,
    ) {
        self.channel_event(channel, ChannelEvent::ReceivedInvitation { invitees, inviter });
    }

    fn invitation_declined(&self, channel: &Channel, invitee: User, inviter: Option<User>) {
        self.channel_event(channel, ChannelEvent::DeclinedInvitation { invitee, inviter });
    }

    fn user_joined(&self, channel: &Channel, user: User) {
        self.channel_event(channel, ChannelEvent::UserJoined(user));
    }

    fn user_left(&self, channel: &Channel, user: User) {
        self.channel_event(channel, ChannelEvent::UserLeft(user));
    }

    /// Open channel counterpart of [`user_joined`](Self::user_joined).
    fn user_entered(&self, channel: &Channel, user: User) {
        self.channel_event(channel, ChannelEvent::UserJoined(user));
    }

    /// Open channel counterpart of [`user_left`](Self::user_left).
    fn user_exited(&self, channel: &Channel, user: User) {
        self.channel_event(channel, ChannelEvent::UserLeft(user));
    }

    fn user_muted(&self, channel: &Channel, user: User) {
        self.channel_event(channel, ChannelEvent::UserMuted(user));
    }

    fn user_unmuted(&self, channel: &Channel, user: User) {
        self.channel_event(channel, ChannelEvent::UserUnmuted(user));
    }

    fn user_banned(&self, channel: &Channel, user: User) {
        self.channel_event(channel, ChannelEvent::UserBanned(user));
    }

    fn user_unbanned(&self, channel: &Channel, user: User) {
        self.channel_event(channel, ChannelEvent::UserUnbanned(user));
    }

    fn channel_frozen(&self, channel: &Channel) {
        self.channel_event(channel, ChannelEvent::Frozen);
    }

    fn channel_unfrozen(&self, channel: &Channel) {
        self.channel_event(channel, ChannelEvent::Unfrozen);
    }

    fn channel_changed(&self, channel: &Channel) {
        self.channel_event(channel, ChannelEvent::Changed);
    }

    fn channel_hidden(&self, channel: &Channel) {
        self.channel_event(channel, ChannelEvent::Hidden);
    }

    fn meta_data_created(&self, channel: &Channel, meta_data: Option<MetaData>) {
        self.channel_event(channel, ChannelEvent::CreatedMetaData(meta_data));
    }

    fn meta_data_updated(&self, channel: &Channel, meta_data: Option<MetaData>) {
        self.channel_event(channel, ChannelEvent::UpdatedMetaData(meta_data));
    }

    fn meta_data_deleted(&self, channel: &Channel, keys: Option<Vec<String>>) {
        self.channel_event(channel, ChannelEvent::DeletedMetaData(keys));
    }

    fn meta_counters_created(&self, channel: &Channel, counters: Option<MetaCounters>) {
        self.channel_event(channel, ChannelEvent::CreatedMetaCounters(counters));
    }

    fn meta_counters_updated(&self, channel: &Channel, counters: Option<MetaCounters>) {
        self.channel_event(channel, ChannelEvent::UpdatedMetaCounters(counters));
    }

    fn meta_counters_deleted(&self, channel: &Channel, keys: Option<Vec<String>>) {
        self.channel_event(channel, ChannelEvent::DeletedMetaCounters(keys));
    }

    fn reaction_updated(&self, channel: &Channel, reaction: ReactionEvent) {
        self.channel_event(channel, ChannelEvent::ReactionUpdated(reaction));
    }

    fn operators_updated(&self, channel: &Channel) {
        self.channel_event(channel, ChannelEvent::OperatorsUpdated);
    }
}

/// Receives callbacks about the current user.
pub trait UserDelegate: Send + Sync {
    fn user_event(&self, event: UserEvent);

    fn friends_discovered(&self, friends: Option<Vec<User>>) {
        self.user_event(UserEvent::DiscoveredFriends(friends));
    }

    fn total_unread_message_count_updated(
        &self,
        total: i32,
        by_custom_type: Option<HashMap<String, i64>>,
    ) {
        self.user_event(UserEvent::UpdatedTotalUnreadMessageCount {
            total,
            by_custom_type,
        });
    }
}

/// Receives automatic reconnection callbacks.
pub trait ConnectionDelegate: Send + Sync {
    fn connection_event(&self, event: ConnectionEvent);

    fn reconnection_started(&self) {
        self.connection_event(ConnectionEvent::ReconnectionStarted);
    }

    fn reconnection_succeeded(&self) {
        self.connection_event(ConnectionEvent::ReconnectionSucceeded);
    }

    fn reconnection_failed(&self) {
        self.connection_event(ConnectionEvent::ReconnectionFailed);
    }

    fn reconnection_canceled(&self) {
        self.connection_event(ConnectionEvent::ReconnectionCanceled);
    }
}

// =============================================================================
// Calls delegates
// =============================================================================

/// Receives calls-service callbacks not tied to an existing call.
pub trait CallDelegate: Send + Sync {
    fn call_event(&self, event: CallEvent);

    fn started_ringing(&self, call: DirectCall) {
        self.call_event(CallEvent::StartedRinging(call));
    }
}

/// Receives callbacks for individual calls.
pub trait DirectCallDelegate: Send + Sync {
    fn direct_call_event(&self, call: &DirectCall, event: DirectCallEvent);

    fn established(&self, call: &DirectCall) {
        self.direct_call_event(call, DirectCallEvent::Established);
    }

    fn connected(&self, call: &DirectCall) {
        self.direct_call_event(call, DirectCallEvent::Connected);
    }

    fn started_reconnecting(&self, call: &DirectCall) {
        self.direct_call_event(call, DirectCallEvent::StartedReconnecting);
    }

    fn reconnected(&self, call: &DirectCall) {
        self.direct_call_event(call, DirectCallEvent::Reconnected);
    }

    fn remote_audio_settings_changed(&self, call: &DirectCall) {
        self.direct_call_event(call, DirectCallEvent::RemoteAudioSettingsChanged);
    }

    fn remote_video_settings_changed(&self, call: &DirectCall) {
        self.direct_call_event(call, DirectCallEvent::RemoteVideoSettingsChanged);
    }

    fn audio_device_changed(&self, call: &DirectCall, change: AudioDeviceChange) {
        self.direct_call_event(call, DirectCallEvent::AudioDeviceChanged(change));
    }

    fn custom_items_updated(&self, call: &DirectCall, keys: Vec<String>) {
        self.direct_call_event(call, DirectCallEvent::CustomItemsUpdated(keys));
    }

    fn custom_items_deleted(&self, call: &DirectCall, keys: Vec<String>) {
        self.direct_call_event(call, DirectCallEvent::CustomItemsDeleted(keys));
    }

    fn ended(&self, call: &DirectCall) {
        self.direct_call_event(call, DirectCallEvent::Ended);
    }
}

// =============================================================================
// ChatSdk
// =============================================================================

/// Callback-style entry points of the chat SDK.
///
/// Every completion is invoked exactly once, on any thread, possibly before
/// the method returns. Send methods additionally return the provisional
/// message synchronously.
pub trait ChatSdk: Send + Sync {
    // --- delegate registration ---
    //
    // Identifiers key the registrations within a category: adding under an
    // existing identifier replaces that delegate, removing affects only it.

    fn add_channel_delegate(&self, delegate: Arc<dyn ChannelDelegate>, identifier: &str);
    fn add_user_delegate(&self, delegate: Arc<dyn UserDelegate>, identifier: &str);
    fn add_connection_delegate(&self, delegate: Arc<dyn ConnectionDelegate>, identifier: &str);
    fn remove_channel_delegate(&self, identifier: &str);
    fn remove_user_delegate(&self, identifier: &str);
    fn remove_connection_delegate(&self, identifier: &str);

    // --- session ---

    fn connect(&self, user_id: &str, access_token: Option<&str>, completion: Completion<User, SdkError>);
    fn disconnect(&self, completion: SignalCompletion);
    fn block_user(&self, user_id: &str, completion: Completion<User, SdkError>);
    fn unblock_user(&self, user_id: &str, completion: ErrorCompletion<SdkError>);
    fn update_current_user_info(
        &self,
        nickname: Option<&str>,
        profile_url: Option<&str>,
        completion: ErrorCompletion<SdkError>,
    );
    fn total_unread_message_count(&self, completion: Completion<u32, SdkError>);
    fn channel_count(&self, filter: MemberStateFilter, completion: Completion<u32, SdkError>);

    // --- channels ---

    fn group_channel(&self, channel_url: &str, completion: Completion<Channel, SdkError>);
    fn create_group_channel(
        &self,
        params: &GroupChannelParams,
        completion: Completion<Channel, SdkError>,
    );
    fn create_group_channel_with_cover(
        &self,
        params: &GroupChannelParams,
        cover: &CoverImage,
        progress: ProgressHandler,
        completion: Completion<Channel, SdkError>,
    );
    fn create_distinct_group_channel_if_not_exist(
        &self,
        params: &GroupChannelParams,
        completion: Completion<ChannelCreation, SdkError>,
    );
    fn all_meta_data(&self, channel_url: &str, completion: Completion<MetaData, SdkError>);
    fn create_meta_data(
        &self,
        channel_url: &str,
        meta_data: &MetaData,
        completion: Completion<MetaData, SdkError>,
    );

    // --- messages ---

    fn send_user_message(
        &self,
        channel_url: &str,
        params: &UserMessageParams,
        completion: Completion<Message, SdkError>,
    ) -> Message;
    fn send_file_message(
        &self,
        channel_url: &str,
        params: &FileMessageParams,
        progress: ProgressHandler,
        completion: Completion<Message, SdkError>,
    ) -> Message;
    fn resend_user_message(
        &self,
        channel_url: &str,
        message: &Message,
        completion: Completion<Message, SdkError>,
    ) -> Message;
    fn update_user_message(
        &self,
        channel_url: &str,
        message_id: i64,
        params: &UserMessageParams,
        completion: Completion<Message, SdkError>,
    );
    fn delete_message(
        &self,
        channel_url: &str,
        message_id: i64,
        completion: ErrorCompletion<SdkError>,
    );
    fn add_reaction(
        &self,
        channel_url: &str,
        message_id: i64,
        key: &str,
        completion: Completion<ReactionEvent, SdkError>,
    );
    fn delete_reaction(
        &self,
        channel_url: &str,
        message_id: i64,
        key: &str,
        completion: Completion<ReactionEvent, SdkError>,
    );
}

// =============================================================================
// CallsSdk
// =============================================================================

/// Callback-style entry points of the calls SDK.
pub trait CallsSdk: Send + Sync {
    /// Adds or replaces the call delegate registered under `identifier`.
    fn add_delegate(&self, delegate: Arc<dyn CallDelegate>, identifier: &str);
    /// Removes only the call delegate registered under `identifier`.
    fn remove_delegate(&self, identifier: &str);
    /// Makes `delegate` the receiver of callbacks for the call `call_id`.
    fn set_direct_call_delegate(&self, call_id: &str, delegate: Arc<dyn DirectCallDelegate>);

    fn authenticate(&self, params: &AuthenticateParams, completion: Completion<User, SdkError>);
    fn deauthenticate(&self, push_token: Option<&[u8]>, completion: ErrorCompletion<SdkError>);
    fn dial(&self, params: &DialParams, completion: Completion<DirectCall, SdkError>);

    fn register_push_token(
        &self,
        kind: PushTokenKind,
        token: &[u8],
        unique: bool,
        completion: ErrorCompletion<SdkError>,
    );
    fn unregister_push_token(
        &self,
        kind: PushTokenKind,
        token: &[u8],
        completion: ErrorCompletion<SdkError>,
    );
    fn unregister_all_push_tokens(&self, kind: PushTokenKind, completion: ErrorCompletion<SdkError>);

    fn update_custom_items(
        &self,
        call_id: &str,
        items: &CustomItems,
        completion: Completion<CustomItemsChange, SdkError>,
    );
    fn delete_custom_items(
        &self,
        call_id: &str,
        keys: &[String],
        completion: Completion<CustomItemsChange, SdkError>,
    );
    fn delete_all_custom_items(
        &self,
        call_id: &str,
        completion: Completion<CustomItemsChange, SdkError>,
    );
    fn switch_camera(&self, call_id: &str, completion: ErrorCompletion<SdkError>);
}

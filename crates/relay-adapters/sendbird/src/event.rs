//! Event categories republished by the delegate proxy.
//!
//! # Hierarchy
//!
//! ```text
//! ChannelEvent      per channel (scoped by channel URL)
//! UserEvent         global
//! ConnectionEvent   global
//! CallEvent         global
//! DirectCallEvent   per call (scoped by call ID)
//! ```
//!
//! Each variant corresponds to one SDK delegate callback. Events are plain
//! data; they carry the payload of the callback but not the channel or call
//! it was delivered for, which lives in the routing scope instead.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    AudioDeviceChange, DirectCall, Message, MetaCounters, MetaData, ReactionEvent, User,
};

// ============================================================================
// ChannelEvent
// ============================================================================

/// Something happened in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ChannelEvent {
    /// A new message arrived.
    Received(Message),
    /// A message was edited.
    Updated(Message),
    /// A message was deleted; carries its ID.
    MessageDeleted(i64),
    /// A message mentioning the current user arrived.
    ReceivedMention(Message),
    ReadReceiptUpdated,
    DeliveryReceiptUpdated,
    TypingStatusUpdated,
    /// Users were invited.
    ReceivedInvitation {
        invitees: Option<Vec<User>>,
        inviter: Option<User>,
    },
    /// An invitation was declined.
    DeclinedInvitation {
        invitee: User,
        inviter: Option<User>,
    },
    /// A user joined a group channel or entered an open channel.
    UserJoined(User),
    /// A user left a group channel or exited an open channel.
    UserLeft(User),
    UserMuted(User),
    UserUnmuted(User),
    UserBanned(User),
    UserUnbanned(User),
    Frozen,
    Unfrozen,
    /// Channel properties changed.
    Changed,
    /// The channel was hidden from the channel list.
    Hidden,
    CreatedMetaData(Option<MetaData>),
    UpdatedMetaData(Option<MetaData>),
    DeletedMetaData(Option<Vec<String>>),
    CreatedMetaCounters(Option<MetaCounters>),
    UpdatedMetaCounters(Option<MetaCounters>),
    DeletedMetaCounters(Option<Vec<String>>),
    ReactionUpdated(ReactionEvent),
    OperatorsUpdated,
}

impl ChannelEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Received(_) => "received",
            Self::Updated(_) => "updated",
            Self::MessageDeleted(_) => "message_deleted",
            Self::ReceivedMention(_) => "received_mention",
            Self::ReadReceiptUpdated => "read_receipt_updated",
            Self::DeliveryReceiptUpdated => "delivery_receipt_updated",
            Self::TypingStatusUpdated => "typing_status_updated",
            Self::ReceivedInvitation { .. } => "received_invitation",
            Self::DeclinedInvitation { .. } => "declined_invitation",
            Self::UserJoined(_) => "user_joined",
            Self::UserLeft(_) => "user_left",
            Self::UserMuted(_) => "user_muted",
            Self::UserUnmuted(_) => "user_unmuted",
            Self::UserBanned(_) => "user_banned",
            Self::UserUnbanned(_) => "user_unbanned",
            Self::Frozen => "frozen",
            Self::Unfrozen => "unfrozen",
            Self::Changed => "changed",
            Self::Hidden => "hidden",
            Self::CreatedMetaData(_) => "created_meta_data",
            Self::UpdatedMetaData(_) => "updated_meta_data",
            Self::DeletedMetaData(_) => "deleted_meta_data",
            Self::CreatedMetaCounters(_) => "created_meta_counters",
            Self::UpdatedMetaCounters(_) => "updated_meta_counters",
            Self::DeletedMetaCounters(_) => "deleted_meta_counters",
            Self::ReactionUpdated(_) => "reaction_updated",
            Self::OperatorsUpdated => "operators_updated",
        }
    }

    /// The message this event carries, if any.
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Received(message) | Self::Updated(message) | Self::ReceivedMention(message) => {
                Some(message)
            }
            _ => None,
        }
    }
}

// ============================================================================
// Global events
// ============================================================================

/// Events about the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum UserEvent {
    DiscoveredFriends(Option<Vec<User>>),
    UpdatedTotalUnreadMessageCount {
        total: i32,
        by_custom_type: Option<HashMap<String, i64>>,
    },
}

impl UserEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DiscoveredFriends(_) => "discovered_friends",
            Self::UpdatedTotalUnreadMessageCount { .. } => "updated_total_unread_message_count",
        }
    }
}

/// Automatic reconnection progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionEvent {
    ReconnectionStarted,
    ReconnectionSucceeded,
    ReconnectionFailed,
    ReconnectionCanceled,
}

impl ConnectionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReconnectionStarted => "reconnection_started",
            Self::ReconnectionSucceeded => "reconnection_succeeded",
            Self::ReconnectionFailed => "reconnection_failed",
            Self::ReconnectionCanceled => "reconnection_canceled",
        }
    }
}

/// Calls-service events not tied to an existing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CallEvent {
    /// An incoming call started ringing.
    StartedRinging(DirectCall),
}

impl CallEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartedRinging(_) => "started_ringing",
        }
    }
}

// ============================================================================
// DirectCallEvent
// ============================================================================

/// Something happened during a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum DirectCallEvent {
    /// The callee accepted.
    Established,
    /// Media started flowing.
    Connected,
    StartedReconnecting,
    Reconnected,
    RemoteAudioSettingsChanged,
    RemoteVideoSettingsChanged,
    AudioDeviceChanged(AudioDeviceChange),
    /// Keys of the custom items that were updated.
    CustomItemsUpdated(Vec<String>),
    /// Keys of the custom items that were deleted.
    CustomItemsDeleted(Vec<String>),
    Ended,
}

impl DirectCallEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Established => "established",
            Self::Connected => "connected",
            Self::StartedReconnecting => "started_reconnecting",
            Self::Reconnected => "reconnected",
            Self::RemoteAudioSettingsChanged => "remote_audio_settings_changed",
            Self::RemoteVideoSettingsChanged => "remote_video_settings_changed",
            Self::AudioDeviceChanged(_) => "audio_device_changed",
            Self::CustomItemsUpdated(_) => "custom_items_updated",
            Self::CustomItemsDeleted(_) => "custom_items_deleted",
            Self::Ended => "ended",
        }
    }
}

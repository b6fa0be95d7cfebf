//! Direct calls.

use std::collections::HashMap;

use relay_core::{Entity, EntityId};
use serde::{Deserialize, Serialize};

use super::types::User;

/// Application-defined key/value data attached to a call.
pub type CustomItems = HashMap<String, String>;

/// A snapshot of a one-to-one call.
///
/// Snapshots describe the same call exactly when their `call_id`s match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectCall {
    pub call_id: String,
    #[serde(default)]
    pub caller: Option<User>,
    #[serde(default)]
    pub callee: Option<User>,
    #[serde(default)]
    pub is_video: bool,
    #[serde(default)]
    pub custom_items: CustomItems,
}

impl DirectCall {
    pub fn new(call_id: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            caller: None,
            callee: None,
            is_video: false,
            custom_items: CustomItems::new(),
        }
    }
}

impl Entity for DirectCall {
    fn entity_id(&self) -> EntityId {
        EntityId::new(&self.call_id)
    }
}

/// Outcome of a custom item update or deletion.
///
/// The SDK may omit either part; an omitted part is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomItemsChange {
    /// The call's custom items after the change.
    pub items: CustomItems,
    /// The keys that were changed.
    pub keys: Vec<String>,
}

/// A record of a finished call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectCallLog {
    pub call_id: String,
    #[serde(default)]
    pub caller: Option<User>,
    #[serde(default)]
    pub callee: Option<User>,
    #[serde(default)]
    pub is_video: bool,
    /// Call duration in milliseconds.
    #[serde(default)]
    pub duration: i64,
    /// Why the call ended, e.g. `"completed"` or `"declined"`.
    #[serde(default)]
    pub end_result: Option<String>,
    #[serde(default)]
    pub started_at: i64,
    #[serde(default)]
    pub ended_at: i64,
}

/// An audio route: the active input and output ports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRoute {
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

/// Why the audio route changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteChangeReason {
    Unknown,
    NewDeviceAvailable,
    OldDeviceUnavailable,
    CategoryChange,
    Override,
}

/// Payload of an audio device change during a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDeviceChange {
    pub current_route: AudioRoute,
    pub previous_route: AudioRoute,
    pub reason: RouteChangeReason,
}

/// Credentials for the calls service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticateParams {
    pub user_id: String,
    pub access_token: Option<String>,
}

impl AuthenticateParams {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: None,
        }
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

/// Parameters for an outgoing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialParams {
    pub callee_id: String,
    pub is_video: bool,
    pub custom_items: CustomItems,
}

impl DialParams {
    pub fn new(callee_id: impl Into<String>) -> Self {
        Self {
            callee_id: callee_id.into(),
            is_video: false,
            custom_items: CustomItems::new(),
        }
    }

    pub fn video(mut self, is_video: bool) -> Self {
        self.is_video = is_video;
        self
    }
}

/// Push channel a device token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushTokenKind {
    /// VoIP push, used to ring incoming calls.
    Voip,
    /// Regular remote notifications.
    Remote,
}

//! Shared Sendbird types.
//!
//! Users, channel members and the SDK's error type.

use relay_core::{Entity, EntityId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A Sendbird user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub user_id: String,
    /// Display name.
    #[serde(default)]
    pub nickname: Option<String>,
    /// Profile image URL.
    #[serde(default)]
    pub profile_url: Option<String>,
}

impl User {
    /// Creates a user with only an ID.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            nickname: None,
            profile_url: None,
        }
    }

    /// Sets the nickname.
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }
}

impl Entity for User {
    fn entity_id(&self) -> EntityId {
        EntityId::new(&self.user_id)
    }
}

/// Membership state of a user in a group channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberState {
    /// Not a member.
    #[default]
    None,
    /// Invited but not yet joined.
    Invited,
    /// Joined.
    Joined,
}

/// A user in the context of a group channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub state: MemberState,
    #[serde(default)]
    pub is_muted: bool,
    #[serde(default)]
    pub is_blocked_by_me: bool,
}

/// Filter for [`ChatSdk::channel_count`](crate::ChatSdk::channel_count).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStateFilter {
    #[default]
    All,
    JoinedOnly,
    InvitedOnly,
}

/// Error reported by the Sendbird SDKs.
///
/// Passed through to callers unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("sendbird error {code}: {message}")]
pub struct SdkError {
    /// Numeric error code assigned by the SDK.
    pub code: i64,
    /// Human-readable description.
    pub message: String,
}

impl SdkError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

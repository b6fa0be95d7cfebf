//! Channels and channel parameters.

use std::collections::HashMap;

use relay_core::{Entity, EntityId};
use serde::{Deserialize, Serialize};

/// Key/value metadata attached to a channel.
pub type MetaData = HashMap<String, String>;

/// Named integer counters attached to a channel.
pub type MetaCounters = HashMap<String, i64>;

/// Channel flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Membership-based channel.
    Group,
    /// Public channel anyone can enter.
    Open,
}

/// A snapshot of a channel.
///
/// The SDK hands out a fresh snapshot on every callback; two snapshots
/// describe the same channel exactly when their `url`s match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel URL, the channel's unique identifier.
    pub url: String,
    /// Group or open.
    pub kind: ChannelKind,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Cover image URL.
    #[serde(default)]
    pub cover_url: Option<String>,
    /// Custom channel type.
    #[serde(default)]
    pub custom_type: Option<String>,
    /// Number of members (group channels) or participants (open channels).
    #[serde(default)]
    pub member_count: u32,
    /// Whether the channel is frozen.
    #[serde(default)]
    pub is_frozen: bool,
}

impl Channel {
    /// A group channel snapshot with the given URL.
    pub fn group(url: impl Into<String>) -> Self {
        Self::with_kind(url, ChannelKind::Group)
    }

    /// An open channel snapshot with the given URL.
    pub fn open(url: impl Into<String>) -> Self {
        Self::with_kind(url, ChannelKind::Open)
    }

    fn with_kind(url: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            url: url.into(),
            kind,
            name: None,
            cover_url: None,
            custom_type: None,
            member_count: 0,
            is_frozen: false,
        }
    }

    pub fn is_group(&self) -> bool {
        self.kind == ChannelKind::Group
    }

    pub fn is_open(&self) -> bool {
        self.kind == ChannelKind::Open
    }
}

impl Entity for Channel {
    fn entity_id(&self) -> EntityId {
        EntityId::new(&self.url)
    }
}

/// Result of a "create distinct channel if it does not exist" call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCreation {
    pub channel: Channel,
    /// `false` if an existing distinct channel was returned.
    pub created: bool,
}

/// Parameters for creating or updating a group channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupChannelParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_ids: Vec<String>,
    #[serde(default)]
    pub operator_user_ids: Vec<String>,
    /// Reuse an existing channel with the same members.
    #[serde(default)]
    pub is_distinct: bool,
    #[serde(default)]
    pub custom_type: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

impl GroupChannelParams {
    /// Parameters for a channel with the given members.
    pub fn with_users<I, S>(user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_ids: user_ids.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn distinct(mut self, is_distinct: bool) -> Self {
        self.is_distinct = is_distinct;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// An image uploaded alongside a channel create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub file_name: String,
    pub data: Vec<u8>,
}

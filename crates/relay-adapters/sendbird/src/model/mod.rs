//! Data models for the Sendbird chat and calls SDKs.
//!
//! These are plain snapshots of SDK objects. Identity is carried by the
//! [`Entity`](relay_core::Entity) implementations: channels by URL, calls by
//! call ID, users by user ID.

pub mod call;
pub mod channel;
pub mod message;
pub mod types;

pub use call::{
    AudioDeviceChange, AudioRoute, AuthenticateParams, CustomItems, CustomItemsChange, DialParams,
    DirectCall, DirectCallLog, PushTokenKind, RouteChangeReason,
};
pub use channel::{
    Channel, ChannelCreation, ChannelKind, CoverImage, GroupChannelParams, MetaCounters, MetaData,
};
pub use message::{
    FileMessageParams, FileSource, Message, MessageKind, ReactionEvent, ReactionOperation,
    SendingStatus, UserMessageParams,
};
pub use types::{Member, MemberState, MemberStateFilter, SdkError, User};

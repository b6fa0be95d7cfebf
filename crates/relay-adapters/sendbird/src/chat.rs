//! Chat SDK operations as futures and streams.
//!
//! Each method starts the SDK call immediately and returns an adapter over its
//! completion:
//!
//! | Operation | Returns |
//! |-----------|---------|
//! | session, counts, channel lookup | [`SdkFuture`] |
//! | channel create with cover image | [`SdkProgress`] |
//! | send / resend | [`MessageSend`] (provisional, then confirmed) |
//! | update | [`MessageFuture`] |
//!
//! SDK errors are passed through unchanged.

use std::fmt;
use std::sync::Arc;

use relay_core::{
    CallbackFuture, PendingSend, ProgressStream, RequestError, SendFailure, request,
    request_message, request_or_default, request_unit, request_with_progress, send,
    send_with_progress, signal,
};
use tracing::debug;

use crate::model::{
    Channel, ChannelCreation, CoverImage, FileMessageParams, GroupChannelParams,
    MemberStateFilter, Message, MetaData, ReactionEvent, SdkError, User, UserMessageParams,
};
use crate::sdk::ChatSdk;

/// Future of a plain SDK request.
pub type SdkFuture<T> = CallbackFuture<T, RequestError<SdkError>>;

/// Stream of an SDK request that reports upload progress.
pub type SdkProgress<T> = ProgressStream<T, SdkError>;

/// Future of a message-producing request without a provisional message.
pub type MessageFuture = CallbackFuture<Message, SendFailure<Message, SdkError>>;

/// Stream of a two-phase message send.
pub type MessageSend = PendingSend<Message, SdkError>;

/// Async front end of a [`ChatSdk`].
#[derive(Clone)]
pub struct ChatClient {
    sdk: Arc<dyn ChatSdk>,
}

impl ChatClient {
    pub fn new(sdk: Arc<dyn ChatSdk>) -> Self {
        Self { sdk }
    }

    /// The wrapped SDK.
    pub fn sdk(&self) -> &Arc<dyn ChatSdk> {
        &self.sdk
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub fn connect(&self, user_id: &str, access_token: Option<&str>) -> SdkFuture<User> {
        debug!(user_id = %user_id, "Connecting");
        request(|done| self.sdk.connect(user_id, access_token, done))
    }

    /// Disconnects. Never fails.
    pub fn disconnect(&self) -> SdkFuture<()> {
        debug!("Disconnecting");
        signal(|done| self.sdk.disconnect(done))
    }

    pub fn block_user(&self, user_id: &str) -> SdkFuture<User> {
        request(|done| self.sdk.block_user(user_id, done))
    }

    pub fn unblock_user(&self, user_id: &str) -> SdkFuture<()> {
        request_unit(|done| self.sdk.unblock_user(user_id, done))
    }

    pub fn update_current_user_info(
        &self,
        nickname: Option<&str>,
        profile_url: Option<&str>,
    ) -> SdkFuture<()> {
        request_unit(|done| {
            self.sdk
                .update_current_user_info(nickname, profile_url, done)
        })
    }

    pub fn total_unread_message_count(&self) -> SdkFuture<u32> {
        request(|done| self.sdk.total_unread_message_count(done))
    }

    pub fn channel_count(&self, filter: MemberStateFilter) -> SdkFuture<u32> {
        request(|done| self.sdk.channel_count(filter, done))
    }

    // =========================================================================
    // Channels
    // =========================================================================

    pub fn group_channel(&self, channel_url: &str) -> SdkFuture<Channel> {
        request(|done| self.sdk.group_channel(channel_url, done))
    }

    pub fn create_group_channel(&self, params: &GroupChannelParams) -> SdkFuture<Channel> {
        request(|done| self.sdk.create_group_channel(params, done))
    }

    /// Creates a group channel, uploading `cover` as its image.
    pub fn create_group_channel_with_cover(
        &self,
        params: &GroupChannelParams,
        cover: &CoverImage,
    ) -> SdkProgress<Channel> {
        request_with_progress(|progress, done| {
            self.sdk
                .create_group_channel_with_cover(params, cover, progress, done)
        })
    }

    /// Returns the existing distinct channel with these members, or creates one.
    pub fn create_distinct_group_channel_if_not_exist(
        &self,
        params: &GroupChannelParams,
    ) -> SdkFuture<ChannelCreation> {
        request(|done| {
            self.sdk
                .create_distinct_group_channel_if_not_exist(params, done)
        })
    }

    /// All metadata of a channel; a channel without metadata yields an empty map.
    pub fn all_meta_data(&self, channel_url: &str) -> SdkFuture<MetaData> {
        request_or_default(|done| self.sdk.all_meta_data(channel_url, done))
    }

    pub fn create_meta_data(&self, channel_url: &str, meta_data: &MetaData) -> SdkFuture<MetaData> {
        request_or_default(|done| self.sdk.create_meta_data(channel_url, meta_data, done))
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Sends a text message.
    ///
    /// Yields the provisional message first, then the confirmed one. On failure
    /// the SDK's failed copy of the message is kept in
    /// [`SendFailure::SendingFailed`].
    pub fn send_user_message(&self, channel_url: &str, params: &UserMessageParams) -> MessageSend {
        send(|done| self.sdk.send_user_message(channel_url, params, done))
    }

    /// Sends a file message, reporting upload progress between the provisional
    /// and confirmed messages.
    pub fn send_file_message(&self, channel_url: &str, params: &FileMessageParams) -> MessageSend {
        send_with_progress(|progress, done| {
            self.sdk
                .send_file_message(channel_url, params, progress, done)
        })
    }

    /// Resends a message that previously failed.
    pub fn resend_user_message(&self, channel_url: &str, message: &Message) -> MessageSend {
        send(|done| self.sdk.resend_user_message(channel_url, message, done))
    }

    pub fn update_user_message(
        &self,
        channel_url: &str,
        message_id: i64,
        params: &UserMessageParams,
    ) -> MessageFuture {
        request_message(|done| {
            self.sdk
                .update_user_message(channel_url, message_id, params, done)
        })
    }

    pub fn delete_message(&self, channel_url: &str, message_id: i64) -> SdkFuture<()> {
        request_unit(|done| self.sdk.delete_message(channel_url, message_id, done))
    }

    pub fn add_reaction(&self, channel_url: &str, message_id: i64, key: &str) -> SdkFuture<ReactionEvent> {
        request(|done| self.sdk.add_reaction(channel_url, message_id, key, done))
    }

    pub fn delete_reaction(
        &self,
        channel_url: &str,
        message_id: i64,
        key: &str,
    ) -> SdkFuture<ReactionEvent> {
        request(|done| self.sdk.delete_reaction(channel_url, message_id, key, done))
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient").finish_non_exhaustive()
    }
}

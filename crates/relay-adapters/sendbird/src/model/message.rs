//! Messages, message parameters and reactions.

use serde::{Deserialize, Serialize};

use super::types::User;

/// Message flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Text message sent by a user.
    User,
    /// File message sent by a user.
    File,
    /// Message sent by an administrator through the platform API.
    Admin,
}

/// Delivery state of a message sent from this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendingStatus {
    /// Not sent from this client.
    #[default]
    None,
    /// Provisional; waiting for the server.
    Pending,
    /// The server rejected the message.
    Failed,
    /// Sending was canceled.
    Canceled,
    /// Confirmed by the server.
    Succeeded,
}

/// A message snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned ID; `0` while the message is provisional.
    pub message_id: i64,
    /// Client-assigned ID linking a provisional message to its confirmation.
    #[serde(default)]
    pub request_id: Option<String>,
    /// URL of the channel the message belongs to.
    pub channel_url: String,
    pub kind: MessageKind,
    /// Text for user and admin messages, file name for file messages.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub sender: Option<User>,
    #[serde(default)]
    pub sending_status: SendingStatus,
    #[serde(default)]
    pub custom_type: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub created_at: i64,
}

impl Message {
    /// A user message in `channel_url`.
    pub fn user(channel_url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            message_id: 0,
            request_id: None,
            channel_url: channel_url.into(),
            kind: MessageKind::User,
            text: Some(text.into()),
            sender: None,
            sending_status: SendingStatus::None,
            custom_type: None,
            data: None,
            created_at: 0,
        }
    }

    /// Returns `true` while the server has not confirmed the message.
    pub fn is_pending(&self) -> bool {
        self.sending_status == SendingStatus::Pending
    }
}

/// Parameters for sending or updating a user message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessageParams {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub custom_type: Option<String>,
    #[serde(default)]
    pub mentioned_user_ids: Vec<String>,
}

impl UserMessageParams {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Where the content of a file message comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Already hosted; only the URL is sent.
    Url(String),
    /// Uploaded with the message.
    Binary(Vec<u8>),
}

/// Parameters for sending a file message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMessageParams {
    pub source: FileSource,
    pub file_name: String,
    pub mime_type: String,
    pub data: Option<String>,
    pub custom_type: Option<String>,
}

impl FileMessageParams {
    pub fn binary(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            source: FileSource::Binary(bytes),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: None,
            custom_type: None,
        }
    }

    pub fn url(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            source: FileSource::Url(url.into()),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: None,
            custom_type: None,
        }
    }

    /// Size of the payload in bytes, when it is uploaded.
    pub fn upload_size(&self) -> Option<usize> {
        match &self.source {
            FileSource::Binary(bytes) => Some(bytes.len()),
            FileSource::Url(_) => None,
        }
    }
}

/// Whether a reaction was added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionOperation {
    Add,
    Delete,
}

/// A change to the reactions on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub message_id: i64,
    /// Reaction key, e.g. an emoji identifier.
    pub key: String,
    pub user_id: String,
    pub operation: ReactionOperation,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub updated_at: i64,
}

//! In-process SDK doubles with scripted behaviour, for tests of this crate
//! and of crates built on it (enable the `mock` feature).

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use relay_core::{
    Completion, ErrorCompletion, ProgressHandler, SignalCompletion, TransferProgress,
};

use crate::model::{
    AuthenticateParams, Channel, ChannelCreation, CoverImage, CustomItems, CustomItemsChange,
    DialParams, DirectCall, FileMessageParams, GroupChannelParams, MemberStateFilter, Message,
    MessageKind, MetaData, PushTokenKind, ReactionEvent, ReactionOperation, SdkError,
    SendingStatus, User, UserMessageParams,
};
use crate::sdk::{
    CallDelegate, CallsSdk, ChannelDelegate, ChatSdk, ConnectionDelegate, DirectCallDelegate,
    UserDelegate,
};

fn invalid(message: &str) -> SdkError {
    SdkError::new(400_100, message)
}

type Registry<D> = Mutex<Vec<(String, Arc<D>)>>;

/// Adds or replaces the delegate under `identifier`, as the SDK does.
fn register<D: ?Sized>(registry: &Registry<D>, identifier: &str, delegate: Arc<D>) {
    let mut entries = registry.lock();
    match entries.iter().position(|(id, _)| id == identifier) {
        Some(index) => entries[index].1 = delegate,
        None => entries.push((identifier.to_string(), delegate)),
    }
}

fn delegates<D: ?Sized>(registry: &Registry<D>) -> Vec<Arc<D>> {
    registry.lock().iter().map(|(_, d)| d.clone()).collect()
}

// =============================================================================
// MockChatSdk
// =============================================================================

#[derive(Default)]
pub struct MockChatSdk {
    channel_delegates: Registry<dyn ChannelDelegate>,
    user_delegates: Registry<dyn UserDelegate>,
    connection_delegates: Registry<dyn ConnectionDelegate>,
    channel_registrations: AtomicUsize,
    user_registrations: AtomicUsize,
    connection_registrations: AtomicUsize,
    removals: AtomicUsize,
    next_message_id: AtomicI64,
}

impl MockChatSdk {
    pub fn channel_registrations(&self) -> usize {
        self.channel_registrations.load(Ordering::SeqCst)
    }

    pub fn user_registrations(&self) -> usize {
        self.user_registrations.load(Ordering::SeqCst)
    }

    pub fn connection_registrations(&self) -> usize {
        self.connection_registrations.load(Ordering::SeqCst)
    }

    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }

    pub fn channel_delegate_count(&self) -> usize {
        self.channel_delegates.lock().len()
    }

    pub fn user_delegate_count(&self) -> usize {
        self.user_delegates.lock().len()
    }

    pub fn connection_delegate_count(&self) -> usize {
        self.connection_delegates.lock().len()
    }

    pub fn channel_identifiers(&self) -> Vec<String> {
        self.channel_delegates
            .lock()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn emit_channel(&self, f: impl Fn(&dyn ChannelDelegate)) {
        for delegate in delegates(&self.channel_delegates) {
            f(delegate.as_ref());
        }
    }

    pub fn emit_user(&self, f: impl Fn(&dyn UserDelegate)) {
        for delegate in delegates(&self.user_delegates) {
            f(delegate.as_ref());
        }
    }

    pub fn emit_connection(&self, f: impl Fn(&dyn ConnectionDelegate)) {
        for delegate in delegates(&self.connection_delegates) {
            f(delegate.as_ref());
        }
    }

    fn next_id(&self) -> i64 {
        self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn provisional(&self, channel_url: &str, kind: MessageKind, text: Option<String>) -> Message {
        let request_id = format!("req-{}", self.next_id());
        Message {
            request_id: Some(request_id),
            kind,
            text,
            sending_status: SendingStatus::Pending,
            sender: Some(User::new("me")),
            ..Message::user(channel_url, "")
        }
    }

    fn confirm(&self, provisional: &Message) -> Message {
        Message {
            message_id: self.next_id(),
            sending_status: SendingStatus::Succeeded,
            ..provisional.clone()
        }
    }
}

impl ChatSdk for MockChatSdk {
    fn add_channel_delegate(&self, delegate: Arc<dyn ChannelDelegate>, identifier: &str) {
        self.channel_registrations.fetch_add(1, Ordering::SeqCst);
        register(&self.channel_delegates, identifier, delegate);
    }

    fn add_user_delegate(&self, delegate: Arc<dyn UserDelegate>, identifier: &str) {
        self.user_registrations.fetch_add(1, Ordering::SeqCst);
        register(&self.user_delegates, identifier, delegate);
    }

    fn add_connection_delegate(&self, delegate: Arc<dyn ConnectionDelegate>, identifier: &str) {
        self.connection_registrations.fetch_add(1, Ordering::SeqCst);
        register(&self.connection_delegates, identifier, delegate);
    }

    fn remove_channel_delegate(&self, identifier: &str) {
        self.removals.fetch_add(1, Ordering::SeqCst);
        self.channel_delegates.lock().retain(|(id, _)| id != identifier);
    }

    fn remove_user_delegate(&self, identifier: &str) {
        self.user_delegates.lock().retain(|(id, _)| id != identifier);
    }

    fn remove_connection_delegate(&self, identifier: &str) {
        self.connection_delegates.lock().retain(|(id, _)| id != identifier);
    }

    fn connect(
        &self,
        user_id: &str,
        _access_token: Option<&str>,
        completion: Completion<User, SdkError>,
    ) {
        if user_id.is_empty() {
            completion(None, Some(invalid("user id is required")));
        } else {
            completion(Some(User::new(user_id)), None);
        }
    }

    fn disconnect(&self, completion: SignalCompletion) {
        thread::spawn(completion);
    }

    fn block_user(&self, user_id: &str, completion: Completion<User, SdkError>) {
        completion(Some(User::new(user_id)), None);
    }

    fn unblock_user(&self, user_id: &str, completion: ErrorCompletion<SdkError>) {
        completion((user_id == "stranger").then(|| invalid("user is not blocked")));
    }

    fn update_current_user_info(
        &self,
        nickname: Option<&str>,
        _profile_url: Option<&str>,
        completion: ErrorCompletion<SdkError>,
    ) {
        completion((nickname == Some("")).then(|| invalid("nickname must not be empty")));
    }

    fn total_unread_message_count(&self, completion: Completion<u32, SdkError>) {
        completion(Some(3), None);
    }

    fn channel_count(&self, filter: MemberStateFilter, completion: Completion<u32, SdkError>) {
        let count = match filter {
            MemberStateFilter::All => 5,
            MemberStateFilter::JoinedOnly => 4,
            MemberStateFilter::InvitedOnly => 1,
        };
        completion(Some(count), None);
    }

    fn group_channel(&self, channel_url: &str, completion: Completion<Channel, SdkError>) {
        // A misbehaving lookup that reports nothing at all.
        if channel_url == "ghost" {
            completion(None, None);
        } else {
            completion(Some(Channel::group(channel_url)), None);
        }
    }

    fn create_group_channel(
        &self,
        params: &GroupChannelParams,
        completion: Completion<Channel, SdkError>,
    ) {
        let mut channel = Channel::group(format!("group-{}", params.user_ids.join("-")));
        channel.name = params.name.clone();
        channel.member_count = params.user_ids.len() as u32;
        completion(Some(channel), None);
    }

    fn create_group_channel_with_cover(
        &self,
        params: &GroupChannelParams,
        cover: &CoverImage,
        mut progress: ProgressHandler,
        completion: Completion<Channel, SdkError>,
    ) {
        let total = cover.data.len() as i64;
        let channel = Channel {
            cover_url: Some(format!("https://cdn.example/{}", cover.file_name)),
            ..Channel::group(format!("group-{}", params.user_ids.join("-")))
        };
        thread::spawn(move || {
            let half = total / 2;
            progress(TransferProgress::new(half, half, total));
            progress(TransferProgress::new(total - half, total, total));
            completion(Some(channel), None);
        });
    }

    fn create_distinct_group_channel_if_not_exist(
        &self,
        params: &GroupChannelParams,
        completion: Completion<ChannelCreation, SdkError>,
    ) {
        completion(
            Some(ChannelCreation {
                channel: Channel::group(format!("group-{}", params.user_ids.join("-"))),
                created: false,
            }),
            None,
        );
    }

    fn all_meta_data(&self, _channel_url: &str, completion: Completion<MetaData, SdkError>) {
        completion(None, None);
    }

    fn create_meta_data(
        &self,
        _channel_url: &str,
        meta_data: &MetaData,
        completion: Completion<MetaData, SdkError>,
    ) {
        completion(Some(meta_data.clone()), None);
    }

    fn send_user_message(
        &self,
        channel_url: &str,
        params: &UserMessageParams,
        completion: Completion<Message, SdkError>,
    ) -> Message {
        let provisional = self.provisional(channel_url, MessageKind::User, params.text.clone());

        if params.text.as_deref() == Some("reject") {
            let failed = Message {
                sending_status: SendingStatus::Failed,
                ..provisional.clone()
            };
            completion(Some(failed), Some(SdkError::new(900_050, "message blocked")));
            return provisional;
        }

        let confirmed = self.confirm(&provisional);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            completion(Some(confirmed), None);
        });
        provisional
    }

    fn send_file_message(
        &self,
        channel_url: &str,
        params: &FileMessageParams,
        mut progress: ProgressHandler,
        completion: Completion<Message, SdkError>,
    ) -> Message {
        let provisional = self.provisional(
            channel_url,
            MessageKind::File,
            Some(params.file_name.clone()),
        );
        let confirmed = self.confirm(&provisional);
        let total = params.upload_size().unwrap_or_default() as i64;

        thread::spawn(move || {
            if total > 0 {
                progress(TransferProgress::new(total, total, total));
            }
            completion(Some(confirmed), None);
        });
        provisional
    }

    fn resend_user_message(
        &self,
        _channel_url: &str,
        message: &Message,
        completion: Completion<Message, SdkError>,
    ) -> Message {
        let provisional = Message {
            sending_status: SendingStatus::Pending,
            ..message.clone()
        };
        // Completes before the provisional is returned.
        completion(Some(self.confirm(&provisional)), None);
        provisional
    }

    fn update_user_message(
        &self,
        channel_url: &str,
        message_id: i64,
        params: &UserMessageParams,
        completion: Completion<Message, SdkError>,
    ) {
        if message_id == 0 {
            completion(None, Some(invalid("message not found")));
            return;
        }
        let message = Message {
            message_id,
            text: params.text.clone(),
            sending_status: SendingStatus::Succeeded,
            ..Message::user(channel_url, "")
        };
        completion(Some(message), None);
    }

    fn delete_message(
        &self,
        _channel_url: &str,
        message_id: i64,
        completion: ErrorCompletion<SdkError>,
    ) {
        completion((message_id == 0).then(|| invalid("message not found")));
    }

    fn add_reaction(
        &self,
        _channel_url: &str,
        message_id: i64,
        key: &str,
        completion: Completion<ReactionEvent, SdkError>,
    ) {
        completion(
            Some(ReactionEvent {
                message_id,
                key: key.to_string(),
                user_id: "me".into(),
                operation: ReactionOperation::Add,
                updated_at: 1,
            }),
            None,
        );
    }

    fn delete_reaction(
        &self,
        _channel_url: &str,
        message_id: i64,
        key: &str,
        completion: Completion<ReactionEvent, SdkError>,
    ) {
        completion(
            Some(ReactionEvent {
                message_id,
                key: key.to_string(),
                user_id: "me".into(),
                operation: ReactionOperation::Delete,
                updated_at: 2,
            }),
            None,
        );
    }
}

// =============================================================================
// MockCallsSdk
// =============================================================================

#[derive(Default)]
pub struct MockCallsSdk {
    delegates: Registry<dyn CallDelegate>,
    registrations: AtomicUsize,
    direct_delegates: Mutex<Vec<(String, Arc<dyn DirectCallDelegate>)>>,
    push_tokens: Mutex<Vec<(PushTokenKind, Vec<u8>)>>,
    custom_items: Mutex<HashMap<String, CustomItems>>,
}

impl MockCallsSdk {
    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    pub fn delegate_count(&self) -> usize {
        self.delegates.lock().len()
    }

    /// Call IDs in the order a delegate was set for them.
    pub fn attached_calls(&self) -> Vec<String> {
        self.direct_delegates
            .lock()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn push_tokens(&self) -> Vec<(PushTokenKind, Vec<u8>)> {
        self.push_tokens.lock().clone()
    }

    pub fn emit_call(&self, f: impl Fn(&dyn CallDelegate)) {
        for delegate in delegates(&self.delegates) {
            f(delegate.as_ref());
        }
    }

    pub fn emit_direct_call(&self, call_id: &str, f: impl Fn(&dyn DirectCallDelegate)) {
        let delegate = self
            .direct_delegates
            .lock()
            .iter()
            .rev()
            .find(|(id, _)| id == call_id)
            .map(|(_, d)| d.clone());
        if let Some(delegate) = delegate {
            f(delegate.as_ref());
        }
    }
}

impl CallsSdk for MockCallsSdk {
    fn add_delegate(&self, delegate: Arc<dyn CallDelegate>, identifier: &str) {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        register(&self.delegates, identifier, delegate);
    }

    fn remove_delegate(&self, identifier: &str) {
        self.delegates.lock().retain(|(id, _)| id != identifier);
    }

    fn set_direct_call_delegate(&self, call_id: &str, delegate: Arc<dyn DirectCallDelegate>) {
        self.direct_delegates
            .lock()
            .push((call_id.to_string(), delegate));
    }

    fn authenticate(&self, params: &AuthenticateParams, completion: Completion<User, SdkError>) {
        if params.access_token.as_deref() == Some("expired") {
            completion(None, Some(SdkError::new(400_302, "access token expired")));
        } else {
            completion(Some(User::new(&params.user_id)), None);
        }
    }

    fn deauthenticate(&self, _push_token: Option<&[u8]>, completion: ErrorCompletion<SdkError>) {
        completion(None);
    }

    fn dial(&self, params: &DialParams, completion: Completion<DirectCall, SdkError>) {
        let call = DirectCall {
            callee: Some(User::new(&params.callee_id)),
            caller: Some(User::new("me")),
            is_video: params.is_video,
            custom_items: params.custom_items.clone(),
            ..DirectCall::new(format!("call-to-{}", params.callee_id))
        };
        thread::spawn(move || completion(Some(call), None));
    }

    fn register_push_token(
        &self,
        kind: PushTokenKind,
        token: &[u8],
        unique: bool,
        completion: ErrorCompletion<SdkError>,
    ) {
        if token.is_empty() {
            return completion(Some(invalid("token must not be empty")));
        }
        let mut tokens = self.push_tokens.lock();
        if unique {
            tokens.retain(|(k, _)| *k != kind);
        }
        tokens.push((kind, token.to_vec()));
        completion(None);
    }

    fn unregister_push_token(
        &self,
        kind: PushTokenKind,
        token: &[u8],
        completion: ErrorCompletion<SdkError>,
    ) {
        self.push_tokens
            .lock()
            .retain(|(k, t)| !(*k == kind && t == token));
        completion(None);
    }

    fn unregister_all_push_tokens(&self, kind: PushTokenKind, completion: ErrorCompletion<SdkError>) {
        self.push_tokens.lock().retain(|(k, _)| *k != kind);
        completion(None);
    }

    fn update_custom_items(
        &self,
        call_id: &str,
        items: &CustomItems,
        completion: Completion<CustomItemsChange, SdkError>,
    ) {
        let mut all = self.custom_items.lock();
        let current = all.entry(call_id.to_string()).or_default();
        current.extend(items.clone());
        let mut keys: Vec<_> = items.keys().cloned().collect();
        keys.sort();
        completion(
            Some(CustomItemsChange {
                items: current.clone(),
                keys,
            }),
            None,
        );
    }

    fn delete_custom_items(
        &self,
        call_id: &str,
        keys: &[String],
        completion: Completion<CustomItemsChange, SdkError>,
    ) {
        let mut all = self.custom_items.lock();
        let current = all.entry(call_id.to_string()).or_default();
        for key in keys {
            current.remove(key);
        }
        completion(
            Some(CustomItemsChange {
                items: current.clone(),
                keys: keys.to_vec(),
            }),
            None,
        );
    }

    fn delete_all_custom_items(
        &self,
        call_id: &str,
        completion: Completion<CustomItemsChange, SdkError>,
    ) {
        self.custom_items.lock().remove(call_id);
        // The SDK reports neither items nor keys once everything is gone.
        completion(None, None);
    }

    fn switch_camera(&self, _call_id: &str, completion: ErrorCompletion<SdkError>) {
        completion(None);
    }
}

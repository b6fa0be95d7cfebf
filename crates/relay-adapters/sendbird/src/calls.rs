//! Calls SDK operations as futures.

use std::fmt;
use std::sync::Arc;

use relay_core::{request, request_or_default, request_unit};
use tracing::debug;

use crate::chat::SdkFuture;
use crate::model::{
    AuthenticateParams, CustomItems, CustomItemsChange, DialParams, DirectCall, PushTokenKind,
    User,
};
use crate::sdk::CallsSdk;

/// Async front end of a [`CallsSdk`].
#[derive(Clone)]
pub struct CallsClient {
    sdk: Arc<dyn CallsSdk>,
}

impl CallsClient {
    pub fn new(sdk: Arc<dyn CallsSdk>) -> Self {
        Self { sdk }
    }

    pub fn sdk(&self) -> &Arc<dyn CallsSdk> {
        &self.sdk
    }

    pub fn authenticate(&self, params: &AuthenticateParams) -> SdkFuture<User> {
        debug!(user_id = %params.user_id, "Authenticating with calls service");
        request(|done| self.sdk.authenticate(params, done))
    }

    /// Signs out, optionally unregistering `push_token` on the way.
    pub fn deauthenticate(&self, push_token: Option<&[u8]>) -> SdkFuture<()> {
        request_unit(|done| self.sdk.deauthenticate(push_token, done))
    }

    /// Starts an outgoing call.
    pub fn dial(&self, params: &DialParams) -> SdkFuture<DirectCall> {
        debug!(callee = %params.callee_id, video = params.is_video, "Dialing");
        request(|done| self.sdk.dial(params, done))
    }

    pub fn register_push_token(
        &self,
        kind: PushTokenKind,
        token: &[u8],
        unique: bool,
    ) -> SdkFuture<()> {
        request_unit(|done| self.sdk.register_push_token(kind, token, unique, done))
    }

    pub fn unregister_push_token(&self, kind: PushTokenKind, token: &[u8]) -> SdkFuture<()> {
        request_unit(|done| self.sdk.unregister_push_token(kind, token, done))
    }

    pub fn unregister_all_push_tokens(&self, kind: PushTokenKind) -> SdkFuture<()> {
        request_unit(|done| self.sdk.unregister_all_push_tokens(kind, done))
    }

    // Custom item results may omit the item map or key list; those resolve empty.

    pub fn update_custom_items(
        &self,
        call: &DirectCall,
        items: &CustomItems,
    ) -> SdkFuture<CustomItemsChange> {
        request_or_default(|done| self.sdk.update_custom_items(&call.call_id, items, done))
    }

    pub fn delete_custom_items(
        &self,
        call: &DirectCall,
        keys: &[String],
    ) -> SdkFuture<CustomItemsChange> {
        request_or_default(|done| self.sdk.delete_custom_items(&call.call_id, keys, done))
    }

    pub fn delete_all_custom_items(&self, call: &DirectCall) -> SdkFuture<CustomItemsChange> {
        request_or_default(|done| self.sdk.delete_all_custom_items(&call.call_id, done))
    }

    pub fn switch_camera(&self, call: &DirectCall) -> SdkFuture<()> {
        request_unit(|done| self.sdk.switch_camera(&call.call_id, done))
    }
}

impl fmt::Debug for CallsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallsClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockCallsSdk;
    use crate::model::SdkError;
    use crate::proxy::DelegateProxy;
    use relay_core::RequestError;

    fn client() -> (Arc<MockCallsSdk>, CallsClient) {
        let sdk = Arc::new(MockCallsSdk::default());
        (sdk.clone(), CallsClient::new(sdk))
    }

    #[tokio::test]
    async fn test_authenticate() {
        let (_, client) = client();
        assert_eq!(
            client.authenticate(&AuthenticateParams::new("alice")).await,
            Ok(User::new("alice"))
        );
        assert_eq!(
            client
                .authenticate(&AuthenticateParams::new("alice").access_token("expired"))
                .await,
            Err(RequestError::External(SdkError::new(
                400_302,
                "access token expired"
            )))
        );
        assert_eq!(client.deauthenticate(None).await, Ok(()));
    }

    #[tokio::test]
    async fn test_dial() {
        let (_, client) = client();
        let call = client
            .dial(&DialParams::new("bob").video(true))
            .await
            .unwrap();
        assert_eq!(call.call_id, "call-to-bob");
        assert!(call.is_video);
    }

    #[tokio::test]
    async fn test_push_tokens() {
        let (sdk, client) = client();
        client
            .register_push_token(PushTokenKind::Voip, b"one", false)
            .await
            .unwrap();
        client
            .register_push_token(PushTokenKind::Remote, b"two", false)
            .await
            .unwrap();
        assert!(
            client
                .register_push_token(PushTokenKind::Voip, b"", false)
                .await
                .is_err()
        );

        client
            .unregister_push_token(PushTokenKind::Remote, b"two")
            .await
            .unwrap();
        assert_eq!(sdk.push_tokens(), vec![(PushTokenKind::Voip, b"one".to_vec())]);

        client
            .unregister_all_push_tokens(PushTokenKind::Voip)
            .await
            .unwrap();
        assert!(sdk.push_tokens().is_empty());
    }

    #[tokio::test]
    async fn test_custom_items() {
        let (_, client) = client();
        let call = DirectCall::new("call-1");
        let items = CustomItems::from([
            ("topic".to_string(), "standup".to_string()),
            ("room".to_string(), "4".to_string()),
        ]);

        let change = client.update_custom_items(&call, &items).await.unwrap();
        assert_eq!(change.items, items);
        assert_eq!(change.keys, vec!["room".to_string(), "topic".to_string()]);

        let change = client
            .delete_custom_items(&call, &["room".to_string()])
            .await
            .unwrap();
        assert_eq!(change.items.len(), 1);

        assert_eq!(
            client.delete_all_custom_items(&call).await,
            Ok(CustomItemsChange::default())
        );
        assert_eq!(client.switch_camera(&call).await, Ok(()));
    }

    #[tokio::test]
    async fn test_dialed_call_events_through_proxy() {
        let (sdk, client) = client();
        let proxy = DelegateProxy::builder().calls(sdk.clone()).build();

        let call = client.dial(&DialParams::new("bob")).await.unwrap();
        let mut events = proxy.direct_call_events(&call);
        sdk.emit_direct_call(&call.call_id, |d| d.established(&call));

        assert_eq!(
            events.recv().await,
            Some(crate::event::DirectCallEvent::Established)
        );

        proxy.shutdown();
        assert_eq!(sdk.delegate_count(), 0);
        assert_eq!(events.recv().await, None);
    }
}

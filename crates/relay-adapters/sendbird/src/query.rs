//! Paged list queries.
//!
//! Channel lists, member lists, user and friend lists, message search and call
//! logs are all exposed by the SDK as stateful query objects that hand out one
//! page per call. [`PagedQuery`] is the common shape; [`PagedQueryExt`] adapts
//! it to a future per page or a stream of pages.

use futures::Stream;
use futures::stream;
use relay_core::{CallbackFuture, Completion, RequestError, request_or_default};
use tracing::trace;

use crate::model::{Channel, DirectCallLog, Member, Message, SdkError, User};

/// A stateful SDK query that yields results one page at a time.
pub trait PagedQuery: Send + Sync {
    type Item: Send + 'static;

    /// Whether another page may be available.
    fn has_next(&self) -> bool;

    /// Requests the next page. An absent page means "no results".
    fn load_next_page_with(&self, completion: Completion<Vec<Self::Item>, SdkError>);
}

/// Group channel list query.
pub type GroupChannelListQuery = dyn PagedQuery<Item = Channel>;
/// Open channel list query.
pub type OpenChannelListQuery = dyn PagedQuery<Item = Channel>;
/// Group channel member list query.
pub type MemberListQuery = dyn PagedQuery<Item = Member>;
/// User list query.
pub type UserListQuery = dyn PagedQuery<Item = User>;
/// Friend list query.
pub type FriendListQuery = dyn PagedQuery<Item = User>;
/// Message search query.
pub type MessageSearchQuery = dyn PagedQuery<Item = Message>;
/// Direct call log query.
pub type DirectCallLogQuery = dyn PagedQuery<Item = DirectCallLog>;

/// Async adapters for [`PagedQuery`].
pub trait PagedQueryExt: PagedQuery {
    /// Loads the next page. An absent page resolves to an empty list.
    fn load_next_page(&self) -> CallbackFuture<Vec<Self::Item>, RequestError<SdkError>> {
        request_or_default(|done| self.load_next_page_with(done))
    }

    /// Streams every remaining page until the query is exhausted.
    ///
    /// Stops after the first error, which is yielded as the last item.
    fn pages(&self) -> impl Stream<Item = Result<Vec<Self::Item>, RequestError<SdkError>>> + '_ {
        stream::unfold(true, move |more| async move {
            if !more || !self.has_next() {
                return None;
            }
            match self.load_next_page().await {
                Ok(page) => {
                    trace!(len = page.len(), "Loaded query page");
                    Some((Ok(page), true))
                }
                Err(err) => Some((Err(err), false)),
            }
        })
    }
}

impl<Q: PagedQuery + ?Sized> PagedQueryExt for Q {}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    type Reply = (Option<Vec<User>>, Option<SdkError>);

    struct ScriptedQuery {
        replies: Mutex<VecDeque<Reply>>,
    }

    impl ScriptedQuery {
        fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
            }
        }
    }

    impl PagedQuery for ScriptedQuery {
        type Item = User;

        fn has_next(&self) -> bool {
            !self.replies.lock().is_empty()
        }

        fn load_next_page_with(&self, completion: Completion<Vec<User>, SdkError>) {
            let (page, err) = self.replies.lock().pop_front().unwrap_or((None, None));
            completion(page, err);
        }
    }

    #[tokio::test]
    async fn test_absent_page_is_empty() {
        let query = ScriptedQuery::new([(None, None)]);
        assert_eq!(query.load_next_page().await, Ok(vec![]));
    }

    #[tokio::test]
    async fn test_error_passes_through() {
        let error = SdkError::new(800_170, "query in progress");
        let query = ScriptedQuery::new([(None, Some(error.clone()))]);
        assert_eq!(
            query.load_next_page().await,
            Err(RequestError::External(error))
        );
    }

    #[tokio::test]
    async fn test_pages_until_exhausted() {
        let query = ScriptedQuery::new([
            (Some(vec![User::new("a"), User::new("b")]), None),
            (Some(vec![User::new("c")]), None),
        ]);

        let pages: Vec<_> = query.pages().collect().await;
        assert_eq!(
            pages,
            vec![
                Ok(vec![User::new("a"), User::new("b")]),
                Ok(vec![User::new("c")])
            ]
        );
    }

    #[tokio::test]
    async fn test_pages_stop_after_error() {
        let error = SdkError::new(500_000, "unavailable");
        let query = ScriptedQuery::new([
            (Some(vec![User::new("a")]), None),
            (None, Some(error.clone())),
            (Some(vec![User::new("never")]), None),
        ]);

        let pages: Vec<_> = query.pages().collect().await;
        assert_eq!(
            pages,
            vec![Ok(vec![User::new("a")]), Err(RequestError::External(error))]
        );
    }

    #[tokio::test]
    async fn test_through_trait_object() {
        let query: Box<UserListQuery> = Box::new(ScriptedQuery::new([(
            Some(vec![User::new("z")]),
            None,
        )]));
        assert_eq!(query.load_next_page().await, Ok(vec![User::new("z")]));
    }
}

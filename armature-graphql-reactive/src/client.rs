//! The callback-style client the adapter wraps.

use crate::{
    CachePolicy, GraphQLFile, GraphQLMutation, GraphQLOperation, GraphQLQuery, GraphQLResponse,
    GraphQLSubscription,
};

/// What a client callback receives: a response envelope or the client's own error.
pub type ClientResult<D, E> = std::result::Result<GraphQLResponse<D>, E>;

/// Completion callback for one-shot operations.
pub type ResultCallback<D, E> = Box<dyn FnOnce(ClientResult<D, E>) + Send + 'static>;

/// Callback for subscriptions, invoked once per inbound message.
pub type SubscriptionCallback<D, E> = Box<dyn FnMut(ClientResult<D, E>) + Send + 'static>;

/// Something that can stop an in-flight operation.
pub trait Cancellable: Send + Sync {
    /// Request cancellation. Must be harmless on a finished operation.
    fn cancel(&self);
}

impl<F> Cancellable for F
where
    F: Fn() + Send + Sync,
{
    fn cancel(&self) {
        self()
    }
}

/// Handle to an in-flight client operation.
pub struct OperationHandle {
    inner: Option<Box<dyn Cancellable>>,
}

impl OperationHandle {
    /// Wrap a cancellation hook.
    pub fn new(cancellable: impl Cancellable + 'static) -> Self {
        Self {
            inner: Some(Box::new(cancellable)),
        }
    }

    /// A handle with nothing to cancel.
    pub fn noop() -> Self {
        Self { inner: None }
    }

    /// Whether this handle can cancel anything.
    pub fn is_cancellable(&self) -> bool {
        self.inner.is_some()
    }

    /// Cancel the operation.
    pub fn cancel(self) {
        if let Some(inner) = self.inner {
            inner.cancel();
        }
    }
}

impl std::fmt::Debug for OperationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationHandle")
            .field("cancellable", &self.is_cancellable())
            .finish()
    }
}

/// A GraphQL client that delivers results through callbacks.
///
/// Each entry point starts one operation and returns immediately. One-shot
/// callbacks fire at most once; a subscription callback fires once per message.
/// Descriptors and options are the client's to interpret.
pub trait CallbackClient: Send + Sync + 'static {
    /// Error type reported through the failure branch of a callback.
    type Error: Send + 'static;

    /// Run a query under the given cache policy.
    fn execute_query<Q: GraphQLQuery>(
        &self,
        query: Q,
        cache_policy: CachePolicy,
        callback: ResultCallback<Q::Data, Self::Error>,
    ) -> OperationHandle;

    /// Run a mutation, optionally writing the result to the client's store.
    fn execute_mutation<M: GraphQLMutation>(
        &self,
        mutation: M,
        publish_result_to_store: bool,
        callback: ResultCallback<M::Data, Self::Error>,
    ) -> OperationHandle;

    /// Run an operation with attached files.
    fn execute_upload<O: GraphQLOperation>(
        &self,
        operation: O,
        files: Vec<GraphQLFile>,
        callback: ResultCallback<O::Data, Self::Error>,
    ) -> OperationHandle;

    /// Start a subscription.
    fn execute_subscription<S: GraphQLSubscription>(
        &self,
        subscription: S,
        callback: SubscriptionCallback<S::Data, Self::Error>,
    ) -> OperationHandle;
}

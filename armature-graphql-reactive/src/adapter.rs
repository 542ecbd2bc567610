//! Reactive wrapper around a [`CallbackClient`].

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::settle::CancelGuard;
use crate::{
    CachePolicy, CallbackClient, ClientResult, GraphQLFile, GraphQLMutation, GraphQLOperation,
    GraphQLQuery, GraphQLSubscription, OperationHandle, ReactiveConfig, ResultCallback,
    SettlementCell, SingleResult, SubscriptionStream, resolve,
};

/// GraphQL operations delivered as futures and streams.
///
/// Each method issues exactly one client call. `data` maps the optional
/// payload of an error-free response; see [`resolve`] for how errors win.
pub trait ReactiveGraphQL {
    /// Error type reported by the underlying client.
    type Error: Send + 'static;

    /// Fetch a query.
    fn fetch<Q, U, F>(
        &self,
        query: Q,
        cache_policy: CachePolicy,
        data: F,
    ) -> SingleResult<U, Self::Error>
    where
        Q: GraphQLQuery,
        U: Send + 'static,
        F: FnOnce(Option<Q::Data>) -> Option<U> + Send + 'static;

    /// Perform a mutation.
    fn perform<M, U, F>(
        &self,
        mutation: M,
        publish_result_to_store: bool,
        data: F,
    ) -> SingleResult<U, Self::Error>
    where
        M: GraphQLMutation,
        U: Send + 'static,
        F: FnOnce(Option<M::Data>) -> Option<U> + Send + 'static;

    /// Upload files with an operation.
    fn upload<O, U, F>(
        &self,
        operation: O,
        files: Vec<GraphQLFile>,
        data: F,
    ) -> SingleResult<U, Self::Error>
    where
        O: GraphQLOperation,
        U: Send + 'static,
        F: FnOnce(Option<O::Data>) -> Option<U> + Send + 'static;

    /// Subscribe, yielding one item per message.
    fn subscribe<S, U, F>(&self, subscription: S, data: F) -> SubscriptionStream<U, Self::Error>
    where
        S: GraphQLSubscription,
        U: Send + 'static,
        F: FnMut(Option<S::Data>) -> Option<U> + Send + 'static;

    /// Subscribe and settle on the first message only.
    ///
    /// The subscription is cancelled as soon as the first message settles the
    /// result, and later messages are discarded.
    fn subscribe_once<S, U, F>(&self, subscription: S, data: F) -> SingleResult<U, Self::Error>
    where
        S: GraphQLSubscription,
        U: Send + 'static,
        F: FnOnce(Option<S::Data>) -> Option<U> + Send + 'static;
}

/// A [`CallbackClient`] exposed through [`ReactiveGraphQL`].
pub struct ReactiveClient<C> {
    client: Arc<C>,
    config: Arc<ReactiveConfig>,
}

impl<C> Clone for ReactiveClient<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C: CallbackClient> ReactiveClient<C> {
    /// Wrap a client with the default configuration.
    pub fn new(client: C) -> Self {
        Self::with_config(client, ReactiveConfig::default())
    }

    /// Wrap a client with custom configuration.
    pub fn with_config(client: C, config: ReactiveConfig) -> Self {
        Self::from_arc(Arc::new(client), config)
    }

    /// Wrap a client that is already shared.
    pub fn from_arc(client: Arc<C>, config: ReactiveConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    /// Get the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Get the configuration.
    pub fn config(&self) -> &ReactiveConfig {
        &self.config
    }

    /// Fetch a query with the configured default cache policy.
    pub fn query<Q, U, F>(&self, query: Q, data: F) -> SingleResult<U, C::Error>
    where
        Q: GraphQLQuery,
        U: Send + 'static,
        F: FnOnce(Option<Q::Data>) -> Option<U> + Send + 'static,
    {
        self.fetch(query, self.config.default_cache_policy, data)
    }

    /// Perform a mutation with the configured store flag.
    pub fn mutate<M, U, F>(&self, mutation: M, data: F) -> SingleResult<U, C::Error>
    where
        M: GraphQLMutation,
        U: Send + 'static,
        F: FnOnce(Option<M::Data>) -> Option<U> + Send + 'static,
    {
        self.perform(mutation, self.config.publish_result_to_store, data)
    }

    fn single<D, U, F>(
        &self,
        data: F,
        dispatch: impl FnOnce(ResultCallback<D, C::Error>) -> OperationHandle,
    ) -> SingleResult<U, C::Error>
    where
        D: Send + 'static,
        U: Send + 'static,
        F: FnOnce(Option<D>) -> Option<U> + Send + 'static,
    {
        let (cell, rx) = SettlementCell::new();
        let settler = Arc::clone(&cell);
        let callback: ResultCallback<D, C::Error> = Box::new(move |result| {
            let outcome = resolve(result, data);
            trace!(ok = outcome.is_ok(), "Settling GraphQL result");
            settler.settle(outcome);
        });

        let handle = dispatch(callback);
        let guard = CancelGuard::new(handle, &cell, self.config.cancel_on_drop);
        SingleResult::new(rx, guard, self.config.timeout)
    }
}

impl<C: CallbackClient> ReactiveGraphQL for ReactiveClient<C> {
    type Error = C::Error;

    fn fetch<Q, U, F>(
        &self,
        query: Q,
        cache_policy: CachePolicy,
        data: F,
    ) -> SingleResult<U, C::Error>
    where
        Q: GraphQLQuery,
        U: Send + 'static,
        F: FnOnce(Option<Q::Data>) -> Option<U> + Send + 'static,
    {
        debug!(
            operation = Q::OPERATION_NAME,
            kind = %Q::OPERATION_KIND,
            cache_policy = %cache_policy,
            "Fetching GraphQL query"
        );
        trace_request(&query);
        self.single(data, |callback| {
            self.client.execute_query(query, cache_policy, callback)
        })
    }

    fn perform<M, U, F>(
        &self,
        mutation: M,
        publish_result_to_store: bool,
        data: F,
    ) -> SingleResult<U, C::Error>
    where
        M: GraphQLMutation,
        U: Send + 'static,
        F: FnOnce(Option<M::Data>) -> Option<U> + Send + 'static,
    {
        debug!(
            operation = M::OPERATION_NAME,
            kind = %M::OPERATION_KIND,
            publish_result_to_store,
            "Performing GraphQL mutation"
        );
        trace_request(&mutation);
        self.single(data, |callback| {
            self.client
                .execute_mutation(mutation, publish_result_to_store, callback)
        })
    }

    fn upload<O, U, F>(
        &self,
        operation: O,
        files: Vec<GraphQLFile>,
        data: F,
    ) -> SingleResult<U, C::Error>
    where
        O: GraphQLOperation,
        U: Send + 'static,
        F: FnOnce(Option<O::Data>) -> Option<U> + Send + 'static,
    {
        debug!(
            operation = O::OPERATION_NAME,
            kind = %O::OPERATION_KIND,
            files = files.len(),
            "Uploading files with GraphQL operation"
        );
        trace_request(&operation);
        self.single(data, |callback| {
            self.client.execute_upload(operation, files, callback)
        })
    }

    fn subscribe<S, U, F>(&self, subscription: S, data: F) -> SubscriptionStream<U, C::Error>
    where
        S: GraphQLSubscription,
        U: Send + 'static,
        F: FnMut(Option<S::Data>) -> Option<U> + Send + 'static,
    {
        debug!(
            operation = S::OPERATION_NAME,
            kind = %S::OPERATION_KIND,
            "Starting GraphQL subscription"
        );
        trace_request(&subscription);
        let (callback, rx) = crate::subscription::channel(data);
        let handle = self
            .client
            .execute_subscription(subscription, Box::new(callback));
        SubscriptionStream::new(rx, handle, self.config.cancel_on_drop)
    }

    fn subscribe_once<S, U, F>(&self, subscription: S, data: F) -> SingleResult<U, C::Error>
    where
        S: GraphQLSubscription,
        U: Send + 'static,
        F: FnOnce(Option<S::Data>) -> Option<U> + Send + 'static,
    {
        debug!(
            operation = S::OPERATION_NAME,
            kind = %S::OPERATION_KIND,
            "Starting GraphQL subscription for its first message"
        );
        trace_request(&subscription);
        let (cell, rx) = SettlementCell::new();
        let settler = Arc::clone(&cell);
        let slot: Arc<Mutex<Option<OperationHandle>>> = Arc::default();
        let first_slot = Arc::clone(&slot);
        let mut data = Some(data);
        let callback = move |result: ClientResult<S::Data, C::Error>| {
            let Some(data) = data.take() else {
                trace!("Discarding subscription message after the first");
                return;
            };
            let outcome = resolve(result, data);
            trace!(ok = outcome.is_ok(), "Settling first subscription message");
            settler.settle(outcome);
            cancel_slot(&first_slot);
        };

        let handle = self
            .client
            .execute_subscription(subscription, Box::new(callback));
        *slot.lock() = Some(handle);
        // The first message may have arrived before the handle was stored.
        if cell.is_settled() {
            cancel_slot(&slot);
        }

        let guard_slot = Arc::clone(&slot);
        let guard = CancelGuard::new(
            OperationHandle::new(move || cancel_slot(&guard_slot)),
            &cell,
            self.config.cancel_on_drop,
        );
        SingleResult::new(rx, guard, self.config.timeout)
    }
}

fn trace_request<O: GraphQLOperation>(operation: &O) {
    trace!(
        operation = O::OPERATION_NAME,
        document_len = operation.document().len(),
        has_variables = operation.variables().is_some(),
        "Dispatching GraphQL operation to client"
    );
}

/// Cancel the handle in `slot`, at most once.
fn cancel_slot(slot: &Mutex<Option<OperationHandle>>) {
    let handle = slot.lock().take();
    if let Some(handle) = handle {
        debug!("Cancelling GraphQL subscription after its first message");
        handle.cancel();
    }
}

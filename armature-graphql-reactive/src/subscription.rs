//! Multi-value results for GraphQL subscriptions.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use futures::stream::FusedStream;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::{ClientResult, OperationHandle, resolve};

type Item<U, E> = crate::Result<Option<U>, E>;

/// Build the client callback for a subscription and the stream it feeds.
///
/// Every message goes through [`resolve`]. The first error item is forwarded
/// and everything after it is dropped.
pub(crate) fn channel<D, U, E, F>(
    mut data: F,
) -> (
    impl FnMut(ClientResult<D, E>) + Send + 'static,
    mpsc::UnboundedReceiver<Item<U, E>>,
)
where
    D: Send + 'static,
    U: Send + 'static,
    E: Send + 'static,
    F: FnMut(Option<D>) -> Option<U> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let mut failed = false;
    let callback = move |result: ClientResult<D, E>| {
        if failed {
            trace!("Dropping subscription message after failure");
            return;
        }
        let item = resolve(result, &mut data);
        failed = item.is_err();
        if tx.send(item).is_err() {
            trace!("Subscription message arrived after the stream was dropped");
        }
    };
    (callback, rx)
}

/// A stream of mapped subscription messages.
///
/// Yields one item per client callback. An error item ends the stream and
/// always cancels the subscription. Dropping a live stream cancels it only
/// when the adapter is configured to cancel on drop.
#[must_use = "streams do nothing unless polled"]
pub struct SubscriptionStream<U, E> {
    rx: mpsc::UnboundedReceiver<Item<U, E>>,
    handle: Option<OperationHandle>,
    cancel_on_drop: bool,
    terminated: bool,
}

impl<U, E> SubscriptionStream<U, E> {
    pub(crate) fn new(
        rx: mpsc::UnboundedReceiver<Item<U, E>>,
        handle: OperationHandle,
        cancel_on_drop: bool,
    ) -> Self {
        Self {
            rx,
            handle: Some(handle),
            cancel_on_drop,
            terminated: false,
        }
    }

    /// Stop the subscription and end the stream.
    pub fn cancel(&mut self) {
        self.terminated = true;
        self.rx.close();
        if let Some(handle) = self.handle.take() {
            debug!("Cancelling GraphQL subscription");
            handle.cancel();
        }
    }

    fn finish(&mut self) {
        self.terminated = true;
        self.handle = None;
    }
}

impl<U, E> Unpin for SubscriptionStream<U, E> {}

impl<U, E> Stream for SubscriptionStream<U, E> {
    type Item = Item<U, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.terminated {
            return Poll::Ready(None);
        }
        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(Err(e))) => {
                self.cancel();
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(Some(Ok(value))) => Poll::Ready(Some(Ok(value))),
            Poll::Ready(None) => {
                self.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<U, E> FusedStream for SubscriptionStream<U, E> {
    fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl<U, E> Drop for SubscriptionStream<U, E> {
    fn drop(&mut self) {
        if self.terminated {
            return;
        }
        if self.cancel_on_drop {
            self.cancel();
        } else {
            trace!("Leaving GraphQL subscription running after its stream was dropped");
        }
    }
}

impl<U, E> std::fmt::Debug for SubscriptionStream<U, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionStream")
            .field("terminated", &self.terminated)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GraphQLResponse, GraphQLResponseError};
    use futures::StreamExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handle() -> (OperationHandle, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let hook = count.clone();
        let handle = OperationHandle::new(move || {
            hook.fetch_add(1, Ordering::SeqCst);
        });
        (handle, count)
    }

    #[tokio::test]
    async fn test_yields_every_message() {
        let (mut callback, rx) = channel(|n: Option<u32>| n.map(|n| n * 10));
        let mut stream = SubscriptionStream::<u32, String>::new(rx, OperationHandle::noop(), true);

        callback(Ok(GraphQLResponse::from_data(1)));
        callback(Ok(GraphQLResponse::empty()));
        callback(Ok(GraphQLResponse::from_data(3)));

        assert_eq!(stream.next().await.unwrap().unwrap(), Some(10));
        assert_eq!(stream.next().await.unwrap().unwrap(), None);
        assert_eq!(stream.next().await.unwrap().unwrap(), Some(30));
    }

    #[tokio::test]
    async fn test_error_ends_stream_and_cancels() {
        let (handle, cancelled) = counting_handle();
        let (mut callback, rx) = channel(|n: Option<u32>| n);
        let mut stream = SubscriptionStream::<u32, String>::new(rx, handle, true);

        callback(Ok(GraphQLResponse::from_data(1)));
        callback(Ok(GraphQLResponse::from_errors(vec![GraphQLResponseError::new("gone")])));
        callback(Ok(GraphQLResponse::from_data(2)));

        assert_eq!(stream.next().await.unwrap().unwrap(), Some(1));
        assert!(stream.next().await.unwrap().unwrap_err().is_graphql_error());
        assert!(stream.next().await.is_none());
        assert!(stream.is_terminated());
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);

        drop(stream);
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_client_completion_ends_stream_without_cancel() {
        let (handle, cancelled) = counting_handle();
        let (mut callback, rx) = channel(|n: Option<u32>| n);
        let mut stream = SubscriptionStream::<u32, String>::new(rx, handle, true);

        callback(Ok(GraphQLResponse::from_data(5)));
        drop(callback);

        assert_eq!(stream.next().await.unwrap().unwrap(), Some(5));
        assert!(stream.next().await.is_none());
        drop(stream);
        assert_eq!(cancelled.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_cancels_live_subscription() {
        let (handle, cancelled) = counting_handle();
        let (_callback, rx) = channel(|n: Option<u32>| n);
        let stream = SubscriptionStream::<u32, String>::new(rx, handle, true);

        drop(stream);
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_cancels_without_cancel_on_drop() {
        let (handle, cancelled) = counting_handle();
        let (mut callback, rx) = channel(|n: Option<u32>| n);
        let mut stream = SubscriptionStream::<u32, String>::new(rx, handle, false);

        callback(Err("socket closed".to_string()));

        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(err.into_client_error(), Some("socket closed".to_string()));
        assert!(stream.next().await.is_none());
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);

        drop(stream);
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_without_cancel_on_drop() {
        let (handle, cancelled) = counting_handle();
        let (_callback, rx) = channel(|n: Option<u32>| n);
        let stream = SubscriptionStream::<u32, String>::new(rx, handle, false);

        drop(stream);
        assert_eq!(cancelled.load(Ordering::SeqCst), 0);
    }
}

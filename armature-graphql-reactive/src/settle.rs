//! Bridging a completion callback into a single-value future.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::FutureExt;
use futures::future::Shared;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, trace, warn};

use crate::{OperationHandle, ReactiveError};

/// Exactly-once write cell feeding a [`SingleResult`].
///
/// The first [`settle`](Self::settle) wins; later calls are rejected and
/// reported.
pub struct SettlementCell<T> {
    sender: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> SettlementCell<T> {
    /// Create a cell and the receiving end it settles.
    pub fn new() -> (Arc<Self>, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        let cell = Arc::new(Self {
            sender: Mutex::new(Some(tx)),
        });
        (cell, rx)
    }

    /// Settle the cell. Returns `false` if it was already settled.
    pub fn settle(&self, value: T) -> bool {
        let Some(sender) = self.sender.lock().take() else {
            warn!("Ignoring second settlement of a reactive result");
            return false;
        };
        if sender.send(value).is_err() {
            trace!("Reactive result settled after its receiver was dropped");
        }
        true
    }

    /// Whether the cell has been settled.
    pub fn is_settled(&self) -> bool {
        self.sender.lock().is_none()
    }
}

/// Cancels an operation on drop unless it settled or was disarmed.
///
/// Holds the cell weakly so a client that drops its callback still closes
/// the channel.
pub(crate) struct CancelGuard<T> {
    handle: Option<OperationHandle>,
    cell: Weak<SettlementCell<T>>,
}

impl<T> CancelGuard<T> {
    pub(crate) fn new(handle: OperationHandle, cell: &Arc<SettlementCell<T>>, armed: bool) -> Self {
        Self {
            handle: armed.then_some(handle),
            cell: Arc::downgrade(cell),
        }
    }

    pub(crate) fn disarm(&mut self) {
        self.handle = None;
    }
}

impl<T> Drop for CancelGuard<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take()
            && self.cell.upgrade().is_some_and(|cell| !cell.is_settled()) {
                debug!("Cancelling unsettled GraphQL operation");
                handle.cancel();
            }
    }
}

type Outcome<U, E> = crate::Result<Option<U>, E>;

/// A single-value reactive result.
///
/// Resolves to the mapped value (possibly `None`) or to the error that won
/// resolution. Dropping it before it resolves cancels the underlying
/// operation when the adapter is configured to.
#[must_use = "futures do nothing unless polled"]
pub struct SingleResult<U, E> {
    inner: Pin<Box<dyn Future<Output = Outcome<U, E>> + Send>>,
}

impl<U, E> SingleResult<U, E>
where
    U: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn new(
        mut rx: oneshot::Receiver<Outcome<U, E>>,
        mut guard: CancelGuard<Outcome<U, E>>,
        timeout: Option<Duration>,
    ) -> Self {
        let inner = async move {
            // A settled result needs no timer, and so no runtime.
            let received = match rx.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(TryRecvError::Closed) => None,
                Err(TryRecvError::Empty) => match timeout {
                    Some(limit) => match tokio::time::timeout(limit, rx).await {
                        Ok(received) => received.ok(),
                        Err(_) => {
                            debug!(timeout = ?limit, "GraphQL operation timed out");
                            return Err(ReactiveError::Timeout(limit));
                        }
                    },
                    None => rx.await.ok(),
                },
            };
            guard.disarm();
            received.unwrap_or(Err(ReactiveError::Abandoned))
        };
        Self {
            inner: Box::pin(inner),
        }
    }

    /// A result that is already settled.
    pub fn ready(outcome: Outcome<U, E>) -> Self {
        Self {
            inner: Box::pin(futures::future::ready(outcome)),
        }
    }
}

impl<U, E> SingleResult<U, E>
where
    U: Clone,
    E: Clone,
{
    /// Share the result so it can be awaited from several places.
    pub fn shared(self) -> Shared<Self> {
        FutureExt::shared(self)
    }
}

impl<U, E> Future for SingleResult<U, E> {
    type Output = Outcome<U, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl<U, E> std::fmt::Debug for SingleResult<U, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleResult").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_pending, assert_ready, task};

    fn counting_handle() -> (OperationHandle, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let hook = count.clone();
        let handle = OperationHandle::new(move || {
            hook.fetch_add(1, Ordering::SeqCst);
        });
        (handle, count)
    }

    #[test]
    fn test_second_settlement_is_rejected() {
        let (cell, mut rx) = SettlementCell::<u32>::new();
        assert!(!cell.is_settled());

        assert!(cell.settle(1));
        assert!(cell.is_settled());
        assert!(!cell.settle(2));

        assert_eq!(rx.try_recv().unwrap(), 1);
    }

    #[test]
    fn test_pending_until_settled() {
        let (cell, rx) = SettlementCell::new();
        let guard = CancelGuard::new(OperationHandle::noop(), &cell, true);
        let mut fut = task::spawn(SingleResult::<&str, String>::new(rx, guard, None));

        assert_pending!(fut.poll());
        cell.settle(Ok(Some("Ada")));
        assert!(fut.is_woken());
        assert_eq!(assert_ready!(fut.poll()).unwrap(), Some("Ada"));
    }

    #[test]
    fn test_dropped_sender_is_abandoned() {
        let (cell, rx) = SettlementCell::<Outcome<u32, String>>::new();
        let guard = CancelGuard::new(OperationHandle::noop(), &cell, true);
        let mut fut = task::spawn(SingleResult::new(rx, guard, None));

        drop(cell);
        let err = assert_ready!(fut.poll()).unwrap_err();
        assert!(matches!(err, ReactiveError::Abandoned));
    }

    #[test]
    fn test_drop_before_settlement_cancels() {
        let (handle, cancelled) = counting_handle();
        let (cell, rx) = SettlementCell::<Outcome<u32, String>>::new();
        let guard = CancelGuard::new(handle, &cell, true);
        let mut fut = task::spawn(SingleResult::new(rx, guard, None));

        assert_pending!(fut.poll());
        drop(fut);
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_after_settlement_does_not_cancel() {
        let (handle, cancelled) = counting_handle();
        let (cell, rx) = SettlementCell::<Outcome<u32, String>>::new();
        let guard = CancelGuard::new(handle, &cell, true);
        let fut = SingleResult::new(rx, guard, None);

        cell.settle(Ok(None));
        drop(fut);
        assert_eq!(cancelled.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_disarmed_guard_never_cancels() {
        let (handle, cancelled) = counting_handle();
        let (cell, rx) = SettlementCell::<Outcome<u32, String>>::new();
        let guard = CancelGuard::new(handle, &cell, false);

        drop(SingleResult::new(rx, guard, None));
        assert_eq!(cancelled.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_settled_result_with_timeout_needs_no_runtime() {
        let (cell, rx) = SettlementCell::<Outcome<u32, String>>::new();
        let guard = CancelGuard::new(OperationHandle::noop(), &cell, true);
        let fut = SingleResult::new(rx, guard, Some(Duration::from_secs(1)));

        cell.settle(Ok(Some(3)));
        assert_eq!(futures::executor::block_on(fut).unwrap(), Some(3));
    }

    #[test]
    fn test_abandoned_result_with_timeout_needs_no_runtime() {
        let (cell, rx) = SettlementCell::<Outcome<u32, String>>::new();
        let guard = CancelGuard::new(OperationHandle::noop(), &cell, true);
        let fut = SingleResult::new(rx, guard, Some(Duration::from_secs(1)));

        drop(cell);
        let err = futures::executor::block_on(fut).unwrap_err();
        assert!(matches!(err, ReactiveError::Abandoned));
    }

    #[tokio::test]
    async fn test_shared_result_is_readable_many_times() {
        let shared = SingleResult::<u32, String>::ready(Ok(Some(7))).shared();
        let other = shared.clone();

        assert_eq!(shared.await.unwrap(), Some(7));
        assert_eq!(other.await.unwrap(), Some(7));
    }
}

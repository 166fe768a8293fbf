//! Awaitable continuations returned by accepted calls.

use std::future::Future;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;

use callbridge_core::{CallError, CorrelationId, CorrelationRegistry};

/// The eventual result of an accepted native call.
///
/// Resolves once the callback has been dispatched. Awaiting it directly
/// waits indefinitely; [`wait`](Self::wait) and
/// [`wait_timeout`](Self::wait_timeout) give up after a deadline and
/// deregister the call. Dropping a `Pending` leaves the call registered
/// until its callback arrives, and that result is discarded.
#[must_use = "a pending call does nothing unless awaited"]
pub struct Pending<T> {
    id: CorrelationId,
    rx: oneshot::Receiver<Result<T, CallError>>,
    registry: Weak<CorrelationRegistry>,
    default_timeout: Option<Duration>,
}

impl<T> Pending<T> {
    pub(crate) fn new(
        id: CorrelationId,
        rx: oneshot::Receiver<Result<T, CallError>>,
        registry: Weak<CorrelationRegistry>,
        default_timeout: Option<Duration>,
    ) -> Self {
        Self {
            id,
            rx,
            registry,
            default_timeout,
        }
    }

    pub fn id(&self) -> CorrelationId {
        self.id
    }

    /// Await the result, applying the broker's configured call timeout.
    pub async fn wait(self) -> Result<T, CallError> {
        match self.default_timeout {
            Some(after) => self.wait_timeout(after).await,
            None => self.await,
        }
    }

    /// Await the result for at most `after`.
    ///
    /// On expiry the call is removed from the registry and its id remembered
    /// as abandoned, so a callback arriving afterwards is logged as late.
    pub async fn wait_timeout(mut self, after: Duration) -> Result<T, CallError> {
        let id = self.id;
        match tokio::time::timeout(after, &mut self.rx).await {
            Ok(received) => flatten(id, received),
            Err(_) => {
                let abandoned = self
                    .registry
                    .upgrade()
                    .and_then(|registry| registry.abandon(id));
                if abandoned.is_some() {
                    tracing::warn!(%id, ?after, "no callback before deadline, call abandoned");
                    return Err(CallError::Timeout { id, after });
                }
                // The dispatcher took the entry first; its result is in flight.
                flatten(id, (&mut self.rx).await)
            }
        }
    }

    /// Block the current thread until the result arrives.
    ///
    /// # Panics
    ///
    /// If called from within an asynchronous execution context.
    pub fn blocking_wait(self) -> Result<T, CallError> {
        let id = self.id;
        flatten(id, self.rx.blocking_recv())
    }
}

fn flatten<T>(
    id: CorrelationId,
    received: Result<Result<T, CallError>, oneshot::error::RecvError>,
) -> Result<T, CallError> {
    match received {
        Ok(outcome) => outcome,
        Err(_) => Err(CallError::Abandoned { id }),
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, CallError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let id = self.id;
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| flatten(id, received))
    }
}

impl<T> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending")
            .field("id", &self.id)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callbridge_core::Continuation;
    use std::sync::Arc;

    fn pending_with_registry(
        raw: i32,
    ) -> (
        Arc<CorrelationRegistry>,
        oneshot::Sender<Result<u32, CallError>>,
        Pending<u32>,
    ) {
        let registry = Arc::new(CorrelationRegistry::new());
        let id = CorrelationId(raw);
        registry.register(id, Continuation::new("test", |_, _| {}));
        let (tx, rx) = oneshot::channel();
        let pending = Pending::new(id, rx, Arc::downgrade(&registry), None);
        (registry, tx, pending)
    }

    #[tokio::test]
    async fn test_resolves_with_sent_value() {
        let (_registry, tx, pending) = pending_with_registry(1);
        tx.send(Ok(7)).unwrap();
        assert_eq!(pending.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_dropped_sender_is_abandoned() {
        let (_registry, tx, pending) = pending_with_registry(2);
        drop(tx);
        assert!(matches!(pending.await, Err(CallError::Abandoned { .. })));
    }

    #[tokio::test]
    async fn test_timeout_deregisters() {
        let (registry, _tx, pending) = pending_with_registry(3);
        let err = pending
            .wait_timeout(Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::Timeout { id, .. } if id == CorrelationId(3)));
        assert!(!registry.contains(CorrelationId(3)));
        assert!(registry.is_abandoned(CorrelationId(3)));
    }

    #[tokio::test]
    async fn test_timeout_loses_race_to_dispatch() {
        let (registry, tx, pending) = pending_with_registry(4);
        // Simulate the dispatcher having taken the entry already.
        registry.take(CorrelationId(4));
        let sender = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            let _ = tx.send(Ok(11));
        });
        let value = pending.wait_timeout(Duration::from_millis(5)).await.unwrap();
        assert_eq!(value, 11);
        sender.await.unwrap();
    }

    #[test]
    fn test_blocking_wait() {
        let (_registry, tx, pending) = pending_with_registry(5);
        std::thread::spawn(move || {
            let _ = tx.send(Ok(42));
        });
        assert_eq!(pending.blocking_wait().unwrap(), 42);
    }
}

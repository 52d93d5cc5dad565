use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{DriverError, Result};

#[derive(Debug)]
enum Outcome {
    Reached,
    Closed,
}

#[derive(Debug)]
struct Waiter {
    id: u64,
    tx: oneshot::Sender<Outcome>,
}

#[derive(Debug, Default)]
struct Inner {
    slot: Mutex<Option<Waiter>>,
    next_id: AtomicU64,
}

impl Inner {
    fn slot(&self) -> MutexGuard<'_, Option<Waiter>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One-slot queue pairing a command with the next target-reached event.
///
/// Target-reached notifications carry no command identity, so at most one
/// listener may be attached at a time. A second [`Correlator::subscribe`]
/// fails with [`DriverError::CompletionPending`].
#[derive(Debug, Clone, Default)]
pub struct Correlator {
    inner: Arc<Inner>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the listener for the next target-reached event.
    pub fn subscribe(&self) -> Result<Subscription> {
        let mut slot = self.inner.slot();
        if slot.is_some() {
            return Err(DriverError::CompletionPending);
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        *slot = Some(Waiter { id, tx });
        debug!(id, "completion listener attached");

        Ok(Subscription {
            id,
            rx,
            inner: Arc::clone(&self.inner),
        })
    }

    /// Deliver a target-reached event. Returns false if nothing was waiting.
    pub fn notify_target_reached(&self) -> bool {
        match self.inner.slot().take() {
            Some(waiter) => {
                debug!(id = waiter.id, "completion listener fired");
                waiter.tx.send(Outcome::Reached).is_ok()
            }
            None => false,
        }
    }

    /// Detach the pending listener; its waiter resolves as cancelled.
    pub fn cancel(&self) -> bool {
        match self.inner.slot().take() {
            Some(waiter) => {
                debug!(id = waiter.id, "completion listener cancelled");
                true
            }
            None => false,
        }
    }

    /// Detach the pending listener because the link went away.
    pub fn close(&self) {
        if let Some(waiter) = self.inner.slot().take() {
            debug!(id = waiter.id, "completion listener closed with link");
            let _ = waiter.tx.send(Outcome::Closed);
        }
    }

    /// Whether a listener is attached.
    pub fn is_pending(&self) -> bool {
        self.inner.slot().is_some()
    }
}

/// A one-shot listener for the next target-reached event.
///
/// Dropping the subscription detaches it, so every exit path (fired,
/// cancelled, timed out, abandoned) leaves the correlator empty.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: oneshot::Receiver<Outcome>,
    inner: Arc<Inner>,
}

impl Subscription {
    /// Wait for the event, the timeout, or cancellation, whichever is first.
    pub async fn wait(mut self, timeout: Option<Duration>, cancel: &CancellationToken) -> Result<()> {
        let outcome = tokio::select! {
            biased;
            outcome = &mut self.rx => outcome,
            _ = cancel.cancelled() => return Err(DriverError::Cancelled),
            _ = deadline(timeout) => {
                return Err(DriverError::Timeout(timeout.unwrap_or_default()));
            }
        };

        match outcome {
            Ok(Outcome::Reached) => Ok(()),
            Ok(Outcome::Closed) => Err(DriverError::Disconnected),
            Err(_) => Err(DriverError::Cancelled),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut slot = self.inner.slot();
        if slot.as_ref().is_some_and(|waiter| waiter.id == self.id) {
            slot.take();
            debug!(id = self.id, "completion listener detached");
        }
    }
}

async fn deadline(timeout: Option<Duration>) {
    match timeout {
        Some(timeout) => tokio::time::sleep(timeout).await,
        None => std::future::pending().await,
    }
}

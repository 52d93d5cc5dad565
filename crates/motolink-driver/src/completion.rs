use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::correlator::Subscription;
use crate::error::Result;

/// Result of issuing a command.
#[derive(Debug)]
pub enum Completion {
    /// Done once written.
    Immediate,
    /// Waiting for the controller's target-reached notification.
    Pending(PendingCompletion),
    /// Done after a fixed delay with no wire dependency (stop).
    Settle(Duration),
}

impl Completion {
    /// Whether the command is already complete.
    pub fn is_immediate(&self) -> bool {
        matches!(self, Self::Immediate)
    }

    /// Wait until the command is complete.
    pub async fn wait(self) -> Result<()> {
        match self {
            Self::Immediate => Ok(()),
            Self::Settle(delay) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(())
            }
            Self::Pending(pending) => pending.wait().await,
        }
    }
}

/// A distance/angle command awaiting its target-reached notification.
#[derive(Debug)]
pub struct PendingCompletion {
    subscription: Subscription,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl PendingCompletion {
    pub(crate) fn new(
        subscription: Subscription,
        timeout: Option<Duration>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            subscription,
            timeout,
            cancel,
        }
    }

    /// Token that aborts [`PendingCompletion::wait`] with `Cancelled`.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Configured timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Wait for target reached, timeout, cancellation or link loss.
    pub async fn wait(self) -> Result<()> {
        self.subscription.wait(self.timeout, &self.cancel).await
    }
}

//! Execution context carried by every storage operation
//!
//! A [`Context`] bounds a provider call by an optional deadline and an
//! optional cancellation signal. Backends wrap each SDK call in
//! [`Context::run`]; nothing here retries or extends a call.

use std::future::{Future, pending, poll_fn};
use std::task::Poll;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

/// Reason a context stopped an operation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation and deadline scope for storage operations
///
/// Cloning a context shares its cancellation signals. Derived contexts keep
/// the earliest deadline and every cancellation signal of their parents.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Vec<watch::Receiver<bool>>,
}

/// Handle that cancels every context derived from it
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_canceled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Context {
    /// A context that is never canceled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that expires after `timeout`
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that expires at `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Derive a cancelable context
    ///
    /// The derived context is also canceled by any handle of its parents.
    /// The new handle cancels only the derived context and its own children.
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel.push(rx);
        (self, CancelHandle { tx })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Report why this context is done, or `None` if it is still live
    pub fn err(&self) -> Option<ContextError> {
        if self.cancel.iter().any(|rx| *rx.borrow()) {
            return Some(ContextError::Canceled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(ContextError::DeadlineExceeded);
        }
        None
    }

    /// Drive `fut` to completion unless the context ends first
    ///
    /// A context that is already done fails without polling `fut`.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, ContextError> {
        if let Some(err) = self.err() {
            return Err(err);
        }

        tokio::select! {
            output = fut => Ok(output),
            _ = self.canceled() => Err(ContextError::Canceled),
            _ = self.expired() => Err(ContextError::DeadlineExceeded),
        }
    }

    /// Resolves once any cancellation signal fires
    async fn canceled(&self) {
        let mut waits: Vec<_> = self
            .cancel
            .iter()
            .cloned()
            .map(|rx| Box::pin(wait_canceled(rx)))
            .collect();

        poll_fn(|cx| {
            if waits.iter_mut().any(|wait| wait.as_mut().poll(cx).is_ready()) {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
        .await
    }

    async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => pending::<()>().await,
        }
    }
}

async fn wait_canceled(mut rx: watch::Receiver<bool>) {
    if rx.wait_for(|canceled| *canceled).await.is_err() {
        // Sender dropped without canceling
        pending::<()>().await;
    }
}

// src/barrier/wait.rs

//! Cancellable pause between polls.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::source::BoxFuture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full interval passed.
    Elapsed,
    /// The token fired first.
    Cancelled,
}

/// Trait abstracting how the barrier waits between polls.
///
/// Production code uses [`TokioWait`]; tests can record the requested
/// intervals and return immediately.
pub trait Wait: Send {
    fn wait<'a>(
        &'a mut self,
        interval: Duration,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, WaitOutcome>;
}

/// Sleeps on the Tokio timer, racing the cancellation token.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioWait;

impl Wait for TokioWait {
    fn wait<'a>(
        &'a mut self,
        interval: Duration,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, WaitOutcome> {
        Box::pin(async move {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => WaitOutcome::Cancelled,
                _ = tokio::time::sleep(interval) => WaitOutcome::Elapsed,
            }
        })
    }
}

// src/barrier/runner.rs

use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::ordering::{QueuePosition, locate};
use crate::source::PipelineSource;

use super::core::{BarrierCore, BarrierStep};
use super::wait::{Wait, WaitOutcome};
use super::{BarrierOptions, BarrierOutcome};

/// Polls a [`PipelineSource`] until the configured pipeline is first in line.
///
/// This is the async IO shell around [`BarrierCore`]: it fetches a snapshot,
/// hands the computed position to the core, and carries out the returned
/// step. Any fetch or ordering error ends the run at once; nothing is
/// retried here.
pub struct Barrier<S: PipelineSource, W: Wait> {
    source: S,
    wait: W,
    options: BarrierOptions,
}

impl<S: PipelineSource, W: Wait> fmt::Debug for Barrier<S, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Barrier")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<S: PipelineSource, W: Wait> Barrier<S, W> {
    pub fn new(source: S, wait: W, options: BarrierOptions) -> Self {
        Self {
            source,
            wait,
            options,
        }
    }

    /// Fetch one snapshot and locate our pipeline in it.
    pub async fn check(&self) -> Result<QueuePosition> {
        let project = self.options.project.as_str();
        let snapshot = self.source.fetch_running(project).await?;
        debug!(project, running = ?snapshot.ids(), "fetched running pipelines");

        locate(&snapshot, project, self.options.pipeline)
    }

    /// Main polling loop.
    ///
    /// - Returns `First` as soon as a check puts us at position 0.
    /// - Returns `NotFirst` after one check in single-check mode.
    /// - Returns `Cancelled` if `cancel` fires during a check or a wait.
    /// - Returns the first error from the source or the ordering engine.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<BarrierOutcome> {
        let mut core = BarrierCore::new(self.options.interval, self.options.once);

        info!(
            project = %self.options.project,
            pipeline = self.options.pipeline,
            interval = ?self.options.interval,
            "waiting for pipeline to become the oldest running one"
        );

        loop {
            info!("checking if we're first in line");

            let position = tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    warn!("cancelled while checking pipeline position");
                    return Ok(BarrierOutcome::Cancelled { attempts: core.attempts() });
                }

                result = self.check() => result?,
            };

            match core.on_position(&position) {
                BarrierStep::Finish => {
                    info!(attempts = core.attempts(), "we're first in line");
                    return Ok(BarrierOutcome::First {
                        attempts: core.attempts(),
                    });
                }
                BarrierStep::GiveUp => {
                    info!(
                        position = position.position,
                        total = position.total,
                        ahead = ?position.ahead,
                        "we're not first; single check requested, not waiting"
                    );
                    return Ok(BarrierOutcome::NotFirst { position });
                }
                BarrierStep::WaitAndRetry(interval) => {
                    info!(
                        position = position.position,
                        total = position.total,
                        ahead = ?position.ahead,
                        "we're not first; trying again in {:?}",
                        interval
                    );

                    if self.wait.wait(interval, &cancel).await == WaitOutcome::Cancelled {
                        warn!("cancelled while waiting for the next poll");
                        return Ok(BarrierOutcome::Cancelled {
                            attempts: core.attempts(),
                        });
                    }
                }
            }
        }
    }
}

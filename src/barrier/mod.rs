// src/barrier/mod.rs

//! The barrier loop: poll until our pipeline is first in line.
//!
//! The pure state machine lives in [`core`]; the async shell that fetches
//! snapshots and waits between polls is implemented in [`runner`]. The wait
//! itself sits behind the [`Wait`] trait so tests can observe it without
//! sleeping.

use std::time::Duration;

use crate::config::Settings;
use crate::ordering::QueuePosition;
use crate::pipeline::PipelineId;

pub mod core;
pub mod runner;
pub mod wait;

pub use self::core::{BarrierCore, BarrierState, BarrierStep};
pub use runner::Barrier;
pub use wait::{TokioWait, Wait, WaitOutcome};

/// Immutable inputs of one barrier run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarrierOptions {
    pub project: String,
    pub pipeline: PipelineId,
    pub interval: Duration,
    /// Check a single time instead of waiting when not first.
    pub once: bool,
}

impl BarrierOptions {
    pub fn new(project: impl Into<String>, pipeline: PipelineId, interval: Duration) -> Self {
        Self {
            project: project.into(),
            pipeline,
            interval,
            once: false,
        }
    }

    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn from_settings(settings: &Settings, once: bool) -> Self {
        Self::new(
            settings.barrier.project.clone(),
            settings.barrier.pipeline,
            settings.barrier.interval,
        )
        .once(once)
    }
}

/// How a barrier run ended, short of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierOutcome {
    /// Our pipeline is the oldest running one.
    First { attempts: u32 },
    /// Single-check mode found other pipelines ahead of ours.
    NotFirst { position: QueuePosition },
    /// The cancellation token fired before we reached the front.
    Cancelled { attempts: u32 },
}

impl BarrierOutcome {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            BarrierOutcome::First { .. } => 0,
            BarrierOutcome::NotFirst { .. } => 2,
            BarrierOutcome::Cancelled { .. } => 130,
        }
    }
}

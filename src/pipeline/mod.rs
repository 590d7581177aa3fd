// src/pipeline/mod.rs

//! Pipeline data model shared by sources and the ordering engine.
//!
//! - [`PipelineRef`] is one running pipeline as observed at fetch time.
//! - [`snapshot`] holds the per-poll collection of running pipelines.

use std::fmt;

use serde::Deserialize;

pub mod snapshot;

pub use snapshot::Snapshot;

/// Project-scoped pipeline identifier as assigned by GitLab.
pub type PipelineId = u64;

/// Lifecycle status of a GitLab pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Created,
    WaitingForResource,
    Preparing,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Manual,
    Scheduled,
    /// Any status this crate does not know about yet.
    #[serde(other)]
    Unknown,
}

impl PipelineStatus {
    pub fn is_running(self) -> bool {
        self == PipelineStatus::Running
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStatus::Created => "created",
            PipelineStatus::WaitingForResource => "waiting_for_resource",
            PipelineStatus::Preparing => "preparing",
            PipelineStatus::Pending => "pending",
            PipelineStatus::Running => "running",
            PipelineStatus::Success => "success",
            PipelineStatus::Failed => "failed",
            PipelineStatus::Canceled => "canceled",
            PipelineStatus::Skipped => "skipped",
            PipelineStatus::Manual => "manual",
            PipelineStatus::Scheduled => "scheduled",
            PipelineStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Immutable view of one running pipeline at fetch time.
///
/// `updated_at` is kept exactly as the API reported it. Parsing happens in
/// the ordering engine so that a malformed value is reported against the
/// pipeline it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRef {
    pub id: PipelineId,
    pub updated_at: String,
    pub status: PipelineStatus,
}

impl PipelineRef {
    pub fn new(id: PipelineId, updated_at: impl Into<String>, status: PipelineStatus) -> Self {
        Self {
            id,
            updated_at: updated_at.into(),
            status,
        }
    }

    /// Shorthand for a pipeline in the `running` state.
    pub fn running(id: PipelineId, updated_at: impl Into<String>) -> Self {
        Self::new(id, updated_at, PipelineStatus::Running)
    }
}

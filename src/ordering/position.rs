// src/ordering/position.rs

use crate::errors::{PipelineQueueError, Result};
use crate::ordering::sort::order_snapshot;
use crate::pipeline::{PipelineId, Snapshot};

/// Where a pipeline sits in the timestamp-ordered queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuePosition {
    /// Zero-based rank; `0` means first in line.
    pub position: usize,
    /// Number of running pipelines in the snapshot.
    pub total: usize,
    /// The pipeline directly ahead of the target, if any.
    pub ahead: Option<PipelineId>,
}

impl QueuePosition {
    pub fn is_first(&self) -> bool {
        self.position == 0
    }
}

/// Sort the snapshot and report the target's position.
///
/// A target that is not in the snapshot is an error: the caller should only
/// queue a pipeline that is itself running.
pub fn locate(snapshot: &Snapshot, project: &str, target: PipelineId) -> Result<QueuePosition> {
    let ordered = order_snapshot(snapshot)?;

    let position = ordered
        .iter()
        .position(|p| p.id == target)
        .ok_or_else(|| PipelineQueueError::PipelineNotFound {
            project: project.to_string(),
            pipeline_id: target,
        })?;

    let ahead = position.checked_sub(1).map(|i| ordered[i].id);

    Ok(QueuePosition {
        position,
        total: ordered.len(),
        ahead,
    })
}

pub fn position_of(snapshot: &Snapshot, project: &str, target: PipelineId) -> Result<usize> {
    locate(snapshot, project, target).map(|p| p.position)
}

/// `true` iff `target` is the oldest running pipeline in the snapshot.
pub fn is_first(snapshot: &Snapshot, project: &str, target: PipelineId) -> Result<bool> {
    locate(snapshot, project, target).map(|p| p.is_first())
}

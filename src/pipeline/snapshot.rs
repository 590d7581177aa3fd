// src/pipeline/snapshot.rs

use std::collections::HashSet;

use crate::errors::{PipelineQueueError, Result};
use crate::pipeline::{PipelineId, PipelineRef};

/// All pipelines observed as `running` for one project at one point in time.
///
/// Entries keep the order the upstream API returned them in. That order
/// carries no meaning; the ordering engine re-sorts by `updated_at`.
/// Pipeline ids are unique within a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pipelines: Vec<PipelineRef>,
}

impl Snapshot {
    /// Build a snapshot, rejecting duplicate pipeline ids.
    pub fn new(pipelines: Vec<PipelineRef>) -> Result<Self> {
        let mut seen: HashSet<PipelineId> = HashSet::with_capacity(pipelines.len());
        for p in &pipelines {
            if !seen.insert(p.id) {
                return Err(PipelineQueueError::InvalidSnapshot(format!(
                    "pipeline {} appears more than once",
                    p.id
                )));
            }
        }
        Ok(Self { pipelines })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn pipelines(&self) -> &[PipelineRef] {
        &self.pipelines
    }

    pub fn iter(&self) -> impl Iterator<Item = &PipelineRef> {
        self.pipelines.iter()
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    pub fn contains(&self, id: PipelineId) -> bool {
        self.pipelines.iter().any(|p| p.id == id)
    }

    pub fn ids(&self) -> Vec<PipelineId> {
        self.pipelines.iter().map(|p| p.id).collect()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a PipelineRef;
    type IntoIter = std::slice::Iter<'a, PipelineRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.pipelines.iter()
    }
}

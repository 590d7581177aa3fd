// src/ordering/sort.rs

use chrono::{DateTime, Utc};

use crate::errors::{PipelineQueueError, Result};
use crate::pipeline::{PipelineId, PipelineRef, Snapshot};

/// A pipeline together with its parsed `updated_at` instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedPipeline {
    pub id: PipelineId,
    pub updated_at: DateTime<Utc>,
}

/// Parse a pipeline's RFC 3339 `updated_at` into UTC.
pub fn parse_updated_at(pipeline: &PipelineRef) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(pipeline.updated_at.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|source| PipelineQueueError::TimestampParse {
            pipeline_id: pipeline.id,
            value: pipeline.updated_at.clone(),
            source,
        })
}

/// Return the snapshot's pipelines ordered oldest `updated_at` first.
///
/// All timestamps are parsed before any comparison happens, so the first
/// malformed one (in upstream order) fails the whole call. The sort is
/// stable: pipelines with equal instants keep their upstream relative order.
pub fn order_snapshot(snapshot: &Snapshot) -> Result<Vec<OrderedPipeline>> {
    let mut ordered = snapshot
        .iter()
        .map(|p| {
            Ok(OrderedPipeline {
                id: p.id,
                updated_at: parse_updated_at(p)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // `sort_by_key` is stable.
    ordered.sort_by_key(|p| p.updated_at);

    Ok(ordered)
}

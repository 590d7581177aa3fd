// src/source/detailed.rs

use tracing::debug;

use crate::errors::{PipelineQueueError, Result};
use crate::pipeline::{PipelineRef, Snapshot};
use crate::source::{BoxFuture, GitLabApi, PipelineSource};

/// Source for API versions whose listing lacks `updated_at`.
///
/// Issues one detail request per running pipeline, sequentially and in
/// listing order. The first failing detail request fails the whole fetch.
#[derive(Debug, Clone)]
pub struct DetailedSource<A> {
    api: A,
}

impl<A: GitLabApi> DetailedSource<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }
}

impl<A: GitLabApi> PipelineSource for DetailedSource<A> {
    fn fetch_running<'a>(&'a self, project: &'a str) -> BoxFuture<'a, Result<Snapshot>> {
        Box::pin(async move {
            let listed = self.api.list_running(project).await?;
            debug!(project, count = listed.len(), "listed running pipelines");

            let mut pipelines = Vec::with_capacity(listed.len());
            for summary in listed {
                if !summary.status.is_running() {
                    debug!(
                        pipeline = summary.id,
                        status = %summary.status,
                        "skipping pipeline that is not running"
                    );
                    continue;
                }

                let detail = self.api.pipeline(project, summary.id).await?;
                let updated_at = detail.updated_at.ok_or(PipelineQueueError::MissingTimestamp {
                    pipeline_id: summary.id,
                })?;

                pipelines.push(PipelineRef::new(summary.id, updated_at, summary.status));
            }

            Snapshot::new(pipelines)
        })
    }
}

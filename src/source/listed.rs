// src/source/listed.rs

use tracing::debug;

use crate::errors::{PipelineQueueError, Result};
use crate::pipeline::{PipelineRef, Snapshot};
use crate::source::{BoxFuture, GitLabApi, PipelineSource};

/// Source for API versions whose listing already carries `updated_at`.
///
/// One listing per fetch, no detail requests. A listed pipeline without a
/// timestamp fails the fetch with `MissingTimestamp`.
#[derive(Debug, Clone)]
pub struct ListedSource<A> {
    api: A,
}

impl<A: GitLabApi> ListedSource<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }
}

impl<A: GitLabApi> PipelineSource for ListedSource<A> {
    fn fetch_running<'a>(&'a self, project: &'a str) -> BoxFuture<'a, Result<Snapshot>> {
        Box::pin(async move {
            let listed = self.api.list_running(project).await?;
            debug!(project, count = listed.len(), "listed running pipelines");

            let pipelines = listed
                .into_iter()
                .filter(|summary| summary.status.is_running())
                .map(|summary| {
                    let updated_at =
                        summary
                            .updated_at
                            .ok_or(PipelineQueueError::MissingTimestamp {
                                pipeline_id: summary.id,
                            })?;
                    Ok(PipelineRef::new(summary.id, updated_at, summary.status))
                })
                .collect::<Result<Vec<_>>>()?;

            Snapshot::new(pipelines)
        })
    }
}

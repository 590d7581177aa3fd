use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pipeline_queue::barrier::{Wait, WaitOutcome};
use pipeline_queue::errors::{PipelineQueueError, Result};
use pipeline_queue::pipeline::{PipelineId, Snapshot};
use pipeline_queue::source::{
    BoxFuture, GitLabApi, PipelineDetail, PipelineSource, PipelineSummary,
};
use tokio_util::sync::CancellationToken;

/// A pipeline source that replays a script of snapshots and errors.
///
/// - each `fetch_running` pops the next scripted response
/// - the projects it was asked about are recorded
/// - an exhausted script fails the fetch
#[derive(Debug, Default)]
pub struct FakeSource {
    script: Mutex<VecDeque<Result<Snapshot>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_snapshot(self, snapshot: Snapshot) -> Self {
        self.script.lock().unwrap().push_back(Ok(snapshot));
        self
    }

    pub fn then_error(self, error: PipelineQueueError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    /// Shared handle to the recorded calls, usable after the source moved.
    pub fn calls_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

impl PipelineSource for FakeSource {
    fn fetch_running<'a>(&'a self, project: &'a str) -> BoxFuture<'a, Result<Snapshot>> {
        self.calls.lock().unwrap().push(project.to_string());
        let next = self.script.lock().unwrap().pop_front();

        Box::pin(async move {
            next.unwrap_or_else(|| {
                Err(PipelineQueueError::Other(anyhow::anyhow!(
                    "FakeSource script exhausted"
                )))
            })
        })
    }
}

/// One request made against [`FakeGitLabApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List { project: String },
    Detail { project: String, id: PipelineId },
}

/// In-memory GitLab API with canned listing and per-pipeline details.
#[derive(Debug, Default)]
pub struct FakeGitLabApi {
    listing: Vec<PipelineSummary>,
    details: HashMap<PipelineId, PipelineDetail>,
    failing_details: HashSet<PipelineId>,
    list_status: Option<u16>,
    calls: Mutex<Vec<ApiCall>>,
}

impl FakeGitLabApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, listing: Vec<PipelineSummary>) -> Self {
        self.listing = listing;
        self
    }

    pub fn with_detail(mut self, detail: PipelineDetail) -> Self {
        self.details.insert(detail.id, detail);
        self
    }

    /// Make the detail request for `id` fail with HTTP 500.
    pub fn failing_detail(mut self, id: PipelineId) -> Self {
        self.failing_details.insert(id);
        self
    }

    /// Make the listing request fail with the given HTTP status.
    pub fn failing_list(mut self, status: u16) -> Self {
        self.list_status = Some(status);
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl GitLabApi for FakeGitLabApi {
    fn list_running<'a>(
        &'a self,
        project: &'a str,
    ) -> BoxFuture<'a, Result<Vec<PipelineSummary>>> {
        self.calls.lock().unwrap().push(ApiCall::List {
            project: project.to_string(),
        });

        let result = match self.list_status {
            Some(status) => Err(PipelineQueueError::UnexpectedStatus {
                status,
                url: format!("fake://projects/{project}/pipelines"),
            }),
            None => Ok(self.listing.clone()),
        };
        Box::pin(async move { result })
    }

    fn pipeline<'a>(
        &'a self,
        project: &'a str,
        id: PipelineId,
    ) -> BoxFuture<'a, Result<PipelineDetail>> {
        self.calls.lock().unwrap().push(ApiCall::Detail {
            project: project.to_string(),
            id,
        });

        let url = format!("fake://projects/{project}/pipelines/{id}");
        let result = if self.failing_details.contains(&id) {
            Err(PipelineQueueError::UnexpectedStatus { status: 500, url })
        } else {
            self.details
                .get(&id)
                .cloned()
                .ok_or(PipelineQueueError::UnexpectedStatus { status: 404, url })
        };
        Box::pin(async move { result })
    }
}

/// A wait that records each requested interval and returns immediately.
///
/// Optionally cancels the token on the n-th wait, to simulate a shutdown
/// signal arriving mid-wait.
#[derive(Debug, Clone, Default)]
pub struct RecordingWait {
    waits: Arc<Mutex<Vec<Duration>>>,
    cancel_on: Option<usize>,
}

impl RecordingWait {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel during the n-th wait (1-based).
    pub fn cancel_on(mut self, nth: usize) -> Self {
        self.cancel_on = Some(nth);
        self
    }

    pub fn waits_handle(&self) -> Arc<Mutex<Vec<Duration>>> {
        Arc::clone(&self.waits)
    }
}

impl Wait for RecordingWait {
    fn wait<'a>(
        &'a mut self,
        interval: Duration,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, WaitOutcome> {
        let count = {
            let mut waits = self.waits.lock().unwrap();
            waits.push(interval);
            waits.len()
        };

        if self.cancel_on == Some(count) {
            cancel.cancel();
        }

        let outcome = if cancel.is_cancelled() {
            WaitOutcome::Cancelled
        } else {
            WaitOutcome::Elapsed
        };
        Box::pin(async move { outcome })
    }
}

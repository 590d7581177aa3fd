#![allow(dead_code)]

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use pipeline_queue::config::RawConfigFile;
use pipeline_queue::pipeline::{PipelineId, PipelineRef, PipelineStatus, Snapshot};
use pipeline_queue::source::{PipelineDetail, PipelineSummary};

/// Fixed reference instant `T` used by scenario tests.
pub const BASE_TIMESTAMP: &str = "2018-08-08T22:00:00.000Z";

pub fn base_instant() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(BASE_TIMESTAMP)
        .expect("BASE_TIMESTAMP is valid RFC 3339")
        .with_timezone(&Utc)
}

/// `T + offset_secs`, formatted the way GitLab reports `updated_at`.
pub fn ts(offset_secs: i64) -> String {
    (base_instant() + TimeDelta::seconds(offset_secs)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Builder for `Snapshot` to simplify test setup.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    pipelines: Vec<PipelineRef>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a running pipeline updated at `T + offset_secs`.
    pub fn running(mut self, id: PipelineId, offset_secs: i64) -> Self {
        self.pipelines.push(PipelineRef::running(id, ts(offset_secs)));
        self
    }

    /// Add a running pipeline with a raw `updated_at` value.
    pub fn running_raw(mut self, id: PipelineId, updated_at: &str) -> Self {
        self.pipelines.push(PipelineRef::running(id, updated_at));
        self
    }

    pub fn build(self) -> Snapshot {
        Snapshot::new(self.pipelines).expect("Failed to build valid snapshot from builder")
    }
}

pub fn summary(id: PipelineId, status: PipelineStatus) -> PipelineSummary {
    PipelineSummary {
        id,
        status,
        updated_at: None,
    }
}

pub fn summary_with_ts(id: PipelineId, offset_secs: i64) -> PipelineSummary {
    PipelineSummary {
        id,
        status: PipelineStatus::Running,
        updated_at: Some(ts(offset_secs)),
    }
}

pub fn detail(id: PipelineId, offset_secs: i64) -> PipelineDetail {
    PipelineDetail {
        id,
        status: PipelineStatus::Running,
        updated_at: Some(ts(offset_secs)),
    }
}

/// Builder for `RawConfigFile`.
#[derive(Debug, Default)]
pub struct RawConfigBuilder {
    raw: RawConfigFile,
}

impl RawConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(mut self, project: &str) -> Self {
        self.raw.barrier.project = Some(project.to_string());
        self
    }

    pub fn pipeline(mut self, pipeline: PipelineId) -> Self {
        self.raw.barrier.pipeline = Some(pipeline);
        self
    }

    pub fn interval(mut self, interval: &str) -> Self {
        self.raw.barrier.interval = Some(interval.to_string());
        self
    }

    pub fn hostname(mut self, hostname: &str) -> Self {
        self.raw.gitlab.hostname = Some(hostname.to_string());
        self
    }

    pub fn build(self) -> RawConfigFile {
        self.raw
    }
}

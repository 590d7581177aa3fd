// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{
    BarrierSection, BarrierSettings, DEFAULT_HOSTNAME, DEFAULT_INTERVAL,
    DEFAULT_REQUEST_TIMEOUT, GitLabSection, GitLabSettings, RawConfigFile, Settings,
};
use crate::errors::{PipelineQueueError, Result};
use crate::source::gitlab::api_base_url;
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for Settings {
    type Error = PipelineQueueError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        Ok(Settings {
            gitlab: validate_gitlab(raw.gitlab)?,
            barrier: validate_barrier(raw.barrier)?,
        })
    }
}

fn validate_gitlab(section: GitLabSection) -> Result<GitLabSettings> {
    let hostname = section
        .hostname
        .map(|h| h.trim().to_string())
        .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string());
    api_base_url(&hostname)?;

    let request_timeout = positive_duration(
        "request_timeout",
        section.request_timeout.as_deref().unwrap_or(DEFAULT_REQUEST_TIMEOUT),
    )?;

    Ok(GitLabSettings {
        hostname,
        token: section.token.map(|t| t.trim().to_string()).unwrap_or_default(),
        token_kind: section.token_kind.unwrap_or_default(),
        request_timeout,
    })
}

fn validate_barrier(section: BarrierSection) -> Result<BarrierSettings> {
    let project = section
        .project
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| {
            PipelineQueueError::ConfigError(
                "project is required (--project, $CI_PROJECT_ID or [barrier].project)".to_string(),
            )
        })?;

    let pipeline = section.pipeline.ok_or_else(|| {
        PipelineQueueError::ConfigError(
            "pipeline is required (--pipeline, $CI_PIPELINE_ID or [barrier].pipeline)".to_string(),
        )
    })?;

    let interval = positive_duration(
        "interval",
        section.interval.as_deref().unwrap_or(DEFAULT_INTERVAL),
    )?;

    Ok(BarrierSettings {
        project,
        pipeline,
        interval,
        api_variant: section.api_variant.unwrap_or_default(),
    })
}

fn positive_duration(field: &str, value: &str) -> Result<Duration> {
    let duration = parse_duration(value)
        .map_err(|e| PipelineQueueError::ConfigError(format!("invalid {field}: {e}")))?;
    if duration.is_zero() {
        return Err(PipelineQueueError::ConfigError(format!(
            "{field} must be greater than zero (got '{value}')"
        )));
    }
    Ok(duration)
}

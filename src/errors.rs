// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::pipeline::PipelineId;

#[derive(Error, Debug)]
pub enum PipelineQueueError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitLab API returned HTTP {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Failed to decode GitLab response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Pipeline {pipeline_id} is not among the running pipelines of project {project}")]
    PipelineNotFound {
        project: String,
        pipeline_id: PipelineId,
    },

    #[error("Pipeline {pipeline_id} has an unparseable updated_at timestamp '{value}': {source}")]
    TimestampParse {
        pipeline_id: PipelineId,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Pipeline {pipeline_id} was listed without an updated_at timestamp")]
    MissingTimestamp { pipeline_id: PipelineId },

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PipelineQueueError>;

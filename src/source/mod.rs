// src/source/mod.rs

//! Pipeline sources: where snapshots of running pipelines come from.
//!
//! The barrier loop only talks to a [`PipelineSource`]. Production code uses
//! one of two GitLab-backed sources, picked by [`ApiVariant`]:
//!
//! - [`DetailedSource`] lists running pipelines, then fetches each one's
//!   detail to learn its `updated_at`.
//! - [`ListedSource`] takes `updated_at` straight from the listing.
//!
//! Both are generic over [`GitLabApi`], the narrow upstream capability, so
//! tests can swap the real [`GitLabClient`] for a fake without any HTTP.
//!
//! [`ApiVariant`]: crate::types::ApiVariant

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use crate::config::Settings;
use crate::errors::Result;
use crate::pipeline::{PipelineId, PipelineStatus, Snapshot};
use crate::types::ApiVariant;

pub mod detailed;
pub mod gitlab;
pub mod listed;

pub use detailed::DetailedSource;
pub use gitlab::GitLabClient;
pub use listed::ListedSource;

/// Boxed `Send` future, used at the trait seams below.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Capability to fetch the current set of running pipelines for a project.
pub trait PipelineSource: Send + Sync {
    /// Fetch a fresh snapshot. Any error aborts the fetch; no partial
    /// snapshot is ever returned.
    fn fetch_running<'a>(&'a self, project: &'a str) -> BoxFuture<'a, Result<Snapshot>>;
}

impl<S: PipelineSource + ?Sized> PipelineSource for Box<S> {
    fn fetch_running<'a>(&'a self, project: &'a str) -> BoxFuture<'a, Result<Snapshot>> {
        (**self).fetch_running(project)
    }
}

/// One entry of the project pipeline listing.
///
/// Older API versions omit `updated_at` here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelineSummary {
    pub id: PipelineId,
    pub status: PipelineStatus,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Single-pipeline detail response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelineDetail {
    pub id: PipelineId,
    pub status: PipelineStatus,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// The two GitLab endpoints the sources rely on.
pub trait GitLabApi: Send + Sync {
    /// List the project's running pipelines (all pages, upstream order).
    fn list_running<'a>(
        &'a self,
        project: &'a str,
    ) -> BoxFuture<'a, Result<Vec<PipelineSummary>>>;

    /// Fetch one pipeline's detail.
    fn pipeline<'a>(
        &'a self,
        project: &'a str,
        id: PipelineId,
    ) -> BoxFuture<'a, Result<PipelineDetail>>;
}

impl<A: GitLabApi + ?Sized> GitLabApi for std::sync::Arc<A> {
    fn list_running<'a>(
        &'a self,
        project: &'a str,
    ) -> BoxFuture<'a, Result<Vec<PipelineSummary>>> {
        (**self).list_running(project)
    }

    fn pipeline<'a>(
        &'a self,
        project: &'a str,
        id: PipelineId,
    ) -> BoxFuture<'a, Result<PipelineDetail>> {
        (**self).pipeline(project, id)
    }
}

/// Construct the production source selected by `settings`.
pub fn build_source(settings: &Settings) -> Result<Box<dyn PipelineSource>> {
    let client = GitLabClient::new(&settings.gitlab)?;
    let source: Box<dyn PipelineSource> = match settings.barrier.api_variant {
        ApiVariant::Detailed => Box::new(DetailedSource::new(client)),
        ApiVariant::Listed => Box::new(ListedSource::new(client)),
    };
    Ok(source)
}

// src/source/gitlab.rs

//! GitLab REST v4 client for the two pipeline endpoints the sources need.
//!
//! - `GET /projects/:id/pipelines?scope=running&status=running&order_by=id&sort=asc`,
//!   following `X-Next-Page` until every page has been read.
//! - `GET /projects/:id/pipelines/:pipeline_id`.
//!
//! Every request carries the configured per-request timeout, so a stalled
//! connection can not hang the barrier loop forever.

use percent_encoding::percent_decode_str;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::GitLabSettings;
use crate::errors::{PipelineQueueError, Result};
use crate::pipeline::PipelineId;
use crate::source::{BoxFuture, GitLabApi, PipelineDetail, PipelineSummary};

const PER_PAGE: &str = "100";
const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Build the `/api/v4` base URL for a GitLab host such as
/// `https://gitlab.com` or `https://example.org/gitlab`.
pub fn api_base_url(hostname: &str) -> Result<Url> {
    let mut url = Url::parse(hostname.trim()).map_err(|e| {
        PipelineQueueError::ConfigError(format!("invalid GitLab hostname '{hostname}': {e}"))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(PipelineQueueError::ConfigError(format!(
            "GitLab hostname '{hostname}' must use http or https"
        )));
    }

    url.set_query(None);
    url.set_fragment(None);
    push_segments(&mut url, &["api", "v4"])?;
    Ok(url)
}

fn push_segments(url: &mut Url, segments: &[&str]) -> Result<()> {
    let display = url.to_string();
    url.path_segments_mut()
        .map_err(|_| {
            PipelineQueueError::ConfigError(format!("'{display}' cannot be used as a base URL"))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(())
}

/// Turn a project id or path into the single path segment GitLab expects.
///
/// Accepts both `group/project` and the already-encoded `group%2Fproject`;
/// the value is decoded here and re-encoded by [`push_segments`].
fn project_segment(project: &str) -> Result<String> {
    percent_decode_str(project.trim())
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| {
            PipelineQueueError::ConfigError(format!(
                "project '{project}' is not valid percent-encoded UTF-8: {e}"
            ))
        })
}

fn next_page(headers: &HeaderMap) -> Option<String> {
    headers
        .get(NEXT_PAGE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Production [`GitLabApi`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    api_base: Url,
}

impl GitLabClient {
    pub fn new(settings: &GitLabSettings) -> Result<Self> {
        let api_base = api_base_url(&settings.hostname)?;

        let mut headers = HeaderMap::new();
        if !settings.token.is_empty() {
            let mut value = HeaderValue::from_str(&settings.token).map_err(|_| {
                PipelineQueueError::ConfigError(
                    "access token contains characters not allowed in an HTTP header".to_string(),
                )
            })?;
            value.set_sensitive(true);
            headers.insert(
                HeaderName::from_static(settings.token_kind.header_name()),
                value,
            );
        }

        let http = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(concat!("pipeline-queue/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self { http, api_base })
    }

    fn pipelines_url(&self, project: &str) -> Result<Url> {
        let project = project_segment(project)?;
        let mut url = self.api_base.clone();
        push_segments(&mut url, &["projects", project.as_str(), "pipelines"])?;
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<(T, HeaderMap)> {
        debug!(%url, "GET");
        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineQueueError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let headers = response.headers().clone();
        let body = response.bytes().await?;
        let value = serde_json::from_slice(&body).map_err(|source| PipelineQueueError::Decode {
            url: url.to_string(),
            source,
        })?;

        Ok((value, headers))
    }

    async fn list_running_pages(&self, project: &str) -> Result<Vec<PipelineSummary>> {
        let base = self.pipelines_url(project)?;
        let mut pipelines = Vec::new();
        let mut page = "1".to_string();

        loop {
            let mut url = base.clone();
            url.query_pairs_mut()
                .append_pair("scope", "running")
                .append_pair("status", "running")
                .append_pair("order_by", "id")
                .append_pair("sort", "asc")
                .append_pair("per_page", PER_PAGE)
                .append_pair("page", &page);

            let (items, headers): (Vec<PipelineSummary>, _) = self.get_json(url).await?;
            let fetched = items.len();
            pipelines.extend(items);

            match next_page(&headers) {
                Some(next) if fetched > 0 => page = next,
                _ => break,
            }
        }

        Ok(pipelines)
    }

    async fn pipeline_detail(&self, project: &str, id: PipelineId) -> Result<PipelineDetail> {
        let mut url = self.pipelines_url(project)?;
        push_segments(&mut url, &[&id.to_string()])?;
        let (detail, _) = self.get_json(url).await?;
        Ok(detail)
    }
}

impl GitLabApi for GitLabClient {
    fn list_running<'a>(
        &'a self,
        project: &'a str,
    ) -> BoxFuture<'a, Result<Vec<PipelineSummary>>> {
        Box::pin(self.list_running_pages(project))
    }

    fn pipeline<'a>(
        &'a self,
        project: &'a str,
        id: PipelineId,
    ) -> BoxFuture<'a, Result<PipelineDetail>> {
        Box::pin(self.pipeline_detail(project, id))
    }
}

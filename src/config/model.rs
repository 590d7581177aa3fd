// src/config/model.rs

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::pipeline::PipelineId;
use crate::types::{ApiVariant, TokenKind};

pub const DEFAULT_HOSTNAME: &str = "https://gitlab.com";
pub const DEFAULT_INTERVAL: &str = "30s";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "30s";

/// Configuration as read from an optional TOML file, before validation.
///
/// ```toml
/// [gitlab]
/// hostname = "https://gitlab.example.org"
/// token_kind = "private"
/// request_timeout = "20s"
///
/// [barrier]
/// project = "42"
/// interval = "1m"
/// api_variant = "listed"
/// ```
///
/// Every field is optional. CLI flags (and their environment defaults)
/// override file values; anything still unset falls back to a built-in
/// default or, for `project` and `pipeline`, fails validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub gitlab: GitLabSection,

    #[serde(default)]
    pub barrier: BarrierSection,
}

/// `[gitlab]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitLabSection {
    /// Base URL of the GitLab instance.
    pub hostname: Option<String>,
    pub token: Option<String>,
    pub token_kind: Option<TokenKind>,
    /// Per-request HTTP timeout, e.g. `"30s"`.
    pub request_timeout: Option<String>,
}

/// `[barrier]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BarrierSection {
    pub project: Option<String>,
    pub pipeline: Option<PipelineId>,
    /// Wait between polls, e.g. `"30s"` or `"1m30s"`.
    pub interval: Option<String>,
    pub api_variant: Option<ApiVariant>,
}

/// Fully resolved and validated settings. Built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub gitlab: GitLabSettings,
    pub barrier: BarrierSettings,
}

/// Everything needed to talk to the GitLab API.
#[derive(Clone, PartialEq, Eq)]
pub struct GitLabSettings {
    pub hostname: String,
    pub token: String,
    pub token_kind: TokenKind,
    pub request_timeout: Duration,
}

impl GitLabSettings {
    /// Anonymous access to `hostname` with default timeout.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            token: String::new(),
            token_kind: TokenKind::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for GitLabSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabSettings")
            .field("hostname", &self.hostname)
            .field("token", &redact(&self.token))
            .field("token_kind", &self.token_kind)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Which pipeline to queue, where, and how often to re-check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarrierSettings {
    pub project: String,
    pub pipeline: PipelineId,
    pub interval: Duration,
    pub api_variant: ApiVariant,
}

pub fn redact(token: &str) -> &'static str {
    if token.is_empty() { "<none>" } else { "<redacted>" }
}

// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Flags that GitLab CI already knows the answer to fall back to the
//! predefined CI variables (`CI_PROJECT_ID`, `CI_PIPELINE_ID`,
//! `CI_JOB_TOKEN`), so inside a job the tool usually runs with no flags.
//! A token taken from `CI_JOB_TOKEN` is sent as `JOB-TOKEN` unless
//! `--token-kind` says otherwise. Values left unset here may still come
//! from `--config`.

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};

use crate::pipeline::PipelineId;
use crate::types::{ApiVariant, TokenKind};

const LONG_ABOUT: &str = "\
Blocks until older pipelines finish running.

pipeline-queue queries the GitLab API for the project's running pipelines and
orders them oldest to newest by their last update. If the given pipeline is not
the oldest one, it sleeps for the poll interval and checks again. Once the
pipeline is first in line it stops blocking and exits successfully.";

/// Command-line arguments for `pipeline-queue`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "pipeline-queue",
    version,
    about = "Block until older pipelines of the same project finish running.",
    long_about = LONG_ABOUT
)]
pub struct CliArgs {
    /// API access token.
    #[arg(short = 't', long, env = "CI_JOB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Header used to send the token: `private` (PRIVATE-TOKEN) or `job` (JOB-TOKEN).
    ///
    /// Defaults to `job` when the token comes from `$CI_JOB_TOKEN`, else `private`.
    #[arg(long, value_enum, value_name = "KIND")]
    pub token_kind: Option<TokenKind>,

    /// Base URL of the GitLab instance [default: https://gitlab.com].
    #[arg(short = 'n', long, value_name = "URL")]
    pub hostname: Option<String>,

    /// Time to wait between polls, e.g. `30s`, `1m30s`, `500ms` [default: 30s].
    #[arg(short = 'i', long = "interval-time", value_name = "DURATION")]
    pub interval: Option<String>,

    /// Project ID or path (`group/project`, raw or URL-encoded) whose pipelines are queued.
    #[arg(short = 'j', long, env = "CI_PROJECT_ID", value_name = "ID")]
    pub project: Option<String>,

    /// Pipeline ID of the current pipeline.
    #[arg(short = 'l', long, env = "CI_PIPELINE_ID", value_name = "ID")]
    pub pipeline: Option<PipelineId>,

    /// How pipeline timestamps are fetched [default: detailed].
    #[arg(long, value_enum, value_name = "VARIANT")]
    pub api_variant: Option<ApiVariant>,

    /// Timeout for each HTTP request [default: 30s].
    #[arg(long, value_name = "DURATION")]
    pub request_timeout: Option<String>,

    /// Optional TOML config file. CLI flags and CI variables take precedence.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Check once and exit with status 2 instead of waiting when not first.
    #[arg(long)]
    pub once: bool,

    /// Resolve and print settings, but make no API requests.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PIPELINE_QUEUE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Set when `token` was filled from `$CI_JOB_TOKEN` rather than `--token`.
    #[arg(skip)]
    pub token_from_ci: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse the process arguments, exiting with clap's usage error on failure.
pub fn parse() -> CliArgs {
    let matches = CliArgs::command().get_matches();
    from_matches(&matches).unwrap_or_else(|e| e.exit())
}

/// Build [`CliArgs`] from parsed matches, recording where the token came from.
pub fn from_matches(matches: &ArgMatches) -> Result<CliArgs, clap::Error> {
    let mut args = CliArgs::from_arg_matches(matches)?;
    args.token_from_ci = matches.value_source("token") == Some(ValueSource::EnvVariable);
    Ok(args)
}

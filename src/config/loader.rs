// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{RawConfigFile, Settings};
use crate::errors::Result;
use crate::types::TokenKind;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_settings`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Overwrite file values with whatever the CLI (or its env defaults) set.
pub fn apply_cli_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    let gitlab = &mut raw.gitlab;
    if let Some(ref hostname) = args.hostname {
        gitlab.hostname = Some(hostname.clone());
    }
    if let Some(ref token) = args.token {
        gitlab.token = Some(token.clone());
        if args.token_from_ci {
            // GitLab only accepts CI job tokens in the JOB-TOKEN header.
            gitlab.token_kind = Some(TokenKind::Job);
        }
    }
    if let Some(kind) = args.token_kind {
        gitlab.token_kind = Some(kind);
    }
    if let Some(ref timeout) = args.request_timeout {
        gitlab.request_timeout = Some(timeout.clone());
    }

    let barrier = &mut raw.barrier;
    if let Some(ref project) = args.project {
        barrier.project = Some(project.clone());
    }
    if let Some(pipeline) = args.pipeline {
        barrier.pipeline = Some(pipeline);
    }
    if let Some(ref interval) = args.interval {
        barrier.interval = Some(interval.clone());
    }
    if let Some(variant) = args.api_variant {
        barrier.api_variant = Some(variant);
    }
}

/// Resolve the final [`Settings`] for a run.
///
/// - Reads `--config` if given (a missing file is an error).
/// - Layers CLI flags and CI environment defaults on top.
/// - Applies built-in defaults and validates.
pub fn load_settings(args: &CliArgs) -> Result<Settings> {
    let mut raw = match args.config {
        Some(ref path) => {
            debug!(path = %path, "loading config file");
            load_from_path(path)?
        }
        None => RawConfigFile::default(),
    };

    apply_cli_overrides(&mut raw, args);
    Settings::try_from(raw)
}

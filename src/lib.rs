// src/lib.rs

pub mod barrier;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod ordering;
pub mod pipeline;
pub mod signal;
pub mod source;
pub mod types;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::barrier::{Barrier, BarrierOptions, TokioWait};
use crate::cli::CliArgs;
use crate::config::{Settings, load_settings};
use crate::config::model::redact;
use crate::source::build_source;

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - settings resolution (CLI, CI variables, optional config file)
/// - the GitLab-backed pipeline source
/// - the barrier loop with a Tokio wait
/// - SIGINT/SIGTERM handling via a cancellation token
pub async fn run(args: CliArgs) -> Result<i32> {
    let settings = load_settings(&args)?;

    if args.dry_run {
        print_dry_run(&settings, args.once);
        return Ok(0);
    }

    let source = build_source(&settings)?;
    let options = BarrierOptions::from_settings(&settings, args.once);

    let cancel = CancellationToken::new();
    let _signal_handle = crate::signal::cancel_on_shutdown(cancel.clone());

    let outcome = Barrier::new(source, TokioWait, options).run(cancel.clone()).await?;
    debug!(?outcome, "barrier finished");

    // Release the signal task.
    cancel.cancel();

    Ok(outcome.exit_code())
}

/// Simple dry-run output: print the resolved settings without the token.
fn print_dry_run(settings: &Settings, once: bool) {
    println!("pipeline-queue dry-run");
    println!("  gitlab.hostname = {}", settings.gitlab.hostname);
    println!("  gitlab.token = {}", redact(&settings.gitlab.token));
    println!("  gitlab.token_kind = {:?}", settings.gitlab.token_kind);
    println!("  gitlab.request_timeout = {:?}", settings.gitlab.request_timeout);
    println!("  barrier.project = {}", settings.barrier.project);
    println!("  barrier.pipeline = {}", settings.barrier.pipeline);
    println!("  barrier.interval = {:?}", settings.barrier.interval);
    println!("  barrier.api_variant = {:?}", settings.barrier.api_variant);
    println!("  once = {once}");

    debug!("dry-run complete (no API requests)");
}

// src/config/mod.rs

//! Configuration loading and validation for pipeline-queue.
//!
//! Responsibilities:
//! - Define the optional TOML-backed data model (`model.rs`).
//! - Load a config file from disk and layer CLI flags on top (`loader.rs`).
//! - Validate everything once into an immutable [`Settings`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{apply_cli_overrides, load_from_path, load_settings};
pub use model::{
    BarrierSection, BarrierSettings, GitLabSection, GitLabSettings, RawConfigFile, Settings,
};

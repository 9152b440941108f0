// src/config/mod.rs

//! Configuration loading and validation for warmrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Parse duration strings (`duration.rs`).
//! - Load a config file from disk, or fall back to the built-in table (`loader.rs`).
//! - Validate and compile patterns and rule targets (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    builtin_config, builtin_raw_config, default_config_path, load_and_validate, load_config,
    load_from_path,
};
pub use model::{
    ConfigFile, ConfigSection, FilterSection, RawConfigFile, RuleConfig, Timing, WorkerSection,
};

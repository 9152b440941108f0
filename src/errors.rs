// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarmrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Failed to start worker: {0}")]
    WorkerSpawn(String),

    #[error("Worker exited right after start {attempts} time(s) in a row")]
    WorkerCrash { attempts: u32 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WarmrunError>;

//! Error types for camsweep.
//!
//! Uses `thiserror` for ergonomic error definitions.

use crate::types::{PortListError, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Why a single probe produced no response to classify.
///
/// These are expected for the vast majority of addresses and never reach the
/// operator.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("connection refused")]
    ConnectRefused,

    #[error("connection timed out")]
    ConnectTimeout,

    #[error("connection failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    #[error("failed to send request: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("timed out waiting for a response")]
    ReadTimeout,

    #[error("failed to read response: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("peer closed the connection without responding")]
    EmptyResponse,
}

/// Result type alias for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid configuration format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Batch report errors.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode JSON report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode CSV report: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Top-level errors surfaced by the command line.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Ports(#[from] PortListError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

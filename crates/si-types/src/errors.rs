use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the Silica system
#[derive(Error, Debug)]
pub enum SiError {
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Metrics-artifact errors
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Metrics artifact not found: {path}")]
    ArtifactNotFound { path: PathBuf },

    #[error("Metrics artifact has no parseable key/value pairs: {path}")]
    ArtifactUnparseable { path: PathBuf },

    #[error("Failed to read metrics artifact {path}: {message}")]
    ReadFailed { path: PathBuf, message: String },
}

/// Build-pipeline errors
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Build timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Failed to spawn build process '{program}': {message}")]
    Spawn { program: String, message: String },

    #[error("Build process exited with code {code}")]
    NonZeroExit { code: i32 },

    #[error("Invalid build invocation: {message}")]
    InvalidInvocation { message: String },
}

/// Metric-evaluation errors
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Missing trial parameter: {name}")]
    MissingParameter { name: String },

    #[error("Missing metric: {name}")]
    MissingMetric { name: String },

    #[error("Metric {name} is not numeric: {value}")]
    NotNumeric { name: String, value: String },
}

/// Search-oracle errors
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Oracle has exhausted its search space")]
    Exhausted,

    #[error("Unknown trial handle: {token}")]
    UnknownToken { token: uuid::Uuid },
}

/// Result type alias for Silica operations
pub type SiResult<T> = Result<T, SiError>;

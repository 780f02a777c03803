//! Error types for the IR layer

use thiserror::Error;

/// Result type for IR operations
pub type Result<T> = std::result::Result<T, IrError>;

/// IR, hashing, and mapping errors
///
/// Validation failures and hash mismatches are reported as data, not through
/// this type. These variants cover I/O, encoding, and malformed inputs.
#[derive(Error, Debug)]
pub enum IrError {
    #[error("Invalid reference: {0}")]
    InvalidRef(String),

    #[error("Invalid IR version: {0}")]
    InvalidVersion(String),

    #[error("Incompatible IR version: corpus is {found}, this build reads {supported}")]
    IncompatibleVersion { found: String, supported: String },

    #[error("Mapping table not found: {from} -> {to}")]
    TableNotFound { from: String, to: String },

    #[error("Integrity check failed for {count} content block(s): {ids}")]
    IntegrityFailure { count: usize, ids: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl IrError {
    /// Build an integrity failure from the offending block ids
    pub fn integrity_failure(ids: &[String]) -> Self {
        IrError::IntegrityFailure {
            count: ids.len(),
            ids: ids.join(", "),
        }
    }
}

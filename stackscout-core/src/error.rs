/// Top-level Stackscout error type.
///
/// All fallible operations in `stackscout-core` return
/// [`Result<T, ScoutError>`](Result). Each variant wraps a phase-specific
/// error enum, allowing callers to match on the error source without losing
/// type information.
#[derive(thiserror::Error, Debug)]
pub enum ScoutError {
    /// Error talking to the source-control host (auth, rate limit, not-found).
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Error assembling or writing report output.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Error in configuration parsing or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from the source-control host API.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// Network-level failure reaching the host.
    #[error("Network error: {0}")]
    Network(String),

    /// Host returned a non-success HTTP status.
    #[error("API error (HTTP {status}): {body}")]
    Api {
        /// HTTP status code from the host.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Response payload could not be decoded (JSON or base64 content).
    #[error("Decode error: {0}")]
    Decode(String),

    /// The organization could not be resolved; aborts the whole run.
    #[error("Organization not found: {0}")]
    OrgNotFound(String),
}

/// Errors writing report output files.
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    /// Filesystem I/O error writing a report.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization of a report failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors in Stackscout configuration parsing and validation.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist at the expected path.
    #[error("Config file not found: {0}")]
    NotFound(String),

    /// Configuration file syntax could not be parsed (TOML error).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration values are present but semantically invalid.
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// No credential available (missing token flag and env var).
    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

/// Convenience alias for `Result<T, ScoutError>`.
pub type Result<T> = std::result::Result<T, ScoutError>;

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for annolint operations.
#[derive(Debug, Error)]
pub enum AnnolintError {
    /// The annotation source could not be read at all (missing file,
    /// permission denied, undecodable bytes). Always aborts the scan.
    #[error("Cannot read {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source was readable but is not valid JSON.
    #[error("File is not a valid JSON document. Error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// The source is valid JSON but violates the annotation schema.
    ///
    /// `location` is a path to the first offending field, e.g.
    /// `images -> 0 -> file_name`. Only the first violation is reported.
    #[error("Data validation failed at '{location}': {message}")]
    Schema { location: String, message: String },

    #[error("Failed to serialize report: {source}")]
    ReportSerialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write report to {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported report format: {0} (supported: json)")]
    UnsupportedFormat(String),

    /// The scan itself succeeded but surfaced findings. Carried out of
    /// `run()` so the binary can exit non-zero in CI-style usage.
    #[error("Scan found {total} issue(s)")]
    IssuesFound { total: usize },
}

//! Error types for ecoflow-reports
//!
//! Every failure that can leave an export pipeline is expressed as one of a
//! small set of typed kinds:
//! - [`ValidationError`] - a report record is missing a canonical metric or an ESG sub-score
//! - [`RenderError`] - capture was attempted without a materialized surface
//! - [`EncodingError`] - rasterization, document assembly, or tabular serialization failed
//! - [`PersistenceError`] - a storage or artifact write failed
//! - [`Error::Concurrency`] - an export was triggered while another one is in flight
//!
//! Library errors (`sqlx`, `csv`, `zip`, I/O) convert into these kinds so that
//! nothing untyped crosses the coordinator boundary.

use crate::types::ExportFormat;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ecoflow-reports operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ecoflow-reports
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "capture.scale")
        key: Option<String>,
    },

    /// Report record failed validation
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Render surface unavailable or layout failed
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Artifact encoding failed
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Storage or artifact write failed
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Export triggered while another export is still running
    #[error("export already in flight: {in_flight}")]
    Concurrency {
        /// Format of the export currently holding the coordinator
        in_flight: ExportFormat,
    },
}

/// Report record validation failures
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A canonical metric label is absent from the report
    #[error("report is missing required metric '{label}'")]
    MissingMetric {
        /// The label that was looked up
        label: String,
    },

    /// Two metrics share the same label
    #[error("metric label '{label}' appears more than once")]
    DuplicateMetric {
        /// The repeated label
        label: String,
    },

    /// An ESG pillar lacks one of its three scoring sub-metrics
    #[error("{pillar} pillar is missing sub-score '{key}'")]
    MissingSubScore {
        /// Pillar name (environmental, social, governance)
        pillar: String,
        /// The missing sub-score key
        key: String,
    },

    /// A percentage value is outside `[0, 100]` or not finite
    #[error("{field} must be a percentage in [0, 100], got {value}")]
    OutOfRange {
        /// Field that carried the value
        field: String,
        /// The rejected value
        value: f64,
    },

    /// Industry ranking must be a positive integer
    #[error("industry ranking must be positive")]
    InvalidRanking,
}

/// Render surface errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// Capture was invoked after the surface was torn down (or never materialized)
    #[error("no materialized surface available for capture")]
    SurfaceDetached,

    /// The generated layout could not be parsed into a render tree
    #[error("layout failed: {reason}")]
    Layout {
        /// Parser message
        reason: String,
    },
}

/// Artifact encoding errors
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The surface has no area to rasterize
    #[error("cannot rasterize a {width}x{height} surface")]
    EmptySurface {
        /// Surface width in pixels
        width: u32,
        /// Surface height in pixels
        height: u32,
    },

    /// Rasterization failed
    #[error("rasterization failed: {0}")]
    Raster(String),

    /// Document assembly failed
    #[error("document assembly failed: {0}")]
    Document(String),

    /// Delimited-text serialization failed
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet container could not be written
    #[error("spreadsheet assembly failed: {0}")]
    Spreadsheet(#[from] zip::result::ZipError),

    /// A blocking encode task panicked or was cancelled
    #[error("encode task failed: {0}")]
    TaskFailed(String),
}

/// Storage and artifact delivery errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Failed to open or migrate the report database
    #[error("failed to open report store: {0}")]
    ConnectionFailed(String),

    /// A schema migration could not be applied
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// A database query failed
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// The report record could not be serialized for storage
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row cannot be read back as a report
    #[error("stored report {id} is corrupt: {reason}")]
    CorruptRecord {
        /// Database ID of the row
        id: i64,
        /// What is wrong with it
        reason: String,
    },

    /// The backend rejected the write
    #[error("storage rejected the report: {0}")]
    Rejected(String),

    /// Writing an artifact to its output location failed
    #[error("failed to write artifact to {path}: {reason}")]
    ArtifactWrite {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error message
        reason: String,
    },
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Persistence(PersistenceError::Query(e))
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Encoding(EncodingError::Csv(e))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Encoding(EncodingError::Spreadsheet(e))
    }
}

impl Error {
    /// Machine-readable error code for the notification channel
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::Render(_) => "render_error",
            Error::Encoding(_) => "encoding_error",
            Error::Persistence(_) => "persistence_error",
            Error::Concurrency { .. } => "concurrency_error",
        }
    }

    /// Shorthand for a configuration error on a specific key
    pub(crate) fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

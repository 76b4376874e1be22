//! Error types for the price dashboard
//!
//! Uses thiserror for ergonomic error definitions.
//! Per-region fetch failures never surface as these errors at the HTTP edge:
//! they are captured into the status trail of a `FetchOutcome` instead.

use thiserror::Error;

/// Custom Result type using our Error
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Dashboard errors
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Configuration errors (missing token, bad vars)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (dates, regions, resolution)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// ENTSO-E API errors
    #[error("ENTSO-E API error: {0}")]
    Upstream(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML document errors
    #[error("XML error: {0}")]
    Xml(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: retry after {0} seconds")]
    RateLimit(u64),

    /// Worker runtime errors
    #[error("Worker error: {0}")]
    Worker(String),

    /// Cache storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DashboardError {
    /// HTTP status code to answer with at the worker edge
    pub fn status_code(&self) -> u16 {
        match self {
            DashboardError::InvalidRequest(_) => 400,
            DashboardError::RateLimit(_) => 429,
            DashboardError::Upstream(_) | DashboardError::Http(_) => 502,
            _ => 500,
        }
    }
}

impl From<worker::Error> for DashboardError {
    fn from(err: worker::Error) -> Self {
        DashboardError::Worker(err.to_string())
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        DashboardError::Http(err.to_string())
    }
}

impl From<quick_xml::DeError> for DashboardError {
    fn from(err: quick_xml::DeError) -> Self {
        DashboardError::Xml(err.to_string())
    }
}

impl From<DashboardError> for worker::Error {
    fn from(err: DashboardError) -> Self {
        worker::Error::RustError(err.to_string())
    }
}

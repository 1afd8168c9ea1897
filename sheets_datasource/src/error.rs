use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failures of the host-provided backend-request abstraction.
#[derive(Error, Debug)]
pub enum BackendSrvError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("URL parsing failed: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    /// The host answered with a non-2xx status. `body` holds the parsed JSON
    /// body when the response carried one.
    #[error("HTTP Error: {status}")]
    Status {
        status: StatusCode,
        body: Option<Value>,
    },
}

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error(transparent)]
    Backend(#[from] BackendSrvError),
    #[error("Unexpected response shape: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DataSourceError>;

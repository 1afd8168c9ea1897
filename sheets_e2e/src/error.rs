//! Error types for the end-to-end scenario

use sheets_common::HealthStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Couldn't parse uid from {0}")]
    DashboardUid(String),

    #[error("Couldn't parse id from {0}")]
    DataSourceId(String),

    #[error("Expected alert to contain {expected:?}, got {actual:?}")]
    AlertMismatch { expected: String, actual: String },

    #[error("Data source health is {0:?}, expected OK")]
    Unhealthy(Option<HealthStatus>),

    #[error("No dashboard has been added yet")]
    NoDashboard,

    #[error("Unknown context key: {0}")]
    UnknownContextKey(String),

    #[error("Host UI step failed: {0}")]
    Ui(String),

    #[error("{url} answered {status} with a non-JSON body")]
    InvalidBody { url: String, status: u16 },

    #[error("Host request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, E2eError>;

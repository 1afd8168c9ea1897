//! Error types for the plugin backend

use sheets_common::SettingsError;
use thiserror::Error;

/// Failures talking to the Google Sheets and Drive APIs.
#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("Invalid datasource configuration: {0}")]
    Config(#[from] SettingsError),

    #[error("Invalid service account key: {0}")]
    ServiceAccount(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(String),

    #[error("Google API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unable to get spreadsheet: {0}")]
    InvalidResponse(String),

    #[error("Spreadsheet ID is required")]
    MissingSpreadsheetId,
}

impl From<url::ParseError> for SheetsError {
    fn from(err: url::ParseError) -> Self {
        SheetsError::Url(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Sheets(#[from] SheetsError),

    #[error("HTTP server error: {0}")]
    HttpServer(String),
}

pub type Result<T> = std::result::Result<T, BackendError>;

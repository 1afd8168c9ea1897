//! # Google Sheets Plugin Backend
//!
//! The HTTP side of the Google Sheets datasource. The host forwards the
//! adapter's health, resource and query calls here; the backend answers them
//! from the Google Sheets and Drive APIs.
//!
//! ## Routes
//!
//! *   `GET /health`: liveness.
//! *   `GET /api/datasources/{id}/health`: credential check, `200`/`OK` or `503`/`ERROR`.
//! *   `GET /api/datasources/{id}/resources/spreadsheets`: `{spreadsheets: {id: name}}`.
//! *   `POST /api/ds/query`: runs `query` and `testAPI` queries.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sheets_backend::{BackendConfig, start_server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = BackendConfig::default();
//!     config.settings.json_data.api_key = Some("my-api-key".into());
//!     start_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod googlesheets;
pub mod logging;
pub mod server;

pub use config::{BackendConfig, SheetsSettings, resolve_settings};
pub use error::{BackendError, Result, SheetsError};
pub use googlesheets::{GoogleClient, GoogleEndpoints, GoogleSheets};
pub use server::{AppState, router, start_server};

//! # Sheets Datasource
//!
//! Host-side adapter for the Google Sheets datasource. The host constructs a
//! [`DataSource`] once per session with its instance settings and a
//! [`BackendSrv`] it provides for reaching the plugin backend; after that the
//! adapter is read-only.
//!
//! ## Operations
//!
//! - **`list_spreadsheets`**: spreadsheets from the `spreadsheets` resource as
//!   `{label, value}` picker entries. A missing mapping is an empty list.
//! - **`health_check`**: the backend health record, returned as-is. A non-2xx
//!   answer carrying a health record is normalized to that record.
//! - **`test_datasource`**: `OK` becomes `success`, everything else `fail`.
//! - **`query`**: forwarded to the host's generic query endpoint.
//!
//! ```no_run
//! use sheets_datasource::{DataSource, DataSourceApi, HttpBackendSrv};
//! use sheets_common::{DataSourceInstanceSettings, SheetsSourceOptions};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = DataSourceInstanceSettings {
//!     id: 1,
//!     uid: "sheets".into(),
//!     name: "Google Sheets".into(),
//!     plugin_type: "google-sheets-datasource".into(),
//!     json_data: SheetsSourceOptions::default(),
//! };
//! let backend = HttpBackendSrv::new(Url::parse("http://localhost:3000")?);
//! let ds = DataSource::new(settings, backend);
//! println!("{:?}", ds.test_datasource().await?);
//! # Ok(())
//! # }
//! ```

/// The host's backend-request abstraction and its HTTP implementation.
pub mod backend_srv;
/// The adapter itself.
pub mod datasource;
/// Error types for adapter operations.
pub mod error;

pub use backend_srv::{BackendSrv, HttpBackendSrv};
pub use datasource::{DataSource, DataSourceApi};
pub use error::{BackendSrvError, DataSourceError, Result};

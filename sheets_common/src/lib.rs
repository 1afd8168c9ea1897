//! # Sheets Common
//!
//! Wire types shared between the host-side adapter (`sheets_datasource`), the
//! plugin backend (`sheets_backend`) and the end-to-end scenario (`sheets_e2e`).
//!
//! Every type here serializes with the camelCase field names the host uses on
//! the wire, so a value produced by one crate can be consumed by another
//! without translation.

/// Data frames returned by queries.
pub mod frame;
/// Health check records and the binary test classification.
pub mod health;
/// Query requests and responses.
pub mod query;
/// Datasource instance settings.
pub mod settings;

pub use frame::{DataFrame, Field, FieldConfig, FieldValues, FrameMeta};
pub use health::{HealthCheckResult, HealthStatus, TestDataSourceResult, TestStatus};
pub use query::{
    DataResponse, QueryDataRequest, QueryDataResponse, QueryType, SheetsQuery, SpreadsheetRef,
    TimeRange,
};
pub use settings::{AuthType, DataSourceInstanceSettings, SettingsError, SheetsSourceOptions};

/// A value/label pair the host renders in pickers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SelectableValue {
    pub label: String,
    pub value: String,
}

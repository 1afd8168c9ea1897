//! Google Sheets access: credentials, API client, grid caching and the
//! grid-to-frame conversion.

pub mod auth;
pub mod cache;
pub mod client;
pub mod columns;
pub mod model;
pub mod transform;

use crate::error::SheetsError;
use cache::{SheetCache, SheetData};
use client::SheetsApi;
use model::DriveFile;
use serde_json::{Map, Value, json};
use sheets_common::{DataFrame, SheetsQuery};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub use client::{GoogleClient, GoogleEndpoints};

/// Frame name of a credentials-only query.
pub const TEST_API_FRAME: &str = "TestAPI";

/// Query execution for one configured datasource.
pub struct GoogleSheets {
    client: Arc<dyn SheetsApi>,
    cache: SheetCache,
}

impl GoogleSheets {
    pub fn new(client: Arc<dyn SheetsApi>) -> Self {
        Self {
            client,
            cache: SheetCache::new(),
        }
    }

    /// Reads the query's range and converts it to a frame.
    pub async fn query(&self, query: &SheetsQuery) -> Result<DataFrame, SheetsError> {
        let spreadsheet_id = query.spreadsheet.id.trim();
        if spreadsheet_id.is_empty() {
            return Err(SheetsError::MissingSpreadsheetId);
        }

        let (data, mut meta) = self.sheet_data(spreadsheet_id, query).await?;
        let converted =
            transform::grid_to_frame(&data.grid, &query.ref_id, data.time_zone.as_deref());

        meta.insert("warnings".into(), json!(converted.warnings));
        meta.insert("spreadsheetId".into(), json!(spreadsheet_id));
        meta.insert("range".into(), json!(query.range));
        debug!(
            ref_id = %query.ref_id,
            rows = converted.frame.row_count(),
            fields = converted.frame.fields.len(),
            "Converted sheet to frame"
        );
        Ok(converted.frame.with_custom_meta(meta))
    }

    async fn sheet_data(
        &self,
        spreadsheet_id: &str,
        query: &SheetsQuery,
    ) -> Result<(Arc<SheetData>, Map<String, Value>), SheetsError> {
        let key = SheetCache::key(spreadsheet_id, &query.range);
        let use_cache = query.cache_duration_seconds > 0;

        if use_cache && let Some((data, remaining)) = self.cache.get(&key) {
            debug!(%key, "Sheet cache hit");
            let mut meta = Map::new();
            meta.insert("hit".into(), json!(true));
            meta.insert("count".into(), json!(self.cache.item_count()));
            meta.insert("expires".into(), json!(format!("{}s", remaining.as_secs())));
            return Ok((data, meta));
        }

        let spreadsheet = self
            .client
            .get_spreadsheet(spreadsheet_id, &query.range)
            .await
            .map_err(|e| match e {
                SheetsError::Api { message, .. } => SheetsError::InvalidResponse(message),
                other => other,
            })?;

        let grid = spreadsheet
            .sheets
            .into_iter()
            .next()
            .and_then(|sheet| sheet.data.into_iter().next())
            .ok_or_else(|| SheetsError::InvalidResponse("response contains no grid data".into()))?;

        let data = Arc::new(SheetData {
            grid,
            time_zone: spreadsheet.properties.time_zone,
        });

        if use_cache {
            self.cache.purge_expired();
            self.cache.set(
                key,
                Arc::clone(&data),
                Duration::from_secs(query.cache_duration_seconds),
            );
        }

        let mut meta = Map::new();
        meta.insert("hit".into(), json!(false));
        Ok((data, meta))
    }

    /// Checks the credentials only; answers with an empty `TestAPI` frame.
    pub async fn test_api(&self, ref_id: &str) -> Result<DataFrame, SheetsError> {
        self.client.authenticate().await?;
        let mut frame = DataFrame::new(TEST_API_FRAME);
        frame.ref_id = ref_id.to_string();
        Ok(frame)
    }

    /// Spreadsheets visible to the credentials, in the order Drive lists them.
    pub async fn list_spreadsheets(&self) -> Result<Vec<DriveFile>, SheetsError> {
        let files = self.client.list_spreadsheet_files().await?;
        info!(count = files.len(), "Listed spreadsheets");
        Ok(files)
    }

    pub async fn check_credentials(&self) -> Result<(), SheetsError> {
        self.client.authenticate().await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeSheets;
    use super::*;
    use sheets_common::FieldValues;

    fn service(fake: FakeSheets) -> (GoogleSheets, Arc<FakeSheets>) {
        let fake = Arc::new(fake);
        (GoogleSheets::new(fake.clone()), fake)
    }

    #[tokio::test]
    async fn query_converts_sheet_and_fills_meta() {
        let (sheets, _) = service(FakeSheets::with_rows(&[
            &["Name", "Value"],
            &["a", "1"],
            &["b", "2"],
        ]));
        let query = SheetsQuery::new("A", "sheet-1").with_range("Sheet1!A1:B3");

        let frame = sheets.query(&query).await.unwrap();
        assert_eq!(frame.name, "A");
        assert_eq!(
            frame.field("Value").unwrap().values,
            FieldValues::Number(vec![Some(1.0), Some(2.0)])
        );
        assert_eq!(frame.custom_meta("hit"), Some(&json!(false)));
        assert_eq!(frame.custom_meta("spreadsheetId"), Some(&json!("sheet-1")));
        assert_eq!(frame.custom_meta("range"), Some(&json!("Sheet1!A1:B3")));
        assert_eq!(frame.custom_meta("warnings"), Some(&json!([])));
    }

    #[tokio::test]
    async fn cached_queries_skip_the_api() {
        let (sheets, fake) = service(FakeSheets::with_rows(&[&["Name"], &["a"]]));
        let query = SheetsQuery::new("A", "sheet-1").with_cache_duration(300);

        sheets.query(&query).await.unwrap();
        let second = sheets.query(&query).await.unwrap();

        assert_eq!(fake.fetch_count(), 1);
        assert_eq!(second.custom_meta("hit"), Some(&json!(true)));
        assert_eq!(second.custom_meta("count"), Some(&json!(1)));
        let expires = second.custom_meta("expires").and_then(Value::as_str).unwrap();
        assert!(expires.ends_with('s'), "unexpected expires: {expires}");
    }

    #[tokio::test]
    async fn zero_cache_duration_always_fetches() {
        let (sheets, fake) = service(FakeSheets::with_rows(&[&["Name"], &["a"]]));
        let query = SheetsQuery::new("A", "sheet-1");

        sheets.query(&query).await.unwrap();
        sheets.query(&query).await.unwrap();
        assert_eq!(fake.fetch_count(), 2);
    }

    #[tokio::test]
    async fn missing_spreadsheet_id_is_rejected() {
        let (sheets, fake) = service(FakeSheets::with_rows(&[&["Name"]]));
        let err = sheets.query(&SheetsQuery::new("A", "  ")).await.unwrap_err();
        assert!(matches!(err, SheetsError::MissingSpreadsheetId));
        assert_eq!(fake.fetch_count(), 0);
    }

    #[tokio::test]
    async fn api_failures_read_as_unable_to_get_spreadsheet() {
        let (sheets, _) = service(FakeSheets::with_rows(&[&["Name"]]));
        let err = sheets.query(&SheetsQuery::new("A", "other")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to get spreadsheet: Requested entity was not found."
        );
    }

    #[tokio::test]
    async fn empty_response_is_an_error() {
        let mut fake = FakeSheets::with_rows(&[]);
        if let Some(s) = fake.spreadsheet.as_mut() {
            s.sheets.clear();
        }
        let (sheets, _) = service(fake);
        let err = sheets.query(&SheetsQuery::new("A", "sheet-1")).await.unwrap_err();
        assert!(matches!(err, SheetsError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_api_returns_named_frame() {
        let (sheets, _) = service(FakeSheets::with_rows(&[]));
        let frame = sheets.test_api("B").await.unwrap();
        assert_eq!(frame.name, TEST_API_FRAME);
        assert_eq!(frame.ref_id, "B");
        assert!(frame.fields.is_empty());
    }

    #[tokio::test]
    async fn test_api_surfaces_auth_failures() {
        let mut fake = FakeSheets::with_rows(&[]);
        fake.auth_error = Some("invalid_grant".into());
        let (sheets, _) = service(fake);
        let err = sheets.test_api("B").await.unwrap_err();
        assert!(err.to_string().contains("invalid_grant"));
    }
}

use crate::backend_srv::BackendSrv;
use crate::error::{BackendSrvError, Result};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use sheets_common::{
    DataSourceInstanceSettings, HealthCheckResult, QueryDataRequest, QueryDataResponse,
    SelectableValue, SheetsSourceOptions, TestDataSourceResult,
};
use tracing::{debug, info, warn};

/// Operations the host calls on a datasource instance.
#[async_trait::async_trait]
pub trait DataSourceApi: Send + Sync {
    /// Spreadsheets visible to the configured credentials, as picker entries.
    async fn list_spreadsheets(&self) -> Result<Vec<SelectableValue>>;

    async fn health_check(&self) -> Result<HealthCheckResult>;

    /// "Save & test": the health check collapsed to success/fail.
    async fn test_datasource(&self) -> Result<TestDataSourceResult>;

    /// Runs panel queries through the host's generic query endpoint.
    async fn query(&self, request: QueryDataRequest) -> Result<QueryDataResponse>;
}

#[derive(Debug, Deserialize)]
struct SpreadsheetsResponse {
    #[serde(default)]
    spreadsheets: Option<Map<String, Value>>,
}

/// The Google Sheets adapter. Holds the host settings and the host's
/// backend-request service; performs no I/O until a method is called.
pub struct DataSource<B> {
    settings: DataSourceInstanceSettings<SheetsSourceOptions>,
    backend: B,
}

impl<B: BackendSrv> DataSource<B> {
    pub fn new(settings: DataSourceInstanceSettings<SheetsSourceOptions>, backend: B) -> Self {
        Self { settings, backend }
    }

    pub fn id(&self) -> u64 {
        self.settings.id
    }

    pub fn settings(&self) -> &DataSourceInstanceSettings<SheetsSourceOptions> {
        &self.settings
    }

    /// `GET` on one of this datasource's backend resources.
    pub async fn get_resource(&self, path: &str) -> Result<Value> {
        let path = format!(
            "/api/datasources/{}/resources/{}",
            self.settings.id,
            path.trim_start_matches('/')
        );
        Ok(self.backend.get(&path).await?)
    }

    fn stamp_query(&self, query: &sheets_common::SheetsQuery) -> Result<Value> {
        let mut value = serde_json::to_value(query)?;
        if let Value::Object(map) = &mut value {
            map.insert(
                "datasource".into(),
                json!({ "uid": self.settings.uid, "type": self.settings.plugin_type }),
            );
            map.insert("datasourceId".into(), json!(self.settings.id));
        }
        Ok(value)
    }
}

#[async_trait::async_trait]
impl<B: BackendSrv> DataSourceApi for DataSource<B> {
    async fn list_spreadsheets(&self) -> Result<Vec<SelectableValue>> {
        let body = self.get_resource("spreadsheets").await?;
        if body.is_null() {
            return Ok(Vec::new());
        }

        let response: SpreadsheetsResponse = serde_json::from_value(body)?;
        let spreadsheets = response.spreadsheets.unwrap_or_default();
        debug!(
            datasource_id = self.settings.id,
            count = spreadsheets.len(),
            "Listed spreadsheets"
        );

        spreadsheets
            .into_iter()
            .map(|(value, label)| {
                Ok(SelectableValue {
                    label: serde_json::from_value(label)?,
                    value,
                })
            })
            .collect()
    }

    async fn health_check(&self) -> Result<HealthCheckResult> {
        let path = format!("/api/datasources/{}/health", self.settings.id);
        match self.backend.get(&path).await {
            Ok(body) => Ok(serde_json::from_value(body)?),
            // The backend reports ERROR with a 503; keep it on the structured path.
            Err(BackendSrvError::Status {
                status,
                body: Some(body),
            }) => match serde_json::from_value::<HealthCheckResult>(body.clone()) {
                Ok(result) => {
                    warn!(
                        datasource_id = self.settings.id,
                        %status,
                        status_reported = ?result.status,
                        "Health check answered with non-success status"
                    );
                    Ok(result)
                }
                Err(_) => Err(BackendSrvError::Status {
                    status,
                    body: Some(body),
                }
                .into()),
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn test_datasource(&self) -> Result<TestDataSourceResult> {
        let health = self.health_check().await?;
        info!(
            datasource_id = self.settings.id,
            status = ?health.status,
            message = %health.message,
            "Tested datasource"
        );
        Ok(health.into())
    }

    async fn query(&self, request: QueryDataRequest) -> Result<QueryDataResponse> {
        let queries = request
            .queries
            .iter()
            .map(|q| self.stamp_query(q))
            .collect::<Result<Vec<_>>>()?;

        let mut body = json!({ "queries": queries });
        if let Some(range) = &request.range {
            body["from"] = json!(range.from);
            body["to"] = json!(range.to);
        }

        let response = self.backend.post("/api/ds/query", &body).await?;
        Ok(serde_json::from_value(response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use sheets_common::{HealthStatus, SheetsQuery, TestStatus};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned host answers keyed by path.
    #[derive(Default)]
    struct FakeBackend {
        responses: HashMap<String, (u16, Value)>,
        requests: Mutex<Vec<(String, Option<Value>)>>,
    }

    type FakeResult = std::result::Result<Value, BackendSrvError>;

    impl FakeBackend {
        fn with(mut self, path: &str, status: u16, body: Value) -> Self {
            self.responses.insert(path.to_string(), (status, body));
            self
        }

        fn answer(&self, path: &str, body: Option<&Value>) -> FakeResult {
            self.requests
                .lock()
                .unwrap()
                .push((path.to_string(), body.cloned()));
            let (status, body) = self
                .responses
                .get(path)
                .cloned()
                .unwrap_or((404, Value::Null));
            if (200..300).contains(&status) {
                Ok(body)
            } else {
                Err(BackendSrvError::Status {
                    status: StatusCode::from_u16(status).unwrap(),
                    body: (!body.is_null()).then_some(body),
                })
            }
        }
    }

    #[async_trait::async_trait]
    impl BackendSrv for FakeBackend {
        async fn get(&self, path: &str) -> FakeResult {
            self.answer(path, None)
        }

        async fn post(&self, path: &str, body: &Value) -> FakeResult {
            self.answer(path, Some(body))
        }
    }

    fn settings() -> DataSourceInstanceSettings<SheetsSourceOptions> {
        DataSourceInstanceSettings {
            id: 42,
            uid: "sheets-uid".into(),
            name: "Google Sheets".into(),
            plugin_type: "google-sheets-datasource".into(),
            json_data: SheetsSourceOptions::default(),
        }
    }

    const RESOURCE: &str = "/api/datasources/42/resources/spreadsheets";
    const HEALTH: &str = "/api/datasources/42/health";

    #[tokio::test]
    async fn construction_performs_no_requests() {
        let ds = DataSource::new(settings(), FakeBackend::default());
        assert_eq!(ds.id(), 42);
        assert!(ds.backend.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_spreadsheets_maps_id_to_value_and_name_to_label() {
        let backend = FakeBackend::default().with(
            RESOURCE,
            200,
            json!({"spreadsheets": {"id1": "Sheet One"}}),
        );
        let ds = DataSource::new(settings(), backend);

        let sheets = ds.list_spreadsheets().await.unwrap();
        assert_eq!(
            sheets,
            vec![SelectableValue {
                label: "Sheet One".into(),
                value: "id1".into()
            }]
        );
    }

    #[tokio::test]
    async fn list_spreadsheets_keeps_backend_order() {
        let backend = FakeBackend::default().with(
            RESOURCE,
            200,
            json!({"spreadsheets": {"zz": "Last", "aa": "First"}}),
        );
        let ds = DataSource::new(settings(), backend);

        let values: Vec<_> = ds
            .list_spreadsheets()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec!["zz", "aa"]);
    }

    #[tokio::test]
    async fn list_spreadsheets_without_mapping_is_empty() {
        for body in [json!({}), json!({"spreadsheets": null}), Value::Null] {
            let backend = FakeBackend::default().with(RESOURCE, 200, body);
            let ds = DataSource::new(settings(), backend);
            assert!(ds.list_spreadsheets().await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn list_spreadsheets_propagates_transport_errors() {
        let backend = FakeBackend::default().with(RESOURCE, 500, json!({"error": "boom"}));
        let ds = DataSource::new(settings(), backend);
        assert!(ds.list_spreadsheets().await.is_err());
    }

    #[tokio::test]
    async fn test_datasource_maps_ok_to_success() {
        let backend =
            FakeBackend::default().with(HEALTH, 200, json!({"status": "OK", "message": "fine"}));
        let ds = DataSource::new(settings(), backend);

        let result = ds.test_datasource().await.unwrap();
        assert_eq!(result.status, TestStatus::Success);
        assert_eq!(result.message, "fine");
    }

    #[tokio::test]
    async fn test_datasource_maps_error_to_fail() {
        let backend = FakeBackend::default().with(
            HEALTH,
            200,
            json!({"status": "ERROR", "message": "bad creds"}),
        );
        let ds = DataSource::new(settings(), backend);

        let result = ds.test_datasource().await.unwrap();
        assert_eq!(result.status, TestStatus::Fail);
        assert_eq!(result.message, "bad creds");
    }

    #[tokio::test]
    async fn test_datasource_unknown_is_fail_and_repeatable() {
        let backend =
            FakeBackend::default().with(HEALTH, 200, json!({"status": "UNKNOWN", "message": ""}));
        let ds = DataSource::new(settings(), backend);

        let first = ds.test_datasource().await.unwrap();
        let second = ds.test_datasource().await.unwrap();
        assert_eq!(first.status, TestStatus::Fail);
        assert_eq!(first.message, "");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn health_check_normalizes_error_status_with_health_body() {
        let backend = FakeBackend::default().with(
            HEALTH,
            503,
            json!({"status": "ERROR", "message": "API key rejected"}),
        );
        let ds = DataSource::new(settings(), backend);

        let health = ds.health_check().await.unwrap();
        assert_eq!(health.status, HealthStatus::Error);
        assert_eq!(health.message, "API key rejected");
    }

    #[tokio::test]
    async fn health_check_keeps_errors_without_health_body() {
        let backend = FakeBackend::default().with(HEALTH, 502, json!({"oops": true}));
        let ds = DataSource::new(settings(), backend);

        let err = ds.health_check().await.unwrap_err();
        assert!(err.to_string().contains("502"), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn query_stamps_datasource_and_forwards_queries() {
        let backend = FakeBackend::default().with(
            "/api/ds/query",
            200,
            json!({"results": {"A": {"frames": []}}}),
        );
        let ds = DataSource::new(settings(), backend);

        let request = QueryDataRequest {
            queries: vec![SheetsQuery::new("A", "sheet-1").with_range("A1:B2")],
            range: None,
        };
        let response = ds.query(request).await.unwrap();
        assert!(response.results.contains_key("A"));

        let requests = ds.backend.requests.lock().unwrap();
        let (path, body) = &requests[0];
        assert_eq!(path, "/api/ds/query");
        let query = &body.as_ref().unwrap()["queries"][0];
        assert_eq!(query["spreadsheet"]["id"], json!("sheet-1"));
        assert_eq!(query["range"], json!("A1:B2"));
        assert_eq!(query["datasource"]["uid"], json!("sheets-uid"));
        assert_eq!(query["datasourceId"], json!(42));
    }
}

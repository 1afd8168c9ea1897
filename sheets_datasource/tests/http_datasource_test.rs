//! Integration tests for `DataSource` over `HttpBackendSrv`, with the host
//! played by wiremock.

use serde_json::json;
use sheets_common::{
    DataSourceInstanceSettings, HealthStatus, QueryDataRequest, SheetsQuery, SheetsSourceOptions,
    TestStatus, TimeRange,
};
use sheets_datasource::{DataSource, DataSourceApi, DataSourceError, HttpBackendSrv};
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(id: u64) -> DataSourceInstanceSettings<SheetsSourceOptions> {
    DataSourceInstanceSettings {
        id,
        uid: format!("uid-{id}"),
        name: "Google Sheets".into(),
        plugin_type: "google-sheets-datasource".into(),
        json_data: SheetsSourceOptions::default(),
    }
}

fn datasource(server: &MockServer, id: u64) -> DataSource<HttpBackendSrv> {
    let backend = HttpBackendSrv::new(Url::parse(&server.uri()).unwrap());
    DataSource::new(settings(id), backend)
}

mod list_spreadsheets {
    use super::*;

    #[tokio::test]
    async fn reads_the_spreadsheets_resource() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/datasources/3/resources/spreadsheets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spreadsheets": { "id1": "Sheet One", "id2": "Budget" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sheets = datasource(&server, 3).list_spreadsheets().await.unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].value, "id1");
        assert_eq!(sheets[0].label, "Sheet One");
        assert_eq!(sheets[1].label, "Budget");
    }

    #[tokio::test]
    async fn empty_body_yields_no_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/datasources/3/resources/spreadsheets"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let sheets = datasource(&server, 3).list_spreadsheets().await.unwrap();
        assert!(sheets.is_empty());
    }

    #[tokio::test]
    async fn server_error_is_propagated_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/datasources/3/resources/spreadsheets"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .expect(1)
            .mount(&server)
            .await;

        let result = datasource(&server, 3).list_spreadsheets().await;
        assert!(matches!(result, Err(DataSourceError::Backend(_))));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let backend = HttpBackendSrv::new(Url::parse("http://127.0.0.1:1").unwrap());
        let ds = DataSource::new(settings(3), backend);
        assert!(ds.list_spreadsheets().await.is_err());
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn ok_health_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/datasources/9/health"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "OK", "message": "Success"})),
            )
            .mount(&server)
            .await;

        let ds = datasource(&server, 9);
        let health = ds.health_check().await.unwrap();
        assert_eq!(health.status, HealthStatus::Ok);

        let result = ds.test_datasource().await.unwrap();
        assert_eq!(result.status, TestStatus::Success);
        assert_eq!(result.message, "Success");
    }

    #[tokio::test]
    async fn service_unavailable_with_error_body_is_fail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/datasources/9/health"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "status": "ERROR",
                "message": "bad creds",
                "details": { "authType": "key" }
            })))
            .mount(&server)
            .await;

        let ds = datasource(&server, 9);
        let health = ds.health_check().await.unwrap();
        assert_eq!(health.status, HealthStatus::Error);
        assert_eq!(health.details.unwrap()["authType"], json!("key"));

        let result = ds.test_datasource().await.unwrap();
        assert_eq!(result.status, TestStatus::Fail);
        assert_eq!(result.message, "bad creds");
    }

    #[tokio::test]
    async fn plain_text_error_stays_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/datasources/9/health"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let result = datasource(&server, 9).test_datasource().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn bearer_token_is_sent_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/datasources/9/health"))
            .and(header("authorization", "Bearer host-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "OK", "message": ""})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let backend =
            HttpBackendSrv::new(Url::parse(&server.uri()).unwrap()).with_token("host-token");
        let ds = DataSource::new(settings(9), backend);
        assert_eq!(ds.health_check().await.unwrap().status, HealthStatus::Ok);
    }
}

mod query {
    use super::*;

    #[tokio::test]
    async fn posts_to_the_generic_query_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ds/query"))
            .and(body_partial_json(json!({
                "from": "now-1h",
                "to": "now",
                "queries": [{
                    "refId": "A",
                    "spreadsheet": { "id": "sheet-1" },
                    "datasourceId": 5
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": {
                    "A": {
                        "frames": [{
                            "name": "A",
                            "refId": "A",
                            "fields": [
                                { "name": "Value", "type": "number", "values": [1.0, 2.0] }
                            ]
                        }]
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = QueryDataRequest {
            queries: vec![SheetsQuery::new("A", "sheet-1")],
            range: Some(TimeRange {
                from: "now-1h".into(),
                to: "now".into(),
            }),
        };
        let response = datasource(&server, 5).query(request).await.unwrap();
        let frames = &response.results["A"].frames;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].row_count(), 2);
    }
}

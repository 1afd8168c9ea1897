use crate::frame::DataFrame;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryType {
    /// Read a spreadsheet range into a frame.
    #[default]
    #[serde(rename = "query")]
    Query,
    /// Only check that the configured credentials work.
    #[serde(rename = "testAPI")]
    TestApi,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpreadsheetRef {
    #[serde(default)]
    pub id: String,
}

/// A single panel query against a spreadsheet.
///
/// Fields the host adds on its own (`datasource`, `hide`, ...) are kept in
/// `extra` so the query can be forwarded unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsQuery {
    #[serde(default)]
    pub ref_id: String,
    /// Raw query type; unknown values are rejected per query by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,
    #[serde(default)]
    pub spreadsheet: SpreadsheetRef,
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub cache_duration_seconds: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SheetsQuery {
    pub fn new(ref_id: impl Into<String>, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            spreadsheet: SpreadsheetRef {
                id: spreadsheet_id.into(),
            },
            ..Self::default()
        }
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    pub fn with_cache_duration(mut self, seconds: u64) -> Self {
        self.cache_duration_seconds = seconds;
        self
    }

    /// Resolves `query_type`, treating a missing value as a data query.
    /// Returns `None` for a type the backend does not know.
    pub fn parsed_query_type(&self) -> Option<QueryType> {
        match self.query_type.as_deref() {
            None | Some("") => Some(QueryType::Query),
            Some(raw) => serde_json::from_value(Value::String(raw.to_string())).ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

/// Body of the host's generic query endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryDataRequest {
    pub queries: Vec<SheetsQuery>,
    #[serde(flatten)]
    pub range: Option<TimeRange>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataResponse {
    #[serde(default)]
    pub frames: Vec<DataFrame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Results keyed by query `refId`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryDataResponse {
    #[serde(default)]
    pub results: BTreeMap<String, DataResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_round_trips_host_fields() {
        let raw = json!({
            "refId": "A",
            "spreadsheet": { "id": "sheet-1" },
            "range": "Sheet1!A1:C10",
            "cacheDurationSeconds": 300,
            "datasource": { "uid": "abc" },
            "hide": false
        });
        let query: SheetsQuery = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(query.spreadsheet.id, "sheet-1");
        assert_eq!(query.cache_duration_seconds, 300);
        assert_eq!(query.extra["datasource"], json!({"uid": "abc"}));
        assert_eq!(serde_json::to_value(&query).unwrap(), raw);
    }

    #[test]
    fn query_type_resolution() {
        let mut query = SheetsQuery::new("A", "id");
        assert_eq!(query.parsed_query_type(), Some(QueryType::Query));

        query.query_type = Some("testAPI".into());
        assert_eq!(query.parsed_query_type(), Some(QueryType::TestApi));

        query.query_type = Some("drop tables".into());
        assert_eq!(query.parsed_query_type(), None);
    }

    #[test]
    fn request_flattens_time_range() {
        let request = QueryDataRequest {
            queries: vec![SheetsQuery::new("A", "id")],
            range: Some(TimeRange {
                from: "now-6h".into(),
                to: "now".into(),
            }),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["from"], json!("now-6h"));
        assert_eq!(value["to"], json!("now"));
    }
}

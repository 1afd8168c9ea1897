use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Upstream status reported by the backend health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    #[default]
    Unknown,
    Ok,
    Error,
}

/// Body of `GET /api/datasources/{id}/health`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl HealthCheckResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Ok,
            message: message.into(),
            details: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Error,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Success,
    Fail,
}

/// What the host's "Save & test" button shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDataSourceResult {
    pub status: TestStatus,
    pub message: String,
}

impl From<HealthCheckResult> for TestDataSourceResult {
    /// Collapses the ternary health status to success/fail. Only `OK` succeeds.
    fn from(result: HealthCheckResult) -> Self {
        let status = match result.status {
            HealthStatus::Ok => TestStatus::Success,
            HealthStatus::Unknown | HealthStatus::Error => TestStatus::Fail,
        };
        Self {
            status,
            message: result.message,
        }
    }
}

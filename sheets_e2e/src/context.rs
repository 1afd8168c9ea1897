use crate::error::{E2eError, Result};

pub const LAST_ADDED_DASHBOARD: &str = "lastAddedDashboard";
pub const LAST_ADDED_DASHBOARD_UID: &str = "lastAddedDashboardUid";
pub const LAST_ADDED_DATA_SOURCE: &str = "lastAddedDataSource";
pub const LAST_ADDED_DATA_SOURCE_ID: &str = "lastAddedDataSourceId";

/// Keys a harness may use to persist the context between steps.
pub const CONTEXT_KEYS: [&str; 4] = [
    LAST_ADDED_DASHBOARD,
    LAST_ADDED_DASHBOARD_UID,
    LAST_ADDED_DATA_SOURCE,
    LAST_ADDED_DATA_SOURCE_ID,
];

/// What earlier steps of a scenario created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioContext {
    pub last_added_dashboard: Option<String>,
    pub last_added_dashboard_uid: Option<String>,
    pub last_added_data_source: Option<String>,
    pub last_added_data_source_id: Option<String>,
}

impl ScenarioContext {
    pub fn get(&self, key: &str) -> Result<Option<&str>> {
        let value = match key {
            LAST_ADDED_DASHBOARD => &self.last_added_dashboard,
            LAST_ADDED_DASHBOARD_UID => &self.last_added_dashboard_uid,
            LAST_ADDED_DATA_SOURCE => &self.last_added_data_source,
            LAST_ADDED_DATA_SOURCE_ID => &self.last_added_data_source_id,
            other => return Err(E2eError::UnknownContextKey(other.to_string())),
        };
        Ok(value.as_deref())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let slot = match key {
            LAST_ADDED_DASHBOARD => &mut self.last_added_dashboard,
            LAST_ADDED_DASHBOARD_UID => &mut self.last_added_dashboard_uid,
            LAST_ADDED_DATA_SOURCE => &mut self.last_added_data_source,
            LAST_ADDED_DATA_SOURCE_ID => &mut self.last_added_data_source_id,
            other => return Err(E2eError::UnknownContextKey(other.to_string())),
        };
        *slot = Some(value.into());
        Ok(())
    }

    /// Set values as `(key, value)` pairs, in `CONTEXT_KEYS` order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        CONTEXT_KEYS
            .iter()
            .filter_map(|key| match self.get(key) {
                Ok(Some(value)) => Some((*key, value)),
                _ => None,
            })
            .collect()
    }
}

//! Scenario steps. Each step reads and writes the `ScenarioContext` it is
//! handed instead of a shared global store.

use crate::context::ScenarioContext;
use crate::error::{E2eError, Result};
use crate::host::{HostApi, HostUi};
use crate::host_url::{dashboard_uid, data_source_id, join_base};
use chrono::Utc;
use sheets_common::{HealthCheckResult, HealthStatus};
use tracing::info;

/// A value typed into the field with the given placeholder before save & test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInput {
    pub placeholder: String,
    pub value: String,
}

impl FieldInput {
    pub fn new(placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceConfig {
    /// Text the save & test alert must contain.
    pub alert_message: String,
    /// Plugin to pick on the add-data-source page.
    pub name: String,
    pub before_submit: Vec<FieldInput>,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            alert_message: "Data source is working".to_string(),
            name: "TestData DB".to_string(),
            before_submit: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    pub data_source_name: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            data_source_name: "TestData DB".to_string(),
        }
    }
}

/// Name given to data sources created by a scenario.
pub fn generated_data_source_name() -> String {
    format!("e2e-{}", Utc::now().timestamp_millis())
}

/// Drives the host UI and API through the scenario steps.
pub struct Scenario<U, A> {
    ui: U,
    api: A,
    base_url: String,
    context: ScenarioContext,
}

impl<U: HostUi, A: HostApi> Scenario<U, A> {
    pub fn new(ui: U, api: A, base_url: impl Into<String>) -> Self {
        Self {
            ui,
            api,
            base_url: base_url.into(),
            context: ScenarioContext::default(),
        }
    }

    /// Continues from the state a previous run left behind.
    pub fn with_context(mut self, context: ScenarioContext) -> Self {
        self.context = context;
        self
    }

    pub fn context(&self) -> &ScenarioContext {
        &self.context
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn into_context(self) -> ScenarioContext {
        self.context
    }

    /// Adds a data source of plugin `config.name` under a generated name,
    /// checks the save & test alert and the health endpoint. Returns the
    /// generated name.
    pub async fn add_data_source(&mut self, config: DataSourceConfig) -> Result<String> {
        info!(plugin = %config.name, "Adding data source");
        self.ui.visit_add_data_source().await?;
        self.ui.select_data_source_plugin(&config.name).await?;

        let name = generated_data_source_name();
        self.ui.set_data_source_name(&name).await?;
        for input in &config.before_submit {
            self.ui
                .fill_by_placeholder(&input.placeholder, &input.value)
                .await?;
        }
        self.ui.save_and_test().await?;

        let alert = self.ui.alert_message().await?;
        if !alert.contains(&config.alert_message) {
            return Err(E2eError::AlertMismatch {
                expected: config.alert_message,
                actual: alert,
            });
        }
        info!(%name, "Added data source");

        let url = self.ui.current_url().await?;
        let id = data_source_id(&url)?;
        self.context.last_added_data_source = Some(name.clone());
        self.context.last_added_data_source_id = Some(id.clone());

        let health_url = join_base(&self.base_url, &format!("/api/datasources/{id}/health"))?;
        info!(%health_url, "Fetching");
        let body = self.api.get_json(&health_url).await?;
        let status = serde_json::from_value::<HealthCheckResult>(body)
            .ok()
            .map(|health| health.status);
        if status != Some(HealthStatus::Ok) {
            return Err(E2eError::Unhealthy(status));
        }

        Ok(name)
    }

    /// Creates and saves a dashboard; records its title and uid.
    pub async fn add_dashboard(&mut self) -> Result<String> {
        info!("Adding dashboard");
        let title = self.ui.add_and_save_dashboard().await?;
        info!(%title, "Added dashboard");

        let url = self.ui.current_url().await?;
        let uid = dashboard_uid(&url)?;
        self.context.last_added_dashboard = Some(title.clone());
        self.context.last_added_dashboard_uid = Some(uid);
        Ok(title)
    }

    /// Adds a panel querying `config.data_source_name` to the last added
    /// dashboard.
    pub async fn add_panel(&mut self, config: PanelConfig) -> Result<()> {
        let uid = self
            .context
            .last_added_dashboard_uid
            .clone()
            .ok_or(E2eError::NoDashboard)?;

        info!(%uid, data_source = %config.data_source_name, "Adding panel");
        self.ui.open_dashboard(&uid).await?;
        self.ui.add_panel().await?;
        self.ui.pick_data_source(&config.data_source_name).await?;
        self.ui.open_visualization_tab().await
    }
}

/// Smoke test: add a Google Sheets data source with an API key, a dashboard,
/// and a panel on it.
pub async fn smoke_scenario<U: HostUi, A: HostApi>(
    ui: U,
    api: A,
    base_url: impl Into<String>,
) -> Result<ScenarioContext> {
    let mut scenario = Scenario::new(ui, api, base_url);
    scenario
        .add_data_source(DataSourceConfig {
            alert_message: "Success".to_string(),
            name: "Google Sheets".to_string(),
            before_submit: vec![FieldInput::new("Enter API Key", "abc123")],
        })
        .await?;
    scenario.add_dashboard().await?;
    scenario
        .add_panel(PanelConfig {
            data_source_name: "Google Sheets".to_string(),
        })
        .await?;
    Ok(scenario.into_context())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_test_data_plugin() {
        let config = DataSourceConfig::default();
        assert_eq!(config.alert_message, "Data source is working");
        assert_eq!(config.name, "TestData DB");
        assert!(config.before_submit.is_empty());
        assert_eq!(PanelConfig::default().data_source_name, "TestData DB");
    }

    #[test]
    fn generated_names_carry_a_timestamp() {
        let name = generated_data_source_name();
        let millis = name.strip_prefix("e2e-").unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
    }
}
